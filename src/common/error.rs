use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro. Cada variante é um "tipo" de falha; a mensagem
// detalhada vai só para o log, nunca para o cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dados inválidos: {0}")]
    Validation(String),

    #[error("Erro de validação: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    // Não encontrado, não é admin e igreja inativa caem todos aqui,
    // para não vazar a existência (ou o status) de uma igreja.
    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Conflito de agenda: {0}")]
    Conflict(String),

    #[error("Operação inválida para o estado atual: {0}")]
    InvalidState(String),

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável, legível por máquina, devolvido no corpo da resposta.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::ValidationError(_) => "validation",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::InvalidState(_) => "invalid_state",
            AppError::InvalidToken | AppError::JwtError(_) => "unauthorized",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidToken | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        // O detalhe fica no log do operador
        if status.is_server_error() {
            tracing::error!(kind, "Erro Interno do Servidor: {}", self);
        } else {
            tracing::warn!(kind, "Requisição rejeitada: {}", self);
        }

        (status, Json(json!({ "error": kind }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_failures_collapse_to_bad_request() {
        let errors = [
            AppError::Validation("titulo vazio".into()),
            AppError::Forbidden("igreja inexistente".into()),
            AppError::Conflict("sobreposição".into()),
            AppError::InvalidState("já publicado".into()),
        ];
        for err in errors {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn forbidden_kind_does_not_carry_the_reason() {
        let missing = AppError::Forbidden("igreja não existe".into());
        let not_admin = AppError::Forbidden("não é admin".into());
        assert_eq!(missing.kind(), not_admin.kind());
    }

    #[test]
    fn store_failures_are_internal() {
        let err = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "internal");
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    }
}
