// src/middleware/church_code.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::{error::AppError, extract::PathParam},
    models::church::{is_valid_code, normalize_code},
};

// Extrator do código da igreja vindo do path (`/.../{code}`).
// Normaliza (trim + minúsculas) e barra códigos que nunca poderiam existir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChurchCode(pub String);

impl<S> FromRequestParts<S> for ChurchCode
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let PathParam(raw) = PathParam::<String>::from_request_parts(parts, state).await?;

        let code = normalize_code(&raw);
        if !is_valid_code(&code) {
            return Err(AppError::Validation(format!("Código de igreja inválido: '{raw}'")));
        }

        Ok(ChurchCode(code))
    }
}
