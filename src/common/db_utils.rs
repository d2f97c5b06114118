use crate::common::error::AppError;

// SQLSTATE de violação da constraint EXCLUDE (events_no_overlap)
const EXCLUSION_VIOLATION: &str = "23P01";

// ---
// Helper: traduz violações de constraint do Postgres em erros de negócio
// ---
/// Usado nas escritas: a constraint do banco é a garantia final dos invariantes
/// (código/nome únicos, agenda sem sobreposição), a checagem prévia é só o caminho comum.
pub(crate) fn map_write_error(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
            return AppError::Conflict(format!(
                "Horário sobrepõe outra programação no local ({})",
                db_err.constraint().unwrap_or("events_no_overlap")
            ));
        }
        if db_err.is_unique_violation() {
            return AppError::InvalidState(format!(
                "Registro duplicado ({})",
                db_err.constraint().unwrap_or("unique")
            ));
        }
        if db_err.is_check_violation() {
            return AppError::Validation(format!(
                "Dados rejeitados pelo banco ({})",
                db_err.constraint().unwrap_or("check")
            ));
        }
    }
    AppError::DatabaseError(e)
}

/// Escapa `%`, `_` e `\` para uso seguro dentro de um padrão ILIKE.
pub(crate) fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("cme"), "cme");
    }

    #[test]
    fn non_database_errors_stay_database_errors() {
        assert!(matches!(
            map_write_error(sqlx::Error::RowNotFound),
            AppError::DatabaseError(_)
        ));
    }
}
