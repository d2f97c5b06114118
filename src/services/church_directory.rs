// src/services/church_directory.rs

use std::sync::Arc;

use crate::{common::error::AppError, db::ChurchStore, models::church::Church};

/// Responde "quem chama é admin desta igreja, e a igreja está utilizável?".
///
/// Os predicados devolvem `None` tanto para igreja inexistente quanto para quem
/// não é admin (ou igreja inativa): o chamador não consegue distinguir os casos.
#[derive(Clone)]
pub struct ChurchDirectory {
    store: Arc<dyn ChurchStore>,
}

impl ChurchDirectory {
    pub fn new(store: Arc<dyn ChurchStore>) -> Self {
        Self { store }
    }

    pub async fn is_admin(
        &self,
        church_code: &str,
        caller_email: &str,
    ) -> Result<Option<Church>, AppError> {
        let church = self.store.find_by_code(church_code).await?;
        Ok(church.filter(|c| c.has_admin(caller_email)))
    }

    pub async fn is_admin_and_available(
        &self,
        church_code: &str,
        caller_email: &str,
    ) -> Result<Option<Church>, AppError> {
        let church = self.is_admin(church_code, caller_email).await?;
        Ok(church.filter(Church::is_available))
    }

    /// `is_admin` convertido em erro genérico de autorização.
    pub async fn authorize_admin(
        &self,
        church_code: &str,
        caller_email: &str,
    ) -> Result<Church, AppError> {
        self.is_admin(church_code, caller_email)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden(format!(
                    "{caller_email} não é admin da igreja '{church_code}'"
                ))
            })
    }

    /// Usado por toda alteração de roster e de agenda.
    pub async fn authorize_available_admin(
        &self,
        church_code: &str,
        caller_email: &str,
    ) -> Result<Church, AppError> {
        self.is_admin_and_available(church_code, caller_email)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden(format!(
                    "{caller_email} não é admin da igreja '{church_code}' ou a igreja não está ativa"
                ))
            })
    }

    /// Leitura pública: só igrejas ativas existem para quem não é admin.
    pub async fn find_active(&self, church_code: &str) -> Result<Option<Church>, AppError> {
        let church = self.store.find_by_code(church_code).await?;
        Ok(church.filter(Church::is_available))
    }
}
