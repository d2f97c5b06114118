// src/services/church_service.rs

use std::sync::Arc;

use chrono::Utc;
use validator::ValidateEmail;

use crate::{
    common::error::AppError,
    db::ChurchStore,
    models::{
        auth::Caller,
        church::{
            is_valid_church_code, normalize_code, AdminSet, Church, ChurchDetail, ChurchListing,
            ChurchProfile, ChurchStatus,
        },
        event::non_blank,
    },
    services::{church_directory::ChurchDirectory, time_window::TimeOffset},
};

/// Dados de cadastro/atualização do perfil de uma igreja.
#[derive(Debug, Clone)]
pub struct ChurchProfileInput {
    pub name: String,
    pub address: Option<String>,
    pub time_offset: i32,
    /// Admins além de quem chama; vazios e repetidos são ignorados.
    pub admins: Vec<String>,
}

impl ChurchProfileInput {
    fn validated_name(&self) -> Result<String, AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("O nome da igreja é obrigatório".into()));
        }
        Ok(name.to_string())
    }

    fn validated_admins(&self) -> Result<&[String], AppError> {
        if let Some(invalid) = self
            .admins
            .iter()
            .map(|email| email.trim())
            .find(|email| !email.is_empty() && !email.validate_email())
        {
            return Err(AppError::Validation(format!("E-mail de admin inválido: '{invalid}'")));
        }
        Ok(&self.admins)
    }
}

#[derive(Clone)]
pub struct ChurchService {
    store: Arc<dyn ChurchStore>,
    directory: ChurchDirectory,
}

impl ChurchService {
    /// Cria uma nova instância do serviço de igrejas.
    pub fn new(store: Arc<dyn ChurchStore>, directory: ChurchDirectory) -> Self {
        Self { store, directory }
    }

    /// LÓGICA DE NEGÓCIO: cadastra a igreja já ativa, com quem chamou como primeiro admin.
    pub async fn register(
        &self,
        caller: &Caller,
        code: &str,
        input: ChurchProfileInput,
    ) -> Result<Church, AppError> {
        // 1. Validações
        let code = normalize_code(code);
        if !is_valid_church_code(&code) {
            return Err(AppError::Validation(format!("Código de igreja inválido: '{code}'")));
        }
        let name = input.validated_name()?;
        let admins = AdminSet::with_owner(&caller.email, input.validated_admins()?);
        TimeOffset::from_minutes(input.time_offset)?;

        // 2. Código e nome são únicos
        if self.store.find_by_code_or_name(&code, &name).await?.is_some() {
            return Err(AppError::InvalidState(format!(
                "Já existe igreja com o código '{code}' ou o nome '{name}'"
            )));
        }

        // 3. Monta e grava
        let now = Utc::now();
        let church = Church {
            code,
            name,
            address: non_blank(input.address),
            time_offset: input.time_offset,
            status: ChurchStatus::Active,
            admins,
            servants: Vec::new(),
            locations: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&church).await?;

        tracing::info!(church = %church.code, admin = %caller.email, "⛪ Igreja cadastrada");
        Ok(church)
    }

    /// Atualiza nome, endereço, offset e a lista de admins (quem chama continua admin).
    /// Basta ser admin: a igreja pode estar pendente ou inativa.
    pub async fn update_profile(
        &self,
        caller: &Caller,
        code: &str,
        input: ChurchProfileInput,
    ) -> Result<ChurchProfile, AppError> {
        let mut church = self.directory.authorize_admin(code, &caller.email).await?;

        let name = input.validated_name()?;
        let admins = AdminSet::with_owner(&caller.email, input.validated_admins()?);
        TimeOffset::from_minutes(input.time_offset)?;

        church.name = name;
        church.address = non_blank(input.address);
        church.time_offset = input.time_offset;
        church.admins = admins;

        // Nome repetido é barrado pela constraint UNIQUE do banco
        self.store.save(&church).await?;
        Ok(ChurchProfile {
            church: church.summary(),
            admins: church.admins.iter().map(str::to_string).collect(),
        })
    }

    pub async fn list_for_admin(&self, caller: &Caller) -> Result<Vec<ChurchListing>, AppError> {
        let churches = self.store.list_by_admin(&caller.email).await?;

        Ok(churches
            .iter()
            .map(|church| ChurchListing {
                church: church.summary(),
                status: church.status,
            })
            .collect())
    }

    pub async fn detail(&self, caller: &Caller, code: &str) -> Result<ChurchDetail, AppError> {
        let church = self.directory.authorize_admin(code, &caller.email).await?;

        Ok(ChurchDetail {
            church: church.summary(),
            status: church.status,
            admins: church
                .admins
                .iter()
                .filter(|email| *email != caller.email)
                .map(str::to_string)
                .collect(),
            servants: church.servants,
            locations: church.locations,
        })
    }

    pub async fn reactivate(&self, caller: &Caller, code: &str) -> Result<(), AppError> {
        let mut church = self.directory.authorize_admin(code, &caller.email).await?;
        if church.status != ChurchStatus::Inactive {
            return Err(AppError::InvalidState(format!(
                "Igreja '{}' não está inativa",
                church.code
            )));
        }

        church.status = ChurchStatus::Active;
        self.store.save(&church).await
    }

    pub async fn inactivate(&self, caller: &Caller, code: &str) -> Result<(), AppError> {
        let mut church = self.directory.authorize_admin(code, &caller.email).await?;
        if church.status == ChurchStatus::Inactive {
            return Err(AppError::InvalidState(format!(
                "Igreja '{}' já está inativa",
                church.code
            )));
        }

        church.status = ChurchStatus::Inactive;
        self.store.save(&church).await
    }
}
