// src/services/roster_service.rs
//
// Servos, locais e admins de uma igreja. Toda operação exige admin de
// igreja ativa e grava o documento da igreja inteiro.

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::ChurchStore,
    models::{
        auth::Caller,
        church::{
            is_valid_code, normalize_code, normalize_email, Church, Location, LocationList,
            RosterStatus, Servant, ServantList,
        },
        event::non_blank,
    },
    services::church_directory::ChurchDirectory,
};

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("O campo '{field}' é obrigatório")));
    }
    Ok(value.to_string())
}

#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn ChurchStore>,
    directory: ChurchDirectory,
}

impl RosterService {
    pub fn new(store: Arc<dyn ChurchStore>, directory: ChurchDirectory) -> Self {
        Self { store, directory }
    }

    async fn load(&self, caller: &Caller, code: &str) -> Result<Church, AppError> {
        self.directory
            .authorize_available_admin(code, &caller.email)
            .await
    }

    // ---
    // 1. Servos
    // ---

    pub async fn add_servant(
        &self,
        caller: &Caller,
        code: &str,
        email: &str,
        name: &str,
        role: Option<String>,
    ) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;

        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::Validation("O e-mail do servo é obrigatório".into()));
        }
        if church.servant_mut(&email).is_some() {
            return Err(AppError::InvalidState(format!("Servo '{email}' já cadastrado")));
        }

        church.servants.push(Servant {
            email,
            name: required(name, "name")?,
            role: non_blank(role),
            status: RosterStatus::Active,
        });
        self.store.save(&church).await
    }

    pub async fn update_servant(
        &self,
        caller: &Caller,
        code: &str,
        email: &str,
        name: &str,
        role: Option<String>,
    ) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;
        let name = required(name, "name")?;

        let servant = church
            .servant_mut(email)
            .ok_or_else(|| AppError::InvalidState(format!("Servo '{email}' não existe")))?;
        if servant.status == RosterStatus::Inactive {
            return Err(AppError::InvalidState(format!(
                "Servo '{email}' está inativo e não pode ser alterado"
            )));
        }

        servant.name = name;
        servant.role = non_blank(role);
        self.store.save(&church).await
    }

    pub async fn set_servant_status(
        &self,
        caller: &Caller,
        code: &str,
        email: &str,
        status: RosterStatus,
    ) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;

        let servant = church
            .servant_mut(email)
            .ok_or_else(|| AppError::InvalidState(format!("Servo '{email}' não existe")))?;
        if servant.status == status {
            return Err(AppError::InvalidState(format!(
                "Servo '{email}' já está com status {status:?}"
            )));
        }

        servant.status = status;
        self.store.save(&church).await
    }

    pub async fn list_servants(&self, caller: &Caller, code: &str) -> Result<ServantList, AppError> {
        let church = self.load(caller, code).await?;

        Ok(ServantList {
            servants: church
                .servants
                .into_iter()
                .filter(|s| s.status == RosterStatus::Active)
                .collect(),
            church_code: church.code,
        })
    }

    // ---
    // 2. Locais
    // ---

    pub async fn add_location(
        &self,
        caller: &Caller,
        code: &str,
        location_code: &str,
        name: &str,
    ) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;

        let location_code = normalize_code(location_code);
        if !is_valid_code(&location_code) {
            return Err(AppError::Validation(format!(
                "Código de local inválido: '{location_code}'"
            )));
        }
        if church.location(&location_code).is_some() {
            return Err(AppError::InvalidState(format!(
                "Local '{location_code}' já cadastrado"
            )));
        }

        church.locations.push(Location {
            code: location_code,
            name: required(name, "name")?,
            status: RosterStatus::Active,
        });
        self.store.save(&church).await
    }

    /// Programações já gravadas mantêm o nome antigo do local.
    pub async fn rename_location(
        &self,
        caller: &Caller,
        code: &str,
        location_code: &str,
        name: &str,
    ) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;
        let name = required(name, "name")?;

        let location = church.location_mut(location_code).ok_or_else(|| {
            AppError::InvalidState(format!("Local '{location_code}' não existe"))
        })?;
        if location.status == RosterStatus::Inactive {
            return Err(AppError::InvalidState(format!(
                "Local '{location_code}' está inativo e não pode ser alterado"
            )));
        }

        location.name = name;
        self.store.save(&church).await
    }

    pub async fn set_location_status(
        &self,
        caller: &Caller,
        code: &str,
        location_code: &str,
        status: RosterStatus,
    ) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;

        let location = church.location_mut(location_code).ok_or_else(|| {
            AppError::InvalidState(format!("Local '{location_code}' não existe"))
        })?;
        if location.status == status {
            return Err(AppError::InvalidState(format!(
                "Local '{location_code}' já está com status {status:?}"
            )));
        }

        location.status = status;
        self.store.save(&church).await
    }

    pub async fn list_locations(
        &self,
        caller: &Caller,
        code: &str,
    ) -> Result<LocationList, AppError> {
        let church = self.load(caller, code).await?;

        Ok(LocationList {
            locations: church
                .locations
                .into_iter()
                .filter(|l| l.status == RosterStatus::Active)
                .collect(),
            church_code: church.code,
        })
    }

    // ---
    // 3. Admins
    // ---

    pub async fn add_admin(&self, caller: &Caller, code: &str, email: &str) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;

        if normalize_email(email).is_empty() {
            return Err(AppError::Validation("O e-mail do admin é obrigatório".into()));
        }
        if !church.admins.insert(email) {
            return Err(AppError::InvalidState(format!("'{email}' já é admin")));
        }

        self.store.save(&church).await
    }

    pub async fn remove_admin(
        &self,
        caller: &Caller,
        code: &str,
        email: &str,
    ) -> Result<(), AppError> {
        let mut church = self.load(caller, code).await?;

        if !church.admins.contains(email) {
            return Err(AppError::InvalidState(format!("'{email}' não é admin")));
        }
        if church.admins.len() == 1 {
            return Err(AppError::InvalidState(
                "A igreja precisa de pelo menos um admin".into(),
            ));
        }

        church.admins.remove(email);
        self.store.save(&church).await
    }

    pub async fn list_admins(&self, caller: &Caller, code: &str) -> Result<Vec<String>, AppError> {
        let church = self.load(caller, code).await?;
        Ok(church.admins.iter().map(str::to_string).collect())
    }
}
