// src/models/church.rs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    services::time_window::TimeOffset,
};

/// E-mails são comparados sempre em minúsculas e sem espaços nas pontas.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Códigos (igreja, local) são chaves de URL: minúsculos e sem espaços.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Segmentos fixos sob `/v1/church/service/`; uma igreja com um destes códigos
/// ficaria inalcançável nas rotas de programação.
pub const RESERVED_CHURCH_CODES: [&str; 5] = ["events", "publish", "liturgy", "news", "servants"];

pub fn is_valid_church_code(code: &str) -> bool {
    is_valid_code(code) && !RESERVED_CHURCH_CODES.contains(&code)
}

// ---
// 1. Status
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChurchStatus {
    Inactive,
    Active,
    Pending,
}

impl ChurchStatus {
    pub fn code(self) -> i16 {
        match self {
            ChurchStatus::Inactive => 0,
            ChurchStatus::Active => 1,
            ChurchStatus::Pending => 2,
        }
    }
}

impl TryFrom<i16> for ChurchStatus {
    type Error = AppError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ChurchStatus::Inactive),
            1 => Ok(ChurchStatus::Active),
            2 => Ok(ChurchStatus::Pending),
            other => Err(AppError::InternalServerError(anyhow::anyhow!(
                "status de igreja desconhecido: {other}"
            ))),
        }
    }
}

/// Status de servos e locais: só ativo/inativo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RosterStatus {
    Inactive,
    #[default]
    Active,
}

// ---
// 2. Conjunto de administradores
// ---
/// Conjunto de e-mails de admins. A unicidade é garantida na inserção.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminSet(BTreeSet<String>);

impl AdminSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.0.contains(&normalize_email(email))
    }

    /// Retorna `false` se o e-mail já estava no conjunto (ou veio vazio).
    pub fn insert(&mut self, email: &str) -> bool {
        let email = normalize_email(email);
        if email.is_empty() {
            return false;
        }
        self.0.insert(email)
    }

    pub fn remove(&mut self, email: &str) -> bool {
        self.0.remove(&normalize_email(email))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// O chamador sempre entra; os demais são adicionados ignorando vazios e repetidos.
    pub fn with_owner<I, S>(owner: &str, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut admins = Self::new();
        admins.insert(owner);
        for other in others {
            admins.insert(other.as_ref());
        }
        admins
    }
}

// ---
// 3. Servos e Locais (roster da igreja)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Servant {
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "Pianista")]
    pub role: Option<String>,
    #[serde(default)]
    pub status: RosterStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[schema(example = "ruang_utama")]
    pub code: String,
    #[schema(example = "Ruang utama gereja lantai 1")]
    pub name: String,
    #[serde(default)]
    pub status: RosterStatus,
}

// ---
// 4. Church (o Tenant)
// ---
#[derive(Debug, Clone, PartialEq)]
pub struct Church {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    /// Minutos em relação ao UTC, fixo (sem horário de verão).
    pub time_offset: i32,
    pub status: ChurchStatus,
    pub admins: AdminSet,
    pub servants: Vec<Servant>,
    pub locations: Vec<Location>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Church {
    pub fn has_admin(&self, email: &str) -> bool {
        self.admins.contains(email)
    }

    /// Só igrejas ativas aceitam alterações de roster e de agenda.
    pub fn is_available(&self) -> bool {
        self.status == ChurchStatus::Active
    }

    pub fn offset(&self) -> Result<TimeOffset, AppError> {
        TimeOffset::from_minutes(self.time_offset)
    }

    pub fn servant_mut(&mut self, email: &str) -> Option<&mut Servant> {
        let email = normalize_email(email);
        self.servants.iter_mut().find(|s| s.email == email)
    }

    pub fn location(&self, code: &str) -> Option<&Location> {
        let code = normalize_code(code);
        self.locations.iter().find(|l| l.code == code)
    }

    pub fn location_mut(&mut self, code: &str) -> Option<&mut Location> {
        let code = normalize_code(code);
        self.locations.iter_mut().find(|l| l.code == code)
    }

    pub fn summary(&self) -> ChurchSummary {
        ChurchSummary {
            code: self.code.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            time_offset: self.time_offset,
        }
    }
}

// ---
// 5. Projeções devolvidas pela API
// ---

/// Visão pública: sem admins, servos nem status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurchSummary {
    #[schema(example = "hkbp-menteng")]
    pub code: String,
    #[schema(example = "HKBP Menteng")]
    pub name: String,
    pub address: Option<String>,
    #[schema(example = 420)]
    pub time_offset: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurchListing {
    #[serde(flatten)]
    pub church: ChurchSummary,
    pub status: ChurchStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurchProfile {
    #[serde(flatten)]
    pub church: ChurchSummary,
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurchDetail {
    #[serde(flatten)]
    pub church: ChurchSummary,
    pub status: ChurchStatus,
    /// Admins além de quem consultou.
    pub admins: Vec<String>,
    pub servants: Vec<Servant>,
    pub locations: Vec<Location>,
}

/// Servos ativos de uma igreja.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServantList {
    pub church_code: String,
    pub servants: Vec<Servant>,
}

/// Locais ativos de uma igreja.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationList {
    pub church_code: String,
    pub locations: Vec<Location>,
}
