// src/models/event.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    services::time_window::{ClientTimestamp, TimeWindow},
};

/// Local padrão quando a programação não informa nenhum.
pub const DEFAULT_LOCATION_CODE: &str = "main";
pub const DEFAULT_LOCATION_NAME: &str = "Main Hall";

/// Campos opcionais em branco são guardados como ausentes.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    Published,
    PendingPublish,
}

impl EventStatus {
    pub fn code(self) -> i16 {
        match self {
            EventStatus::Published => 1,
            EventStatus::PendingPublish => 2,
        }
    }
}

impl TryFrom<i16> for EventStatus {
    type Error = AppError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EventStatus::Published),
            2 => Ok(EventStatus::PendingPublish),
            other => Err(AppError::InternalServerError(anyhow::anyhow!(
                "status de programação desconhecido: {other}"
            ))),
        }
    }
}

// --- Referência ao local ---

/// Cópia do código e do nome do local no momento em que a programação foi gravada.
///
/// É uma referência fraca: renomear ou inativar o local na igreja depois
/// não altera programações já existentes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRef {
    #[schema(example = "ruang_utama")]
    pub location_code: String,
    #[schema(example = "Ruang utama gereja lantai 1")]
    pub location_name: String,
}

// --- Sub-recursos (substituídos por inteiro a cada envio) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Votum")]
    pub title: String,
    pub title_link: Option<String>,
    pub content: Option<String>,
    pub content_link: Option<String>,
}

impl AgendaItem {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title,
            title_link: non_blank(self.title_link),
            content: non_blank(self.content),
            content_link: non_blank(self.content_link),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ibadah pemuda")]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub content: String,
    pub link: Option<String>,
}

impl Announcement {
    pub fn normalized(self) -> Self {
        Self {
            link: non_blank(self.link),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Liturgis")]
    pub service_role: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Sintua")]
    pub servant_role: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "invalid_email"))]
    pub email: String,
}

impl Assignment {
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            ..self
        }
    }
}

// --- A programação (Event / "service") ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[schema(example = "hkbp-menteng")]
    pub church_code: String,
    #[schema(example = "Minggu Trinitatis")]
    pub title: String,
    pub status: EventStatus,
    pub datetime_start: DateTime<Utc>,
    pub datetime_end: DateTime<Utc>,
    #[serde(flatten)]
    pub location: LocationRef,
    pub reflection: Option<String>,
    pub remarks: Option<String>,
    pub agenda: Vec<AgendaItem>,
    pub announcements: Vec<Announcement>,
    pub assignments: Vec<Assignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_stored(self.datetime_start, self.datetime_end)
    }

    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }
}

// --- Entrada de agenda (criação e atualização) ---

/// Horários sem offset são interpretados no fuso fixo da igreja;
/// horários com `Z` ou offset explícito já são instantes absolutos.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    #[schema(example = "Minggu Trinitatis")]
    pub title: Option<String>,
    #[schema(value_type = String, example = "2024-01-07T09:00:00")]
    pub datetime_start: ClientTimestamp,
    #[schema(value_type = String, example = "2024-01-07T10:30:00")]
    pub datetime_end: ClientTimestamp,
    #[schema(example = "ruang_utama")]
    pub location_code: Option<String>,
    #[schema(example = "Ruang utama gereja lantai 1")]
    pub location_name: Option<String>,
    pub reflection: Option<String>,
    pub remarks: Option<String>,
}
