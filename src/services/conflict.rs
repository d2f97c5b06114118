// src/services/conflict.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::EventStore,
    models::event::Event,
    services::time_window::TimeWindow,
};

/// "Existe alguma programação nesta igreja + local cujo intervalo sobrepõe este?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapQuery {
    pub church_code: String,
    pub location_code: String,
    pub window: TimeWindow,
    /// Na atualização, a própria programação não conta.
    pub exclude_id: Option<Uuid>,
}

impl OverlapQuery {
    pub fn new(church_code: &str, location_code: &str, window: TimeWindow) -> Self {
        Self {
            church_code: church_code.to_string(),
            location_code: location_code.to_string(),
            window,
            exclude_id: None,
        }
    }

    pub fn excluding(mut self, id: Uuid) -> Self {
        self.exclude_id = Some(id);
        self
    }

    /// O mesmo predicado que o repositório traduz para SQL
    /// (`datetime_start < $end AND datetime_end > $start`).
    pub fn matches(&self, event: &Event) -> bool {
        event.church_code == self.church_code
            && event.location.location_code == self.location_code
            && self.exclude_id != Some(event.id)
            && event.window().overlaps(&self.window)
    }
}

#[derive(Clone)]
pub struct ConflictDetector {
    events: Arc<dyn EventStore>,
}

impl ConflictDetector {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    pub async fn is_overlapping(&self, query: &OverlapQuery) -> Result<bool, AppError> {
        self.events.exists_overlapping(query).await
    }

    pub async fn ensure_free(&self, query: &OverlapQuery) -> Result<(), AppError> {
        if self.is_overlapping(query).await? {
            return Err(AppError::Conflict(format!(
                "Horário sobrepõe outra programação no local '{}' da igreja '{}'",
                query.location_code, query.church_code
            )));
        }
        Ok(())
    }
}
