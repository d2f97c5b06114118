// src/services/event_query_service.rs
//
// Consultas públicas (sem autenticação): só igrejas ativas e programações
// publicadas aparecem aqui.

use std::{collections::BTreeSet, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    db::{ChurchStore, EventStore},
    models::{
        church::{normalize_code, ChurchSummary},
        event::{non_blank, Event},
    },
    services::{
        church_directory::ChurchDirectory,
        time_window::{ClientTimestamp, TimeOffset, TimeWindow},
    },
};

/// Maior intervalo aceito numa busca (e o padrão quando nenhuma data vem).
pub const MAX_SEARCH_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventSearchParams {
    /// Trecho do nome da igreja (sem diferenciar maiúsculas).
    pub name: Option<String>,
    /// Início da janela. Sem offset é lido como UTC.
    #[param(example = "2024-01-07T00:00:00Z")]
    pub service_date_time_from: Option<String>,
    #[param(example = "2024-01-14T00:00:00Z")]
    pub service_date_time_to: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct EventSearchResult {
    pub churches: Vec<ChurchSummary>,
    #[serde(rename = "services")]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayEvents {
    pub church: ChurchSummary,
    #[serde(rename = "services")]
    pub events: Vec<Event>,
}

/// Janela da busca: as duas datas ou nenhuma; no máximo 30 dias.
pub fn search_window(
    from: Option<&str>,
    to: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TimeWindow, AppError> {
    let max_span = TimeDelta::days(MAX_SEARCH_DAYS);
    let from = from.map(str::trim).filter(|v| !v.is_empty());
    let to = to.map(str::trim).filter(|v| !v.is_empty());

    match (from, to) {
        (None, None) => TimeWindow::new(now, now + max_span),
        (Some(from), Some(to)) => {
            // Sem igreja definida não há offset local: vale UTC
            let utc = TimeOffset::from_minutes(0)?;
            let window = TimeWindow::new(
                ClientTimestamp::parse(from)?.resolve(utc),
                ClientTimestamp::parse(to)?.resolve(utc),
            )?;
            if window.duration() > max_span {
                return Err(AppError::Validation(format!(
                    "A busca aceita no máximo {MAX_SEARCH_DAYS} dias"
                )));
            }
            Ok(window)
        }
        _ => Err(AppError::Validation(
            "Informe as duas datas da busca ou nenhuma".into(),
        )),
    }
}

#[derive(Clone)]
pub struct EventQueryService {
    churches: Arc<dyn ChurchStore>,
    events: Arc<dyn EventStore>,
    directory: ChurchDirectory,
}

impl EventQueryService {
    pub fn new(
        churches: Arc<dyn ChurchStore>,
        events: Arc<dyn EventStore>,
        directory: ChurchDirectory,
    ) -> Self {
        Self {
            churches,
            events,
            directory,
        }
    }

    pub async fn search(
        &self,
        params: &EventSearchParams,
        now: DateTime<Utc>,
    ) -> Result<EventSearchResult, AppError> {
        // 1. Janela
        let window = search_window(
            params.service_date_time_from.as_deref(),
            params.service_date_time_to.as_deref(),
            now,
        )?;

        // 2. Igrejas + programações
        let (churches, events) = match non_blank(params.name.clone()) {
            Some(name) => {
                let churches = self.churches.search_active_by_name(name.trim()).await?;
                if churches.is_empty() {
                    return Ok(EventSearchResult::default());
                }
                let codes: Vec<String> = churches.iter().map(|c| c.code.clone()).collect();
                let events = self
                    .events
                    .find_published_in_window(&window, Some(&codes))
                    .await?;
                (churches, events)
            }
            None => {
                let events = self.events.find_published_in_window(&window, None).await?;
                let codes: Vec<String> = events
                    .iter()
                    .map(|e| e.church_code.clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                let churches = self.churches.list_active_by_codes(&codes).await?;
                (churches, events)
            }
        };

        // 3. Programações de igreja inativa (ou inexistente) ficam de fora
        let active: BTreeSet<&str> = churches.iter().map(|c| c.code.as_str()).collect();
        let events = events
            .into_iter()
            .filter(|e| active.contains(e.church_code.as_str()))
            .collect();

        Ok(EventSearchResult {
            churches: churches.iter().map(|c| c.summary()).collect(),
            events,
        })
    }

    /// Programações publicadas no "hoje" local da igreja.
    pub async fn today(&self, church_code: &str, now: DateTime<Utc>) -> Result<TodayEvents, AppError> {
        let code = normalize_code(church_code);
        let church = self
            .directory
            .find_active(&code)
            .await?
            .ok_or_else(|| AppError::Forbidden(format!("Igreja '{code}' indisponível")))?;

        let window = church.offset()?.day_window(now);
        let events = self
            .events
            .find_published_in_window(&window, Some(std::slice::from_ref(&church.code)))
            .await?;

        Ok(TodayEvents {
            church: church.summary(),
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn no_dates_means_the_next_thirty_days() {
        let now = utc("2024-01-07T12:00:00Z");
        let window = search_window(None, None, now).unwrap();
        assert_eq!(window.start(), now);
        assert_eq!(window.end(), utc("2024-02-06T12:00:00Z"));
    }

    #[test]
    fn blank_dates_count_as_missing() {
        let now = utc("2024-01-07T12:00:00Z");
        assert!(search_window(Some(""), Some("  "), now).is_ok());
    }

    #[test]
    fn a_single_date_is_rejected() {
        let now = Utc::now();
        assert!(search_window(Some("2024-01-07T00:00:00Z"), None, now).is_err());
        assert!(search_window(None, Some("2024-01-07T00:00:00Z"), now).is_err());
    }

    #[test]
    fn span_limit_is_inclusive() {
        let now = Utc::now();
        assert!(search_window(Some("2024-01-01T00:00:00Z"), Some("2024-01-31T00:00:00Z"), now).is_ok());
        assert!(matches!(
            search_window(Some("2024-01-01T00:00:00Z"), Some("2024-01-31T00:00:01Z"), now),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn inverted_or_empty_ranges_are_rejected() {
        let now = Utc::now();
        assert!(search_window(Some("2024-01-02"), Some("2024-01-01"), now).is_err());
        assert!(search_window(Some("2024-01-02"), Some("2024-01-02"), now).is_err());
    }

    #[test]
    fn local_search_timestamps_are_read_as_utc() {
        let window = search_window(Some("2024-01-07T09:00"), Some("2024-01-08"), Utc::now()).unwrap();
        assert_eq!(window.start(), utc("2024-01-07T09:00:00Z"));
        assert_eq!(window.end(), utc("2024-01-08T00:00:00Z"));
    }
}
