// src/services/event_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::EventStore,
    models::{
        auth::Caller,
        church::{normalize_code, Church},
        event::{
            non_blank, AgendaItem, Announcement, Assignment, Event, EventStatus, LocationRef,
            ScheduleInput, DEFAULT_LOCATION_CODE, DEFAULT_LOCATION_NAME,
        },
    },
    services::{
        church_directory::ChurchDirectory,
        conflict::{ConflictDetector, OverlapQuery},
        time_window::{normalize_interval, ClientTimestamp, TimeWindow},
    },
};

/// Lote vazio ou com qualquer item inválido é rejeitado por inteiro.
fn validate_batch<T: Validate>(items: &[T]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::Validation("A lista enviada está vazia".into()));
    }
    for item in items {
        item.validate()?;
    }
    Ok(())
}

/// Rejeita `início >= fim` antes de qualquer acesso ao banco, quando dá para
/// comparar sem saber o offset da igreja.
fn check_order(start: &ClientTimestamp, end: &ClientTimestamp) -> Result<(), AppError> {
    let ordered = match (start, end) {
        (ClientTimestamp::Absolute(s), ClientTimestamp::Absolute(e)) => s < e,
        (ClientTimestamp::Local(s), ClientTimestamp::Local(e)) => s < e,
        _ => true,
    };
    if !ordered {
        return Err(AppError::Validation(
            "A data de início deve ser anterior à data de término".into(),
        ));
    }
    Ok(())
}

/// Código ausente vira o local padrão. O nome vem do cadastro da igreja
/// quando o local existe lá; senão do que foi enviado, ou do próprio código.
fn resolve_location(church: &Church, code: Option<String>, name: Option<String>) -> LocationRef {
    let location_code = non_blank(code)
        .map(|c| normalize_code(&c))
        .unwrap_or_else(|| DEFAULT_LOCATION_CODE.to_string());

    let location_name = church
        .location(&location_code)
        .map(|l| l.name.clone())
        .or_else(|| non_blank(name).map(|n| n.trim().to_string()))
        .unwrap_or_else(|| {
            if location_code == DEFAULT_LOCATION_CODE {
                DEFAULT_LOCATION_NAME.to_string()
            } else {
                location_code.clone()
            }
        });

    LocationRef {
        location_code,
        location_name,
    }
}

fn title_or_church_name(title: Option<String>, church: &Church) -> String {
    non_blank(title)
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| church.name.clone())
}

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
    directory: ChurchDirectory,
    conflicts: ConflictDetector,
}

impl EventService {
    pub fn new(
        events: Arc<dyn EventStore>,
        directory: ChurchDirectory,
        conflicts: ConflictDetector,
    ) -> Self {
        Self {
            events,
            directory,
            conflicts,
        }
    }

    /// Programação inexistente responde igual a "sem permissão".
    async fn load(&self, caller: &Caller, id: Uuid) -> Result<(Church, Event), AppError> {
        let event = self
            .events
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Forbidden(format!("Programação {id} não encontrada")))?;

        let church = self
            .directory
            .authorize_available_admin(&event.church_code, &caller.email)
            .await?;

        Ok((church, event))
    }

    fn schedule_window(church: &Church, input: &ScheduleInput) -> Result<TimeWindow, AppError> {
        normalize_interval(&input.datetime_start, &input.datetime_end, church.offset()?)
    }

    pub async fn create(
        &self,
        caller: &Caller,
        church_code: &str,
        input: ScheduleInput,
    ) -> Result<Event, AppError> {
        // 1. Ordem das datas
        check_order(&input.datetime_start, &input.datetime_end)?;

        // 2. Permissão
        let church = self
            .directory
            .authorize_available_admin(church_code, &caller.email)
            .await?;

        // 3. Janela em UTC + local
        let window = Self::schedule_window(&church, &input)?;
        let location = resolve_location(&church, input.location_code, input.location_name);

        // 4. Conflito de horário
        self.conflicts
            .ensure_free(&OverlapQuery::new(&church.code, &location.location_code, window))
            .await?;

        // 5. Grava como pendente de publicação
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            church_code: church.code.clone(),
            title: title_or_church_name(input.title, &church),
            status: EventStatus::PendingPublish,
            datetime_start: window.start(),
            datetime_end: window.end(),
            location,
            reflection: non_blank(input.reflection),
            remarks: non_blank(input.remarks),
            agenda: Vec::new(),
            announcements: Vec::new(),
            assignments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.events.insert(&event).await?;

        tracing::info!(
            event_id = %event.id,
            church = %event.church_code,
            location = %event.location.location_code,
            "📅 Programação criada"
        );
        Ok(event)
    }

    /// Substitui os campos de agenda. Vale para qualquer status.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        input: ScheduleInput,
    ) -> Result<Event, AppError> {
        check_order(&input.datetime_start, &input.datetime_end)?;

        let (church, mut event) = self.load(caller, id).await?;

        let window = Self::schedule_window(&church, &input)?;
        let location = resolve_location(&church, input.location_code, input.location_name);

        self.conflicts
            .ensure_free(
                &OverlapQuery::new(&church.code, &location.location_code, window).excluding(id),
            )
            .await?;

        event.title = title_or_church_name(input.title, &church);
        event.datetime_start = window.start();
        event.datetime_end = window.end();
        event.location = location;
        event.reflection = non_blank(input.reflection);
        event.remarks = non_blank(input.remarks);
        event.updated_at = Utc::now();

        self.events.save_schedule(&event).await?;
        Ok(event)
    }

    pub async fn publish(&self, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let (_, event) = self.load(caller, id).await?;
        if event.is_published() {
            return Err(AppError::InvalidState(format!("Programação {id} já publicada")));
        }

        // Escrita condicional: perde a corrida quem chegar depois
        if !self.events.publish(id).await? {
            return Err(AppError::InvalidState(format!("Programação {id} já publicada")));
        }

        tracing::info!(event_id = %id, church = %event.church_code, "📣 Programação publicada");
        Ok(())
    }

    pub async fn replace_agenda(
        &self,
        caller: &Caller,
        id: Uuid,
        items: Vec<AgendaItem>,
    ) -> Result<Vec<AgendaItem>, AppError> {
        self.load(caller, id).await?;
        validate_batch(&items)?;

        let agenda: Vec<AgendaItem> = items.into_iter().map(AgendaItem::normalized).collect();
        self.events.save_agenda(id, &agenda).await?;
        Ok(agenda)
    }

    pub async fn replace_announcements(
        &self,
        caller: &Caller,
        id: Uuid,
        items: Vec<Announcement>,
    ) -> Result<Vec<Announcement>, AppError> {
        self.load(caller, id).await?;
        validate_batch(&items)?;

        let announcements: Vec<Announcement> = items.into_iter().map(Announcement::normalized).collect();
        self.events.save_announcements(id, &announcements).await?;
        Ok(announcements)
    }

    pub async fn replace_assignments(
        &self,
        caller: &Caller,
        id: Uuid,
        items: Vec<Assignment>,
    ) -> Result<Vec<Assignment>, AppError> {
        self.load(caller, id).await?;
        validate_batch(&items)?;

        let assignments: Vec<Assignment> = items.into_iter().map(Assignment::normalized).collect();
        self.events.save_assignments(id, &assignments).await?;
        Ok(assignments)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::church::{AdminSet, ChurchStatus, Location, RosterStatus};

    fn church() -> Church {
        Church {
            code: "acme".into(),
            name: "Acme Church".into(),
            address: None,
            time_offset: 0,
            status: ChurchStatus::Active,
            admins: AdminSet::with_owner("a@x.com", Vec::<String>::new()),
            servants: vec![],
            locations: vec![Location {
                code: "hall".into(),
                name: "Great Hall".into(),
                status: RosterStatus::Active,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_location_falls_back_to_main_hall() {
        let location = resolve_location(&church(), None, None);
        assert_eq!(location.location_code, DEFAULT_LOCATION_CODE);
        assert_eq!(location.location_name, DEFAULT_LOCATION_NAME);
    }

    #[test]
    fn known_location_name_comes_from_the_church() {
        let location = resolve_location(&church(), Some(" Hall ".into()), Some("Outro".into()));
        assert_eq!(location.location_code, "hall");
        assert_eq!(location.location_name, "Great Hall");
    }

    #[test]
    fn unknown_location_keeps_the_submitted_name_or_code() {
        let named = resolve_location(&church(), Some("annex".into()), Some("Annex".into()));
        assert_eq!(named.location_name, "Annex");

        let unnamed = resolve_location(&church(), Some("annex".into()), None);
        assert_eq!(unnamed.location_name, "annex");
    }

    #[test]
    fn blank_title_uses_the_church_name() {
        assert_eq!(title_or_church_name(Some("  ".into()), &church()), "Acme Church");
        assert_eq!(title_or_church_name(Some("Vespers".into()), &church()), "Vespers");
    }

    #[test]
    fn empty_batches_are_rejected() {
        assert!(matches!(
            validate_batch::<AgendaItem>(&[]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn one_invalid_item_rejects_the_batch() {
        let items = vec![
            AgendaItem {
                title: "Votum".into(),
                title_link: None,
                content: None,
                content_link: None,
            },
            AgendaItem {
                title: String::new(),
                title_link: None,
                content: None,
                content_link: None,
            },
        ];
        assert!(validate_batch(&items).is_err());
    }

    #[test]
    fn inverted_interval_is_rejected_before_offset_is_known() {
        let start = ClientTimestamp::parse("2024-01-07T10:00:00").unwrap();
        let end = ClientTimestamp::parse("2024-01-07T09:00:00").unwrap();
        assert!(check_order(&start, &end).is_err());
        assert!(check_order(&end, &start).is_ok());
        assert!(check_order(&start, &start).is_err());
    }
}
