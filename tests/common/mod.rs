// Stores em memória com as mesmas garantias das constraints do Postgres
// (código/nome únicos, sem sobreposição por igreja + local).
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use church_admin::{
    common::error::AppError,
    config::AppState,
    db::{ChurchStore, EventStore},
    models::{
        auth::Caller,
        church::{AdminSet, Church, ChurchStatus},
        event::{AgendaItem, Announcement, Assignment, Event, ScheduleInput},
    },
    services::{
        conflict::OverlapQuery,
        time_window::{ClientTimestamp, TimeWindow},
    },
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "segredo-de-teste";

#[derive(Default)]
pub struct InMemoryChurchStore {
    churches: Mutex<HashMap<String, Church>>,
}

impl InMemoryChurchStore {
    pub fn get(&self, code: &str) -> Option<Church> {
        self.churches.lock().unwrap().get(code).cloned()
    }
}

#[async_trait]
impl ChurchStore for InMemoryChurchStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Church>, AppError> {
        Ok(self.get(code))
    }

    async fn find_by_code_or_name(
        &self,
        code: &str,
        name: &str,
    ) -> Result<Option<Church>, AppError> {
        let churches = self.churches.lock().unwrap();
        Ok(churches
            .values()
            .find(|c| c.code == code || c.name == name)
            .cloned())
    }

    async fn insert(&self, church: &Church) -> Result<(), AppError> {
        let mut churches = self.churches.lock().unwrap();
        if churches
            .values()
            .any(|c| c.code == church.code || c.name == church.name)
        {
            return Err(AppError::InvalidState("churches_pkey/name".into()));
        }
        churches.insert(church.code.clone(), church.clone());
        Ok(())
    }

    async fn save(&self, church: &Church) -> Result<(), AppError> {
        let mut churches = self.churches.lock().unwrap();
        if !churches.contains_key(&church.code) {
            return Err(AppError::Forbidden(format!("{} não existe", church.code)));
        }
        if churches
            .values()
            .any(|c| c.code != church.code && c.name == church.name)
        {
            return Err(AppError::InvalidState("churches_name_key".into()));
        }

        let mut saved = church.clone();
        saved.updated_at = Utc::now();
        churches.insert(church.code.clone(), saved);
        Ok(())
    }

    async fn list_by_admin(&self, email: &str) -> Result<Vec<Church>, AppError> {
        let churches = self.churches.lock().unwrap();
        let mut found: Vec<Church> = churches
            .values()
            .filter(|c| c.has_admin(email))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn search_active_by_name(&self, fragment: &str) -> Result<Vec<Church>, AppError> {
        let fragment = fragment.to_lowercase();
        let churches = self.churches.lock().unwrap();
        let mut found: Vec<Church> = churches
            .values()
            .filter(|c| c.is_available() && c.name.to_lowercase().contains(&fragment))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list_active_by_codes(&self, codes: &[String]) -> Result<Vec<Church>, AppError> {
        let churches = self.churches.lock().unwrap();
        let mut found: Vec<Church> = churches
            .values()
            .filter(|c| c.is_available() && codes.contains(&c.code))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventStore {
    pub fn all(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    /// Grava direto, sem passar pelas regras do serviço.
    pub fn put(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut Event)) -> Result<(), AppError> {
        let mut events = self.events.lock().unwrap();
        let stored = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::Forbidden(format!("{id} não existe")))?;
        apply(stored);
        stored.updated_at = Utc::now();
        Ok(())
    }

    fn overlap_query(event: &Event) -> OverlapQuery {
        OverlapQuery::new(
            &event.church_code,
            &event.location.location_code,
            event.window(),
        )
        .excluding(event.id)
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        Ok(self.get(id))
    }

    async fn exists_overlapping(&self, query: &OverlapQuery) -> Result<bool, AppError> {
        Ok(self.events.lock().unwrap().iter().any(|e| query.matches(e)))
    }

    async fn insert(&self, event: &Event) -> Result<(), AppError> {
        let mut events = self.events.lock().unwrap();
        let query = Self::overlap_query(event);
        if events.iter().any(|e| query.matches(e)) {
            return Err(AppError::Conflict("events_no_overlap".into()));
        }
        events.push(event.clone());
        Ok(())
    }

    async fn save_schedule(&self, event: &Event) -> Result<(), AppError> {
        let mut events = self.events.lock().unwrap();
        let query = Self::overlap_query(event);
        if events.iter().any(|e| query.matches(e)) {
            return Err(AppError::Conflict("events_no_overlap".into()));
        }

        let stored = events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| AppError::Forbidden(format!("{} não existe", event.id)))?;
        stored.title = event.title.clone();
        stored.datetime_start = event.datetime_start;
        stored.datetime_end = event.datetime_end;
        stored.location = event.location.clone();
        stored.reflection = event.reflection.clone();
        stored.remarks = event.remarks.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn save_agenda(&self, id: Uuid, agenda: &[AgendaItem]) -> Result<(), AppError> {
        self.update(id, |stored| stored.agenda = agenda.to_vec())
    }

    async fn save_announcements(
        &self,
        id: Uuid,
        announcements: &[Announcement],
    ) -> Result<(), AppError> {
        self.update(id, |stored| stored.announcements = announcements.to_vec())
    }

    async fn save_assignments(
        &self,
        id: Uuid,
        assignments: &[Assignment],
    ) -> Result<(), AppError> {
        self.update(id, |stored| stored.assignments = assignments.to_vec())
    }

    async fn publish(&self, id: Uuid) -> Result<bool, AppError> {
        let mut events = self.events.lock().unwrap();
        match events.iter_mut().find(|e| e.id == id && !e.is_published()) {
            Some(event) => {
                event.status = church_admin::models::event::EventStatus::Published;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_published_in_window(
        &self,
        window: &TimeWindow,
        church_codes: Option<&[String]>,
    ) -> Result<Vec<Event>, AppError> {
        let events = self.events.lock().unwrap();
        let mut found: Vec<Event> = events
            .iter()
            .filter(|e| e.is_published() && e.window().overlaps(window))
            .filter(|e| church_codes.is_none_or(|codes| codes.contains(&e.church_code)))
            .cloned()
            .collect();
        found.sort_by_key(|e| (e.datetime_start, e.church_code.clone()));
        Ok(found)
    }
}

// ---
// Montagem
// ---
pub struct TestApp {
    pub state: AppState,
    pub churches: Arc<InMemoryChurchStore>,
    pub events: Arc<InMemoryEventStore>,
}

pub fn test_app() -> TestApp {
    let churches = Arc::new(InMemoryChurchStore::default());
    let events = Arc::new(InMemoryEventStore::default());
    let state = AppState::from_stores(churches.clone(), events.clone(), JWT_SECRET.to_string());
    TestApp {
        state,
        churches,
        events,
    }
}

pub fn church(code: &str, name: &str, time_offset: i32, status: ChurchStatus, admins: &[&str]) -> Church {
    let (owner, others) = admins.split_first().expect("pelo menos um admin");
    let now = Utc::now();
    Church {
        code: code.to_string(),
        name: name.to_string(),
        address: None,
        time_offset,
        status,
        admins: AdminSet::with_owner(owner, others),
        servants: vec![],
        locations: vec![],
        created_at: now,
        updated_at: now,
    }
}

impl TestApp {
    pub async fn seed(&self, church: Church) {
        self.churches.insert(&church).await.unwrap();
    }

    /// Igreja ativa `acme` (offset 0) administrada por `a@x.com`.
    pub async fn seed_acme(&self) {
        self.seed(church("acme", "Acme Church", 0, ChurchStatus::Active, &["a@x.com"]))
            .await;
    }
}

pub fn caller(email: &str) -> Caller {
    Caller::new(email)
}

pub fn utc(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

pub fn schedule(start: &str, end: &str, location: Option<&str>) -> ScheduleInput {
    ScheduleInput {
        title: None,
        datetime_start: ClientTimestamp::parse(start).unwrap(),
        datetime_end: ClientTimestamp::parse(end).unwrap(),
        location_code: location.map(str::to_string),
        location_name: None,
        reflection: None,
        remarks: None,
    }
}
