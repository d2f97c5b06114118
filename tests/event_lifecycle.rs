mod common;

use std::sync::Arc;

use async_trait::async_trait;
use church_admin::{
    common::error::AppError,
    config::AppState,
    db::EventStore,
    models::{
        church::ChurchStatus,
        event::{AgendaItem, Announcement, Assignment, Event, EventStatus},
    },
    services::{conflict::OverlapQuery, time_window::TimeWindow},
};
use common::{caller, church, schedule, test_app, utc, InMemoryEventStore, JWT_SECRET};
use tokio::sync::Barrier;
use uuid::Uuid;

fn agenda_item(title: &str) -> AgendaItem {
    AgendaItem {
        title: title.to_string(),
        title_link: None,
        content: Some(String::new()),
        content_link: None,
    }
}

#[tokio::test]
async fn overlapping_slots_at_the_same_location_are_rejected() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    let first = events
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", Some("hall")))
        .await
        .unwrap();
    assert_eq!(first.status, EventStatus::PendingPublish);
    assert_eq!(first.title, "Acme Church");

    let overlapping = events
        .create(&admin, "acme", schedule("2024-01-07T09:30:00Z", "2024-01-07T10:30:00Z", Some("hall")))
        .await;
    assert!(matches!(overlapping, Err(AppError::Conflict(_))));

    events
        .create(&admin, "acme", schedule("2024-01-07T10:00:00Z", "2024-01-07T11:00:00Z", Some("hall")))
        .await
        .expect("intervalo que só encosta deve ser aceito");

    // Outro local, mesmo horário
    events
        .create(&admin, "acme", schedule("2024-01-07T09:30:00Z", "2024-01-07T10:30:00Z", Some("chapel")))
        .await
        .unwrap();

    assert_eq!(app.events.all().len(), 3);
}

#[tokio::test]
async fn inverted_interval_is_rejected_even_for_unknown_churches() {
    let app = test_app();
    let result = app
        .state
        .event_service
        .create(
            &caller("a@x.com"),
            "nowhere",
            schedule("2024-01-07T10:00:00Z", "2024-01-07T10:00:00Z", None),
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn only_admins_of_active_churches_can_schedule() {
    let app = test_app();
    app.seed_acme().await;
    app.seed(church("beta", "Beta Church", 0, ChurchStatus::Pending, &["a@x.com"]))
        .await;
    let slot = || schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", None);
    let events = &app.state.event_service;

    let outsider = events.create(&caller("z@x.com"), "acme", slot()).await;
    let pending = events.create(&caller("a@x.com"), "beta", slot()).await;
    let missing = events.create(&caller("a@x.com"), "ghost", slot()).await;

    for result in [outsider, pending, missing] {
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
    assert!(app.events.all().is_empty());
}

#[tokio::test]
async fn default_location_is_main_hall() {
    let app = test_app();
    app.seed_acme().await;

    let event = app
        .state
        .event_service
        .create(&caller("a@x.com"), "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", None))
        .await
        .unwrap();

    assert_eq!(event.location.location_code, "main");
    assert_eq!(event.location.location_name, "Main Hall");
}

#[tokio::test]
async fn updating_to_the_same_interval_succeeds() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    let event = events
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", Some("hall")))
        .await
        .unwrap();

    let mut input = schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", Some("hall"));
    input.title = Some("Ibadah Minggu".into());
    let updated = events.update(&admin, event.id, input).await.unwrap();

    assert_eq!(updated.title, "Ibadah Minggu");
    assert_eq!(app.events.get(event.id).unwrap().title, "Ibadah Minggu");
}

#[tokio::test]
async fn update_still_detects_conflicts_with_other_events() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    events
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", Some("hall")))
        .await
        .unwrap();
    let later = events
        .create(&admin, "acme", schedule("2024-01-07T11:00:00Z", "2024-01-07T12:00:00Z", Some("hall")))
        .await
        .unwrap();

    let result = events
        .update(&admin, later.id, schedule("2024-01-07T09:30:00Z", "2024-01-07T11:30:00Z", Some("hall")))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(app.events.get(later.id).unwrap().datetime_start, utc("2024-01-07T11:00:00Z"));
}

#[tokio::test]
async fn local_times_use_the_church_offset_on_create_and_update() {
    let app = test_app();
    app.seed(church("hkbp", "HKBP Menteng", 420, ChurchStatus::Active, &["a@x.com"]))
        .await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    let created = events
        .create(&admin, "hkbp", schedule("2024-01-07T09:00:00", "2024-01-07T10:30:00", None))
        .await
        .unwrap();
    assert_eq!(created.datetime_start, utc("2024-01-07T02:00:00Z"));
    assert_eq!(created.datetime_end, utc("2024-01-07T03:30:00Z"));

    let updated = events
        .update(&admin, created.id, schedule("2024-01-07T09:00:00", "2024-01-07T10:30:00", None))
        .await
        .unwrap();
    assert_eq!(updated.datetime_start, created.datetime_start);
    assert_eq!(updated.datetime_end, created.datetime_end);

    // Com offset explícito o instante é respeitado
    let explicit = events
        .update(&admin, created.id, schedule("2024-01-07T09:00:00+07:00", "2024-01-07T11:00:00+07:00", None))
        .await
        .unwrap();
    assert_eq!(explicit.datetime_start, utc("2024-01-07T02:00:00Z"));
    assert_eq!(explicit.datetime_end, utc("2024-01-07T04:00:00Z"));
}

#[tokio::test]
async fn publish_succeeds_once() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    let event = events
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", None))
        .await
        .unwrap();

    events.publish(&admin, event.id).await.unwrap();
    assert!(app.events.get(event.id).unwrap().is_published());

    let second = events.publish(&admin, event.id).await;
    assert!(matches!(second, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn update_keeps_the_published_status() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    let event = events
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", None))
        .await
        .unwrap();
    events.publish(&admin, event.id).await.unwrap();

    events
        .update(&admin, event.id, schedule("2024-01-07T10:00:00Z", "2024-01-07T11:00:00Z", None))
        .await
        .unwrap();
    assert!(app.events.get(event.id).unwrap().is_published());
}

#[tokio::test]
async fn unknown_event_looks_like_missing_permission() {
    let app = test_app();
    app.seed_acme().await;

    let result = app
        .state
        .event_service
        .publish(&caller("a@x.com"), Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn agenda_batches_are_all_or_nothing() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    let event = events
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", None))
        .await
        .unwrap();

    let stored = events
        .replace_agenda(&admin, event.id, vec![agenda_item("Votum"), agenda_item("Doa")])
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].content, None, "conteúdo em branco vira ausente");

    let invalid = events
        .replace_agenda(&admin, event.id, vec![agenda_item("Berkat"), agenda_item("")])
        .await;
    assert!(matches!(invalid, Err(AppError::ValidationError(_))));

    let empty = events.replace_agenda(&admin, event.id, vec![]).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let titles: Vec<String> = app
        .events
        .get(event.id)
        .unwrap()
        .agenda
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["Votum", "Doa"]);
}

#[tokio::test]
async fn announcements_and_assignments_replace_wholesale() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");
    let events = &app.state.event_service;

    let event = events
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", None))
        .await
        .unwrap();

    events
        .replace_announcements(
            &admin,
            event.id,
            vec![Announcement {
                title: "Warta".into(),
                content: "Ibadah pemuda sabtu".into(),
                link: Some(" ".into()),
            }],
        )
        .await
        .unwrap();

    let bad_email = events
        .replace_assignments(
            &admin,
            event.id,
            vec![Assignment {
                service_role: "Liturgis".into(),
                servant_role: "Sintua".into(),
                name: "Maria".into(),
                email: "nao-e-email".into(),
            }],
        )
        .await;
    assert!(bad_email.is_err());

    events
        .replace_assignments(
            &admin,
            event.id,
            vec![Assignment {
                service_role: "Liturgis".into(),
                servant_role: "Sintua".into(),
                name: "Maria".into(),
                email: "Maria@Example.com".into(),
            }],
        )
        .await
        .unwrap();

    let stored = app.events.get(event.id).unwrap();
    assert_eq!(stored.announcements[0].link, None);
    assert_eq!(stored.assignments[0].email, "maria@example.com");
    assert_eq!(stored.status, EventStatus::PendingPublish);
}

/// Segura cada leitura até que duas requisições tenham lido o mesmo estado.
struct LockstepEventStore {
    inner: Arc<InMemoryEventStore>,
    barrier: Barrier,
}

#[async_trait]
impl EventStore for LockstepEventStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = self.inner.find_by_id(id).await?;
        self.barrier.wait().await;
        Ok(event)
    }

    async fn exists_overlapping(&self, query: &OverlapQuery) -> Result<bool, AppError> {
        self.inner.exists_overlapping(query).await
    }

    async fn insert(&self, event: &Event) -> Result<(), AppError> {
        self.inner.insert(event).await
    }

    async fn save_schedule(&self, event: &Event) -> Result<(), AppError> {
        self.inner.save_schedule(event).await
    }

    async fn save_agenda(&self, id: Uuid, agenda: &[AgendaItem]) -> Result<(), AppError> {
        self.inner.save_agenda(id, agenda).await
    }

    async fn save_announcements(
        &self,
        id: Uuid,
        announcements: &[Announcement],
    ) -> Result<(), AppError> {
        self.inner.save_announcements(id, announcements).await
    }

    async fn save_assignments(
        &self,
        id: Uuid,
        assignments: &[Assignment],
    ) -> Result<(), AppError> {
        self.inner.save_assignments(id, assignments).await
    }

    async fn publish(&self, id: Uuid) -> Result<bool, AppError> {
        self.inner.publish(id).await
    }

    async fn find_published_in_window(
        &self,
        window: &TimeWindow,
        church_codes: Option<&[String]>,
    ) -> Result<Vec<Event>, AppError> {
        self.inner.find_published_in_window(window, church_codes).await
    }
}

#[tokio::test]
async fn concurrent_replaces_of_different_lists_keep_both() {
    let app = test_app();
    app.seed_acme().await;
    let admin = caller("a@x.com");

    let event = app
        .state
        .event_service
        .create(&admin, "acme", schedule("2024-01-07T09:00:00Z", "2024-01-07T10:00:00Z", None))
        .await
        .unwrap();

    let lockstep = Arc::new(LockstepEventStore {
        inner: app.events.clone(),
        barrier: Barrier::new(2),
    });
    let state = AppState::from_stores(app.churches.clone(), lockstep, JWT_SECRET.to_string());
    let events = &state.event_service;

    let (agenda, announcements) = tokio::join!(
        events.replace_agenda(&admin, event.id, vec![agenda_item("Votum")]),
        events.replace_announcements(
            &admin,
            event.id,
            vec![Announcement {
                title: "Warta".into(),
                content: "Ibadah pemuda sabtu".into(),
                link: None,
            }],
        ),
    );
    agenda.unwrap();
    announcements.unwrap();

    let stored = app.events.get(event.id).unwrap();
    assert_eq!(stored.agenda.len(), 1);
    assert_eq!(stored.announcements.len(), 1);
}
