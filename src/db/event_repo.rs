// src/db/event_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_write_error, error::AppError},
    db::EventStore,
    models::event::{
        AgendaItem, Announcement, Assignment, Event, EventStatus, LocationRef,
    },
    services::{conflict::OverlapQuery, time_window::TimeWindow},
};

const EVENT_COLUMNS: &str = r#"
    id, church_code, title, status, datetime_start, datetime_end,
    location_code, location_name, reflection, remarks,
    agenda, announcements, assignments, created_at, updated_at
"#;

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    church_code: String,
    title: String,
    status: i16,
    datetime_start: DateTime<Utc>,
    datetime_end: DateTime<Utc>,
    location_code: String,
    location_name: String,
    reflection: Option<String>,
    remarks: Option<String>,
    agenda: Json<Vec<AgendaItem>>,
    announcements: Json<Vec<Announcement>>,
    assignments: Json<Vec<Assignment>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Event {
            id: row.id,
            church_code: row.church_code,
            title: row.title,
            status: EventStatus::try_from(row.status)?,
            datetime_start: row.datetime_start,
            datetime_end: row.datetime_end,
            location: LocationRef {
                location_code: row.location_code,
                location_name: row.location_name,
            },
            reflection: row.reflection,
            remarks: row.remarks,
            agenda: row.agenda.0,
            announcements: row.announcements.0,
            assignments: row.assignments.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn ensure_updated(rows_affected: u64, id: Uuid) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::Forbidden(format!("Programação {id} não existe mais")));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Atualiza só a coluna JSONB informada.
    async fn replace_list<T>(&self, id: Uuid, column: &'static str, items: &[T]) -> Result<(), AppError>
    where
        T: Serialize + Sync,
    {
        let result = sqlx::query(&format!(
            "UPDATE events SET {column} = $2, updated_at = NOW() WHERE id = $1"
        ))
        .bind(id)
        .bind(Json(items))
        .execute(&self.pool)
        .await?;

        ensure_updated(result.rows_affected(), id)
    }
}

#[async_trait]
impl EventStore for PgEventRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    async fn exists_overlapping(&self, query: &OverlapQuery) -> Result<bool, AppError> {
        // Sobreposição semiaberta: existente.início < novo.fim E existente.fim > novo.início
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM events
                WHERE church_code = $1
                  AND location_code = $2
                  AND datetime_start < $3
                  AND datetime_end > $4
                  AND ($5::uuid IS NULL OR id <> $5)
            )
            "#,
        )
        .bind(&query.church_code)
        .bind(&query.location_code)
        .bind(query.window.end())
        .bind(query.window.start())
        .bind(query.exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, event: &Event) -> Result<(), AppError> {
        // A constraint events_no_overlap fecha a corrida entre checagem e escrita.
        sqlx::query(
            r#"
            INSERT INTO events (
                id, church_code, title, status, datetime_start, datetime_end,
                location_code, location_name, reflection, remarks,
                agenda, announcements, assignments, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(event.id)
        .bind(&event.church_code)
        .bind(&event.title)
        .bind(event.status.code())
        .bind(event.datetime_start)
        .bind(event.datetime_end)
        .bind(&event.location.location_code)
        .bind(&event.location.location_name)
        .bind(&event.reflection)
        .bind(&event.remarks)
        .bind(Json(&event.agenda))
        .bind(Json(&event.announcements))
        .bind(Json(&event.assignments))
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn save_schedule(&self, event: &Event) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE events SET
                title = $2,
                datetime_start = $3,
                datetime_end = $4,
                location_code = $5,
                location_name = $6,
                reflection = $7,
                remarks = $8,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(event.datetime_start)
        .bind(event.datetime_end)
        .bind(&event.location.location_code)
        .bind(&event.location.location_name)
        .bind(&event.reflection)
        .bind(&event.remarks)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        ensure_updated(result.rows_affected(), event.id)
    }

    async fn save_agenda(&self, id: Uuid, agenda: &[AgendaItem]) -> Result<(), AppError> {
        self.replace_list(id, "agenda", agenda).await
    }

    async fn save_announcements(
        &self,
        id: Uuid,
        announcements: &[Announcement],
    ) -> Result<(), AppError> {
        self.replace_list(id, "announcements", announcements).await
    }

    async fn save_assignments(
        &self,
        id: Uuid,
        assignments: &[Assignment],
    ) -> Result<(), AppError> {
        self.replace_list(id, "assignments", assignments).await
    }

    async fn publish(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(EventStatus::Published.code())
        .bind(EventStatus::PendingPublish.code())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_published_in_window(
        &self,
        window: &TimeWindow,
        church_codes: Option<&[String]>,
    ) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE status = $1
              AND datetime_start < $2
              AND datetime_end > $3
              AND ($4::text[] IS NULL OR church_code = ANY($4))
            ORDER BY datetime_start, church_code
            "#
        ))
        .bind(EventStatus::Published.code())
        .bind(window.end())
        .bind(window.start())
        .bind(church_codes)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }
}
