// src/db.rs
//
// Contratos de persistência. Os serviços falam só com estes traits;
// a implementação de produção é Postgres (sqlx).

pub mod church_repo;
pub use church_repo::PgChurchRepository;
pub mod event_repo;
pub use event_repo::PgEventRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        church::Church,
        event::{AgendaItem, Announcement, Assignment, Event},
    },
    services::{conflict::OverlapQuery, time_window::TimeWindow},
};

#[async_trait]
pub trait ChurchStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Church>, AppError>;

    /// Usado no cadastro: código e nome são únicos.
    async fn find_by_code_or_name(&self, code: &str, name: &str)
        -> Result<Option<Church>, AppError>;

    async fn insert(&self, church: &Church) -> Result<(), AppError>;

    /// Grava o documento inteiro (perfil, status, admins, servos, locais) de forma atômica.
    async fn save(&self, church: &Church) -> Result<(), AppError>;

    async fn list_by_admin(&self, email: &str) -> Result<Vec<Church>, AppError>;

    /// Igrejas ativas cujo nome contém `fragment` (sem diferenciar maiúsculas).
    async fn search_active_by_name(&self, fragment: &str) -> Result<Vec<Church>, AppError>;

    async fn list_active_by_codes(&self, codes: &[String]) -> Result<Vec<Church>, AppError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    async fn exists_overlapping(&self, query: &OverlapQuery) -> Result<bool, AppError>;

    /// Deve rejeitar com `AppError::Conflict` um intervalo que sobreponha outro no mesmo local.
    async fn insert(&self, event: &Event) -> Result<(), AppError>;

    /// Grava título, horários, local, reflexão e observações.
    /// Mesma garantia de não sobreposição do `insert`; o status não muda.
    async fn save_schedule(&self, event: &Event) -> Result<(), AppError>;

    /// Cada lista é gravada sozinha, sem tocar nas outras duas nem no status.
    async fn save_agenda(&self, id: Uuid, agenda: &[AgendaItem]) -> Result<(), AppError>;

    async fn save_announcements(
        &self,
        id: Uuid,
        announcements: &[Announcement],
    ) -> Result<(), AppError>;

    async fn save_assignments(&self, id: Uuid, assignments: &[Assignment])
        -> Result<(), AppError>;

    /// Escrita condicional: só publica se ainda estiver pendente.
    /// Retorna `false` quando nada foi alterado.
    async fn publish(&self, id: Uuid) -> Result<bool, AppError>;

    /// Programações publicadas que sobrepõem `window`, opcionalmente só destas igrejas.
    async fn find_published_in_window(
        &self,
        window: &TimeWindow,
        church_codes: Option<&[String]>,
    ) -> Result<Vec<Event>, AppError>;
}
