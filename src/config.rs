// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ChurchStore, EventStore, PgChurchRepository, PgEventRepository},
    services::{
        auth::AuthService, church_directory::ChurchDirectory, church_service::ChurchService,
        conflict::ConflictDetector, event_query_service::EventQueryService,
        event_service::EventService, roster_service::RosterService,
    },
};

// ---
// 1. Variáveis de ambiente
// ---
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Lê o `.env` (se existir) e as variáveis do processo.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(env_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
        })
    }
}

// ---
// 2. Estado compartilhado
// ---
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub church_service: ChurchService,
    pub roster_service: RosterService,
    pub event_service: EventService,
    pub event_query_service: EventQueryService,
}

impl AppState {
    /// Conecta ao Postgres, roda as migrações e monta os serviços.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = connect(config).await?;

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Ok(Self::from_stores(
            Arc::new(PgChurchRepository::new(db_pool.clone())),
            Arc::new(PgEventRepository::new(db_pool)),
            config.jwt_secret.clone(),
        ))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_stores(
        churches: Arc<dyn ChurchStore>,
        events: Arc<dyn EventStore>,
        jwt_secret: String,
    ) -> Self {
        let directory = ChurchDirectory::new(churches.clone());
        let conflicts = ConflictDetector::new(events.clone());

        Self {
            auth_service: AuthService::new(jwt_secret),
            church_service: ChurchService::new(churches.clone(), directory.clone()),
            roster_service: RosterService::new(churches.clone(), directory.clone()),
            event_service: EventService::new(events.clone(), directory.clone(), conflicts),
            event_query_service: EventQueryService::new(churches, events, directory),
        }
    }
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}
