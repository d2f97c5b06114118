// src/db/church_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool, Postgres, Transaction};

use crate::{
    common::{
        db_utils::{escape_like, map_write_error},
        error::AppError,
    },
    db::ChurchStore,
    models::church::{AdminSet, Church, ChurchStatus, Location, Servant},
};

// Os admins ficam numa tabela própria (chave church_code + email);
// servos e locais são listas JSONB gravadas junto com a igreja.
const SELECT_CHURCH: &str = r#"
    SELECT
        c.code, c.name, c.address, c.time_offset, c.status,
        c.servants, c.locations, c.created_at, c.updated_at,
        COALESCE(
            array_agg(a.email ORDER BY a.email) FILTER (WHERE a.email IS NOT NULL),
            '{}'
        ) AS admins
    FROM churches c
    LEFT JOIN church_admins a ON a.church_code = c.code
"#;

fn church_query(filter: &str) -> String {
    format!("{SELECT_CHURCH} WHERE {filter} GROUP BY c.code ORDER BY c.name")
}

#[derive(FromRow)]
struct ChurchRow {
    code: String,
    name: String,
    address: Option<String>,
    time_offset: i32,
    status: i16,
    servants: Json<Vec<Servant>>,
    locations: Json<Vec<Location>>,
    admins: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChurchRow> for Church {
    type Error = AppError;

    fn try_from(row: ChurchRow) -> Result<Self, Self::Error> {
        let mut admins = AdminSet::new();
        for email in &row.admins {
            admins.insert(email);
        }

        Ok(Church {
            code: row.code,
            name: row.name,
            address: row.address,
            time_offset: row.time_offset,
            status: ChurchStatus::try_from(row.status)?,
            admins,
            servants: row.servants.0,
            locations: row.locations.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_churches(rows: Vec<ChurchRow>) -> Result<Vec<Church>, AppError> {
    rows.into_iter().map(Church::try_from).collect()
}

#[derive(Clone)]
pub struct PgChurchRepository {
    pool: PgPool,
}

impl PgChurchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Deixa a tabela de admins exatamente igual ao conjunto em memória.
    async fn sync_admins(
        tx: &mut Transaction<'_, Postgres>,
        church: &Church,
    ) -> Result<(), AppError> {
        let emails: Vec<String> = church.admins.iter().map(str::to_string).collect();

        sqlx::query("DELETE FROM church_admins WHERE church_code = $1 AND NOT (email = ANY($2))")
            .bind(&church.code)
            .bind(&emails)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO church_admins (church_code, email)
            SELECT $1, UNNEST($2::text[])
            ON CONFLICT (church_code, email) DO NOTHING
            "#,
        )
        .bind(&church.code)
        .bind(&emails)
        .execute(&mut **tx)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }
}

#[async_trait]
impl ChurchStore for PgChurchRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Church>, AppError> {
        let row = sqlx::query_as::<_, ChurchRow>(&church_query("c.code = $1"))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Church::try_from).transpose()
    }

    async fn find_by_code_or_name(
        &self,
        code: &str,
        name: &str,
    ) -> Result<Option<Church>, AppError> {
        let row = sqlx::query_as::<_, ChurchRow>(&church_query("c.code = $1 OR c.name = $2"))
            .bind(code)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Church::try_from).transpose()
    }

    async fn insert(&self, church: &Church) -> Result<(), AppError> {
        // 1. Inicia a transação: igreja + admins entram juntos
        let mut tx = self.pool.begin().await?;

        // 2. Cria a igreja
        sqlx::query(
            r#"
            INSERT INTO churches (
                code, name, address, time_offset, status, servants, locations, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&church.code)
        .bind(&church.name)
        .bind(&church.address)
        .bind(church.time_offset)
        .bind(church.status.code())
        .bind(Json(&church.servants))
        .bind(Json(&church.locations))
        .bind(church.created_at)
        .bind(church.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        // 3. Admins
        Self::sync_admins(&mut tx, church).await?;

        // 4. Commit
        tx.commit().await?;
        Ok(())
    }

    async fn save(&self, church: &Church) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE churches SET
                name = $2,
                address = $3,
                time_offset = $4,
                status = $5,
                servants = $6,
                locations = $7,
                updated_at = NOW()
            WHERE code = $1
            "#,
        )
        .bind(&church.code)
        .bind(&church.name)
        .bind(&church.address)
        .bind(church.time_offset)
        .bind(church.status.code())
        .bind(Json(&church.servants))
        .bind(Json(&church.locations))
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Forbidden(format!(
                "Igreja '{}' não existe mais",
                church.code
            )));
        }

        Self::sync_admins(&mut tx, church).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_by_admin(&self, email: &str) -> Result<Vec<Church>, AppError> {
        let rows = sqlx::query_as::<_, ChurchRow>(&church_query(
            "c.code IN (SELECT church_code FROM church_admins WHERE email = $1)",
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        into_churches(rows)
    }

    async fn search_active_by_name(&self, fragment: &str) -> Result<Vec<Church>, AppError> {
        let rows = sqlx::query_as::<_, ChurchRow>(&church_query(
            r#"c.status = 1 AND c.name ILIKE '%' || $1 || '%' ESCAPE '\'"#,
        ))
        .bind(escape_like(fragment))
        .fetch_all(&self.pool)
        .await?;

        into_churches(rows)
    }

    async fn list_active_by_codes(&self, codes: &[String]) -> Result<Vec<Church>, AppError> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ChurchRow>(&church_query("c.status = 1 AND c.code = ANY($1)"))
            .bind(codes)
            .fetch_all(&self.pool)
            .await?;

        into_churches(rows)
    }
}
