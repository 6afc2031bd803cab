use super::{RecordId, Stats, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{debug, instrument};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in split_sql_statements(SCHEMA_SQL) {
            debug!("applying schema statement: {statement}");
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION),
        _ => false,
    }
}

fn to_db(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Corrupt(format!("counter overflow: {value}")))
}

fn from_db(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative counter: {value}")))
}

fn stats_from_row(row: &PgRow) -> Result<Stats, StoreError> {
    Ok(Stats {
        correct: from_db(row.try_get("correct")?)?,
        incorrect: from_db(row.try_get("incorrect")?)?,
        skipped: from_db(row.try_get("skipped")?)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    Ok(UserRecord {
        id: RecordId(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        stats: stats_from_row(row)?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    #[instrument(skip(self, password_hash))]
    async fn create(&self, username: &str, password_hash: &str) -> Result<RecordId, StoreError> {
        match sqlx::query("INSERT INTO users (username, password) VALUES ($1, $2) RETURNING id")
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
        {
            Ok(row) => Ok(RecordId(row.try_get("id")?)),
            Err(e) if is_unique_violation(&e) => Err(StoreError::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query(
            "SELECT id, username, password, correct, incorrect, skipped FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(user_from_row)
        .transpose()
    }

    #[instrument(skip(self))]
    async fn get_stats(&self, username: &str) -> Result<Option<Stats>, StoreError> {
        sqlx::query("SELECT correct, incorrect, skipped FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(stats_from_row)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn update_stats(&self, username: &str, stats: Stats) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET correct = $2, incorrect = $3, skipped = $4 WHERE username = $1",
        )
        .bind(username)
        .bind(to_db(stats.correct)?)
        .bind(to_db(stats.incorrect)?)
        .bind(to_db(stats.skipped)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn top(&self, limit: usize) -> Result<Vec<UserRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        sqlx::query(
            "SELECT id, username, password, correct, incorrect, skipped FROM users ORDER BY correct DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(user_from_row)
        .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }
}
