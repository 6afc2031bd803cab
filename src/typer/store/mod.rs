//! Credential store contract.
//!
//! Everything the service needs from persistence is expressed by
//! [`UserStore`]: single-record reads and writes plus the leaderboard query.
//! No operation spans more than one record, so concurrent stats updates for
//! the same user are last-write-wins.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists")]
    AlreadyExists,

    #[error("user not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid stored value: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub i64);

/// `(correct, incorrect, skipped)` answer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub correct: u64,
    pub incorrect: u64,
    pub skipped: u64,
}

impl Stats {
    #[must_use]
    pub const fn new(correct: u64, incorrect: u64, skipped: u64) -> Self {
        Self {
            correct,
            incorrect,
            skipped,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.correct
            .saturating_add(self.incorrect)
            .saturating_add(self.skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: RecordId,
    pub username: String,
    pub password_hash: String,
    pub stats: Stats,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user with zeroed stats.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] when the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<RecordId, StoreError>;

    async fn find(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn get_stats(&self, username: &str) -> Result<Option<Stats>, StoreError>;

    /// Overwrite the stats triple.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when no such user exists.
    async fn update_stats(&self, username: &str, stats: Stats) -> Result<(), StoreError>;

    /// Up to `limit` users ordered by correct answers, highest first. Ties keep
    /// the store's natural order.
    async fn top(&self, limit: usize) -> Result<Vec<UserRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
