use super::{RecordId, Stats, StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Store kept in process memory; records stay in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<RecordId, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|user| user.username == username) {
            return Err(StoreError::AlreadyExists);
        }

        let id = RecordId(i64::try_from(users.len()).unwrap_or(i64::MAX).saturating_add(1));
        users.push(UserRecord {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            stats: Stats::default(),
        });

        Ok(id)
    }

    async fn find(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|user| user.username == username).cloned())
    }

    async fn get_stats(&self, username: &str) -> Result<Option<Stats>, StoreError> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|user| user.username == username)
            .map(|user| user.stats))
    }

    async fn update_stats(&self, username: &str, stats: Stats) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.username == username)
            .ok_or(StoreError::NotFound)?;
        user.stats = stats;
        Ok(())
    }

    async fn top(&self, limit: usize) -> Result<Vec<UserRecord>, StoreError> {
        let mut users = self.users.lock().await.clone();
        // stable sort, ties stay in insertion order
        users.sort_by(|a, b| b.stats.correct.cmp(&a.stats.correct));
        users.truncate(limit);
        Ok(users)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
