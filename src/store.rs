use crate::model::{seed_records, NewUser, UserRecord};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Newest-first collection of registered users.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Vec<UserRecord>;
    /// Assigns `id = len + 1` and prepends the record.
    async fn insert(&self, user: NewUser) -> UserRecord;
    /// Replaces the contents with the seed records.
    async fn reset(&self);
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

pub struct MemoryStore {
    users: RwLock<Vec<UserRecord>>,
}

impl MemoryStore {
    /// A store holding the seed records.
    pub fn new() -> Self {
        Self::with_records(seed_records())
    }

    /// A store holding `records`, newest first.
    pub fn with_records(records: Vec<UserRecord>) -> Self {
        Self {
            users: RwLock::new(records),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list(&self) -> Vec<UserRecord> {
        self.users.read().await.clone()
    }

    async fn insert(&self, user: NewUser) -> UserRecord {
        // Id assignment and prepend share one write guard.
        let mut users = self.users.write().await;
        let id = u32::try_from(users.len()).map_or(u32::MAX, |len| len.saturating_add(1));
        let record = UserRecord::from_new(id, user);
        users.insert(0, record.clone());
        record
    }

    async fn reset(&self) {
        *self.users.write().await = seed_records();
    }

    async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}
