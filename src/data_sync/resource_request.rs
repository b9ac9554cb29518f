use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};

/// Freshness and lock state for one upstream resource path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequestRecord {
    pub path: String,
    pub locked: bool,
    /// `None` until the first successful fetch cycle.
    pub expires: Option<DateTime<Utc>>,
}

impl ResourceRequestRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), locked: false, expires: None }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires > now)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LockAttempt {
    /// The cached copy has not expired yet.
    Fresh,
    /// Another refresh holds the lock.
    Busy,
    Acquired,
}

/// Persistence for [`ResourceRequestRecord`]s.
///
/// `try_lock` is a conditional update: the freshness check, the lock check and
/// the lock write happen as one atomic step, so two readers can never both
/// observe `locked == false` and both proceed.
#[async_trait]
pub trait ResourceRequestStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<ResourceRequestRecord>, StoreError>;

    /// Creates the record on first use.
    async fn try_lock(&self, path: &str, now: DateTime<Utc>) -> Result<LockAttempt, StoreError>;

    /// Clears the lock. `expires` is written only when `Some`, so a failed
    /// cycle leaves the previous expiry in place.
    async fn unlock(&self, path: &str, expires: Option<DateTime<Utc>>) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryResourceRequests {
    records: DashMap<String, ResourceRequestRecord>,
}

impl MemoryResourceRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, e.g. to model state left by a previous process.
    pub fn insert(&self, record: ResourceRequestRecord) {
        self.records.insert(record.path.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ResourceRequestStore for MemoryResourceRequests {
    async fn get(&self, path: &str) -> Result<Option<ResourceRequestRecord>, StoreError> {
        Ok(self.records.get(path).map(|record| record.value().clone()))
    }

    async fn try_lock(&self, path: &str, now: DateTime<Utc>) -> Result<LockAttempt, StoreError> {
        // The entry guard holds the shard lock for the whole check-and-set.
        match self.records.entry(path.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_fresh(now) {
                    Ok(LockAttempt::Fresh)
                } else if record.locked {
                    Ok(LockAttempt::Busy)
                } else {
                    record.locked = true;
                    Ok(LockAttempt::Acquired)
                }
            }
            Entry::Vacant(vacant) => {
                let mut record = ResourceRequestRecord::new(path);
                record.locked = true;
                vacant.insert(record);
                Ok(LockAttempt::Acquired)
            }
        }
    }

    async fn unlock(&self, path: &str, expires: Option<DateTime<Utc>>) -> Result<(), StoreError> {
        let mut record = self
            .records
            .entry(path.to_string())
            .or_insert_with(|| ResourceRequestRecord::new(path));
        record.locked = false;
        if expires.is_some() {
            record.expires = expires;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_first_lock_creates_record() {
        let store = MemoryResourceRequests::new();
        let now = Utc::now();

        assert_eq!(store.try_lock("/universe/regions/", now).await.unwrap(), LockAttempt::Acquired);
        let record = store.get("/universe/regions/").await.unwrap().unwrap();
        assert!(record.locked);
        assert_eq!(record.expires, None);
    }

    #[tokio::test]
    async fn test_second_lock_is_busy() {
        let store = MemoryResourceRequests::new();
        let now = Utc::now();

        store.try_lock("/markets/groups/", now).await.unwrap();
        assert_eq!(store.try_lock("/markets/groups/", now).await.unwrap(), LockAttempt::Busy);
    }

    #[tokio::test]
    async fn test_fresh_record_is_not_locked() {
        let store = MemoryResourceRequests::new();
        let now = Utc::now();
        store.insert(ResourceRequestRecord {
            path: "/universe/types/".to_string(),
            locked: false,
            expires: Some(now + Duration::minutes(5)),
        });

        assert_eq!(store.try_lock("/universe/types/", now).await.unwrap(), LockAttempt::Fresh);
        assert!(!store.get("/universe/types/").await.unwrap().unwrap().locked);
    }

    #[tokio::test]
    async fn test_unlock_without_expiry_keeps_previous() {
        let store = MemoryResourceRequests::new();
        let now = Utc::now();
        let previous = now - Duration::minutes(1);
        store.insert(ResourceRequestRecord { path: "/p".to_string(), locked: true, expires: Some(previous) });

        store.unlock("/p", None).await.unwrap();
        let record = store.get("/p").await.unwrap().unwrap();
        assert!(!record.locked);
        assert_eq!(record.expires, Some(previous));

        assert_eq!(store.try_lock("/p", now).await.unwrap(), LockAttempt::Acquired);
        store.unlock("/p", Some(now + Duration::minutes(5))).await.unwrap();
        assert!(store.get("/p").await.unwrap().unwrap().is_fresh(now));
    }
}
