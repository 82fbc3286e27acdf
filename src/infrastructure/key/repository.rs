//! In-memory key record repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::key::{ClientAddr, KeyRecord, KeyRecordRepository};
use crate::domain::DomainError;

/// In-memory implementation of KeyRecordRepository
///
/// The single write lock makes each upsert/delete atomic; readers observe
/// either the previous record for an address or the new one, never both.
#[derive(Debug)]
pub struct InMemoryKeyRecordRepository {
    records: Arc<RwLock<HashMap<String, KeyRecord>>>,
}

impl InMemoryKeyRecordRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository with initial records
    pub fn with_records(records: Vec<KeyRecord>) -> Self {
        let map: HashMap<String, KeyRecord> = records
            .into_iter()
            .map(|r| (r.address().as_str().to_string(), r))
            .collect();

        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }
}

impl Default for InMemoryKeyRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyRecordRepository for InMemoryKeyRecordRepository {
    async fn get(&self, address: &ClientAddr) -> Result<Option<KeyRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(address.as_str()).cloned())
    }

    async fn upsert(&self, record: KeyRecord) -> Result<KeyRecord, DomainError> {
        let mut records = self.records.write().await;
        records.insert(record.address().as_str().to_string(), record.clone());
        Ok(record)
    }

    async fn delete(&self, address: &ClientAddr) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        Ok(records.remove(address.as_str()).is_some())
    }

    async fn list_all(&self) -> Result<Vec<KeyRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let records = self.records.read().await;
        Ok(records.len())
    }
}
