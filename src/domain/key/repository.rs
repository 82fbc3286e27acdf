//! Key record repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ClientAddr, KeyRecord};
use crate::domain::DomainError;

/// Repository trait for key record storage
///
/// Each operation on a given address is atomic with respect to concurrent
/// operations on the same address: a reader observes either the previous
/// record, the new one, or none, never a partial write. Callers needing a
/// multi-step critical section (read, decide, act) serialize above this
/// trait.
#[async_trait]
pub trait KeyRecordRepository: Send + Sync + Debug {
    /// Get the record for an address, if any
    async fn get(&self, address: &ClientAddr) -> Result<Option<KeyRecord>, DomainError>;

    /// Insert the record, replacing any existing record for its address
    async fn upsert(&self, record: KeyRecord) -> Result<KeyRecord, DomainError>;

    /// Delete the record for an address; returns whether one existed
    async fn delete(&self, address: &ClientAddr) -> Result<bool, DomainError>;

    /// Snapshot of all current records, iteration order unspecified
    async fn list_all(&self) -> Result<Vec<KeyRecord>, DomainError>;

    /// Number of current records
    async fn count(&self) -> Result<usize, DomainError>;
}
