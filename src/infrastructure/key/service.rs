//! Access service
//!
//! Orchestrates key issuance, verification, override, revocation and the
//! expiry sweep against the record store. Every operation runs its
//! read-decide-act sequence inside the per-address critical section, so
//! concurrent requests for one address serialize and the sweep can never
//! race a recreation destructively.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::domain::key::{ClientAddr, ExpiryPolicy, KeyRecord, KeyRecordRepository};
use crate::domain::DomainError;

use super::generator::KeyGenerator;
use super::locks::AddressLocks;

/// Fixed literal prepended to every externally visible key string
pub const DEFAULT_DISPLAY_PREFIX: &str = "Sang_";

/// Result of a get-or-create call
#[derive(Debug, Clone)]
pub struct IssuedKey {
    /// The stored token value
    pub key: String,
    /// The token in its external, prefixed form
    pub display_key: String,
}

/// Result of a successful verification
#[derive(Debug, Clone)]
pub struct VerifiedKey {
    /// The matched record
    pub record: KeyRecord,
    /// Lifetime left at the moment of verification
    pub remaining: Duration,
}

/// Access service for per-address key management
#[derive(Debug)]
pub struct AccessService<R>
where
    R: KeyRecordRepository,
{
    repository: Arc<R>,
    generator: KeyGenerator,
    policy: ExpiryPolicy,
    display_prefix: String,
    locks: AddressLocks,
}

impl<R: KeyRecordRepository> AccessService<R> {
    /// Create a new access service with default generator, policy and prefix
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            generator: KeyGenerator::default(),
            policy: ExpiryPolicy::default(),
            display_prefix: DEFAULT_DISPLAY_PREFIX.to_string(),
            locks: AddressLocks::new(),
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: KeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Create with a custom expiration policy
    pub fn with_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create with a custom display prefix
    pub fn with_display_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.display_prefix = prefix.into();
        self
    }

    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }

    /// The external, prefixed form of a stored token
    pub fn display_key(&self, key: &str) -> String {
        format!("{}{}", self.display_prefix, key)
    }

    /// Return the unexpired key for an address, minting one if needed
    ///
    /// An expired record that the reaper has not yet swept counts as
    /// absent and is replaced with a fresh key.
    pub async fn get_or_create(&self, address: &ClientAddr) -> Result<IssuedKey, DomainError> {
        let _guard = self.locks.acquire(address).await;

        let now = Utc::now();

        if let Some(record) = self.repository.get(address).await? {
            if !self.policy.is_expired(&record, now) {
                debug!(address = %address, "Returning existing key");

                return Ok(IssuedKey {
                    display_key: self.display_key(record.key()),
                    key: record.key().to_string(),
                });
            }

            debug!(address = %address, "Existing key expired, reissuing");
        }

        let key = self.generator.generate();
        self.repository
            .upsert(KeyRecord::new(address.clone(), &key))
            .await?;

        info!(address = %address, "Issued new key");

        Ok(IssuedKey {
            display_key: self.display_key(&key),
            key,
        })
    }

    /// Check a presented key against the stored record
    ///
    /// Succeeds only for an existing, unexpired record whose token matches
    /// `presented` in its prefixed form. A miss does not distinguish
    /// wrong-key from no-key, and this is not a constant-time comparison.
    pub async fn verify(
        &self,
        address: &ClientAddr,
        presented: &str,
    ) -> Result<Option<VerifiedKey>, DomainError> {
        let _guard = self.locks.acquire(address).await;

        let now = Utc::now();

        let Some(record) = self.repository.get(address).await? else {
            debug!(address = %address, "Verify miss: no record");
            return Ok(None);
        };

        if self.policy.is_expired(&record, now) {
            debug!(address = %address, "Verify miss: record expired");
            return Ok(None);
        }

        if presented != self.display_key(record.key()) {
            debug!(address = %address, "Verify miss: key mismatch");
            return Ok(None);
        }

        let remaining = self.policy.remaining(&record, now);

        Ok(Some(VerifiedKey { record, remaining }))
    }

    /// Replace the key for an address and restart its TTL countdown
    pub async fn override_key(
        &self,
        address: &ClientAddr,
        custom_key: &str,
    ) -> Result<KeyRecord, DomainError> {
        if custom_key.is_empty() {
            return Err(DomainError::validation("Custom key not provided"));
        }

        let _guard = self.locks.acquire(address).await;

        let record = self
            .repository
            .upsert(KeyRecord::new(address.clone(), custom_key))
            .await?;

        info!(address = %address, "Key overridden");

        Ok(record)
    }

    /// Delete the record for an address; returns whether one existed
    pub async fn revoke(&self, address: &ClientAddr) -> Result<bool, DomainError> {
        let _guard = self.locks.acquire(address).await;

        let existed = self.repository.delete(address).await?;

        if existed {
            info!(address = %address, "Key revoked");
        } else {
            debug!(address = %address, "Revoke miss: no record");
        }

        Ok(existed)
    }

    /// Snapshot of all current records
    pub async fn list_all(&self) -> Result<Vec<KeyRecord>, DomainError> {
        self.repository.list_all().await
    }

    /// Number of current records
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// One expiry sweep: delete every record whose lifetime has elapsed
    ///
    /// Expiry is re-decided per record inside its critical section, not
    /// from the snapshot, so a record recreated mid-sweep survives.
    pub async fn sweep_expired(&self) -> Result<usize, DomainError> {
        let snapshot = self.repository.list_all().await?;
        let mut removed = 0;

        for record in snapshot {
            let address = record.address().clone();
            let _guard = self.locks.acquire(&address).await;

            let now = Utc::now();

            if let Some(current) = self.repository.get(&address).await? {
                if self.policy.is_expired(&current, now) && self.repository.delete(&address).await?
                {
                    debug!(address = %address, "Swept expired key");
                    removed += 1;
                }
            }
        }

        self.locks.prune().await;

        if removed > 0 {
            info!(removed, "Expiry sweep removed records");
        }

        Ok(removed)
    }
}
