//! Application state for shared services

use std::sync::Arc;

use crate::domain::key::{ClientAddr, KeyRecord, KeyRecordRepository};
use crate::domain::DomainError;
use crate::infrastructure::key::{AccessService, IssuedKey, VerifiedKey};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub access_service: Arc<dyn AccessServiceTrait>,
}

impl AppState {
    pub fn new(access_service: Arc<dyn AccessServiceTrait>) -> Self {
        Self { access_service }
    }
}

/// Trait for access service operations
#[async_trait::async_trait]
pub trait AccessServiceTrait: Send + Sync {
    async fn get_or_create(&self, address: &ClientAddr) -> Result<IssuedKey, DomainError>;
    async fn verify(
        &self,
        address: &ClientAddr,
        presented: &str,
    ) -> Result<Option<VerifiedKey>, DomainError>;
    async fn override_key(
        &self,
        address: &ClientAddr,
        custom_key: &str,
    ) -> Result<KeyRecord, DomainError>;
    async fn revoke(&self, address: &ClientAddr) -> Result<bool, DomainError>;
    async fn list_all(&self) -> Result<Vec<KeyRecord>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl<R: KeyRecordRepository + 'static> AccessServiceTrait for AccessService<R> {
    async fn get_or_create(&self, address: &ClientAddr) -> Result<IssuedKey, DomainError> {
        AccessService::get_or_create(self, address).await
    }

    async fn verify(
        &self,
        address: &ClientAddr,
        presented: &str,
    ) -> Result<Option<VerifiedKey>, DomainError> {
        AccessService::verify(self, address, presented).await
    }

    async fn override_key(
        &self,
        address: &ClientAddr,
        custom_key: &str,
    ) -> Result<KeyRecord, DomainError> {
        AccessService::override_key(self, address, custom_key).await
    }

    async fn revoke(&self, address: &ClientAddr) -> Result<bool, DomainError> {
        AccessService::revoke(self, address).await
    }

    async fn list_all(&self) -> Result<Vec<KeyRecord>, DomainError> {
        AccessService::list_all(self).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        AccessService::count(self).await
    }
}
