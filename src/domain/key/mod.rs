//! Key record domain: entity, validation, expiration policy and storage trait

mod entity;
mod expiry;
mod repository;
mod validation;

pub use entity::{ClientAddr, KeyRecord};
pub use expiry::{format_remaining, ExpiryPolicy, DEFAULT_TTL_SECS};
pub use repository::KeyRecordRepository;
pub use validation::{validate_address, AddressValidationError};

#[cfg(test)]
pub use repository::mock::MockKeyRecordRepository;
