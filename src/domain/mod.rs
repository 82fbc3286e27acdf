//! Domain layer - Core business logic and entities

pub mod error;
pub mod key;

pub use error::DomainError;
pub use key::{
    format_remaining, validate_address, AddressValidationError, ClientAddr, ExpiryPolicy,
    KeyRecord, KeyRecordRepository, DEFAULT_TTL_SECS,
};
