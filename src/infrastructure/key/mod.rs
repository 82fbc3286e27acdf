//! Key infrastructure implementations
//!
//! Token generation, record storage backends, the access service and the
//! background expiry sweep.

mod generator;
mod locks;
mod postgres_repository;
mod reaper;
pub(crate) mod repository;
mod service;

pub use generator::{KeyGenerator, DEFAULT_TOKEN_LENGTH};
pub use locks::AddressLocks;
pub use postgres_repository::PostgresKeyRecordRepository;
pub use reaper::{Reaper, ReaperHandle, DEFAULT_SWEEP_INTERVAL_SECS};
pub use repository::InMemoryKeyRecordRepository;
pub use service::{AccessService, IssuedKey, VerifiedKey, DEFAULT_DISPLAY_PREFIX};
