//! API layer - HTTP boundary over the access service

pub mod health;
pub mod keys;
pub mod router;
pub mod state;
pub mod types;

pub use router::create_router_with_state;
pub use state::AppState;
