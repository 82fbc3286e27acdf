//! Expiration policy for key records
//!
//! Pure time arithmetic over a fixed time-to-live; no storage access.

use chrono::{DateTime, Duration, Utc};

use super::entity::KeyRecord;

/// Default record lifetime: 24 hours
pub const DEFAULT_TTL_SECS: u64 = 86_400;

/// Expiration policy with a fixed time-to-live
///
/// A record is expired once its age reaches the TTL exactly; every read
/// path applies this check itself instead of trusting sweep timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    ttl: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::from_secs(DEFAULT_TTL_SECS)
    }
}

impl ExpiryPolicy {
    /// Create a policy with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// Create a policy with a time-to-live in whole seconds
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::seconds(secs as i64))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the record's lifetime has elapsed at `now`
    pub fn is_expired(&self, record: &KeyRecord, now: DateTime<Utc>) -> bool {
        now - record.created_at() >= self.ttl
    }

    /// Lifetime left at `now`; negative once the record has expired
    pub fn remaining(&self, record: &KeyRecord, now: DateTime<Utc>) -> Duration {
        self.ttl - (now - record.created_at())
    }
}

/// Render a remaining lifetime as `H:MM:SS`, clamped at zero
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}
