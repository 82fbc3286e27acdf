//! Key record entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_address, AddressValidationError};

/// Client address identifier - the textual network address a key is issued to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientAddr(String);

impl ClientAddr {
    /// Create a new ClientAddr after validation
    pub fn new(address: impl Into<String>) -> Result<Self, AddressValidationError> {
        let address = address.into();
        validate_address(&address)?;
        Ok(Self(address))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientAddr {
    type Error = AddressValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientAddr> for String {
    fn from(addr: ClientAddr) -> Self {
        addr.0
    }
}

impl std::fmt::Display for ClientAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key record entity - one per distinct client address
///
/// The address is the unique key of the record and is immutable once
/// created; the token and creation timestamp change only through an
/// administrative override, which replaces the record wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Address the key was issued to
    address: ClientAddr,
    /// The issued token value
    key: String,
    /// Timestamp of creation or last override
    created_at: DateTime<Utc>,
}

impl KeyRecord {
    /// Create a new key record stamped with the current time
    pub fn new(address: ClientAddr, key: impl Into<String>) -> Self {
        Self {
            address,
            key: key.into(),
            created_at: Utc::now(),
        }
    }

    /// Set an explicit creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn address(&self) -> &ClientAddr {
        &self.address
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_client_addr_valid() {
        let addr = ClientAddr::new("10.0.0.1").unwrap();
        assert_eq!(addr.as_str(), "10.0.0.1");
        assert_eq!(addr.to_string(), "10.0.0.1");
    }

    #[test]
    fn test_client_addr_invalid() {
        assert!(ClientAddr::new("").is_err());
        assert!(ClientAddr::new("10.0.0.1/24").is_err());
        assert!(ClientAddr::new("not an address").is_err());
    }

    #[test]
    fn test_client_addr_serde_round_trip() {
        let addr = ClientAddr::new("192.168.1.7").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"192.168.1.7\"");

        let parsed: ClientAddr = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_client_addr_deserialize_rejects_invalid() {
        let result: Result<ClientAddr, _> = serde_json::from_str("\"bad addr\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_key_record_creation() {
        let addr = ClientAddr::new("10.0.0.1").unwrap();
        let record = KeyRecord::new(addr.clone(), "aB3dE6gH9k");

        assert_eq!(record.address(), &addr);
        assert_eq!(record.key(), "aB3dE6gH9k");
        assert!(record.created_at() <= Utc::now());
    }

    #[test]
    fn test_key_record_with_created_at() {
        let addr = ClientAddr::new("10.0.0.1").unwrap();
        let stamp = Utc::now() - Duration::hours(3);
        let record = KeyRecord::new(addr, "aB3dE6gH9k").with_created_at(stamp);

        assert_eq!(record.created_at(), stamp);
    }
}
