//! Key endpoints
//!
//! Wire contract: misses and rejected overrides are ordinary JSON message
//! bodies, not HTTP errors; only storage failures surface as 5xx.

use std::net::SocketAddr;

use axum::{
    extract::{rejection::FormRejection, ConnectInfo, Path, State},
    response::Redirect,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::key::{format_remaining, ClientAddr, KeyRecord};

/// Response for a key lookup with a presented key
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VerifyResponse {
    Key { ip: String, key: String, time: String },
    Miss { message: String },
}

/// Form body for the override endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddKeyForm {
    #[serde(default)]
    pub custom_key: String,
}

/// Response for the override endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AddKeyResponse {
    Added { message: String, new_key: String },
    Rejected { message: String },
}

/// Plain message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One entry in the full key listing
#[derive(Debug, Clone, Serialize)]
pub struct KeyListEntry {
    pub ip: String,
    pub key: String,
    pub creation_time: String,
}

impl From<&KeyRecord> for KeyListEntry {
    fn from(record: &KeyRecord) -> Self {
        Self {
            ip: record.address().as_str().to_string(),
            key: record.key().to_string(),
            creation_time: record.created_at().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

fn parse_address(address: &str) -> Result<ClientAddr, ApiError> {
    ClientAddr::new(address)
        .map_err(|e| ApiError::bad_request(e.to_string()).with_param("address"))
}

/// GET /keys
///
/// Redirects the caller to the key path for its own peer address.
pub async fn redirect_to_own_key(ConnectInfo(peer): ConnectInfo<SocketAddr>) -> Redirect {
    debug!(peer = %peer, "Redirecting caller to its key path");

    Redirect::temporary(&format!("/keys/ip/{}", peer.ip()))
}

/// GET /keys/ip/{address}
///
/// Issues (or re-reads) the key for the address and redirects to the
/// key-bearing URL.
pub async fn get_or_create_key(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Redirect, ApiError> {
    let address = parse_address(&address)?;

    let issued = state
        .access_service
        .get_or_create(&address)
        .await
        .map_err(ApiError::from)?;

    Ok(Redirect::temporary(&format!(
        "/keys/ip/{}/{}",
        address, issued.display_key
    )))
}

/// GET /keys/ip/{address}/{key}
pub async fn verify_key(
    State(state): State<AppState>,
    Path((address, key)): Path<(String, String)>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let address = parse_address(&address)?;

    let verified = state
        .access_service
        .verify(&address, &key)
        .await
        .map_err(ApiError::from)?;

    let response = match verified {
        Some(verified) => VerifyResponse::Key {
            ip: address.to_string(),
            key,
            time: format_remaining(verified.remaining),
        },
        None => VerifyResponse::Miss {
            message: format!("IP {} No Key.", address),
        },
    };

    Ok(Json(response))
}

/// POST /add_key/ip/{address}
pub async fn add_key(
    State(state): State<AppState>,
    Path(address): Path<String>,
    form: Result<Form<AddKeyForm>, FormRejection>,
) -> Result<Json<AddKeyResponse>, ApiError> {
    use crate::domain::DomainError;

    let address = parse_address(&address)?;
    // A missing or unparsable body is the same as an empty custom key.
    let form = form.map(|Form(form)| form).unwrap_or_default();

    match state
        .access_service
        .override_key(&address, &form.custom_key)
        .await
    {
        Ok(record) => Ok(Json(AddKeyResponse::Added {
            message: "Custom key added successfully".to_string(),
            new_key: record.key().to_string(),
        })),
        Err(DomainError::Validation { .. }) => Ok(Json(AddKeyResponse::Rejected {
            message: "Custom key not provided".to_string(),
        })),
        Err(e) => Err(ApiError::from(e)),
    }
}

/// POST /delete_key/ip/{address}
pub async fn delete_key(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let address = parse_address(&address)?;

    let existed = state
        .access_service
        .revoke(&address)
        .await
        .map_err(ApiError::from)?;

    let message = if existed {
        format!("Key for IP {} has been deleted.", address)
    } else {
        format!("IP {} does not exist in the database.", address)
    };

    Ok(Json(MessageResponse { message }))
}

/// GET /all_keys
pub async fn list_all_keys(
    State(state): State<AppState>,
) -> Result<Json<Vec<KeyListEntry>>, ApiError> {
    let records = state
        .access_service
        .list_all()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(records.iter().map(KeyListEntry::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_verify_response_key_serialization() {
        let response = VerifyResponse::Key {
            ip: "10.0.0.1".to_string(),
            key: "Sang_aB3dE6gH9k".to_string(),
            time: "23:59:59".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"ip":"10.0.0.1","key":"Sang_aB3dE6gH9k","time":"23:59:59"}"#
        );
    }

    #[test]
    fn test_verify_response_miss_serialization() {
        let response = VerifyResponse::Miss {
            message: "IP 10.0.0.1 No Key.".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"message":"IP 10.0.0.1 No Key."}"#);
    }

    #[test]
    fn test_add_key_form_deserialization() {
        let form: AddKeyForm =
            serde_json::from_str(r#"{"custom_key": "ABCDEFGHIJ"}"#).unwrap();
        assert_eq!(form.custom_key, "ABCDEFGHIJ");

        // A missing field deserializes to the empty string and is rejected
        // downstream rather than failing extraction.
        let form: AddKeyForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.custom_key, "");
    }

    #[test]
    fn test_add_key_response_serialization() {
        let response = AddKeyResponse::Added {
            message: "Custom key added successfully".to_string(),
            new_key: "ABCDEFGHIJ".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"new_key\":\"ABCDEFGHIJ\""));

        let response = AddKeyResponse::Rejected {
            message: "Custom key not provided".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"message":"Custom key not provided"}"#);
    }

    #[test]
    fn test_key_list_entry_from_record() {
        let address = ClientAddr::new("10.0.0.1").unwrap();
        let stamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let record = KeyRecord::new(address, "aB3dE6gH9k").with_created_at(stamp);

        let entry = KeyListEntry::from(&record);

        assert_eq!(entry.ip, "10.0.0.1");
        assert_eq!(entry.key, "aB3dE6gH9k");
        assert_eq!(entry.creation_time, "2024-03-09 14:30:05");
    }

    #[test]
    fn test_parse_address_rejects_invalid() {
        assert!(parse_address("10.0.0.1").is_ok());
        assert!(parse_address("not an address").is_err());
    }
}
