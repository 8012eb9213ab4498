//! Wire shapes for the identity service and normalization into [`Identity`].
//!
//! The backend is not consistent about naming (`_id` vs `id`, `firstName`
//! vs `first_name` vs a single `name`), and sometimes wraps the user in a
//! `{ "user": ... }` envelope. All of that is absorbed here. Pure parsing in
//! `parse_identity` for testability.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use serde::{Deserialize, Serialize};

use super::TransportError;
use crate::identity::{Identity, Role, UnknownRole, normalize_email};

/// `POST` login body.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

#[derive(Deserialize)]
struct RawUser {
    #[serde(alias = "_id")]
    id: RawId,
    email: String,
    #[serde(default, rename = "firstName", alias = "first_name")]
    first_name: Option<String>,
    #[serde(default, rename = "lastName", alias = "last_name")]
    last_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    role: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    company: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl RawUser {
    fn into_identity(self) -> Result<Identity, TransportError> {
        let id = match self.id {
            RawId::Text(text) => text.trim().to_owned(),
            RawId::Number(number) => number.to_string(),
        };
        if id.is_empty() {
            return Err(TransportError::Decode("empty user id".into()));
        }

        let email = normalize_email(&self.email)
            .ok_or_else(|| TransportError::Decode(format!("invalid user email: {}", self.email)))?;
        let role: Role = self
            .role
            .parse()
            .map_err(|e: UnknownRole| TransportError::Decode(e.to_string()))?;

        let (first_name, last_name) = match (non_empty(self.first_name), non_empty(self.last_name)) {
            (Some(first), last) => (first, last.unwrap_or_default()),
            (None, last) => {
                let full = non_empty(self.name).unwrap_or_default();
                match full.split_once(' ') {
                    Some((first, rest)) => (first.to_owned(), last.unwrap_or_else(|| rest.trim().to_owned())),
                    None => (full, last.unwrap_or_default()),
                }
            }
        };

        Ok(Identity {
            id,
            email,
            first_name,
            last_name,
            role,
            phone: non_empty(self.phone),
            address: non_empty(self.address),
            company: non_empty(self.company),
        })
    }
}

/// Parse a response body into an [`Identity`].
///
/// Accepts `{ "user": {...} }` or a bare user object.
pub(crate) fn parse_identity(body: &str) -> Result<Identity, TransportError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;
    let user = match value {
        serde_json::Value::Object(mut map) if map.get("user").is_some_and(serde_json::Value::is_object) => {
            map.remove("user").unwrap_or_default()
        }
        other => other,
    };
    let raw: RawUser = serde_json::from_value(user).map_err(|e| TransportError::Decode(e.to_string()))?;
    raw.into_identity()
}
