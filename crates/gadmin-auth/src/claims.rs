//! Unverified reading of bearer token claims.
//!
//! The console only needs the payload of its session token to decide what to
//! render before the backend has been asked anything. Signatures are never
//! checked here: every authenticated request is verified by the backend, so
//! the claims read by this module are display hints, not authority.

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Standard alphabet, lenient about non-zero bits after the last byte the
/// way browser decoders are.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Identifier of the account a token was issued for.
///
/// The backend issues numeric ids, but nothing in the console depends on
/// that, so string ids are kept as-is. Equality is type sensitive: `1` and
/// `"1"` are different accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Int(i64),
    Text(String),
}

impl UserId {
    /// Read an id from a JSON value. Zero, empty strings and non-scalar
    /// values count as "no id".
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().filter(|id| *id != 0).map(UserId::Int),
            Value::String(s) if !s.is_empty() => Some(UserId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Int(id) => write!(f, "{id}"),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    pub user_id: Option<UserId>,
    pub is_super_admin: bool,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub user_type: Option<i64>,
    pub role_ids: Vec<i64>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
    /// Every field of the payload, including the ones above.
    pub fields: Map<String, Value>,
}

impl Claims {
    /// Build claims from a decoded payload object.
    ///
    /// Fields with an unexpected type are treated as absent rather than
    /// rejecting the whole payload; `is_super_admin` is only true when the
    /// payload carries the boolean `true`.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let string = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        let int = |key: &str| fields.get(key).and_then(Value::as_i64);

        Self {
            user_id: fields.get("user_id").and_then(UserId::from_value),
            is_super_admin: fields.get("is_super_admin") == Some(&Value::Bool(true)),
            username: string("username"),
            nickname: string("nickname"),
            user_type: int("type"),
            role_ids: fields
                .get("role_ids")
                .and_then(Value::as_array)
                .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
                .unwrap_or_default(),
            exp: int("exp"),
            iat: int("iat"),
            fields,
        }
    }

    /// Name to show for the signed-in account.
    pub fn display_name(&self) -> Option<&str> {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.username.as_deref())
    }
}

/// Decode the claims of a `header.payload.signature` token.
///
/// Returns `None` when the token is empty, does not have exactly three
/// segments, the payload is not base64url, or the decoded payload is not a
/// JSON object.
pub fn parse_claims(token: &str) -> Option<Claims> {
    if token.is_empty() {
        return None;
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        tracing::debug!(segments = segments.len(), "token is not a three-segment credential");
        return None;
    }

    let bytes = match decode_base64url(segments[1]) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("token payload is not base64url: {e}");
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(fields)) => Some(Claims::from_fields(fields)),
        Ok(_) => {
            tracing::debug!("token payload is not a JSON object");
            None
        }
        Err(e) => {
            tracing::debug!("token payload is not JSON: {e}");
            None
        }
    }
}

fn decode_base64url(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut padded: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    PAYLOAD_ENGINE.decode(padded)
}
