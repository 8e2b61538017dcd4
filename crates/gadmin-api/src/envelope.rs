//! The backend's `{ "code", "msg", "data" }` response envelope.

use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub code: i64,
    pub msg: String,
    pub data: Option<Value>,
}

impl Envelope {
    /// Recognise an envelope: an object with an integer `code`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let code = obj.get("code")?.as_i64()?;
        Some(Self {
            code,
            msg: obj
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            data: obj.get("data").cloned().filter(|d| !d.is_null()),
        })
    }
}

/// Bodies that are not JSON come back as a JSON string; empty bodies as null.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Turn a raw HTTP response into the payload callers want.
///
/// A zero `code` yields the envelope's `data`, a non-zero one is a
/// [`ApiError::Business`] whatever the HTTP status. Bodies without an
/// envelope pass through on 2xx and become [`ApiError::Http`] otherwise.
pub fn unwrap_response(status: u16, body: &str) -> Result<Value, ApiError> {
    let value = parse_body(body);
    let success = (200..300).contains(&status);

    if let Some(envelope) = Envelope::from_value(&value) {
        if envelope.code != 0 {
            return Err(ApiError::Business {
                code: envelope.code,
                msg: envelope.msg,
                data: envelope.data,
            });
        }
        if success {
            return Ok(envelope.data.unwrap_or(Value::Null));
        }
    }

    if success {
        return Ok(value);
    }
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);
    Err(ApiError::Http { status, error })
}

/// Authentication outcome carried by a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// Token missing, invalid or expired.
    Unauthorized(String),
    /// Signed in but not allowed.
    Forbidden(String),
}

/// Business codes 401/403, or HTTP 401/403 with an `{"error"}` body, are
/// authentication failures. Everything else is left to the caller.
pub fn classify(err: &ApiError) -> Option<Denial> {
    let (code, msg) = match err {
        ApiError::Business { code, msg, .. } => (*code, msg),
        ApiError::Http {
            status,
            error: Some(msg),
        } => (i64::from(*status), msg),
        _ => return None,
    };
    match code {
        401 => Some(Denial::Unauthorized(msg.clone())),
        403 => Some(Denial::Forbidden(msg.clone())),
        _ => None,
    }
}
