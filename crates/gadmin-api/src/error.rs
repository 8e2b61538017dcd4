use std::fmt;

use serde_json::Value;

/// A 401/403 that was handled inside the client (the session was prompted
/// to sign in again, or the user was told they lack permission). Callers
/// get it back as an explicit outcome and normally do nothing further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suppressed {
    Unauthorized { msg: String },
    /// `notified` is false when the notice was skipped by the rate limit.
    Forbidden { msg: String, notified: bool },
}

impl fmt::Display for Suppressed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suppressed::Unauthorized { msg } => write!(f, "unauthorized: {msg}"),
            Suppressed::Forbidden { msg, .. } => write!(f, "forbidden: {msg}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-zero `code` in its envelope.
    #[error("request failed ({code}): {msg}")]
    Business {
        code: i64,
        msg: String,
        data: Option<Value>,
    },

    /// Non-2xx status without an envelope. `error` carries the message of
    /// an `{"error": "..."}` body when there was one.
    #[error("http {status}: {}", .error.as_deref().unwrap_or("no details"))]
    Http { status: u16, error: Option<String> },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Suppressed(Suppressed),
}

impl ApiError {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, ApiError::Suppressed(_))
    }
}
