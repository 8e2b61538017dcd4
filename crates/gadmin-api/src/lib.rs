//! HTTP access to the admin backend: bearer credentials, envelope
//! unwrapping and central handling of 401/403 responses.

pub mod client;
pub mod envelope;
pub mod error;
pub mod notice;

pub use client::{ApiClient, LOGOUT_PATH, USER_PERMISSIONS_PATH};
pub use envelope::{Denial, Envelope, classify, unwrap_response};
pub use error::{ApiError, Suppressed};
pub use notice::{LogNotifier, NoticeGate, Notifier};
