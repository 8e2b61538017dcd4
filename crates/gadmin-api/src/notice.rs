use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Minimum spacing between two "forbidden" notices.
pub const FORBIDDEN_NOTICE_WINDOW: Duration = Duration::from_secs(3);

pub const DEFAULT_UNAUTHORIZED_MSG: &str = "login expired";
pub const REAUTH_PROMPT: &str = ", sign in again to continue";
pub const DEFAULT_FORBIDDEN_MSG: &str = "no permission to access this resource";

/// User-facing reactions to authentication failures.
pub trait Notifier: Send + Sync {
    /// The credential is no longer valid; ask the user to sign in again.
    fn reauth_required(&self, message: &str);

    /// The user is signed in but not allowed to do what they asked.
    fn forbidden(&self, message: &str);
}

/// Notifier that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn reauth_required(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn forbidden(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Rate limit for forbidden notices, so a burst of 403s shows one message.
#[derive(Debug)]
pub struct NoticeGate {
    window: Duration,
    last_shown: Mutex<Option<Instant>>,
}

impl NoticeGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_shown: Mutex::new(None),
        }
    }

    /// Whether a notice may be shown at `now`; records it if so.
    pub fn admit(&self, now: Instant) -> bool {
        let mut last = self.last_shown.lock().unwrap_or_else(PoisonError::into_inner);
        if last.is_some_and(|shown| now.saturating_duration_since(shown) < self.window) {
            return false;
        }
        *last = Some(now);
        true
    }
}

impl Default for NoticeGate {
    fn default() -> Self {
        Self::new(FORBIDDEN_NOTICE_WINDOW)
    }
}
