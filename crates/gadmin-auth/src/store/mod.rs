pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::AuthError;

/// Durable key/value storage for the permission cache.
///
/// Absence is not an error: `read` returns `Ok(None)` for unknown keys and
/// `remove` succeeds when there is nothing to remove.
pub trait DurableStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, AuthError>;
    fn write(&self, key: &str, value: &str) -> Result<(), AuthError>;
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}
