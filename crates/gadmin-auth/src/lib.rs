pub mod cache;
pub mod claims;
pub mod credential;
pub mod error;
pub mod permissions;
pub mod source;
pub mod store;
pub mod types;
pub mod visibility;

pub use cache::{CACHE_KEY, CachePhase, PendingInit, PermissionCache};
pub use claims::{Claims, UserId, parse_claims};
pub use credential::{CredentialSource, StaticCredential, TokenFile};
pub use error::AuthError;
pub use permissions::{GrantSet, PathPattern, has_permission, match_permission_path};
pub use source::PermissionSource;
pub use store::{DurableStore, FileStore, MemoryStore, SqliteStore};
pub use types::*;
pub use visibility::{MenuItem, VisibilityConfig};
