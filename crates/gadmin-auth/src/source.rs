use async_trait::async_trait;
use serde_json::Value;

/// Backend endpoint listing the signed-in user's grants.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Fetch the unwrapped response body, expected to look like
    /// `{ "is_super_admin": bool, "permissions": [{ "path", "method" }] }`.
    /// Validation is left to the caller.
    async fn fetch_permissions(&self) -> anyhow::Result<Value>;
}
