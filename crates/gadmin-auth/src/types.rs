use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::claims::UserId;

/// A single `(path pattern, method)` grant issued by the backend.
///
/// An empty method grants every method on the matching paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub method: String,
}

impl PermissionGrant {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
        }
    }

    /// Read a grant from an untyped JSON value. Non-object values are not
    /// grants; missing or non-string fields read as empty.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Some(Self {
            path: field("path"),
            method: field("method"),
        })
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.method.is_empty() || self.method.eq_ignore_ascii_case(method)
    }
}

/// Read a list of grants, skipping entries that are not objects.
pub fn grants_from_value(value: &Value) -> Vec<PermissionGrant> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(PermissionGrant::from_value).collect())
        .unwrap_or_default()
}

/// The `{ is_super_admin, permissions }` pair served by the backend's
/// current-user permission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserPermissions {
    pub is_super_admin: bool,
    #[serde(default)]
    pub permissions: Vec<PermissionGrant>,
}

impl UserPermissions {
    /// Interpret a response body. Anything but a JSON object is rejected;
    /// `permissions` defaults to empty when missing.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            is_super_admin: obj.get("is_super_admin") == Some(&Value::Bool(true)),
            permissions: obj
                .get("permissions")
                .map(grants_from_value)
                .unwrap_or_default(),
        })
    }
}

/// What gets written to the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCacheRecord {
    pub is_super_admin: bool,
    pub permissions: Vec<PermissionGrant>,
    pub user_id: Option<UserId>,
    /// Milliseconds since the Unix epoch.
    pub cached_at: i64,
}

impl PermissionCacheRecord {
    /// Validate a stored record. The record must be an object that carries
    /// an `is_super_admin` field and a `permissions` array; anything else is
    /// treated as no record at all.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let flag = obj.get("is_super_admin")?;
        let permissions = obj.get("permissions").filter(|p| p.is_array())?;
        Some(Self {
            is_super_admin: *flag == Value::Bool(true),
            permissions: grants_from_value(permissions),
            user_id: obj.get("user_id").and_then(UserId::from_value),
            cached_at: obj.get("cached_at").and_then(Value::as_i64).unwrap_or(0),
        })
    }
}
