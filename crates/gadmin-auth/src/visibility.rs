use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::PermissionGrant;

/// A sidebar entry and the grant needed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub path: String,
    pub title: String,
    /// `None` means the entry is always shown.
    #[serde(default)]
    pub permission: Option<PermissionGrant>,
}

/// Static tables mapping menus and page buttons to the grants they need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default)]
    pub menus: Vec<MenuItem>,
    /// Page path -> button key -> required grant.
    #[serde(default)]
    pub buttons: BTreeMap<String, BTreeMap<String, PermissionGrant>>,
}

impl VisibilityConfig {
    /// Grant required by a menu path, if any.
    pub fn menu_requirement(&self, menu_path: &str) -> Option<&PermissionGrant> {
        self.menus
            .iter()
            .find(|m| m.path == menu_path)
            .and_then(|m| m.permission.as_ref())
    }

    /// Grant required by a button on a page, if configured.
    pub fn button_requirement(&self, page_path: &str, button_key: &str) -> Option<&PermissionGrant> {
        self.buttons.get(page_path)?.get(button_key)
    }
}

fn menu(path: &str, title: &str, permission: Option<(&str, &str)>) -> MenuItem {
    MenuItem {
        path: path.to_string(),
        title: title.to_string(),
        permission: permission.map(|(p, m)| PermissionGrant::new(p, m)),
    }
}

fn page(buttons: &[(&str, &str, &str)]) -> BTreeMap<String, PermissionGrant> {
    buttons
        .iter()
        .map(|(key, path, method)| (key.to_string(), PermissionGrant::new(*path, *method)))
        .collect()
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        let menus = vec![
            menu("/admin", "Dashboard", None),
            menu("/admin/users", "Users", Some(("/admin/api/users", "GET"))),
            menu("/admin/roles", "Roles", Some(("/admin/api/roles", "GET"))),
            menu(
                "/admin/permissions",
                "Permissions",
                Some(("/admin/api/permissions", "GET")),
            ),
            menu(
                "/admin/dictionaries",
                "Dictionaries",
                Some(("/admin/api/dictionaries/types", "GET")),
            ),
        ];

        let mut buttons = BTreeMap::new();
        buttons.insert(
            "/admin/users".to_string(),
            page(&[
                ("add", "/admin/api/users", "POST"),
                ("edit", "/admin/api/users/:id", "PUT"),
                ("delete", "/admin/api/users/:id", "DELETE"),
                ("toggleStatus", "/admin/api/users/:id/toggle-status", "PUT"),
                ("resetPassword", "/admin/api/users/:id/reset-password", "POST"),
            ]),
        );
        buttons.insert(
            "/admin/roles".to_string(),
            page(&[
                ("add", "/admin/api/roles", "POST"),
                ("edit", "/admin/api/roles/:id", "PUT"),
                ("delete", "/admin/api/roles/:id", "DELETE"),
                ("assignPermissions", "/admin/api/roles/:id/permissions", "PUT"),
            ]),
        );
        buttons.insert(
            "/admin/permissions".to_string(),
            page(&[
                ("add", "/admin/api/permissions", "POST"),
                ("edit", "/admin/api/permissions/:id", "PUT"),
                ("delete", "/admin/api/permissions/:id", "DELETE"),
            ]),
        );
        buttons.insert(
            "/admin/dictionaries".to_string(),
            page(&[
                ("add", "/admin/api/dictionaries/types", "POST"),
                ("edit", "/admin/api/dictionaries/types/:id", "PUT"),
                ("delete", "/admin/api/dictionaries/types/:id", "DELETE"),
                ("addItem", "/admin/api/dictionaries/items", "POST"),
                ("editItem", "/admin/api/dictionaries/items/:id", "PUT"),
                ("deleteItem", "/admin/api/dictionaries/items/:id", "DELETE"),
            ]),
        );

        Self { menus, buttons }
    }
}
