use std::sync::LazyLock;

use regex::Regex;

use crate::types::PermissionGrant;

static PARAM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[A-Za-z0-9_]+").expect("parameter token pattern is valid"));

/// A grant path compiled for matching request paths.
///
/// Patterns are matched, in order, by exact equality, by `:name` segment
/// parameters (one or more non-slash characters each), and by a trailing
/// `/*` prefix wildcard. Matching is case sensitive and trailing slashes are
/// significant.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    params: Option<Regex>,
    prefix: Option<String>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let prefix = pattern
            .strip_suffix("/*")
            .map(|prefix| format!("{prefix}/"));
        Self {
            raw: pattern.to_string(),
            params: compile_params(pattern),
            prefix,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.raw == path {
            return true;
        }
        if self.params.as_ref().is_some_and(|re| re.is_match(path)) {
            return true;
        }
        self.prefix
            .as_deref()
            .is_some_and(|prefix| path.starts_with(prefix))
    }
}

/// Literal text is escaped before parameter tokens are substituted, so grant
/// data can never inject regex syntax of its own.
fn compile_params(pattern: &str) -> Option<Regex> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push('^');
    let mut last = 0;
    for token in PARAM_TOKEN.find_iter(pattern) {
        source.push_str(&regex::escape(&pattern[last..token.start()]));
        source.push_str("[^/]+");
        last = token.end();
    }
    source.push_str(&regex::escape(&pattern[last..]));
    source.push('$');

    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern, "unusable permission pattern: {e}");
            None
        }
    }
}

/// Whether a grant path pattern covers a request path.
pub fn match_permission_path(pattern: &str, path: &str) -> bool {
    PathPattern::new(pattern).matches(path)
}

/// Whether a set of grants allows `method` on `path`.
///
/// Super admins are allowed everything. Otherwise the first grant whose
/// method is empty or equal (ignoring ASCII case) and whose pattern matches
/// the path allows the request.
pub fn has_permission(
    is_super_admin: bool,
    grants: &[PermissionGrant],
    path: &str,
    method: &str,
) -> bool {
    if is_super_admin {
        return true;
    }
    grants
        .iter()
        .filter(|grant| grant.allows_method(method))
        .any(|grant| match_permission_path(&grant.path, path))
}

/// Grants with their path patterns compiled once, for repeated queries.
#[derive(Debug, Clone, Default)]
pub struct GrantSet {
    entries: Vec<(PermissionGrant, PathPattern)>,
}

impl GrantSet {
    pub fn new(grants: Vec<PermissionGrant>) -> Self {
        let entries = grants
            .into_iter()
            .map(|grant| {
                let pattern = PathPattern::new(&grant.path);
                (grant, pattern)
            })
            .collect();
        Self { entries }
    }

    pub fn grants(&self) -> Vec<PermissionGrant> {
        self.entries.iter().map(|(grant, _)| grant.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Same rule as [`has_permission`] for a non super admin.
    pub fn allows(&self, path: &str, method: &str) -> bool {
        self.entries
            .iter()
            .any(|(grant, pattern)| grant.allows_method(method) && pattern.matches(path))
    }
}
