use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Where the current bearer credential comes from.
///
/// The permission cache only reads credentials; issuing, renewing and
/// storing them is up to the login flow.
pub trait CredentialSource: Send + Sync {
    fn current(&self) -> Option<String>;
}

/// A credential held in memory, replaceable at runtime.
#[derive(Debug, Default)]
pub struct StaticCredential {
    token: RwLock<Option<String>>,
}

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl CredentialSource for StaticCredential {
    fn current(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Credential persisted in a file, with an optional fallback value.
///
/// The file wins when it holds a non-empty token; otherwise the fallback
/// (typically taken from the environment) is used.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
    fallback: Option<String>,
}

impl TokenFile {
    pub fn new(path: &Path, fallback: Option<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            fallback: fallback.filter(|t| !t.is_empty()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a new credential.
    pub fn store(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.trim())
    }

    /// Forget the stored credential. Missing files are not an error.
    pub fn remove(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl CredentialSource for TokenFile {
    fn current(&self) -> Option<String> {
        let stored = match std::fs::read_to_string(&self.path) {
            Ok(content) => Some(content.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "cannot read token file: {e}");
                None
            }
        };
        stored.or_else(|| self.fallback.clone())
    }
}
