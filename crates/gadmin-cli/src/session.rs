use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use gadmin_api::{ApiClient, LogNotifier};
use gadmin_auth::{
    DurableStore, FileStore, MemoryStore, PermissionCache, SqliteStore, TokenFile,
};

use crate::config::{ConsoleConfig, StoreKind};

/// Everything a command needs for one console session.
pub struct Session {
    pub config: ConsoleConfig,
    pub tokens: Arc<TokenFile>,
    pub client: Arc<ApiClient>,
    pub cache: PermissionCache,
}

impl Session {
    /// Load the config under `base_dir` and wire store, credential, client
    /// and cache together.
    pub fn open(base_dir: &Path, fallback_token: Option<String>) -> Result<Self> {
        let config_path = ConsoleConfig::default_path(base_dir);
        let config = ConsoleConfig::load(&config_path)?;
        Self::from_config(config, fallback_token)
    }

    pub fn from_config(config: ConsoleConfig, fallback_token: Option<String>) -> Result<Self> {
        let settings = &config.console;
        let tokens = Arc::new(TokenFile::new(Path::new(&settings.token_path), fallback_token));
        let store = open_store(settings.store, &settings.store_path)?;

        let timeout = Some(settings.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let client = Arc::new(
            ApiClient::new(&settings.base_url, tokens.clone(), Arc::new(LogNotifier), timeout)
                .with_context(|| format!("invalid base_url {:?}", settings.base_url))?,
        );

        let cache = PermissionCache::new(store, tokens.clone(), client.clone(), config.visibility());
        tracing::debug!(store = %settings.store, base_url = %settings.base_url, "session opened");

        Ok(Self {
            config,
            tokens,
            client,
            cache,
        })
    }
}

fn open_store(kind: StoreKind, path: &str) -> Result<Arc<dyn DurableStore>> {
    let store: Arc<dyn DurableStore> = match kind {
        StoreKind::File => Arc::new(
            FileStore::new(Path::new(path))
                .with_context(|| format!("cannot open cache directory {path}"))?,
        ),
        StoreKind::Sqlite => {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            Arc::new(
                SqliteStore::open(path)
                    .with_context(|| format!("cannot open cache database {path}"))?,
            )
        }
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
