use anyhow::Result;
use gadmin_auth::CredentialSource;

use crate::session::Session;

pub async fn run(session: &Session) -> Result<()> {
    // Without a token the backend has nothing to invalidate.
    if has_credential(session) {
        // The local session ends even when the backend cannot be reached.
        if let Err(e) = session.client.logout().await {
            tracing::warn!("backend logout failed: {e}");
        }
    }

    session.cache.clear();
    session.tokens.remove()?;
    println!("Signed out");

    Ok(())
}

fn has_credential(session: &Session) -> bool {
    session.tokens.current().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConsoleConfig, StoreKind};
    use tempfile::TempDir;

    fn session_in(dir: &TempDir) -> Session {
        let mut config = ConsoleConfig::default_config(dir.path());
        config.console.store = StoreKind::Memory;
        // Nothing listens here; any request would fail with a transport error.
        config.console.base_url = "http://127.0.0.1:1".to_string();
        Session::from_config(config, None).unwrap()
    }

    #[tokio::test]
    async fn signed_out_session_skips_backend() {
        let tmp = TempDir::new().unwrap();
        let session = session_in(&tmp);
        assert!(!has_credential(&session));

        run(&session).await.unwrap();
        assert!(!session.tokens.path().exists());
    }

    #[tokio::test]
    async fn stored_token_is_removed_even_if_backend_is_down() {
        let tmp = TempDir::new().unwrap();
        let session = session_in(&tmp);
        session.tokens.store("a.b.c").unwrap();
        assert!(has_credential(&session));

        run(&session).await.unwrap();
        assert!(!has_credential(&session));
        assert!(!session.cache.is_initialized());
    }
}
