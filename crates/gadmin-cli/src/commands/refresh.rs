use anyhow::{Result, bail};

use crate::session::Session;

pub async fn run(session: &Session) -> Result<()> {
    if session.cache.refresh().await {
        println!(
            "Permissions reloaded: super admin={}, {} grants",
            session.cache.is_super_admin(),
            session.cache.permissions().len()
        );
        return Ok(());
    }

    // Nothing local survived the refresh; go back to the backend.
    if session.cache.fetch_and_cache().await {
        println!(
            "Permissions fetched: super admin={}, {} grants",
            session.cache.is_super_admin(),
            session.cache.permissions().len()
        );
        Ok(())
    } else {
        bail!("no permissions available, run `gadmin login <token>`")
    }
}
