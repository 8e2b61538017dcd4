use anyhow::{Result, bail};
use gadmin_auth::parse_claims;

use crate::session::Session;

pub async fn run(session: &Session, token: &str) -> Result<()> {
    let Some(claims) = parse_claims(token) else {
        bail!("not a valid token: expected header.payload.signature");
    };

    session.tokens.store(token)?;
    println!("Token saved to {}", session.tokens.path().display());

    if session.cache.fetch_and_cache().await {
        let name = claims.display_name().unwrap_or("unknown user");
        if session.cache.is_super_admin() {
            println!("Signed in as {name} (super admin)");
        } else {
            println!(
                "Signed in as {name} with {} permissions",
                session.cache.permissions().len()
            );
        }
        Ok(())
    } else {
        bail!(
            "could not load permissions from {}, try `gadmin refresh` later",
            session.client.base_url()
        )
    }
}
