use anyhow::Result;

use crate::session::Session;

/// Returns whether the request is allowed; the caller maps a denial to the
/// exit code.
pub async fn run(session: &Session, method: &str, path: &str) -> Result<bool> {
    if !session.cache.initialize().await {
        tracing::info!("no cached permissions, checking against an empty set");
    }

    let allowed = session.cache.has_permission(path, method);
    println!(
        "{} {} {}",
        method.to_uppercase(),
        path,
        if allowed { "allowed" } else { "denied" }
    );
    Ok(allowed)
}
