use anyhow::Result;

use crate::session::Session;

pub async fn run(session: &Session) -> Result<()> {
    session.cache.initialize().await;

    let visible: Vec<&str> = session
        .cache
        .visible_menus()
        .into_iter()
        .map(|m| m.path.as_str())
        .collect();

    println!("Menus:");
    for item in &session.cache.visibility().menus {
        let mark = if visible.contains(&item.path.as_str()) {
            "+"
        } else {
            "-"
        };
        println!("  {mark} {:<24} {}", item.path, item.title);
    }

    Ok(())
}
