use anyhow::Result;

use crate::session::Session;

pub async fn run(session: &Session, page: &str) -> Result<()> {
    session.cache.initialize().await;

    let Some(buttons) = session.cache.visibility().buttons.get(page) else {
        println!("No buttons configured for {page}");
        return Ok(());
    };

    println!("Buttons on {page}:");
    for (key, grant) in buttons {
        let mark = if session.cache.is_button_visible(page, key) {
            "+"
        } else {
            "-"
        };
        println!("  {mark} {key:<20} {} {}", grant.method, grant.path);
    }

    Ok(())
}
