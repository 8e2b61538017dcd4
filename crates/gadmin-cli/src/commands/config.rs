use anyhow::Result;
use std::path::Path;

use crate::config::ConsoleConfig;

pub fn run(base_dir: &Path) -> Result<()> {
    let config_path = ConsoleConfig::default_path(base_dir);
    let config = ConsoleConfig::load(&config_path)?;
    let console = &config.console;

    println!("Config: {}", config_path.display());
    println!();
    println!("  Base URL:       {}", console.base_url);
    println!("  Store:          {}", console.store);
    println!("  Store path:     {}", console.store_path);
    println!("  Token file:     {}", console.token_path);
    println!("  Timeout:        {}s", console.request_timeout_secs);
    println!();

    let visibility = config.visibility();
    let source = if config.visibility.is_some() {
        "configured"
    } else {
        "built-in"
    };
    println!(
        "  Visibility ({source}): {} menus, {} pages with buttons",
        visibility.menus.len(),
        visibility.buttons.len()
    );

    Ok(())
}
