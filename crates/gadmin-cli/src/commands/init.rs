use anyhow::Result;
use std::path::Path;

use crate::config::ConsoleConfig;

pub fn run(base_dir: &Path) -> Result<()> {
    println!("Initializing gadmin in {}", base_dir.display());

    std::fs::create_dir_all(base_dir)?;

    let config_path = ConsoleConfig::default_path(base_dir);
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = ConsoleConfig::default_config(base_dir);
        config.save(&config_path)?;
        println!("Created config: {}", config_path.display());
    }

    println!("\ngadmin initialized. Next steps:");
    println!("  1. Set base_url in {}", config_path.display());
    println!("  2. Run `gadmin login <token>` to sign in");

    Ok(())
}
