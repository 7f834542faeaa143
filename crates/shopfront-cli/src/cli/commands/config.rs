//! Config command handlers.

use anyhow::{Context, Result};
use shopfront_core::config::{API_URL_ENV, Config, paths};

pub fn path() {
    println!("{}", paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = paths::config_path();
    Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    println!("Set [api].base_url (or {API_URL_ENV}) to point at your storefront.");
    Ok(())
}

/// Prints the default config; `cargo xtask` writes this to `default_config.toml`.
pub fn generate() -> Result<()> {
    let toml = Config::generate().context("generate default config")?;
    print!("{toml}");
    Ok(())
}
