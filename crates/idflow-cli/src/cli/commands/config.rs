//! `idflow config` handlers.

use anyhow::{Context, Result};
use idflow_core::config::{Config, paths};

pub fn path() {
    println!("{}", paths::config_path().display());
}

pub fn init() -> Result<()> {
    let path = paths::config_path();
    Config::init(&path).with_context(|| format!("init config at {}", path.display()))?;
    println!("Created config at {}", path.display());
    println!("Set app_id and api_key (or IDFLOW_APP_ID / IDFLOW_API_KEY) before logging in.");
    Ok(())
}
