//! Shell config loader (strict parsing).

pub mod schema;

use std::fs;

use webshell_core::error::{BridgeError, Result};

pub use schema::{BridgeSection, ContentSection, HostSection, ShellConfig};

pub fn load_from_file(path: &str) -> Result<ShellConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ShellConfig> {
    let cfg: ShellConfig = serde_yaml::from_str(s)
        .map_err(|e| BridgeError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
