//! Router config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use amqgate_core::error::{AmqGateError, Result};

pub use schema::{AmqGateConfig, OpsSection, PolicyConfig, PolicySection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<AmqGateConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        AmqGateError::Config(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AmqGateConfig> {
    let cfg: AmqGateConfig = serde_yaml::from_str(s)
        .map_err(|e| AmqGateError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
