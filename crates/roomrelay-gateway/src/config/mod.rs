//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use roomrelay_core::error::{RelayError, Result};

pub use schema::{DecodeErrorAction, GatewaySection, RelayConfig, RelaySection};

/// Environment variable overriding the config path.
pub const CONFIG_ENV: &str = "ROOMRELAY_CONFIG";
/// Config path used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "roomrelay.yaml";

pub fn load_from_file(path: &str) -> Result<RelayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RelayError::Config(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

/// Like [`load_from_file`], but a missing file yields the defaults.
/// A file that exists must still parse and validate.
pub fn load_or_default(path: &str) -> Result<RelayConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path, "config file not found, using defaults");
            Ok(RelayConfig::default())
        }
        Err(e) => Err(RelayError::Config(format!("read {path} failed: {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg: RelayConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
