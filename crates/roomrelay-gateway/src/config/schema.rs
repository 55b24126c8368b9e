use serde::Deserialize;
use roomrelay_core::error::{RelayError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub relay: RelaySection,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            relay: RelaySection::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.relay.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(RelayError::Config(
                "gateway.listen must be a valid socket address".into(),
            ));
        }
        if !(1000..=120000).contains(&self.ping_interval_ms) {
            return Err(RelayError::Config(
                "gateway.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}

/// What the gateway does with a frame that fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeErrorAction {
    /// Close the offending session with code 1007.
    #[default]
    Close,
    /// Queue an error frame to the sender and keep the session open.
    Report,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    #[serde(default)]
    pub on_decode_error: DecodeErrorAction,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            path: default_path(),
            allowed_origins: default_allowed_origins(),
            outbound_queue: default_outbound_queue(),
            on_decode_error: DecodeErrorAction::default(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(RelayError::Config("relay.path must start with '/'".into()));
        }
        // axum treats these as captures/wildcards and panics on unnamed ones
        if self.path.contains(['*', ':', '{', '}']) {
            return Err(RelayError::Config(
                "relay.path must be a literal path (no '*', ':', '{' or '}')".into(),
            ));
        }
        let inner = self.path[1..].strip_suffix('/').unwrap_or(&self.path[1..]);
        if self.path.len() > 1 && inner.split('/').any(str::is_empty) {
            return Err(RelayError::Config(
                "relay.path must not contain empty segments".into(),
            ));
        }
        if matches!(self.path.as_str(), "/metrics" | "/healthz") {
            return Err(RelayError::Config(format!(
                "relay.path collides with built-in route {}",
                self.path
            )));
        }
        if self.allowed_origins.is_empty() {
            return Err(RelayError::Config(
                "relay.allowed_origins must not be empty".into(),
            ));
        }
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(RelayError::Config(
                "relay.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }
}

fn default_path() -> String {
    "/room".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_outbound_queue() -> usize {
    1024
}
