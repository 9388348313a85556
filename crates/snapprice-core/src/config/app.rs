//! Server and first-run settings.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Trust the first `X-Forwarded-For` hop as the client address.
    #[serde(default)]
    pub trust_proxy: bool,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_proxy: false,
            max_body_bytes: default_max_body(),
        }
    }
}

/// Optional admin account created at startup when no enabled admin exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Username of the first admin.
    #[serde(default)]
    pub admin_username: Option<String>,
    /// Plaintext password of the first admin; hashed before storage.
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body() -> usize {
    12 * 1024 * 1024
}
