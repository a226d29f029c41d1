//! Server configuration with TOML file support.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for the webhook server.
///
/// Loaded from a TOML file and overridden field by field from the CLI; can
/// also be built programmatically for tests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the webhook listener to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port for the webhook listener.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared webhook secrets keyed by provider slug, e.g.
    /// `[secrets] jumio = "..."`. A provider without an entry here has its
    /// webhooks rejected.
    #[serde(default)]
    pub secrets: HashMap<String, String>,

    /// URL of the downstream named-action endpoint invoked after terminal
    /// verifications. Dispatches are dropped (logged) when unset.
    #[serde(default)]
    pub action_endpoint: Option<String>,

    /// Capacity of the post-verification dispatch queue.
    #[serde(default = "default_dispatch_queue_depth")]
    pub dispatch_queue_depth: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        toml::from_str("").expect("empty config deserializes from defaults")
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_dispatch_queue_depth() -> usize {
    256
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_format, "human");
        assert!(config.secrets.is_empty());
        assert!(config.action_endpoint.is_none());
    }

    #[test]
    fn secrets_table_parses() {
        let config: ServerConfig = toml::from_str(
            r#"
            port = 9000
            action_endpoint = "http://localhost:9999/actions/post-verification"

            [secrets]
            jumio = "a"
            onfido = "b"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.secrets.get("jumio").map(String::as_str), Some("a"));
        assert_eq!(config.secrets.len(), 2);
        assert!(config.action_endpoint.is_some());
    }
}
