/// Configuration schema and defaults for binwatch.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[api]`, `[evaluator]`, `[logging]` and `[web]`.
///
/// Every field has a built-in default. Users only need to set the values they
/// want to override.
use serde::{Deserialize, Serialize};

use crate::evaluator::DEFAULT_CAPACITY;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level binwatch configuration.
///
/// Maps directly to `~/.binwatch/config.toml` and `.binwatch.toml`. Missing
/// sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinwatchConfig {
    pub api: ApiConfig,
    pub evaluator: EvaluatorConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Monitoring API and identity provider endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the bin monitoring REST API.
    pub base_url: String,
    /// Password sign-in endpoint of the identity provider.
    pub auth_url: String,
    /// Identity provider web API key, appended as `?key=`.
    pub api_key: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.110.200:8080".to_string(),
            auth_url: "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
                .to_string(),
            api_key: String::new(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [evaluator]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Usage count of an empty bin. Shared knowledge with the server.
    pub capacity: i64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write the JSONL activity log.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address of the local dashboard.
    pub addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
        }
    }
}

impl BinwatchConfig {
    /// Annotated default config written by `binwatch config init`.
    pub fn default_toml() -> &'static str {
        DEFAULT_TOML
    }
}

const DEFAULT_TOML: &str = r#"# binwatch configuration
#
# Precedence (lowest to highest): built-in defaults, this file,
# .binwatch.toml in the working directory, BINWATCH_* environment variables.

[api]
# Bin monitoring REST API.
base_url = "http://192.168.110.200:8080"
# Identity provider password sign-in endpoint.
auth_url = "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
# Identity provider web API key (or BINWATCH_API_KEY).
api_key = ""
timeout_ms = 10000

[evaluator]
# Usage count reported by an empty bin.
capacity = 28

[logging]
# Append activity to ~/.binwatch/activity.jsonl.
enabled = true

[web]
addr = "127.0.0.1:9747"
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
