//! HTTP adapter and logging configuration.

use serde::{Deserialize, Serialize};

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Caller-facing listener (`/v1`, `/public`). Default: `127.0.0.1:8080`.
    pub bind: Option<String>,
    /// Collaborator listener (`/internal`). Must not be reachable by end callers.
    /// Default: `127.0.0.1:8081`.
    pub internal_bind: Option<String>,
}

impl ServerConfig {
    pub fn effective_bind(&self) -> &str {
        self.bind.as_deref().unwrap_or("127.0.0.1:8080")
    }

    pub fn effective_internal_bind(&self) -> &str {
        self.internal_bind.as_deref().unwrap_or("127.0.0.1:8081")
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset. Default: `info`.
    pub filter: Option<String>,
    /// Emit JSON lines instead of human-readable output. Default: false.
    pub json: Option<bool>,
}

impl LoggingConfig {
    pub fn effective_filter(&self) -> &str {
        self.filter.as_deref().unwrap_or("info")
    }

    pub fn effective_json(&self) -> bool {
        self.json.unwrap_or(false)
    }
}
