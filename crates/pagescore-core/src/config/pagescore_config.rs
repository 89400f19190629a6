//! PageScoreConfig: the top-level configuration loaded from `pagescore.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LimitsConfig, LoggingConfig, ServerConfig, ShareConfig, StorageConfig};
use crate::errors::{AuditError, AuditResult};

pub const ENV_DB_PATH: &str = "PAGESCORE_DB_PATH";
pub const ENV_BIND: &str = "PAGESCORE_BIND";
pub const ENV_INTERNAL_BIND: &str = "PAGESCORE_INTERNAL_BIND";
pub const ENV_SHARE_BASE_URL: &str = "PAGESCORE_SHARE_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PageScoreConfig {
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub share: ShareConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl PageScoreConfig {
    /// Parse from TOML text. Missing sections fall back to defaults.
    pub fn from_toml_str(raw: &str) -> AuditResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| AuditError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, then apply environment overrides.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> AuditResult<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                AuditError::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            Self::from_toml_str(&raw)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.storage.db_path = Some(path);
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.server.bind = Some(bind);
        }
        if let Some(bind) = lookup(ENV_INTERNAL_BIND) {
            self.server.internal_bind = Some(bind);
        }
        if let Some(url) = lookup(ENV_SHARE_BASE_URL) {
            self.share.base_url = Some(url);
        }
    }

    pub fn validate(&self) -> AuditResult<()> {
        if self.share.effective_slug_length() < 6 {
            return Err(AuditError::Config(
                "share.slug_length must be at least 6".to_string(),
            ));
        }
        if self.share.effective_max_slug_attempts() == 0 {
            return Err(AuditError::Config(
                "share.max_slug_attempts must be at least 1".to_string(),
            ));
        }
        if self.server.effective_bind() == self.server.effective_internal_bind() {
            return Err(AuditError::Config(
                "server.internal_bind must differ from server.bind".to_string(),
            ));
        }
        if self.share.effective_base_url().trim().is_empty() {
            return Err(AuditError::Config("share.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = PageScoreConfig::from_toml_str("").unwrap();
        assert_eq!(config.storage.effective_db_path(), "pagescore.db");
        assert_eq!(config.limits.free_plan_limits().audits_per_month, 3);
        assert_eq!(config.share.effective_slug_length(), 10);
        assert_eq!(config.server.effective_bind(), "127.0.0.1:8080");
        assert_eq!(config.logging.effective_filter(), "info");
    }

    #[test]
    fn test_sections_override_defaults() {
        let raw = r#"
            [limits]
            free_audits_per_month = 5

            [share]
            base_url = "https://reports.example.test"
            slug_length = 12
        "#;
        let config = PageScoreConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.limits.free_plan_limits().audits_per_month, 5);
        assert_eq!(config.share.effective_slug_length(), 12);
        assert_eq!(
            config.share.share_url("s1"),
            "https://reports.example.test/s1"
        );
    }

    #[test]
    fn test_short_slugs_are_rejected() {
        let err = PageScoreConfig::from_toml_str("[share]\nslug_length = 4\n").unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn test_zero_slug_attempts_are_rejected() {
        assert!(PageScoreConfig::from_toml_str("[share]\nmax_slug_attempts = 0\n").is_err());
    }

    #[test]
    fn test_internal_listener_must_not_share_the_public_address() {
        let raw = "[server]\nbind = \"0.0.0.0:9000\"\ninternal_bind = \"0.0.0.0:9000\"\n";
        let err = PageScoreConfig::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
        assert_eq!(
            PageScoreConfig::default().server.effective_internal_bind(),
            "127.0.0.1:8081"
        );
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let err = PageScoreConfig::from_toml_str("[storage\n").unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn test_env_overrides_win_over_file_values() {
        let mut config =
            PageScoreConfig::from_toml_str("[storage]\ndb_path = \"file.db\"\n").unwrap();
        config.apply_env_overrides(|key| match key {
            ENV_DB_PATH => Some("env.db".to_string()),
            _ => None,
        });
        assert_eq!(config.storage.effective_db_path(), "env.db");
        assert_eq!(config.server.effective_bind(), "127.0.0.1:8080");
    }
}
