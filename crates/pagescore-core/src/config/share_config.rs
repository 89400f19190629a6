//! Public share link configuration.

use serde::{Deserialize, Serialize};

/// `[share]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ShareConfig {
    /// Prefix of every public report URL. Default: `https://app.pagescore.io/r`.
    pub base_url: Option<String>,
    /// Length of generated slugs. Default: 10.
    pub slug_length: Option<usize>,
    /// Slug generations tried before giving up with a conflict. Default: 5.
    pub max_slug_attempts: Option<u32>,
}

impl ShareConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or("https://app.pagescore.io/r")
    }

    pub fn effective_slug_length(&self) -> usize {
        self.slug_length.unwrap_or(10)
    }

    pub fn effective_max_slug_attempts(&self) -> u32 {
        self.max_slug_attempts.unwrap_or(5)
    }

    /// Public URL for a slug. Tolerates a trailing slash on the base URL.
    pub fn share_url(&self, slug: &str) -> String {
        format!("{}/{}", self.effective_base_url().trim_end_matches('/'), slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_joins_without_double_slash() {
        let config = ShareConfig {
            base_url: Some("https://example.test/r/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.share_url("abc123XYZ0"), "https://example.test/r/abc123XYZ0");
    }
}
