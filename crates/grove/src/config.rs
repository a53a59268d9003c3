//! Site configuration.
//!
//! Every field has a default, so an empty document is a valid configuration.
//! The browser reads overrides from a JSON `<script>` block; the CLI reads
//! `grove.toml` (with the `toml` feature).

use std::str::FromStr;

use grove_highlight::DispatchConfig;
use grove_search::IndexConfig;
use grove_theme::ThemeConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GroveConfig {
    /// Most verbose level logged (`error` .. `trace`).
    pub log_level: String,
    /// Site root URL the manifest path is resolved against.
    pub base_url: String,
    /// Build the quick-open index at all.
    pub search: bool,
    pub highlight: DispatchConfig,
    pub index: IndexConfig,
    pub theme: ThemeConfig,
}

impl Default for GroveConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            base_url: "/".into(),
            search: true,
            highlight: DispatchConfig::default(),
            index: IndexConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl GroveConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// `log_level` as a tracing level, `INFO` if it doesn't parse.
    pub fn max_level(&self) -> tracing::Level {
        tracing::Level::from_str(&self.log_level).unwrap_or(tracing::Level::INFO)
    }

    /// URL of the manifest: `base_url` joined with the manifest path.
    pub fn manifest_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.index.manifest_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
