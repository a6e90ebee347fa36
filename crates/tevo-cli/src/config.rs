use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tevo_deprecation::DeprecationPolicy;
use tevo_merge::MergeConfig;

/// Settings read from `--config`. Missing tables and keys take defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TevoConfig {
    pub merge: MergeConfig,
    pub deprecation: DeprecationPolicy,
}

impl TevoConfig {
    /// Parse configuration from TOML text; missing sections take their defaults.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid tevo configuration")
    }

    /// Load from `path`, or use the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }
}
