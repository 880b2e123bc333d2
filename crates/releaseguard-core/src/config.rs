use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

pub const DEFAULT_APPROVE_THRESHOLD: f64 = 30.0;
pub const DEFAULT_WARN_THRESHOLD: f64 = 60.0;

pub const ENV_APPROVE_THRESHOLD: &str = "RELEASEGUARD_APPROVE_THRESHOLD";
pub const ENV_WARN_THRESHOLD: &str = "RELEASEGUARD_WARN_THRESHOLD";

/// Workspace config file, relative to the working directory.
pub const WORKSPACE_CONFIG_PATH: &str = ".releaseguard/config.json";

/// Risk thresholds of the decision engine.
///
/// Scores below `approve_threshold` approve, scores in
/// `[approve_threshold, warn_threshold)` warn, anything at or above
/// `warn_threshold` blocks. Only constructible through [`EngineConfig::new`],
/// so a value of this type always satisfies
/// `0 <= approve_threshold < warn_threshold <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineConfig {
    approve_threshold: f64,
    warn_threshold: f64,
}

impl EngineConfig {
    pub fn new(approve_threshold: f64, warn_threshold: f64) -> Result<Self, EngineError> {
        let fail = |reason: &str| EngineError::Configuration {
            approve: approve_threshold,
            warn: warn_threshold,
            reason: reason.to_string(),
        };
        if !approve_threshold.is_finite() || !warn_threshold.is_finite() {
            return Err(fail("thresholds must be finite"));
        }
        if approve_threshold < 0.0 {
            return Err(fail("approve threshold must be >= 0"));
        }
        if warn_threshold > 100.0 {
            return Err(fail("warn threshold must be <= 100"));
        }
        if approve_threshold >= warn_threshold {
            return Err(fail("approve threshold must be below warn threshold"));
        }
        Ok(Self {
            approve_threshold,
            warn_threshold,
        })
    }

    pub fn approve_threshold(&self) -> f64 {
        self.approve_threshold
    }

    pub fn warn_threshold(&self) -> f64 {
        self.warn_threshold
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            approve_threshold: DEFAULT_APPROVE_THRESHOLD,
            warn_threshold: DEFAULT_WARN_THRESHOLD,
        }
    }
}

/// One layer of partial threshold settings.
///
/// Layers are merged lowest to highest (defaults, workspace file,
/// environment, command line) and validated once by [`ConfigLayer::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approve_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn_threshold: Option<f64>,
}

impl ConfigLayer {
    /// Values set in `higher` replace values in `self`.
    pub fn merge(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            approve_threshold: higher.approve_threshold.or(self.approve_threshold),
            warn_threshold: higher.warn_threshold.or(self.warn_threshold),
        }
    }

    pub fn resolve(self) -> Result<EngineConfig, EngineError> {
        EngineConfig::new(
            self.approve_threshold.unwrap_or(DEFAULT_APPROVE_THRESHOLD),
            self.warn_threshold.unwrap_or(DEFAULT_WARN_THRESHOLD),
        )
    }

    /// Read the `RELEASEGUARD_*` threshold variables through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<ConfigLayer>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |name: &str| -> Result<Option<f64>> {
            match lookup(name) {
                None => Ok(None),
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .with_context(|| format!("{name}: not a number: {raw:?}")),
            }
        };
        Ok(ConfigLayer {
            approve_threshold: parse(ENV_APPROVE_THRESHOLD)?,
            warn_threshold: parse(ENV_WARN_THRESHOLD)?,
        })
    }

    pub fn from_env() -> Result<ConfigLayer> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load a workspace config file. A missing file is an empty layer.
    pub fn load_file(path: &str) -> Result<ConfigLayer> {
        if !std::path::Path::new(path).exists() {
            return Ok(ConfigLayer::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("cannot read config {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("{path}: invalid config JSON"))
    }
}
