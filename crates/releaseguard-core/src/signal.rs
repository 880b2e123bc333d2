use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SignalType;

/// Identity of a signal within a release: (type, name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignalKey {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub name: String,
}

impl SignalKey {
    pub fn new(signal_type: SignalType, name: impl Into<String>) -> Self {
        Self {
            signal_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.signal_type, self.name)
    }
}

/// One observed measurement for a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub name: String,
    #[serde(alias = "value_num")]
    pub value: f64,
    /// Missing timestamps sort before every explicit one.
    #[serde(default = "unobserved", alias = "collected_at")]
    pub observed_at: DateTime<Utc>,
}

fn unobserved() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Signal {
    pub fn new(
        signal_type: SignalType,
        name: impl Into<String>,
        value: f64,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            signal_type,
            name: name.into(),
            value,
            observed_at,
        }
    }

    pub fn key(&self) -> SignalKey {
        SignalKey::new(self.signal_type, self.name.clone())
    }
}

/// Parse a JSON array of signals.
pub fn parse_signals(json: &str) -> Result<Vec<Signal>> {
    serde_json::from_str(json).context("invalid signal list")
}

/// A signal file: a bare array, or an object naming the release.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SignalFile {
    Release {
        release_id: String,
        signals: Vec<Signal>,
    },
    Bare(Vec<Signal>),
}

impl SignalFile {
    /// Split into the named release (if any) and its signals.
    pub fn into_parts(self) -> (Option<String>, Vec<Signal>) {
        match self {
            SignalFile::Release {
                release_id,
                signals,
            } => (Some(release_id), signals),
            SignalFile::Bare(signals) => (None, signals),
        }
    }
}

/// Parse signal file content. `origin` names the source in errors.
pub fn parse_signal_file(json: &str, origin: &str) -> Result<SignalFile> {
    serde_json::from_str(json).with_context(|| format!("{origin}: invalid signals"))
}

/// Load a signal file from disk.
pub fn load_signal_file(path: &str) -> Result<SignalFile> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read signals {path}"))?;
    parse_signal_file(&content, path)
}
