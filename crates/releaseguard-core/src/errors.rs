use crate::signal::SignalKey;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid thresholds (approve={approve}, warn={warn}): {reason}")]
    Configuration {
        approve: f64,
        warn: f64,
        reason: String,
    },
    /// More than one effective value survived latest-wins resolution.
    #[error("{count} conflicting effective values for {key}")]
    AmbiguousSignal { key: SignalKey, count: usize },
    #[error(transparent)]
    Source(#[from] SourceError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("release not found: {0}")]
    ReleaseNotFound(String),
    #[error("signal source unavailable: {0}")]
    Unavailable(String),
}
