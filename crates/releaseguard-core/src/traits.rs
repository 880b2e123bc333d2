use crate::errors::SourceError;
use crate::signal::Signal;

/// Provides the accumulated signals of a release.
///
/// Implementations must hand back a consistent snapshot: every signal
/// recorded for the release up to some instant, duplicates included.
pub trait SignalSource {
    fn release_signals(&self, release_id: &str) -> Result<Vec<Signal>, SourceError>;
}
