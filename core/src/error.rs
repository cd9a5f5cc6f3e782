use thiserror::Error;

/// Reconstruction failures.
///
/// Only the absence of battle data aborts a run; every other anomaly
/// (unknown record kinds, malformed records, failed contextual lookups)
/// degrades the output instead and is logged where it happens.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// The captured log never contains the joinbattle boundary line.
    #[error("log contains no joinbattle marker")]
    MissingMarker,

    /// No object dump: the joinbattle record carries none and none was
    /// supplied externally.
    #[error("no object dump available for the battle")]
    MissingObjects,

    /// Message pattern construction violated a precondition (empty display
    /// name, or a template failed to compile).
    #[error("message pattern construction failed: {0}")]
    Pattern(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
