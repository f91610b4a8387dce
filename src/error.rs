//! Error taxonomy for the signal-detection core.

use thiserror::Error;

/// Failures surfaced by table construction, calculators and the batch detector.
///
/// Arithmetic edge cases (zero cells, log of zero) are not errors; calculators fold
/// them into a non-signal [`crate::signals::MethodResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("corpus contains no cases; signal detection cannot run")]
    EmptyCorpus,

    #[error("invalid contingency table: {reason}")]
    InvalidTable { reason: String },

    #[error("corpus unavailable: {reason}")]
    CorpusUnavailable { reason: String },

    #[error("signal computation failed: {reason}")]
    ComputationFailed { reason: String },

    #[error("unknown threshold preset: {0} (expected standard, strict or sensitive)")]
    UnknownPreset(String),

    #[error("unknown method selection: {0} (expected prr, ror, ic or all)")]
    UnknownMethod(String),
}

impl SignalError {
    pub fn invalid_table(reason: impl Into<String>) -> Self {
        Self::InvalidTable {
            reason: reason.into(),
        }
    }

    pub fn corpus_unavailable(reason: impl Into<String>) -> Self {
        Self::CorpusUnavailable {
            reason: reason.into(),
        }
    }

    pub fn computation_failed(reason: impl Into<String>) -> Self {
        Self::ComputationFailed {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for logs and API payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCorpus => "EMPTY_CORPUS",
            Self::InvalidTable { .. } => "INVALID_TABLE",
            Self::CorpusUnavailable { .. } => "CORPUS_UNAVAILABLE",
            Self::ComputationFailed { .. } => "COMPUTATION_FAILED",
            Self::UnknownPreset(_) => "UNKNOWN_PRESET",
            Self::UnknownMethod(_) => "UNKNOWN_METHOD",
        }
    }
}
