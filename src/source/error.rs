//! Record source error types and handling

use std::fmt;

/// Errors raised while pulling fixes from a navigation record source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Underlying I/O failure while reading the source
    Io { details: String },
    /// A record could not be parsed
    Parse { line: usize, details: String },
    /// A malformed value inside an otherwise parseable record
    InvalidValue { line: usize, field: String, value: String },
    /// Operation on a source that is no longer open
    Closed { source_id: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io { details } => write!(f, "source I/O error: {}", details),
            SourceError::Parse { line, details } => {
                write!(f, "parse error at line {}: {}", line, details)
            }
            SourceError::InvalidValue { line, field, value } => {
                write!(f, "invalid {} at line {}: {}", field, line, value)
            }
            SourceError::Closed { source_id } => {
                write!(f, "source {} is closed", source_id)
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Result type for record source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Recovery strategy for source failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRecovery {
    /// Skip the offending record and continue reading
    Skip,
    /// Retry the read
    Retry,
    /// Stop reading from this source
    Fail,
}

impl SourceError {
    /// Recommended recovery strategy for this error
    pub fn recovery_strategy(&self) -> SourceRecovery {
        match self {
            SourceError::Io { .. } => SourceRecovery::Retry,
            SourceError::Parse { .. } => SourceRecovery::Skip,
            SourceError::InvalidValue { .. } => SourceRecovery::Skip,
            SourceError::Closed { .. } => SourceRecovery::Fail,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recovery_strategy() != SourceRecovery::Fail
    }
}
