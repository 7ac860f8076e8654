//! Top-level error taxonomy for editing operations
//!
//! Every session operation returns a `NavResult`; failures leave the fix
//! buffer untouched. Bad timestamps found during a load are advisory (the
//! load still succeeds) and only become an error when a repair operation
//! is invoked with nothing to repair.

use crate::config::ConfigError;
use crate::core::FieldKind;
use crate::source::SourceError;
use std::fmt;

/// Errors surfaced by edit, model and buffer operations
#[derive(Debug, Clone, PartialEq)]
pub enum NavError {
    /// Fewer points available than a model or interpolation requires
    NotEnoughData { required: usize, available: usize },
    /// Non-increasing or duplicate timestamps in the buffer
    BadTimestamps { count: usize },
    /// Inversion solver setup failed; the previous model output stands
    AllocationFailure { rows: usize, cols: usize },
    /// Edit invoked with nothing loaded
    NoActiveSource,
    /// Selection-driven edit invoked before any field was made active
    NoActiveField,
    /// A field was asked to do something it does not support
    UnsupportedField { field: FieldKind, operation: String },
    /// Failure pulling records from the source
    Source(SourceError),
    /// Failure writing accepted fixes out
    Output { details: String },
    /// Invalid session configuration
    Config(ConfigError),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavError::NotEnoughData { required, available } => {
                write!(f, "not enough data: need {}, have {}", required, available)
            }
            NavError::BadTimestamps { count } => {
                write!(f, "{} fixes with non-increasing timestamps", count)
            }
            NavError::AllocationFailure { rows, cols } => {
                write!(f, "inversion setup failed for {}x{} system", rows, cols)
            }
            NavError::NoActiveSource => write!(f, "no navigation source is open"),
            NavError::NoActiveField => write!(f, "no field is active for selection edits"),
            NavError::UnsupportedField { field, operation } => {
                write!(f, "field {} does not support {}", field.label(), operation)
            }
            NavError::Source(err) => write!(f, "source error: {}", err),
            NavError::Output { details } => write!(f, "output error: {}", details),
            NavError::Config(err) => write!(f, "configuration error: {}", err),
        }
    }
}

impl std::error::Error for NavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NavError::Source(err) => Some(err),
            NavError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for NavError {
    fn from(err: SourceError) -> Self {
        NavError::Source(err)
    }
}

impl From<ConfigError> for NavError {
    fn from(err: ConfigError) -> Self {
        NavError::Config(err)
    }
}

impl NavError {
    /// Whether the session can continue after this error.
    /// Everything here is recoverable except a dead source; failed
    /// operations report and leave the buffer unchanged.
    pub fn is_recoverable(&self) -> bool {
        match self {
            NavError::Source(err) => err.is_recoverable(),
            _ => true,
        }
    }
}

/// Result type for edit and model operations
pub type NavResult<T> = Result<T, NavError>;
