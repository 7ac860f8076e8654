//! Interactive corrector for ship-navigation fix sequences
//!
//! Reconciles noisy raw navigation streams (position, heading, speed,
//! attitude) recorded during sonar surveys against physically plausible
//! motion, before the fixes are used to geolocate soundings. The crate
//! covers the streaming fix buffer, the per-field edit and selection
//! model, and three alternative position-smoothing models: a
//! Gaussian-weighted mean, dead reckoning, and a regularized
//! least-squares inversion. Plot rendering, sonar-format decoding and
//! command-line handling are external collaborators.

pub mod buffer;
pub mod config;
pub mod core;
pub mod edit;
pub mod error;
pub mod model;
pub mod output;
pub mod session;
pub mod solver;
pub mod source;

// Re-export commonly used types
pub use crate::core::{CoordinateScale, FieldKind, Fix, FixTime, PixelPos, SelectionFlags};
pub use buffer::{FixBuffer, LoadOutcome};
pub use config::{ConfigError, SessionConfig};
pub use error::{NavError, NavResult};
pub use model::PositionModel;
pub use output::{CsvRecordFormatter, FixWriter, LegacyLineFormatter, RecordFormatter};
pub use session::{EditSession, InterpolationMode, SessionMode};
pub use solver::{SmoothingSolver, SparseSystem};
pub use source::{MockFixSource, RawFix, RecordSource, SourceError, TextFixSource};
