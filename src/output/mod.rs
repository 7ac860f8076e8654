//! Persistence of accepted fixes
//!
//! Formatting and writing are split so alternate encodings can be added
//! without touching edit or model logic.

pub mod format;
pub mod writer;

pub use format::{CsvRecordFormatter, LegacyLineFormatter, RecordFormatter};
pub use writer::FixWriter;
