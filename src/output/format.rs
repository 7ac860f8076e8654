//! Record formatters for persisted navigation output
//!
//! The legacy fixed-order line is the format downstream consumers read;
//! its column order and precision must not change. Alternate encodings
//! implement [`RecordFormatter`] so the writer and edit/model logic never
//! see format details.

use crate::core::Fix;

/// Formats one accepted fix as one output record
pub trait RecordFormatter {
    /// Optional header emitted once before the first record
    fn header(&self) -> Option<String> {
        None
    }

    fn format_record(&self, fix: &Fix) -> String;
}

/// Legacy whitespace-delimited line format:
/// `YYYY MM DD hh mm ss.ffffff <epochSeconds> <lon> <lat> <heading>
/// <speed> <draft> <roll> <pitch> <heave>`
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyLineFormatter;

impl RecordFormatter for LegacyLineFormatter {
    fn format_record(&self, fix: &Fix) -> String {
        let t = &fix.time;
        format!(
            "{:04} {:02} {:02} {:02} {:02} {:09.6} {:.6} {:.9} {:.9} {:.3} {:.3} {:.3} {:.3} {:.3} {:.3}",
            t.year,
            t.month,
            t.day,
            t.hour,
            t.minute,
            t.second,
            t.seconds,
            fix.lon,
            fix.lat,
            fix.heading,
            fix.speed,
            fix.draft,
            fix.roll,
            fix.pitch,
            fix.heave,
        )
    }
}

/// Comma-separated variant with a header row, for spreadsheet import
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRecordFormatter;

impl RecordFormatter for CsvRecordFormatter {
    fn header(&self) -> Option<String> {
        Some(
            "year,month,day,hour,minute,second,epoch_seconds,longitude,latitude,heading,speed,draft,roll,pitch,heave"
                .to_string(),
        )
    }

    fn format_record(&self, fix: &Fix) -> String {
        let t = &fix.time;
        format!(
            "{},{},{},{},{},{:.6},{:.6},{:.9},{:.9},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3}",
            t.year,
            t.month,
            t.day,
            t.hour,
            t.minute,
            t.second,
            t.seconds,
            fix.lon,
            fix.lat,
            fix.heading,
            fix.speed,
            fix.draft,
            fix.roll,
            fix.pitch,
            fix.heave,
        )
    }
}
