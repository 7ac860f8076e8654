//! Scoped persistence writer for accepted fixes
//!
//! Opened exactly once when a source is opened in output mode, closed on
//! every exit path, never reopened. Browse-mode sessions have no writer
//! and dumped fixes are discarded.

use crate::core::Fix;
use crate::error::{NavError, NavResult};
use crate::output::format::{LegacyLineFormatter, RecordFormatter};
use std::io::{BufWriter, Write};

/// Streams accepted fixes out as the buffer dumps them
pub struct FixWriter<W: Write> {
    out: Option<BufWriter<W>>,
    formatter: Box<dyn RecordFormatter>,
    header_written: bool,
    records_written: usize,
}

impl<W: Write> FixWriter<W> {
    /// Wrap a sink with the legacy line formatter
    pub fn new(sink: W) -> Self {
        Self::with_formatter(sink, Box::new(LegacyLineFormatter))
    }

    /// Wrap a sink with an alternate record formatter
    pub fn with_formatter(sink: W, formatter: Box<dyn RecordFormatter>) -> Self {
        Self {
            out: Some(BufWriter::new(sink)),
            formatter,
            header_written: false,
            records_written: 0,
        }
    }

    /// Append one accepted fix
    pub fn write_fix(&mut self, fix: &Fix) -> NavResult<()> {
        let out = self.out.as_mut().ok_or_else(|| NavError::Output {
            details: "writer already closed".to_string(),
        })?;

        if !self.header_written {
            self.header_written = true;
            if let Some(header) = self.formatter.header() {
                writeln!(out, "{}", header).map_err(|e| NavError::Output {
                    details: e.to_string(),
                })?;
            }
        }

        writeln!(out, "{}", self.formatter.format_record(fix)).map_err(|e| NavError::Output {
            details: e.to_string(),
        })?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush and release the sink; further writes fail
    pub fn close(&mut self) -> NavResult<()> {
        if let Some(mut out) = self.out.take() {
            out.flush().map_err(|e| NavError::Output {
                details: e.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.out.is_some()
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

impl<W: Write> Drop for FixWriter<W> {
    fn drop(&mut self) {
        // best-effort flush if close() was skipped on an error path
        if let Some(mut out) = self.out.take() {
            let _ = out.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::format::CsvRecordFormatter;
    use std::sync::{Arc, Mutex};

    /// Shared byte sink so tests can read back what the writer produced
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn sample_fix(t: f64) -> Fix {
        Fix::new(0, t, 12.0, 44.0, 10.0, 90.0, 2.0, 0.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn writes_one_line_per_fix() {
        let sink = SharedSink::default();
        let mut writer = FixWriter::new(sink.clone());
        writer.write_fix(&sample_fix(1.0e9)).unwrap();
        writer.write_fix(&sample_fix(1.0e9 + 1.0)).unwrap();
        writer.close().unwrap();

        let bytes = sink.0.lock().unwrap().clone();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(writer.records_written(), 2);
    }

    #[test]
    fn write_after_close_fails_without_panicking() {
        let sink = SharedSink::default();
        let mut writer = FixWriter::new(sink);
        writer.close().unwrap();
        assert!(matches!(
            writer.write_fix(&sample_fix(0.0)),
            Err(NavError::Output { .. })
        ));
    }

    #[test]
    fn written_lines_parse_back_through_the_text_source() {
        use crate::source::{RecordSource, TextFixSource};

        let sink = SharedSink::default();
        let mut writer = FixWriter::new(sink.clone());
        let fix = Fix::new(
            0,
            1_710_678_645.25,
            12.123456789,
            44.987654321,
            10.5,
            271.25,
            2.125,
            0.1,
            -0.2,
            0.05,
            1.0,
        );
        writer.write_fix(&fix).unwrap();
        writer.close().unwrap();

        let bytes = sink.0.lock().unwrap().clone();
        let mut source = TextFixSource::from_unbuffered(&bytes[..], "roundtrip");
        let raw = source.next_fix().unwrap().unwrap();
        assert!((raw.time_secs - fix.time.seconds).abs() < 1.0e-6);
        assert!((raw.lon - fix.lon).abs() < 1.0e-9);
        assert!((raw.lat - fix.lat).abs() < 1.0e-9);
        assert!((raw.speed - fix.speed).abs() < 1.0e-3);
        assert!((raw.heave - fix.heave).abs() < 1.0e-3);
    }

    #[test]
    fn csv_formatter_emits_header_once() {
        let sink = SharedSink::default();
        let mut writer = FixWriter::with_formatter(sink.clone(), Box::new(CsvRecordFormatter));
        writer.write_fix(&sample_fix(0.0)).unwrap();
        writer.write_fix(&sample_fix(1.0)).unwrap();
        writer.close().unwrap();

        let bytes = sink.0.lock().unwrap().clone();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().starts_with("year,"));
    }
}
