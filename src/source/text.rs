//! Flat navigation text format source
//!
//! Reads the legacy one-line-per-fix format written by the persistence
//! layer:
//! `YYYY MM DD hh mm ss.ffffff <epochSeconds> <lon> <lat> <heading>
//! <speed> <draft> <roll> <pitch> <heave>`.
//! The continuous epoch-seconds column is authoritative for time; the
//! calendar columns are carried for human readers.

use crate::source::{RawFix, RecordSource, SourceError, SourceResult};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Number of whitespace-separated columns in one navigation line
const LINE_COLUMNS: usize = 15;

/// Record source over the flat navigation text format
pub struct TextFixSource<R: BufRead> {
    reader: R,
    id: String,
    line_number: usize,
    open: bool,
}

impl TextFixSource<BufReader<File>> {
    /// Open a navigation file on disk
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let id = path.as_ref().display().to_string();
        let file = File::open(path.as_ref()).map_err(|e| SourceError::Io {
            details: format!("{}: {}", id, e),
        })?;
        Ok(Self::from_reader(BufReader::new(file), id))
    }
}

impl<R: Read> TextFixSource<BufReader<R>> {
    /// Wrap any reader, buffering it
    pub fn from_unbuffered(reader: R, id: impl Into<String>) -> Self {
        Self::from_reader(BufReader::new(reader), id)
    }
}

impl<R: BufRead> TextFixSource<R> {
    pub fn from_reader(reader: R, id: impl Into<String>) -> Self {
        Self {
            reader,
            id: id.into(),
            line_number: 0,
            open: true,
        }
    }

    /// Lines consumed so far, including blanks and comments
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    fn parse_line(&self, line: &str) -> SourceResult<RawFix> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != LINE_COLUMNS {
            return Err(SourceError::Parse {
                line: self.line_number,
                details: format!("expected {} columns, found {}", LINE_COLUMNS, tokens.len()),
            });
        }

        let number = |idx: usize, field: &str| -> SourceResult<f64> {
            tokens[idx]
                .parse::<f64>()
                .map_err(|_| SourceError::InvalidValue {
                    line: self.line_number,
                    field: field.to_string(),
                    value: tokens[idx].to_string(),
                })
        };

        let time_secs = number(6, "epoch seconds")?;
        let lon = number(7, "longitude")?;
        let lat = number(8, "latitude")?;
        let heading = number(9, "heading")?;
        let speed = number(10, "speed")?;
        let draft = number(11, "draft")?;
        let roll = number(12, "roll")?;
        let pitch = number(13, "pitch")?;
        let heave = number(14, "heave")?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(SourceError::InvalidValue {
                line: self.line_number,
                field: "latitude".to_string(),
                value: tokens[8].to_string(),
            });
        }
        if !(-360.0..=360.0).contains(&lon) {
            return Err(SourceError::InvalidValue {
                line: self.line_number,
                field: "longitude".to_string(),
                value: tokens[7].to_string(),
            });
        }

        Ok(RawFix {
            time_secs,
            lon,
            lat,
            speed,
            heading,
            draft,
            roll,
            pitch,
            heave,
        })
    }
}

impl<R: BufRead> RecordSource for TextFixSource<R> {
    fn next_fix(&mut self) -> SourceResult<Option<RawFix>> {
        if !self.open {
            return Err(SourceError::Closed {
                source_id: self.id.clone(),
            });
        }

        loop {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).map_err(|e| SourceError::Io {
                details: format!("{}: {}", self.id, e),
            })?;
            if read == 0 {
                self.open = false;
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return self.parse_line(trimmed).map(Some);
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
