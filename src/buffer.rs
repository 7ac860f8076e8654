//! Sliding-window buffer over an unbounded fix sequence
//!
//! The buffer holds at most a fixed number of fixes in arrival order.
//! `load` appends from the source, `dump` streams the head out to the
//! persistence writer (when one is attached) and shifts the window
//! forward. Arrival order is preserved and is not guaranteed to be
//! time-monotonic; a load reports how many timestamps are out of order.

use crate::core::{Fix, DEFAULT_BUFFER_CAPACITY};
use crate::error::NavResult;
use crate::output::FixWriter;
use crate::source::RecordSource;
use log::{debug, warn};
use std::io::Write;

/// Result of one load call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Fixes appended by this call
    pub loaded: usize,
    /// Fixes in the whole buffer whose timestamp does not increase over
    /// their predecessor (advisory, non-fatal)
    pub bad_timestamps: usize,
    /// Whether the source reported end-of-data during this call
    pub end_of_data: bool,
}

/// Sliding window of fixes with load/hold/dump semantics
pub struct FixBuffer {
    fixes: Vec<Fix>,
    capacity: usize,
    /// Index of the "current" fix the UI is centered on
    current: usize,
    total_loaded: usize,
    total_dumped: usize,
}

impl FixBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            fixes: Vec::new(),
            capacity: capacity.max(1),
            current: 0,
            total_loaded: 0,
            total_dumped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    pub fn fixes_mut(&mut self) -> &mut [Fix] {
        &mut self.fixes
    }

    /// Remove one fix outright (timestamp repair by deletion).
    /// Remaining fixes are reindexed.
    pub fn remove(&mut self, index: usize) -> Option<Fix> {
        if index >= self.fixes.len() {
            return None;
        }
        let removed = self.fixes.remove(index);
        self.reindex();
        if self.current >= self.fixes.len() {
            self.current = self.fixes.len().saturating_sub(1);
        }
        // a deleted fix will never be dumped; keep conservation honest
        self.total_dumped += 1;
        Some(removed)
    }

    /// Index of the current fix, clamped to the buffer on every mutation
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.current = if self.fixes.is_empty() {
            0
        } else {
            index.min(self.fixes.len() - 1)
        };
    }

    /// Fixes pulled from the source over the buffer's lifetime
    pub fn total_loaded(&self) -> usize {
        self.total_loaded
    }

    /// Fixes dumped (or deleted) over the buffer's lifetime
    pub fn total_dumped(&self) -> usize {
        self.total_dumped
    }

    /// Pull up to `want` more fixes from the source, appending at the tail.
    ///
    /// Each new fix gets its expected time interval from its predecessor
    /// and an immutable snapshot of every editable field. After appending,
    /// the whole buffer is scanned for non-increasing timestamps; any found
    /// are reported as a non-fatal advisory.
    pub fn load(&mut self, source: &mut dyn RecordSource, want: usize) -> NavResult<LoadOutcome> {
        let room = self.capacity - self.fixes.len();
        let take = want.min(room);
        let mut loaded = 0;
        let mut end_of_data = false;

        while loaded < take {
            match source.next_fix()? {
                Some(raw) => {
                    let interval = self
                        .fixes
                        .last()
                        .map(|prev| raw.time_secs - prev.time.seconds)
                        .unwrap_or(0.0);
                    let mut fix = Fix::new(
                        self.total_loaded,
                        raw.time_secs,
                        raw.lon,
                        raw.lat,
                        raw.speed,
                        raw.heading,
                        raw.draft,
                        raw.roll,
                        raw.pitch,
                        raw.heave,
                        interval,
                    );
                    fix.index = self.fixes.len();
                    self.fixes.push(fix);
                    self.total_loaded += 1;
                    loaded += 1;
                }
                None => {
                    end_of_data = true;
                    break;
                }
            }
        }

        let bad_timestamps = self.count_bad_timestamps();
        if bad_timestamps > 0 {
            warn!(
                "{}: {} fixes with non-increasing timestamps in buffer",
                source.id(),
                bad_timestamps
            );
        }
        debug!(
            "loaded {} fixes from {} ({} in buffer)",
            loaded,
            source.id(),
            self.fixes.len()
        );

        Ok(LoadOutcome {
            loaded,
            bad_timestamps,
            end_of_data,
        })
    }

    /// Dump all but the last `hold` fixes, in increasing order, to the
    /// writer when one is attached (output mode; browse mode passes None
    /// and the fixes are discarded). The remaining fixes shift to the head
    /// and the current index moves back by the dumped count, clamped to
    /// the buffer.
    pub fn dump<W: Write>(
        &mut self,
        writer: Option<&mut FixWriter<W>>,
        hold: usize,
    ) -> NavResult<usize> {
        let dump_count = self.fixes.len().saturating_sub(hold);
        if dump_count == 0 {
            return Ok(0);
        }

        if let Some(writer) = writer {
            for fix in &self.fixes[..dump_count] {
                writer.write_fix(fix)?;
            }
        }

        self.fixes.drain(..dump_count);
        self.reindex();
        self.total_dumped += dump_count;
        self.current = if self.fixes.is_empty() {
            0
        } else {
            self.current
                .saturating_sub(dump_count)
                .min(self.fixes.len() - 1)
        };

        debug!("dumped {} fixes, holding {}", dump_count, self.fixes.len());
        Ok(dump_count)
    }

    /// Dump everything; the caller closes the writer afterwards
    pub fn close<W: Write>(&mut self, writer: Option<&mut FixWriter<W>>) -> NavResult<usize> {
        self.dump(writer, 0)
    }

    fn count_bad_timestamps(&self) -> usize {
        self.fixes
            .windows(2)
            .filter(|pair| pair[1].time.seconds <= pair[0].time.seconds)
            .count()
    }

    fn reindex(&mut self) {
        for (i, fix) in self.fixes.iter_mut().enumerate() {
            fix.index = i;
        }
    }
}

impl Default for FixBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockFixSource, RawFix};

    fn track_source(count: usize) -> MockFixSource {
        MockFixSource::with_track("track", count, 1000.0, 1.0, 10.0, 50.0, 0.0001, 0.0001)
    }

    #[test]
    fn load_appends_and_snapshots() {
        let mut buffer = FixBuffer::new(100);
        let mut source = track_source(10);
        let outcome = buffer.load(&mut source, 5).unwrap();
        assert_eq!(outcome.loaded, 5);
        assert_eq!(outcome.bad_timestamps, 0);
        assert!(!outcome.end_of_data);

        let fixes = buffer.fixes();
        assert_eq!(fixes.len(), 5);
        assert_eq!(fixes[0].interval, 0.0);
        assert!((fixes[1].interval - 1.0).abs() < 1.0e-9);
        assert_eq!(fixes[3].record, 3);
        assert_eq!(fixes[3].lon, fixes[3].lon_org);
    }

    #[test]
    fn load_stops_at_capacity() {
        let mut buffer = FixBuffer::new(3);
        let mut source = track_source(10);
        let outcome = buffer.load(&mut source, 10).unwrap();
        assert_eq!(outcome.loaded, 3);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn load_reports_end_of_data() {
        let mut buffer = FixBuffer::new(100);
        let mut source = track_source(4);
        let outcome = buffer.load(&mut source, 10).unwrap();
        assert_eq!(outcome.loaded, 4);
        assert!(outcome.end_of_data);
    }

    #[test]
    fn load_flags_non_increasing_timestamps() {
        let mut buffer = FixBuffer::new(100);
        let mut source = MockFixSource::new("dups");
        for t in [0.0, 1.0, 1.0, 1.0, 4.0] {
            source.push_fix(RawFix::new(t, 0.0, 0.0));
        }
        let outcome = buffer.load(&mut source, 10).unwrap();
        assert_eq!(outcome.bad_timestamps, 2);
    }

    #[test]
    fn dump_shifts_window_and_adjusts_current() {
        let mut buffer = FixBuffer::new(100);
        let mut source = track_source(10);
        buffer.load(&mut source, 10).unwrap();
        buffer.set_current_index(7);

        let dumped = buffer.dump::<Vec<u8>>(None, 4).unwrap();
        assert_eq!(dumped, 6);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.current_index(), 1);
        // head fix keeps its global record number but gets index 0
        assert_eq!(buffer.fixes()[0].record, 6);
        assert_eq!(buffer.fixes()[0].index, 0);
    }

    #[test]
    fn current_index_clamps_when_buffer_empties() {
        let mut buffer = FixBuffer::new(100);
        let mut source = track_source(5);
        buffer.load(&mut source, 5).unwrap();
        buffer.set_current_index(4);
        buffer.dump::<Vec<u8>>(None, 0).unwrap();
        assert_eq!(buffer.current_index(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn conservation_across_load_dump_cycles() {
        let mut buffer = FixBuffer::new(6);
        let mut source = track_source(20);
        loop {
            let outcome = buffer.load(&mut source, 6).unwrap();
            buffer.dump::<Vec<u8>>(None, 2).unwrap();
            if outcome.end_of_data {
                break;
            }
        }
        buffer.close::<Vec<u8>>(None).unwrap();
        assert_eq!(buffer.total_loaded(), 20);
        assert_eq!(buffer.total_dumped(), 20);
    }
}
