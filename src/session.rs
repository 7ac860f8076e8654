//! Editing session: one source, one buffer, one model, one writer
//!
//! The session is the single owner of all mutable editing state, passed
//! into every operation by the embedding UI. Operations run to completion
//! in call order; there is no background execution. Failed operations
//! report an error and leave the buffer unchanged.

use crate::buffer::{FixBuffer, LoadOutcome};
use crate::config::SessionConfig;
use crate::core::{FieldKind, Fix, PixelPos, SOLVER_ESTIMATION_CYCLES};
use crate::edit;
use crate::error::{NavError, NavResult};
use crate::model::{self, PositionModel};
use crate::output::FixWriter;
use crate::solver::SmoothingSolver;
use crate::source::RecordSource;
use log::{info, warn};
use std::io::Write;

/// Whether dumped fixes are persisted or discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Edits are discarded when the buffer dumps
    Browse,
    /// Dumped fixes stream to the persistence writer
    Output,
}

/// Interpolation flavor for [`EditSession::interpolate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Bridge selected fixes between their unselected neighbors
    Gap,
    /// Straighten runs of repeated stale sensor values
    RepeatedValues,
}

/// Interactive editing session over one navigation source
pub struct EditSession {
    config: SessionConfig,
    mode: SessionMode,
    source: Option<Box<dyn RecordSource>>,
    writer: Option<FixWriter<Box<dyn Write>>>,
    buffer: FixBuffer,
    model: PositionModel,
    show_model_overlay: bool,
    active_field: Option<FieldKind>,
    window: Option<(usize, usize)>,
    solver: SmoothingSolver,
}

impl EditSession {
    pub fn new(config: SessionConfig) -> NavResult<Self> {
        config.validate()?;
        let solver = SmoothingSolver {
            max_iterations: config.solver_iterations,
            estimation_cycles: SOLVER_ESTIMATION_CYCLES,
            bandwidth_ratio: config.solver_bandwidth_ratio,
        };
        Ok(Self {
            buffer: FixBuffer::new(config.buffer_capacity),
            config,
            mode: SessionMode::Browse,
            source: None,
            writer: None,
            model: PositionModel::Off,
            show_model_overlay: false,
            active_field: None,
            window: None,
            solver,
        })
    }

    pub fn with_defaults() -> Self {
        // the default configuration always validates
        Self::new(SessionConfig::default()).expect("default configuration is valid")
    }

    /// Open a source in browse mode; dumped fixes are discarded
    pub fn open_browse(&mut self, source: Box<dyn RecordSource>) -> NavResult<()> {
        self.open_inner(source, None)
    }

    /// Open a source in output mode. The writer is opened exactly once
    /// here and is closed on every exit path; it cannot be reopened
    /// without a fresh source.
    pub fn open_output(
        &mut self,
        source: Box<dyn RecordSource>,
        sink: Box<dyn Write>,
    ) -> NavResult<()> {
        self.open_inner(source, Some(FixWriter::new(sink)))
    }

    fn open_inner(
        &mut self,
        source: Box<dyn RecordSource>,
        writer: Option<FixWriter<Box<dyn Write>>>,
    ) -> NavResult<()> {
        if self.source.is_some() || self.writer.is_some() {
            return Err(NavError::Output {
                details: "a source is already open; close it first".to_string(),
            });
        }
        info!("opening source {}", source.id());
        self.mode = if writer.is_some() {
            SessionMode::Output
        } else {
            SessionMode::Browse
        };
        self.source = Some(source);
        self.writer = writer;
        self.window = None;
        self.active_field = None;
        Ok(())
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    // --- buffer management -------------------------------------------------

    /// Pull the configured chunk of fixes from the source
    pub fn load(&mut self) -> NavResult<LoadOutcome> {
        self.load_n(self.config.load_chunk)
    }

    /// Pull up to `n` more fixes, then refresh derived motion and the
    /// active model. A non-zero `bad_timestamps` count in the outcome is
    /// the advisory that enables timestamp repair.
    pub fn load_n(&mut self, n: usize) -> NavResult<LoadOutcome> {
        let source = self.source.as_mut().ok_or(NavError::NoActiveSource)?;
        let outcome = self.buffer.load(source.as_mut(), n)?;
        if outcome.loaded > 0 {
            edit::recompute_made_good(self.buffer.fixes_mut());
            self.recompute_model_logged();
        }
        Ok(outcome)
    }

    /// Dump all but the configured hold count
    pub fn dump(&mut self) -> NavResult<usize> {
        self.dump_holding(self.config.hold_count)
    }

    /// Dump all but the last `hold` fixes. In output mode the dumped
    /// fixes stream to the writer in increasing order; the visible window
    /// and current index shift with the buffer.
    pub fn dump_holding(&mut self, hold: usize) -> NavResult<usize> {
        let dumped = self.buffer.dump(self.writer.as_mut(), hold)?;
        if dumped > 0 {
            if let Some((start, end)) = self.window {
                self.window = Some((start.saturating_sub(dumped), end.saturating_sub(dumped)));
            }
            edit::recompute_made_good(self.buffer.fixes_mut());
        }
        Ok(dumped)
    }

    /// Dump everything, close the writer and release the source.
    /// Returns the number of fixes dumped by this final flush.
    pub fn close(&mut self) -> NavResult<usize> {
        let dumped = self.buffer.close(self.writer.as_mut())?;
        if let Some(writer) = self.writer.as_mut() {
            writer.close()?;
        }
        self.writer = None;
        self.source = None;
        self.window = None;
        self.active_field = None;
        info!("session closed, {} fixes flushed", dumped);
        Ok(dumped)
    }

    pub fn fixes(&self) -> &[Fix] {
        self.buffer.fixes()
    }

    pub fn current_index(&self) -> usize {
        self.buffer.current_index()
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.buffer.set_current_index(index);
    }

    pub fn total_loaded(&self) -> usize {
        self.buffer.total_loaded()
    }

    pub fn total_dumped(&self) -> usize {
        self.buffer.total_dumped()
    }

    // --- visible window and renderer feedback ------------------------------

    /// Scope subsequent edit operations to `[start, end)` of the buffer
    pub fn set_visible_window(&mut self, start: usize, end: usize) {
        let len = self.buffer.len();
        let end = end.min(len);
        self.window = Some((start.min(end), end));
    }

    /// The effective window: the caller's, clamped, or the whole buffer
    pub fn visible_window(&self) -> (usize, usize) {
        let len = self.buffer.len();
        match self.window {
            Some((start, end)) => (start.min(len), end.min(len)),
            None => (0, len),
        }
    }

    /// Record the renderer's screen position for one fix in one plot
    pub fn set_pixel_position(
        &mut self,
        field: FieldKind,
        index: usize,
        x: i32,
        y: i32,
    ) -> NavResult<()> {
        let fixes = self.buffer.fixes_mut();
        if index >= fixes.len() {
            return Err(NavError::NotEnoughData {
                required: index + 1,
                available: fixes.len(),
            });
        }
        fixes[index].pixel[field.index()] = Some(PixelPos::new(x, y));
        Ok(())
    }

    // --- selection ---------------------------------------------------------

    /// Make a field the target of pointer operations, clearing selections
    /// on every other field so an edit can only land on the active one
    pub fn set_active_field(&mut self, field: FieldKind) {
        if self.active_field != Some(field) {
            edit::clear_other_fields(self.buffer.fixes_mut(), field);
            self.active_field = Some(field);
        }
    }

    pub fn active_field(&self) -> Option<FieldKind> {
        self.active_field
    }

    /// Toggle the selection of the fix nearest the pointer.
    /// Returns the absolute buffer index of the hit, if any.
    pub fn pick(&mut self, field: FieldKind, x: i32, y: i32) -> NavResult<Option<usize>> {
        self.ensure_loaded()?;
        self.set_active_field(field);
        let (start, end) = self.visible_window();
        let hit = edit::pick(&mut self.buffer.fixes_mut()[start..end], field, x, y);
        Ok(hit.map(|i| i + start))
    }

    /// Select every fix within `radius` pixels of the pointer
    pub fn select_range(
        &mut self,
        field: FieldKind,
        x: i32,
        y: i32,
        radius: i32,
    ) -> NavResult<usize> {
        self.ensure_loaded()?;
        self.set_active_field(field);
        let (start, end) = self.visible_window();
        Ok(edit::select_radius(
            &mut self.buffer.fixes_mut()[start..end],
            field,
            x,
            y,
            radius,
            true,
        ))
    }

    /// Deselect every fix within `radius` pixels of the pointer
    pub fn deselect_range(
        &mut self,
        field: FieldKind,
        x: i32,
        y: i32,
        radius: i32,
    ) -> NavResult<usize> {
        self.ensure_loaded()?;
        self.set_active_field(field);
        let (start, end) = self.visible_window();
        Ok(edit::select_radius(
            &mut self.buffer.fixes_mut()[start..end],
            field,
            x,
            y,
            radius,
            false,
        ))
    }

    /// Select the whole visible window for a field
    pub fn select_all(&mut self, field: FieldKind) -> NavResult<usize> {
        self.ensure_loaded()?;
        self.set_active_field(field);
        let (start, end) = self.visible_window();
        Ok(edit::select_all(
            &mut self.buffer.fixes_mut()[start..end],
            field,
        ))
    }

    /// Deselect the whole visible window for a field
    pub fn deselect_all(&mut self, field: FieldKind) -> NavResult<usize> {
        self.ensure_loaded()?;
        self.set_active_field(field);
        let (start, end) = self.visible_window();
        Ok(edit::deselect_all(
            &mut self.buffer.fixes_mut()[start..end],
            field,
        ))
    }

    /// Select around the pointer with the configured pick radius
    pub fn select_near(&mut self, field: FieldKind, x: i32, y: i32) -> NavResult<usize> {
        self.select_range(field, x, y, self.config.pick_radius_px)
    }

    /// Deselect around the pointer with the configured pick radius
    pub fn deselect_near(&mut self, field: FieldKind, x: i32, y: i32) -> NavResult<usize> {
        self.deselect_range(field, x, y, self.config.pick_radius_px)
    }

    /// Flag the fix nearest the pointer as excluded from inversion
    pub fn flag_at(&mut self, field: FieldKind, x: i32, y: i32) -> NavResult<Option<usize>> {
        self.set_flag_inner(field, x, y, true)
    }

    /// Clear the exclude-from-inversion flag on the nearest fix
    pub fn unflag_at(&mut self, field: FieldKind, x: i32, y: i32) -> NavResult<Option<usize>> {
        self.set_flag_inner(field, x, y, false)
    }

    fn set_flag_inner(
        &mut self,
        field: FieldKind,
        x: i32,
        y: i32,
        flagged: bool,
    ) -> NavResult<Option<usize>> {
        self.ensure_loaded()?;
        let (start, end) = self.visible_window();
        let hit = edit::set_flag_at(
            &mut self.buffer.fixes_mut()[start..end],
            field,
            x,
            y,
            flagged,
        )?;
        if hit.is_some() {
            // flag changes feed the position models directly
            self.recompute_model_logged();
        }
        Ok(hit.map(|i| i + start))
    }

    // --- edits -------------------------------------------------------------

    /// Interpolate the active field's selected fixes
    pub fn interpolate(&mut self, mode: InterpolationMode) -> NavResult<usize> {
        self.ensure_loaded()?;
        let field = self.require_active_field()?;
        let (start, end) = self.visible_window();
        let slice = &mut self.buffer.fixes_mut()[start..end];
        let changed = match mode {
            InterpolationMode::Gap => edit::interpolate_gaps(slice, field),
            InterpolationMode::RepeatedValues => edit::interpolate_repeats(slice, field),
        };
        if changed > 0 {
            self.after_value_edit(field);
        }
        Ok(changed)
    }

    /// Restore the active field's selected fixes to their load-time values
    pub fn revert_selected(&mut self) -> NavResult<usize> {
        self.ensure_loaded()?;
        let field = self.require_active_field()?;
        let (start, end) = self.visible_window();
        let changed = edit::revert_selected(&mut self.buffer.fixes_mut()[start..end], field);
        if changed > 0 {
            self.after_value_edit(field);
        }
        Ok(changed)
    }

    /// Add a constant offset to the active field's selected fixes
    pub fn offset_selected(&mut self, delta: f64) -> NavResult<usize> {
        self.ensure_loaded()?;
        let field = self.require_active_field()?;
        let (start, end) = self.visible_window();
        let changed =
            edit::offset_selected(&mut self.buffer.fixes_mut()[start..end], field, delta);
        if changed > 0 {
            self.after_value_edit(field);
        }
        Ok(changed)
    }

    /// Copy speed-made-good into the speed of each selected fix
    pub fn adopt_speed_made_good(&mut self) -> NavResult<usize> {
        self.ensure_loaded()?;
        let (start, end) = self.visible_window();
        let mut changed = 0;
        for fix in &mut self.buffer.fixes_mut()[start..end] {
            if fix.selected.get(FieldKind::Speed) {
                fix.speed = fix.speed_made_good;
                changed += 1;
            }
        }
        if changed > 0 {
            self.after_value_edit(FieldKind::Speed);
        }
        Ok(changed)
    }

    /// Copy course-made-good into the heading of each selected fix
    pub fn adopt_course_made_good(&mut self) -> NavResult<usize> {
        self.ensure_loaded()?;
        let (start, end) = self.visible_window();
        let mut changed = 0;
        for fix in &mut self.buffer.fixes_mut()[start..end] {
            if fix.selected.get(FieldKind::Heading) {
                fix.heading = fix.course_made_good;
                changed += 1;
            }
        }
        if changed > 0 {
            self.after_value_edit(FieldKind::Heading);
        }
        Ok(changed)
    }

    // --- timestamp repair --------------------------------------------------

    /// Verify time ordering across the buffer. Returns `BadTimestamps`
    /// with the offending count while repair actions should be offered.
    pub fn check_timestamps(&self) -> NavResult<()> {
        let bad = edit::find_bad(self.buffer.fixes()).len();
        if bad > 0 {
            Err(NavError::BadTimestamps { count: bad })
        } else {
            Ok(())
        }
    }

    /// Spread marked timestamps evenly between the surrounding good ones
    pub fn redistribute_timestamps(&mut self) -> NavResult<usize> {
        self.ensure_loaded()?;
        let (start, end) = self.visible_window();
        let changed = edit::redistribute_marked(&mut self.buffer.fixes_mut()[start..end])?;
        if changed > 0 {
            self.after_value_edit(FieldKind::TimeInterval);
        }
        Ok(changed)
    }

    /// Delete the marked fixes that break strict time ordering
    pub fn delete_bad_timestamps(&mut self) -> NavResult<usize> {
        self.ensure_loaded()?;
        let (start, end) = self.visible_window();
        let doomed: Vec<usize> = edit::bad_marked_indices(&self.buffer.fixes()[start..end])
            .into_iter()
            .map(|i| i + start)
            .collect();
        for &index in &doomed {
            self.buffer.remove(index);
        }
        if !doomed.is_empty() {
            self.after_value_edit(FieldKind::TimeInterval);
        }
        Ok(doomed.len())
    }

    // --- models ------------------------------------------------------------

    /// Switch the position model and recompute it. Entering dead
    /// reckoning or inversion forces the model overlay on.
    pub fn set_model(&mut self, model: PositionModel) -> NavResult<()> {
        self.model = model;
        if model.forces_overlay() {
            self.show_model_overlay = true;
        }
        if self.buffer.is_empty() || model == PositionModel::Off {
            return Ok(());
        }
        self.recompute_model()
    }

    pub fn model(&self) -> PositionModel {
        self.model
    }

    pub fn show_model_overlay(&self) -> bool {
        self.show_model_overlay
    }

    pub fn set_model_overlay(&mut self, show: bool) {
        self.show_model_overlay = show;
    }

    /// Recompute the active model over its scope (buffer-wide for mean
    /// and dead reckoning, the visible window for inversion)
    pub fn recompute_model(&mut self) -> NavResult<()> {
        let window = self.visible_window();
        model::recompute(self.model, self.buffer.fixes_mut(), window, &self.solver)
    }

    // --- internals ---------------------------------------------------------

    fn ensure_loaded(&self) -> NavResult<()> {
        if self.buffer.is_empty() {
            return Err(NavError::NoActiveSource);
        }
        Ok(())
    }

    fn require_active_field(&self) -> NavResult<FieldKind> {
        self.active_field.ok_or(NavError::NoActiveField)
    }

    /// Refresh everything downstream of a value edit. A model failure
    /// here only means the previous model output stays on screen, so it
    /// is logged rather than failing the edit that succeeded.
    fn after_value_edit(&mut self, field: FieldKind) {
        match field {
            FieldKind::TimeInterval => {
                edit::rebuild_intervals(self.buffer.fixes_mut());
                edit::recompute_made_good(self.buffer.fixes_mut());
                self.recompute_model_logged();
            }
            FieldKind::Longitude | FieldKind::Latitude => {
                edit::recompute_made_good(self.buffer.fixes_mut());
                self.recompute_model_logged();
            }
            FieldKind::Speed | FieldKind::Heading => {
                if matches!(self.model, PositionModel::DeadReckoning { .. }) {
                    self.recompute_model_logged();
                }
            }
            FieldKind::Draft => {}
        }
    }

    fn recompute_model_logged(&mut self) {
        if self.model == PositionModel::Off {
            return;
        }
        if let Err(err) = self.recompute_model() {
            warn!("model recompute failed: {}", err);
        }
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        // writer flushes on its own drop; make the close explicit anyway
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockFixSource, RawFix};
    use std::sync::{Arc, Mutex};

    /// Byte sink the test can read back after the session closes
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

    fn session() -> EditSession {
        EditSession::with_defaults()
    }

    fn track_session(count: usize, dt: f64) -> EditSession {
        let mut s = session();
        let source = MockFixSource::with_track("track", count, 1000.0, dt, 10.0, 50.0, 1.0e-4, 1.0e-4);
        s.open_browse(Box::new(source)).unwrap();
        s.load_n(count).unwrap();
        s
    }

    fn mark_latitude(s: &mut EditSession, indices: &[usize]) {
        for i in 0..s.fixes().len() {
            s.set_pixel_position(FieldKind::Latitude, i, i as i32, 0).unwrap();
        }
        s.set_active_field(FieldKind::Latitude);
        for &i in indices {
            s.pick(FieldKind::Latitude, i as i32, 0).unwrap();
        }
    }

    #[test]
    fn output_session_conserves_every_fix() {
        let sink = SharedSink::default();
        let mut s = session();
        let source = MockFixSource::with_track("out", 25, 0.0, 1.0, 10.0, 50.0, 1.0e-4, 0.0);
        s.open_output(Box::new(source), Box::new(sink.clone())).unwrap();

        loop {
            let outcome = s.load_n(8).unwrap();
            s.dump_holding(3).unwrap();
            if outcome.end_of_data {
                break;
            }
        }
        s.close().unwrap();

        assert_eq!(s.total_loaded(), 25);
        assert_eq!(s.total_dumped(), 25);
        let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.lines().count(), 25);
    }

    #[test]
    fn dumped_lines_are_in_increasing_record_order() {
        let sink = SharedSink::default();
        let mut s = session();
        let source = MockFixSource::with_track("ordered", 10, 0.0, 1.0, 10.0, 50.0, 0.0, 1.0e-4);
        s.open_output(Box::new(source), Box::new(sink.clone())).unwrap();
        s.load_n(10).unwrap();
        s.close().unwrap();

        let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        let epochs: Vec<f64> = text
            .lines()
            .map(|l| l.split_whitespace().nth(6).unwrap().parse().unwrap())
            .collect();
        assert!(epochs.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn midpoint_interpolation_scenario() {
        let mut s = track_session(1000, 1.0);
        mark_latitude(&mut s, &[500]);
        let changed = s.interpolate(InterpolationMode::Gap).unwrap();
        assert_eq!(changed, 1);

        let fixes = s.fixes();
        let expected = (fixes[499].lat + fixes[501].lat) / 2.0;
        assert!((fixes[500].lat - expected).abs() < 1.0e-12);
    }

    #[test]
    fn revert_is_exact_after_repeated_edits() {
        let mut s = track_session(50, 1.0);
        mark_latitude(&mut s, &[20]);
        let original = s.fixes()[20].lat_org;
        s.offset_selected(0.25).unwrap();
        s.offset_selected(0.25).unwrap();
        s.revert_selected().unwrap();
        assert_eq!(s.fixes()[20].lat, original);
        s.revert_selected().unwrap();
        assert_eq!(s.fixes()[20].lat, original);
    }

    #[test]
    fn dead_reckoning_zero_speed_pins_to_first_fix() {
        let mut s = session();
        let mut source = MockFixSource::new("still");
        for i in 0..100 {
            // drifting raw positions, but zero reported speed
            source.push_fix(
                RawFix::new(i as f64, 12.0 + i as f64 * 0.001, 44.0).with_heading(44.0),
            );
        }
        s.open_browse(Box::new(source)).unwrap();
        s.load_n(100).unwrap();
        s.set_model(PositionModel::DeadReckoning {
            drift_lon: 0.0,
            drift_lat: 0.0,
        })
        .unwrap();

        assert!(s.show_model_overlay());
        for fix in s.fixes() {
            assert!((fix.lon_model - 12.0).abs() < 1.0e-12);
            assert!((fix.lat_model - 44.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn bad_timestamp_deletion_scenario() {
        let mut s = session();
        let mut source = MockFixSource::new("dups");
        for t in [0.0, 1.0, 1.0, 1.0, 4.0] {
            source.push_fix(RawFix::new(t, 10.0, 50.0));
        }
        s.open_browse(Box::new(source)).unwrap();
        let outcome = s.load_n(5).unwrap();
        assert_eq!(outcome.bad_timestamps, 2);

        // mark fixes 1..=3 for interval repair
        for i in 0..s.fixes().len() {
            s.set_pixel_position(FieldKind::TimeInterval, i, i as i32 * 10, 0).unwrap();
        }
        s.set_active_field(FieldKind::TimeInterval);
        s.select_range(FieldKind::TimeInterval, 20, 0, 10).unwrap();

        assert!(matches!(
            s.check_timestamps(),
            Err(NavError::BadTimestamps { count: 2 })
        ));
        let deleted = s.delete_bad_timestamps().unwrap();
        assert_eq!(deleted, 2);
        let times: Vec<f64> = s.fixes().iter().map(|f| f.time.seconds).collect();
        assert_eq!(times, vec![0.0, 1.0, 4.0]);
        assert!(s.check_timestamps().is_ok());
    }

    #[test]
    fn timestamp_redistribution_restores_ordering() {
        let mut s = session();
        let mut source = MockFixSource::new("sticky-clock");
        for t in [0.0, 1.0, 1.0, 1.0, 4.0] {
            source.push_fix(RawFix::new(t, 10.0, 50.0));
        }
        s.open_browse(Box::new(source)).unwrap();
        s.load_n(5).unwrap();

        for i in 0..s.fixes().len() {
            s.set_pixel_position(FieldKind::TimeInterval, i, i as i32 * 10, 0).unwrap();
        }
        s.set_active_field(FieldKind::TimeInterval);
        s.select_range(FieldKind::TimeInterval, 20, 0, 10).unwrap();

        let changed = s.redistribute_timestamps().unwrap();
        assert_eq!(changed, 3);
        let times: Vec<f64> = s.fixes().iter().map(|f| f.time.seconds).collect();
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn switching_fields_clears_previous_selection() {
        let mut s = track_session(10, 1.0);
        mark_latitude(&mut s, &[3, 4]);
        assert_eq!(edit::selected_indices(s.fixes(), FieldKind::Latitude).len(), 2);

        s.set_active_field(FieldKind::Speed);
        assert!(edit::selected_indices(s.fixes(), FieldKind::Latitude).is_empty());
    }

    #[test]
    fn edits_without_data_are_rejected_without_state_change() {
        let mut s = session();
        assert!(matches!(s.pick(FieldKind::Latitude, 0, 0), Err(NavError::NoActiveSource)));
        assert!(matches!(s.load_n(5), Err(NavError::NoActiveSource)));
        assert_eq!(s.fixes().len(), 0);
    }

    #[test]
    fn second_open_without_close_is_rejected() {
        let mut s = session();
        s.open_browse(Box::new(MockFixSource::new("first"))).unwrap();
        let result = s.open_browse(Box::new(MockFixSource::new("second")));
        assert!(matches!(result, Err(NavError::Output { .. })));
    }

    #[test]
    fn reopen_after_close_gets_a_fresh_writer() {
        let sink_a = SharedSink::default();
        let sink_b = SharedSink::default();
        let mut s = session();

        s.open_output(
            Box::new(MockFixSource::with_track("a", 3, 0.0, 1.0, 10.0, 50.0, 0.0, 0.0)),
            Box::new(sink_a.clone()),
        )
        .unwrap();
        s.load_n(3).unwrap();
        s.close().unwrap();

        s.open_output(
            Box::new(MockFixSource::with_track("b", 2, 0.0, 1.0, 10.0, 50.0, 0.0, 0.0)),
            Box::new(sink_b.clone()),
        )
        .unwrap();
        s.load_n(2).unwrap();
        s.close().unwrap();

        let lines_a = String::from_utf8(sink_a.0.lock().unwrap().clone()).unwrap();
        let lines_b = String::from_utf8(sink_b.0.lock().unwrap().clone()).unwrap();
        assert_eq!(lines_a.lines().count(), 3);
        assert_eq!(lines_b.lines().count(), 2);
    }

    #[test]
    fn inversion_runs_over_the_visible_window_only() {
        let mut s = track_session(40, 1.0);
        s.set_visible_window(10, 30);
        s.set_model(PositionModel::Inversion {
            weight_speed: 1.0,
            weight_accel: 1.0,
        })
        .unwrap();

        let fixes = s.fixes();
        // outside the window the model position is still the raw default
        assert_eq!(fixes[0].lat_model, fixes[0].lat);
        // inside it the solver has produced a smooth value
        assert!(fixes[15].lat_model.is_finite());
    }

    #[test]
    fn gaussian_model_recomputes_after_position_edit() {
        let mut s = track_session(30, 1.0);
        s.set_model(PositionModel::GaussianMean { window_secs: 4.0 }).unwrap();
        let before = s.fixes()[15].lat_model;

        mark_latitude(&mut s, &[15]);
        s.offset_selected(0.01).unwrap();
        let after = s.fixes()[15].lat_model;
        assert!((after - before).abs() > 1.0e-6);
    }
}
