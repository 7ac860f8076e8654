//! Mock record source for testing and development

use crate::source::{RawFix, RecordSource, SourceError, SourceResult};
use std::collections::VecDeque;

/// Scripted record source used by tests and interactive development.
///
/// Fixes are queued up front and handed out in order; optional error
/// injection exercises the recovery paths the same way a flaky file or
/// device would.
pub struct MockFixSource {
    id: String,
    queue: VecDeque<RawFix>,
    open: bool,
    simulate_errors: bool,
    error_probability: f32,
    fixes_delivered: usize,
}

impl MockFixSource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            queue: VecDeque::new(),
            open: true,
            simulate_errors: false,
            error_probability: 0.0,
            fixes_delivered: 0,
        }
    }

    /// Queue a single fix
    pub fn push_fix(&mut self, fix: RawFix) {
        self.queue.push_back(fix);
    }

    /// Build a source holding a uniform straight-line track: `count` fixes
    /// spaced `dt` seconds apart, stepping by (`dlon`, `dlat`) degrees per
    /// fix from the given start.
    #[allow(clippy::too_many_arguments)]
    pub fn with_track(
        id: impl Into<String>,
        count: usize,
        start_time: f64,
        dt: f64,
        start_lon: f64,
        start_lat: f64,
        dlon: f64,
        dlat: f64,
    ) -> Self {
        let mut source = Self::new(id);
        for i in 0..count {
            let t = start_time + i as f64 * dt;
            source.push_fix(
                RawFix::new(t, start_lon + i as f64 * dlon, start_lat + i as f64 * dlat)
                    .with_speed(10.0)
                    .with_heading(0.0)
                    .with_draft(2.0),
            );
        }
        source
    }

    /// Enable error injection with the given probability (0.0 to 1.0)
    pub fn simulate_errors(&mut self, enable: bool, probability: f32) {
        self.simulate_errors = enable;
        self.error_probability = probability.clamp(0.0, 1.0);
    }

    /// Close the source, making further reads fail
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Fixes still queued
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Fixes handed out so far
    pub fn fixes_delivered(&self) -> usize {
        self.fixes_delivered
    }

    fn should_inject_error(&self) -> bool {
        if !self.simulate_errors {
            return false;
        }
        use rand::Rng;
        rand::thread_rng().gen::<f32>() < self.error_probability
    }
}

impl RecordSource for MockFixSource {
    fn next_fix(&mut self) -> SourceResult<Option<RawFix>> {
        if !self.open {
            return Err(SourceError::Closed {
                source_id: self.id.clone(),
            });
        }

        if self.should_inject_error() {
            return Err(SourceError::Io {
                details: "injected read failure".to_string(),
            });
        }

        match self.queue.pop_front() {
            Some(fix) => {
                self.fixes_delivered += 1;
                Ok(Some(fix))
            }
            None => Ok(None),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
