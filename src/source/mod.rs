//! Record source abstraction for navigation fix streams
//!
//! A record source yields raw fixes in file order and signals end-of-data
//! distinctly from read failures. Concrete sources cover the flat
//! navigation text format and a scripted mock for tests; decoders for
//! specific sonar systems live outside this crate and plug in through the
//! same trait.

pub mod error;
pub mod mock;
pub mod text;

pub use error::{SourceError, SourceRecovery, SourceResult};
pub use mock::MockFixSource;
pub use text::TextFixSource;

/// One raw navigation record as delivered by a source, before any editing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFix {
    /// Continuous seconds since the Unix epoch
    pub time_secs: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Speed over ground (km/h)
    pub speed: f64,
    /// Compass heading (degrees)
    pub heading: f64,
    /// Sonar draft (meters)
    pub draft: f64,
    pub roll: f64,
    pub pitch: f64,
    pub heave: f64,
}

impl RawFix {
    pub fn new(time_secs: f64, lon: f64, lat: f64) -> Self {
        Self {
            time_secs,
            lon,
            lat,
            speed: 0.0,
            heading: 0.0,
            draft: 0.0,
            roll: 0.0,
            pitch: 0.0,
            heave: 0.0,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    pub fn with_draft(mut self, draft: f64) -> Self {
        self.draft = draft;
        self
    }

    pub fn with_attitude(mut self, roll: f64, pitch: f64, heave: f64) -> Self {
        self.roll = roll;
        self.pitch = pitch;
        self.heave = heave;
        self
    }
}

/// Abstraction over a stream of navigation fixes
pub trait RecordSource {
    /// Pull the next fix in file order.
    /// Returns `Ok(Some(fix))` while records remain, `Ok(None)` at
    /// end-of-data, and `Err` on read failures.
    fn next_fix(&mut self) -> SourceResult<Option<RawFix>>;

    /// Identifier for diagnostics (file path, mock name)
    fn id(&self) -> &str;

    /// Whether the source can still be read
    fn is_open(&self) -> bool;
}
