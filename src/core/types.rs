//! Core data types for the navigation fix editor

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};

/// Editable per-fix fields that carry independent selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Expected time interval to the previous fix; edits act on the timestamp
    TimeInterval,
    Longitude,
    Latitude,
    Speed,
    Heading,
    Draft,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::TimeInterval,
        FieldKind::Longitude,
        FieldKind::Latitude,
        FieldKind::Speed,
        FieldKind::Heading,
        FieldKind::Draft,
    ];

    /// Stable index used for per-field arrays (pixel cache, selection flags)
    pub fn index(self) -> usize {
        match self {
            FieldKind::TimeInterval => 0,
            FieldKind::Longitude => 1,
            FieldKind::Latitude => 2,
            FieldKind::Speed => 3,
            FieldKind::Heading => 4,
            FieldKind::Draft => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::TimeInterval => "time interval",
            FieldKind::Longitude => "longitude",
            FieldKind::Latitude => "latitude",
            FieldKind::Speed => "speed",
            FieldKind::Heading => "heading",
            FieldKind::Draft => "draft",
        }
    }

    /// Whether the exclude-from-inversion flag applies to this field
    pub fn supports_flagging(self) -> bool {
        matches!(self, FieldKind::Longitude | FieldKind::Latitude)
    }
}

/// Fix timestamp held as calendar components and continuous epoch seconds.
///
/// The two representations are kept consistent: mutate through
/// [`FixTime::from_epoch_seconds`] or [`FixTime::set_epoch_seconds`] and the
/// calendar fields are rebuilt to match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// Second of minute including the fractional part
    pub second: f64,
    /// Continuous seconds since the Unix epoch
    pub seconds: f64,
}

impl FixTime {
    /// Build a timestamp from continuous epoch seconds
    pub fn from_epoch_seconds(seconds: f64) -> Self {
        let mut whole = seconds.floor() as i64;
        let mut micros = ((seconds - whole as f64) * 1.0e6).round() as i64;
        if micros >= 1_000_000 {
            whole += 1;
            micros -= 1_000_000;
        }
        let datetime: DateTime<Utc> = Utc
            .timestamp_opt(whole, (micros as u32) * 1_000)
            .single()
            .unwrap_or_default();

        Self {
            year: datetime.year(),
            month: datetime.month(),
            day: datetime.day(),
            hour: datetime.hour(),
            minute: datetime.minute(),
            second: datetime.second() as f64 + micros as f64 / 1.0e6,
            seconds,
        }
    }

    /// Build a timestamp from calendar components.
    /// Returns `None` for out-of-range components.
    pub fn from_components(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    ) -> Option<Self> {
        let whole_second = second.floor() as u32;
        let micros = ((second - whole_second as f64) * 1.0e6).round() as u32;
        let naive = NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_micro_opt(hour, minute, whole_second, micros)?;
        let datetime = naive.and_utc();
        let seconds = datetime.timestamp() as f64
            + datetime.timestamp_subsec_micros() as f64 / 1.0e6;

        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            seconds,
        })
    }

    /// Move the timestamp, rebuilding the calendar components
    pub fn set_epoch_seconds(&mut self, seconds: f64) {
        *self = Self::from_epoch_seconds(seconds);
    }
}

/// Screen position of a fix in one plot, cached by the renderer and read
/// back only for hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared pixel distance to a pointer position
    pub fn distance_squared(&self, x: i32, y: i32) -> i64 {
        let dx = (self.x - x) as i64;
        let dy = (self.y - y) as i64;
        dx * dx + dy * dy
    }
}

/// Per-field selection state for one fix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionFlags {
    flags: [bool; 6],
}

impl SelectionFlags {
    pub fn get(&self, field: FieldKind) -> bool {
        self.flags[field.index()]
    }

    pub fn set(&mut self, field: FieldKind, selected: bool) {
        self.flags[field.index()] = selected;
    }

    pub fn toggle(&mut self, field: FieldKind) {
        self.flags[field.index()] = !self.flags[field.index()];
    }

    /// Clear selection on every field except the one given
    pub fn clear_except(&mut self, keep: FieldKind) {
        for field in FieldKind::ALL {
            if field != keep {
                self.flags[field.index()] = false;
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.flags = [false; 6];
    }

    pub fn any(&self) -> bool {
        self.flags.iter().any(|&f| f)
    }
}

/// One navigation fix: time, position, speed, heading and attitude, with
/// load-time snapshots for every editable field.
///
/// Current and original values live side by side as named fields so edits
/// and reverts can never drift out of step.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    /// Position within the active buffer; reassigned when the buffer shifts
    pub index: usize,
    /// Global record number within the source, never reused
    pub record: usize,
    pub time: FixTime,
    pub time_org: FixTime,
    /// Expected seconds to the previous fix (0 for the first loaded fix)
    pub interval: f64,
    pub interval_org: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    pub lon_org: f64,
    /// Model-derived longitude; defined for every fix once a model has run
    pub lon_model: f64,
    /// Latitude in decimal degrees
    pub lat: f64,
    pub lat_org: f64,
    pub lat_model: f64,
    /// Speed over ground (km/h)
    pub speed: f64,
    pub speed_org: f64,
    /// Compass heading (degrees)
    pub heading: f64,
    pub heading_org: f64,
    /// Sonar draft (meters)
    pub draft: f64,
    pub draft_org: f64,
    pub roll: f64,
    pub pitch: f64,
    pub heave: f64,
    /// Speed actually achieved between consecutive positions (km/h)
    pub speed_made_good: f64,
    /// Course actually achieved between consecutive positions (degrees)
    pub course_made_good: f64,
    pub selected: SelectionFlags,
    /// Excluded-from-inversion flag; applies to longitude/latitude only
    pub flagged: bool,
    /// Renderer-cached screen positions, one slot per [`FieldKind`]
    pub pixel: [Option<PixelPos>; 6],
}

impl Fix {
    /// Create a fix from raw sensor values, snapshotting every editable
    /// field. `interval` is the expected gap to the predecessor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        record: usize,
        time_secs: f64,
        lon: f64,
        lat: f64,
        speed: f64,
        heading: f64,
        draft: f64,
        roll: f64,
        pitch: f64,
        heave: f64,
        interval: f64,
    ) -> Self {
        let time = FixTime::from_epoch_seconds(time_secs);
        Self {
            index: 0,
            record,
            time,
            time_org: time,
            interval,
            interval_org: interval,
            lon,
            lon_org: lon,
            lon_model: lon,
            lat,
            lat_org: lat,
            lat_model: lat,
            speed,
            speed_org: speed,
            heading,
            heading_org: heading,
            draft,
            draft_org: draft,
            roll,
            pitch,
            heave,
            speed_made_good: 0.0,
            course_made_good: heading,
            selected: SelectionFlags::default(),
            flagged: false,
            pixel: [None; 6],
        }
    }

    /// Current editable value for a field. The time-interval field edits the
    /// timestamp, so its value is the continuous time in seconds.
    pub fn value(&self, field: FieldKind) -> f64 {
        match field {
            FieldKind::TimeInterval => self.time.seconds,
            FieldKind::Longitude => self.lon,
            FieldKind::Latitude => self.lat,
            FieldKind::Speed => self.speed,
            FieldKind::Heading => self.heading,
            FieldKind::Draft => self.draft,
        }
    }

    /// Load-time snapshot for a field; the sole revert target
    pub fn original(&self, field: FieldKind) -> f64 {
        match field {
            FieldKind::TimeInterval => self.time_org.seconds,
            FieldKind::Longitude => self.lon_org,
            FieldKind::Latitude => self.lat_org,
            FieldKind::Speed => self.speed_org,
            FieldKind::Heading => self.heading_org,
            FieldKind::Draft => self.draft_org,
        }
    }

    /// Set the current value for a field. Timestamp edits rebuild the
    /// calendar components; the caller recomputes intervals.
    pub fn set_value(&mut self, field: FieldKind, value: f64) {
        match field {
            FieldKind::TimeInterval => self.time.set_epoch_seconds(value),
            FieldKind::Longitude => self.lon = value,
            FieldKind::Latitude => self.lat = value,
            FieldKind::Speed => self.speed = value,
            FieldKind::Heading => self.heading = value,
            FieldKind::Draft => self.draft = value,
        }
    }

    /// Restore a field to its load-time snapshot
    pub fn revert(&mut self, field: FieldKind) {
        match field {
            FieldKind::TimeInterval => {
                self.time = self.time_org;
                self.interval = self.interval_org;
            }
            FieldKind::Longitude => self.lon = self.lon_org,
            FieldKind::Latitude => self.lat = self.lat_org,
            FieldKind::Speed => self.speed = self.speed_org,
            FieldKind::Heading => self.heading = self.heading_org,
            FieldKind::Draft => self.draft = self.draft_org,
        }
    }
}
