//! Time-series edit model: selection, interpolation, timestamp repair and
//! derived motion

pub mod interpolate;
pub mod motion;
pub mod selection;
pub mod timestamps;

pub use interpolate::{interpolate_gaps, interpolate_repeats, rebuild_intervals};
pub use motion::{normalize_course, recompute_made_good};
pub use selection::{
    clear_other_fields, deselect_all, offset_selected, pick, revert_selected, select_all,
    select_radius, selected_indices, set_flag_at,
};
pub use timestamps::{bad_marked_indices, find_bad, redistribute_marked};
