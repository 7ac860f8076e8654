//! Core types and constants for the navigation fix editor

pub mod constants;
pub mod scale;
pub mod types;

pub use constants::*;
pub use scale::CoordinateScale;
pub use types::*;
