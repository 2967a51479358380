//! PHI pattern detection.
//!
//! The matching model is kept as an explicit data table (type, patterns,
//! priority, confidence) so tuning a pattern never touches the overlap
//! resolution logic.

pub mod detector;
pub(crate) mod patterns;

pub use detector::PhiDetector;
