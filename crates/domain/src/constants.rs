//! Domain constants shared across crates

/// Largest input the detector will accept, in bytes (1 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Candidates below this confidence are discarded before overlap resolution.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.55;

/// Total finding count above which a scan is classified high risk regardless
/// of finding types.
pub const DEFAULT_HIGH_COUNT_THRESHOLD: usize = 10;

/// Minimum number of characters required in a review justification.
pub const DEFAULT_MIN_JUSTIFICATION_CHARS: usize = 20;

/// Trailing debounce window for scheduled scans, in seconds.
pub const DEFAULT_DEBOUNCE_SECS: u64 = 30;

/// Confidence boost applied when a contextual keyword appears near a match.
pub const CONTEXT_CONFIDENCE_BOOST: f64 = 0.15;

/// Characters of surrounding text searched for contextual keywords.
pub const CONTEXT_WINDOW_CHARS: usize = 48;
