//! Scan scheduling: debounce timers and forced scans.

pub mod error;
pub mod scan_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use scan_scheduler::{ScanScheduler, ScanSchedulerConfig};
