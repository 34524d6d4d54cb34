//! Progress reporting for running jobs.
//!
//! Executors report through a [`ProgressSink`]. Numeric progress is rate
//! limited per job (500 ms by default) and never decreases; entry names of
//! an extraction are reported once per entry.
//!
//! - `sink` - The sink trait, the no-op sink and the rate limiter
//! - `display` - An `indicatif` renderer drawing one bar per job
//! - `style` - Progress bar styling options
//!
//! # Examples
//!
//! ```rust
//! use haul::jobs::{JobId, JobKind};
//! use haul::progress::ProgressSink;
//!
//! #[derive(Debug)]
//! struct Log;
//!
//! impl ProgressSink for Log {
//!     fn on_progress(&self, job: JobId, current: u64, total: Option<u64>, pct: Option<u8>) {
//!         println!("{job}: {current}/{total:?} ({pct:?}%)");
//!     }
//!
//!     fn on_current_entry(&self, job: JobId, name: &str) {
//!         println!("{job}: {name}");
//!     }
//! }
//! ```

pub(crate) mod display;
pub(crate) mod sink;
pub(crate) mod style;

pub use display::ProgressBars;
pub(crate) use sink::ProgressReporter;
pub use sink::{percentage, NoopProgress, ProgressSink, DEFAULT_PROGRESS_INTERVAL};
pub use style::{ProgressBarOpts, StyleOptions};
