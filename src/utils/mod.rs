//! Shared utility functions.
//!
//! - [`content_length`] - Total size detection from HTTP responses

pub mod content_length;

pub use content_length::{parse_content_range_total, total_size};
