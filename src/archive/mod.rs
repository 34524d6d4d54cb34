//! Archive classification and extraction.
//!
//! This module decides what kind of payload a downloaded file holds and
//! unpacks the one supported container format, ZIP, from local storage.

pub mod detect;
pub mod zip;

pub use detect::{classify, classify_bytes, classify_extension, ArchiveKind};
pub use zip::ZipExtractor;
