//! Extraction jobs.
//!
//! An [`Extractor`] unpacks a downloaded payload into a destination
//! directory. ZIP archives are unpacked entry by entry, RAR archives are
//! rejected and any other file is copied as is.
//!
//! ```rust,no_run
//! use haul::cancel::CancellationToken;
//! use haul::extractor::{ExtractionJobSpec, ExtractorBuilder};
//! use haul::jobs::JobId;
//!
//! # async fn example() -> haul::Result<()> {
//! let extractor = ExtractorBuilder::new().build();
//! let spec = ExtractionJobSpec::new("/roms/nes/game.zip", "/roms/nes/game")
//!     .delete_archive_on_success(true);
//! let extracted = extractor
//!     .execute(JobId::new(1), &spec, &CancellationToken::new())
//!     .await?;
//! println!("{} files", extracted.files_extracted);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extractor;
pub mod spec;

pub use config::{ExtractorBuilder, ExtractorConfig};
pub use extractor::{Extracted, Extractor};
pub use spec::ExtractionJobSpec;
