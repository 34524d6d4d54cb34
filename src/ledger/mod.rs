//! Durable per-target status records.
//!
//! The ledger is the single source of truth for whether an asset has been
//! downloaded and installed. It lists every source URL that produced the
//! asset, in first-seen order, together with the outcome of the last
//! extraction attempt. Nothing in this crate ever deletes a ledger.
//!
//! # Examples
//!
//! ```rust
//! use haul::ledger::{DownloadTarget, MemoryLedgerStore, StatusLedger};
//! use std::path::Path;
//!
//! # fn example() -> haul::Result<()> {
//! let ledger = StatusLedger::new(MemoryLedgerStore::new());
//! let target = DownloadTarget::new("/roms/nes", "game.zip");
//!
//! ledger.append_source_url(&target, "http://a/x.zip", None, Some("smb"))?;
//! ledger.set_extraction_path(&target, Path::new("/roms/nes/game"))?;
//! assert!(ledger.is_installed(&target)?);
//! # Ok(())
//! # }
//! ```

pub mod record;
pub mod store;

pub use record::{DownloadTarget, LedgerDocument, Outcome, SourceRecord};
pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore};

use crate::error::{Error, Result};

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read and update operations over a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct StatusLedger {
    store: Arc<dyn LedgerStore>,
}

impl Default for StatusLedger {
    fn default() -> Self {
        Self::new(FileLedgerStore)
    }
}

impl StatusLedger {
    /// Creates a ledger over the given store.
    pub fn new(store: impl LedgerStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Creates a ledger over a shared store.
    pub fn with_store(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Reads the ledger of `target`.
    pub fn read(&self, target: &DownloadTarget) -> Result<Option<LedgerDocument>> {
        Ok(self.store.load(target)?)
    }

    /// Records `url` (and `alt_url` when distinct) as sources of `target`.
    ///
    /// Creates the ledger when absent. An existing SLUG line is kept; one is
    /// written from `logical_id` only when none exists. Existing records are
    /// never removed or reordered, and URLs already present are not repeated.
    ///
    /// URLs containing tabs or line breaks and logical ids containing line
    /// breaks are rejected with [`Error::InvalidLedgerValue`].
    pub fn append_source_url(
        &self,
        target: &DownloadTarget,
        url: &str,
        alt_url: Option<&str>,
        logical_id: Option<&str>,
    ) -> Result<()> {
        check_field(url, &['\t', '\r', '\n'])?;
        if let Some(alt) = alt_url {
            check_field(alt, &['\t', '\r', '\n'])?;
        }
        if let Some(id) = logical_id {
            check_field(id, &['\r', '\n'])?;
        }

        let existing = self.store.load(target)?;
        let created = existing.is_none();
        let mut document = existing.unwrap_or_default();
        let mut changed = created;

        if document.slug.is_none() {
            if let Some(id) = logical_id {
                document.slug = Some(id.to_string());
                changed = true;
            }
        }

        changed |= document.append(url);
        if let Some(alt) = alt_url.filter(|alt| *alt != url) {
            changed |= document.append(alt);
        }

        if changed {
            debug!("Recording source {} for {}", url, target);
            self.store.save(target, &document)?;
        }
        Ok(())
    }

    /// Marks the first bare or failed record as extracted into `dest_dir`.
    ///
    /// Returns `false` when the ledger is absent or every record already
    /// carries a success. A path containing line breaks is rejected with
    /// [`Error::InvalidLedgerValue`] and the ledger is left unchanged.
    pub fn set_extraction_path(&self, target: &DownloadTarget, dest_dir: &Path) -> Result<bool> {
        let destination = dest_dir.to_string_lossy().into_owned();
        check_field(&destination, &['\r', '\n'])?;
        self.update_first_eligible(target, Outcome::Extracted(destination))
    }

    /// Records `message` as the error of the first bare or failed record.
    ///
    /// A previous error is replaced; a success is never overwritten. Line
    /// breaks in `message` are flattened to spaces.
    pub fn set_error(&self, target: &DownloadTarget, message: &str) -> Result<bool> {
        let message = message.replace("\r\n", " ").replace(['\r', '\n'], " ");
        self.update_first_eligible(target, Outcome::Failed(message))
    }

    /// Records a job failure, logging instead of returning a ledger error.
    pub(crate) fn record_failure(&self, target: &DownloadTarget, message: &str) {
        if let Err(e) = self.set_error(target, message) {
            warn!("Could not record failure for {}: {}", target, e);
        }
    }

    /// Whether any source of `target` has been extracted.
    pub fn is_installed(&self, target: &DownloadTarget) -> Result<bool> {
        Ok(self
            .store
            .load(target)?
            .is_some_and(|document| document.is_installed()))
    }

    /// Whether `url` is already recorded for `target`.
    pub fn has_source(&self, target: &DownloadTarget, url: &str) -> Result<bool> {
        Ok(self
            .store
            .load(target)?
            .is_some_and(|document| document.contains(url)))
    }

    fn update_first_eligible(&self, target: &DownloadTarget, outcome: Outcome) -> Result<bool> {
        let Some(mut document) = self.store.load(target)? else {
            debug!("No ledger for {}, nothing to update", target);
            return Ok(false);
        };
        let Some(record) = document.first_eligible_mut() else {
            debug!("No eligible record in ledger for {}", target);
            return Ok(false);
        };
        record.outcome = outcome;
        self.store.save(target, &document)?;
        Ok(true)
    }
}

/// Rejects values that would split or corrupt a ledger line.
fn check_field(value: &str, forbidden: &[char]) -> Result<()> {
    if value.contains(forbidden) {
        return Err(Error::InvalidLedgerValue(value.to_string()));
    }
    Ok(())
}
