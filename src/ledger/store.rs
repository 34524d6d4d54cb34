//! Storage backends for ledgers.

use super::record::{DownloadTarget, LedgerDocument};

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Key-value storage for ledgers, keyed by [`DownloadTarget`].
///
/// Implementations only load and save whole documents. The read-modify-write
/// cycle is not atomic across callers; at most one job may write a given
/// target at a time.
pub trait LedgerStore: Send + Sync + Debug {
    /// Loads the ledger of `target`, or `None` when it does not exist.
    fn load(&self, target: &DownloadTarget) -> io::Result<Option<LedgerDocument>>;

    /// Replaces the ledger of `target` with `document`.
    fn save(&self, target: &DownloadTarget, document: &LedgerDocument) -> io::Result<()>;
}

/// Ledgers stored as `<directory>/<file name>.status` text files.
///
/// Saving writes a temporary file next to the ledger and renames it over the
/// old one, so a crash leaves either the old or the new content. A rewritten
/// ledger keeps the permissions of the file it replaces; a new one gets the
/// usual mode of a freshly created file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLedgerStore;

impl LedgerStore for FileLedgerStore {
    fn load(&self, target: &DownloadTarget) -> io::Result<Option<LedgerDocument>> {
        match fs::read_to_string(target.ledger_path()) {
            Ok(text) => Ok(Some(LedgerDocument::parse(&text))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, target: &DownloadTarget, document: &LedgerDocument) -> io::Result<()> {
        let path = target.ledger_path();
        fs::create_dir_all(target.directory())?;

        let existing = match fs::metadata(&path) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };

        let mut tmp = temp_ledger(target.directory())?;
        tmp.write_all(document.to_string().as_bytes())?;
        if let Some(permissions) = existing {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!("Rewrote ledger {:?}", path);
        Ok(())
    }
}

/// Creates the temporary file a ledger is written to before the rename.
fn temp_ledger(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".status");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask, like `File::create`.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

/// Ledgers kept in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    documents: Mutex<HashMap<DownloadTarget, LedgerDocument>>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, target: &DownloadTarget) -> io::Result<Option<LedgerDocument>> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        Ok(documents.get(target).cloned())
    }

    fn save(&self, target: &DownloadTarget, document: &LedgerDocument) -> io::Result<()> {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents.insert(target.clone(), document.clone());
        Ok(())
    }
}
