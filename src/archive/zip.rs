//! ZIP extraction for archives on local storage.
//!
//! Entries are copied out in fixed-size chunks so that a cancellation request
//! is noticed within one chunk, even for very large entries.

use crate::error::{Error, Result};

use ::zip::ZipArchive;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default size of a single write while extracting an entry.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Extracts every entry of a ZIP archive into a directory.
pub struct ZipExtractor {
    archive: ZipArchive<File>,
    chunk_size: usize,
    file_count: usize,
}

impl ZipExtractor {
    /// Opens the archive at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut file_count = 0;
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            if !entry.is_dir() && entry.enclosed_name().is_some() {
                file_count += 1;
            }
        }
        Ok(Self {
            archive,
            chunk_size: DEFAULT_CHUNK_SIZE,
            file_count,
        })
    }

    /// Sets the size of a single write.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Number of file entries [`extract_to`](Self::extract_to) will write.
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// Extracts all entries below `dest`, recreating directories.
    ///
    /// `on_entry` is called before each file entry with its name and the
    /// number of files already written. Entries whose path would escape
    /// `dest` are skipped. Returns the number of files written.
    pub fn extract_to<F>(
        &mut self,
        dest: &Path,
        cancel: &CancellationToken,
        mut on_entry: F,
    ) -> Result<usize>
    where
        F: FnMut(&str, usize),
    {
        let mut buffer = vec![0u8; self.chunk_size];
        let mut written = 0;

        for index in 0..self.archive.len() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let mut entry = self.archive.by_index(index)?;
            let name = entry.name().to_string();
            let relative = match entry.enclosed_name() {
                Some(path) => path,
                None => {
                    warn!("Skipping entry with unsafe path {:?}", name);
                    continue;
                }
            };
            let out_path = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
                continue;
            }

            on_entry(&name, written);
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }

            debug!("Extracting {} to {:?}", name, out_path);
            let mut out = File::create(&out_path)?;
            loop {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let read = entry.read(&mut buffer)?;
                if read == 0 {
                    break;
                }
                out.write_all(&buffer[..read])?;
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
                }
            }

            written += 1;
        }

        Ok(written)
    }
}
