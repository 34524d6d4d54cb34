//! Description of one extraction job.

use crate::ledger::DownloadTarget;

use std::path::{Path, PathBuf};

/// Everything the extraction executor needs to unpack one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJobSpec {
    /// The downloaded payload.
    pub archive_path: PathBuf,
    /// Directory receiving the extracted files.
    pub dest_dir: PathBuf,
    /// Remove the payload once at least one file was produced.
    pub delete_archive_on_success: bool,
    /// Human readable name for progress display.
    pub title: String,
    /// Logical id of the asset.
    pub logical_id: Option<String>,
    /// Ledger file name, when it differs from the payload's name.
    pub file_name: Option<String>,
    /// Ledger directory, when it differs from the payload's folder.
    pub download_base_dir: Option<PathBuf>,
}

impl ExtractionJobSpec {
    /// Creates a new [`ExtractionJobSpec`] titled after the payload's name.
    pub fn new(archive_path: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        let archive_path = archive_path.into();
        let title = archive_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            archive_path,
            dest_dir: dest_dir.into(),
            delete_archive_on_success: false,
            title,
            logical_id: None,
            file_name: None,
            download_base_dir: None,
        }
    }

    /// Remove the payload after a successful extraction.
    pub fn delete_archive_on_success(mut self, delete: bool) -> Self {
        self.delete_archive_on_success = delete;
        self
    }

    /// Sets the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the logical id.
    pub fn logical_id(mut self, id: impl Into<String>) -> Self {
        self.logical_id = Some(id.into());
        self
    }

    /// Sets the ledger file name.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Sets the ledger directory.
    pub fn download_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_base_dir = Some(dir.into());
        self
    }

    /// Ledger key of the downloaded asset.
    pub fn target(&self) -> DownloadTarget {
        let directory = self
            .download_base_dir
            .clone()
            .or_else(|| self.archive_path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let file_name = self.file_name.clone().unwrap_or_else(|| {
            self.archive_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        DownloadTarget::new(directory, file_name)
    }
}
