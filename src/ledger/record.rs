//! Ledger records and their text encoding.
//!
//! A ledger file looks like this:
//!
//! ```text
//! SLUG:super-mario-bros
//! http://a/x.zip	/roms/nes/game
//! http://b/x.zip
//! http://c/x.zip	ERROR:disk full
//! ```
//!
//! The optional first line carries the logical id. Every other line is one
//! [`SourceRecord`]: a URL, optionally followed by a tab and either the
//! extraction directory or `ERROR:` and a message.

use std::fmt;
use std::path::{Path, PathBuf};

const SLUG_PREFIX: &str = "SLUG:";
const ERROR_PREFIX: &str = "ERROR:";
const LEDGER_EXTENSION: &str = "status";

/// The (directory, file name) pair identifying one downloadable asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadTarget {
    directory: PathBuf,
    file_name: String,
}

impl DownloadTarget {
    /// Creates a new [`DownloadTarget`].
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    /// Directory holding the asset and its ledger.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File name of the asset.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full path of the asset itself.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Path of the ledger file: `<directory>/<file name>.status`.
    pub fn ledger_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.file_name, LEDGER_EXTENSION))
    }
}

impl fmt::Display for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

/// What is known about one source URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Downloaded, never extracted.
    Pending,
    /// Extracted into the given directory. Never changes afterwards.
    Extracted(String),
    /// Last extraction or download attempt failed with the given message.
    Failed(String),
}

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub url: String,
    pub outcome: Outcome,
}

impl SourceRecord {
    /// Creates a bare record for `url`.
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: Outcome::Pending,
        }
    }

    /// Whether an outcome may still be written to this record.
    pub fn is_eligible(&self) -> bool {
        !matches!(self.outcome, Outcome::Extracted(_))
    }

    fn parse_line(line: &str) -> Self {
        match line.split_once('\t') {
            None => Self::pending(line),
            Some((url, "")) => Self::pending(url),
            Some((url, rest)) => {
                let outcome = match rest.strip_prefix(ERROR_PREFIX) {
                    Some(message) => Outcome::Failed(message.to_string()),
                    None => Outcome::Extracted(rest.to_string()),
                };
                Self {
                    url: url.to_string(),
                    outcome,
                }
            }
        }
    }
}

impl fmt::Display for SourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Pending => write!(f, "{}", self.url),
            Outcome::Extracted(dir) => write!(f, "{}\t{}", self.url, dir),
            Outcome::Failed(message) => write!(f, "{}\t{}{}", self.url, ERROR_PREFIX, message),
        }
    }
}

/// The whole content of one ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerDocument {
    pub slug: Option<String>,
    pub records: Vec<SourceRecord>,
}

impl LedgerDocument {
    /// Parses ledger text. Blank lines are ignored; `\r\n` endings are accepted.
    pub fn parse(text: &str) -> Self {
        let mut document = Self::default();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            if document.slug.is_none() && document.records.is_empty() {
                if let Some(slug) = line.strip_prefix(SLUG_PREFIX) {
                    document.slug = Some(slug.to_string());
                    continue;
                }
            }
            document.records.push(SourceRecord::parse_line(line));
        }
        document
    }

    /// Whether a record with exactly this URL exists.
    pub fn contains(&self, url: &str) -> bool {
        self.records.iter().any(|r| r.url == url)
    }

    /// Appends a bare record unless the URL is already present.
    ///
    /// Returns `true` when a record was added.
    pub fn append(&mut self, url: &str) -> bool {
        if self.contains(url) {
            return false;
        }
        self.records.push(SourceRecord::pending(url));
        true
    }

    /// The first record that is bare or carries an error.
    pub fn first_eligible_mut(&mut self) -> Option<&mut SourceRecord> {
        self.records.iter_mut().find(|r| r.is_eligible())
    }

    /// Whether any source has been extracted.
    pub fn is_installed(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r.outcome, Outcome::Extracted(_)))
    }

    /// The directory of the first extracted source, if any.
    pub fn extraction_path(&self) -> Option<&str> {
        self.records.iter().find_map(|r| match &r.outcome {
            Outcome::Extracted(dir) => Some(dir.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for LedgerDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(slug) = &self.slug {
            writeln!(f, "{}{}", SLUG_PREFIX, slug)?;
        }
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}
