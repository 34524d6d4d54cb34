//! Archive type detection.
//!
//! Classification looks at the file extension first, which settles the
//! common case without any I/O, and only reads the leading magic bytes when
//! the extension says nothing.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const RAR_MAGIC: [u8; 4] = [0x52, 0x61, 0x72, 0x21];

/// What kind of payload a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// A ZIP container, which can be extracted.
    Zip,
    /// A RAR container: recognized, but extraction is not supported.
    Rar,
    /// Anything else. Treated as a plain file.
    Unknown,
}

impl ArchiveKind {
    /// Whether entries of this kind can be unpacked.
    pub fn is_supported(&self) -> bool {
        matches!(self, ArchiveKind::Zip)
    }

    /// Whether this is a known container format, supported or not.
    pub fn is_archive(&self) -> bool {
        !matches!(self, ArchiveKind::Unknown)
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArchiveKind::Zip => "ZIP",
            ArchiveKind::Rar => "RAR",
            ArchiveKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classifies the file at `path`.
///
/// Unreadable or short files are reported as [`ArchiveKind::Unknown`].
pub fn classify(path: &Path) -> ArchiveKind {
    if let Some(kind) = classify_extension(path) {
        return kind;
    }

    let mut head = Vec::with_capacity(ZIP_MAGIC.len());
    match File::open(path) {
        Ok(file) => match file.take(ZIP_MAGIC.len() as u64).read_to_end(&mut head) {
            Ok(_) => classify_bytes(&head),
            Err(_) => ArchiveKind::Unknown,
        },
        Err(_) => ArchiveKind::Unknown,
    }
}

/// Classifies by file extension alone, case-insensitively.
pub fn classify_extension(path: &Path) -> Option<ArchiveKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "zip" => Some(ArchiveKind::Zip),
        "rar" => Some(ArchiveKind::Rar),
        _ => None,
    }
}

/// Classifies by the leading magic bytes.
pub fn classify_bytes(head: &[u8]) -> ArchiveKind {
    if head.starts_with(&ZIP_MAGIC) {
        ArchiveKind::Zip
    } else if head.starts_with(&RAR_MAGIC) {
        ArchiveKind::Rar
    } else {
        ArchiveKind::Unknown
    }
}
