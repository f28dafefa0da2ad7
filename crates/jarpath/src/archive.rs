//! Archive metadata: dependency declarations in `META-INF/MANIFEST.MF`.
//!
//! Reading is best-effort. An archive that cannot be opened, has no manifest,
//! or has no classpath attribute simply declares no dependencies.

use crate::config::ClasspathConfig;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

/// Location of the manifest inside an archive.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Errors reading an archive. These never leave the crate: callers see an
/// empty dependency list instead.
#[derive(Error, Debug)]
pub(crate) enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("not a readable archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Main-section attributes of an archive manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveMetadata {
    /// Attributes in declaration order. Names keep their original case.
    attributes: Vec<(String, String)>,
}

impl ArchiveMetadata {
    /// Parse the main section of a manifest.
    ///
    /// Lines are `Name: value`; a line starting with a single space continues
    /// the previous value. The main section ends at the first blank line.
    /// Malformed lines are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut attributes: Vec<(String, String)> = Vec::new();

        for line in content.lines() {
            if line.is_empty() {
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = attributes.last_mut() {
                    value.push_str(continuation);
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                attributes.push((name.trim().to_string(), value.to_string()));
            }
        }

        Self { attributes }
    }

    /// Look up an attribute; names compare case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whitespace-separated paths listed under `attribute`, in order.
    #[must_use]
    pub fn paths(&self, attribute: &str) -> Vec<String> {
        self.get(attribute)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Number of attributes in the main section.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if the main section has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Read the manifest of the archive at `path`.
    ///
    /// Returns `None` for archives without a manifest.
    pub(crate) fn from_archive(path: &Path) -> Result<Option<Self>, ArchiveError> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut entry = match archive.by_name(MANIFEST_PATH) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(Some(Self::parse(&String::from_utf8_lossy(&bytes))))
    }
}

/// Reads declared dependency paths from archives.
#[derive(Debug, Clone)]
pub struct ManifestReader {
    attribute: String,
}

impl ManifestReader {
    /// Create a reader for the configured manifest attribute.
    #[must_use]
    pub fn new(config: &ClasspathConfig) -> Self {
        Self {
            attribute: config.manifest_attribute.clone(),
        }
    }

    /// The dependency paths declared by `archive`, relative to its directory.
    ///
    /// Never fails: unreadable archives declare nothing.
    #[must_use]
    pub fn read_dependencies(&self, archive: &Path) -> Vec<String> {
        match ArchiveMetadata::from_archive(archive) {
            Ok(Some(metadata)) => metadata.paths(&self.attribute),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::debug!("Ignoring metadata of {}: {e}", archive.display());
                Vec::new()
            }
        }
    }
}

impl Default for ManifestReader {
    fn default() -> Self {
        Self::new(&ClasspathConfig::default())
    }
}

/// Returns true if the archive at `path` has an entry named `entry`.
///
/// Unreadable archives have no entries.
pub(crate) fn contains_entry(path: &Path, entry: &str) -> bool {
    let archive = File::open(path)
        .map_err(ArchiveError::from)
        .and_then(|file| ZipArchive::new(file).map_err(ArchiveError::from));
    match archive {
        Ok(archive) => archive.file_names().any(|name| name == entry),
        Err(e) => {
            log::debug!("Cannot list entries of {}: {e}", path.display());
            false
        }
    }
}
