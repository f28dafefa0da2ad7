//! Resolution of versioned archive names.
//!
//! A request for `lib/foo.jar` that does not exist on disk is satisfied by a
//! sibling such as `lib/foo-2.1.jar`. When several versions are present the
//! most recently modified file wins; version strings are never compared.

use crate::config::{ClasspathConfig, ConfigError};
use crate::listing::{file_name_str, list_entries};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Finds the on-disk file best matching a possibly unversioned archive path.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    /// `<base>-<major>(.<minor>)+[letter]?(-<qualifier>|.GA)*<suffix>`
    pattern: Regex,
    /// Archive suffix including the dot.
    suffix: String,
    sorted_listing: bool,
}

impl VersionResolver {
    /// Build a resolver for the configured archive extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the version grammar cannot be compiled.
    pub fn new(config: &ClasspathConfig) -> Result<Self, ConfigError> {
        let suffix = config.archive_suffix();
        let source = format!(
            r"^(.+?)(-\d+(\.\d+)+[a-z]?(-[A-Za-z0-9.]+|\.GA)*)({})$",
            regex::escape(&suffix)
        );
        let pattern = Regex::new(&source).map_err(|source| ConfigError::InvalidPattern {
            pattern: suffix.clone(),
            source,
        })?;
        Ok(Self {
            pattern,
            suffix,
            sorted_listing: config.sorted_listing,
        })
    }

    /// The base name of a versioned file name (`foo` for `foo-1.0.jar`).
    #[must_use]
    pub fn versioned_base<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .map(|base| base.as_str())
    }

    /// The base name used to look for versions of `file_name`.
    ///
    /// Versioned names yield their prefix; other archive names drop the
    /// suffix; anything else has no base name.
    #[must_use]
    pub fn base_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        self.versioned_base(file_name)
            .or_else(|| file_name.strip_suffix(self.suffix.as_str()))
    }

    /// Resolve `path` to an existing file where possible.
    ///
    /// Returns `path` unchanged if it exists, if its name is not an archive
    /// name, or if no sibling version is found.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.exists() {
            return path.to_path_buf();
        }

        let Some(file_name) = file_name_str(path) else {
            return path.to_path_buf();
        };
        let Some(base) = self.base_name(file_name) else {
            return path.to_path_buf();
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut candidates: Vec<PathBuf> = list_entries(dir, self.sorted_listing)
            .into_iter()
            .filter(|candidate| {
                file_name_str(candidate).is_some_and(|name| {
                    // prefix check first, it is cheaper than the grammar
                    name.starts_with(base) && self.versioned_base(name) == Some(base)
                })
            })
            .collect();

        if candidates.len() > 1 {
            return pick_newest(file_name, candidates);
        }
        candidates.pop().unwrap_or_else(|| path.to_path_buf())
    }
}

/// Latest modification time wins; the first listed candidate wins ties.
fn pick_newest(requested: &str, mut candidates: Vec<PathBuf>) -> PathBuf {
    let mut newest = 0;
    let mut newest_time = modified(&candidates[0]);
    for (i, candidate) in candidates.iter().enumerate().skip(1) {
        let time = modified(candidate);
        if time > newest_time {
            newest = i;
            newest_time = time;
        }
    }

    let names: Vec<_> = candidates
        .iter()
        .map(|c| file_name_str(c).unwrap_or_default())
        .collect();
    log::warn!(
        "{requested} matched multiple versions: {}; picking {}",
        names.join(", "),
        candidates[newest].display()
    );

    candidates.swap_remove(newest)
}

/// Modification time, or `None` when it cannot be read (sorts oldest).
fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
