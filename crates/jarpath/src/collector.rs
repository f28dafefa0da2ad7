//! Recursive collection of every archive under a directory.

use crate::listing::{file_name_str, list_entries};
use crate::location::Location;
use crate::sink::{ClasspathSink, Loader, SinkError};
use crate::version::VersionResolver;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Registers all archives below a directory, demoting problematic archives
/// to the end of each directory's listing.
///
/// Manifests are not read; that is [`DependencyWalker`](crate::DependencyWalker)'s job.
#[derive(Debug, Clone)]
pub struct DirectoryCollector {
    resolver: VersionResolver,
    problematic: Regex,
    suffix: String,
    sorted_listing: bool,
}

impl DirectoryCollector {
    /// Create a collector.
    ///
    /// `problematic` must match whole file names; `suffix` includes the dot.
    #[must_use]
    pub fn new(
        resolver: VersionResolver,
        problematic: Regex,
        suffix: impl Into<String>,
        sorted_listing: bool,
    ) -> Self {
        Self {
            resolver,
            problematic,
            suffix: suffix.into(),
            sorted_listing,
        }
    }

    /// Returns true if `path` names an archive that must load last.
    #[must_use]
    pub fn is_problematic(&self, path: &Path) -> bool {
        file_name_str(path).is_some_and(|name| self.problematic.is_match(name))
    }

    /// Register everything under `root` into `sink`.
    ///
    /// Unless `only_archives` is set, each directory is registered before its
    /// contents. Directories that cannot be listed contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure.
    pub fn collect_recursive<L: Loader>(
        &self,
        root: &Path,
        only_archives: bool,
        sink: &ClasspathSink<L>,
    ) -> Result<(), SinkError> {
        if !only_archives {
            sink.register(Location::from_path(root))?;
        }

        for entry in self.ordered_entries(root) {
            if entry.is_dir() {
                self.collect_recursive(&entry, only_archives, sink)?;
            } else if file_name_str(&entry).is_some_and(|name| name.ends_with(&self.suffix)) {
                // dangling entries (broken symlinks) would resolve to a sibling
                // that the listing registers on its own
                if !entry.exists() {
                    log::debug!("Skipping dangling archive {}", entry.display());
                    continue;
                }
                let resolved = self.resolver.resolve(&entry);
                sink.register(Location::from_path(resolved))?;
            }
        }

        Ok(())
    }

    /// Entries of `dir` with problematic archives moved to the end.
    ///
    /// The sort is stable, so each class keeps the listing order.
    pub(crate) fn ordered_entries(&self, dir: &Path) -> Vec<PathBuf> {
        let mut entries = list_entries(dir, self.sorted_listing);
        entries.sort_by_key(|entry| self.is_problematic(entry));
        entries
    }
}
