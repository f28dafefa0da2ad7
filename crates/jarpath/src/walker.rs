//! Transitive expansion of manifest-declared dependencies.

use crate::archive::ManifestReader;
use crate::location::{normalize, Location};
use crate::sink::{ClasspathSink, Loader, SinkError};
use crate::version::VersionResolver;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Depth-first, cycle-safe walk over archive dependencies.
///
/// Each archive is resolved to a versioned file if needed, registered, and
/// then its declared dependencies are expanded relative to its own
/// directory. Missing archives are skipped; every location is registered at
/// most once per walk.
#[derive(Debug, Clone)]
pub struct DependencyWalker {
    resolver: VersionResolver,
    reader: ManifestReader,
}

/// Visited set and discovery order shared by the roots of one walk.
#[derive(Debug, Default)]
struct Discovered {
    visited: HashSet<Location>,
    order: Vec<Location>,
}

impl DependencyWalker {
    /// Create a walker from its two collaborators.
    #[must_use]
    pub fn new(resolver: VersionResolver, reader: ManifestReader) -> Self {
        Self { resolver, reader }
    }

    /// Walk from each of `roots` (relative to `base`), registering every
    /// discovered archive into `sink`.
    ///
    /// Returns the discovered locations in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure. Locations registered before it stay
    /// registered.
    pub fn walk<L, P>(
        &self,
        roots: &[P],
        base: &Path,
        sink: &ClasspathSink<L>,
    ) -> Result<Vec<Location>, SinkError>
    where
        L: Loader,
        P: AsRef<Path>,
    {
        let mut discovered = Discovered::default();
        for root in roots {
            self.expand(base.join(root), sink, &mut discovered)?;
        }
        Ok(discovered.order)
    }

    /// Pre-order expansion from one candidate using an explicit stack.
    fn expand<L: Loader>(
        &self,
        candidate: PathBuf,
        sink: &ClasspathSink<L>,
        discovered: &mut Discovered,
    ) -> Result<(), SinkError> {
        let mut pending = vec![candidate];

        while let Some(candidate) = pending.pop() {
            let resolved = self.resolver.resolve(&candidate);
            if !resolved.exists() {
                log::debug!("Skipping missing archive {}", candidate.display());
                continue;
            }

            let location = Location::from_path(&resolved);
            if !discovered.visited.insert(location.clone()) {
                continue;
            }
            sink.register(location.clone())?;
            discovered.order.push(location);

            let dependencies = self.reader.read_dependencies(&resolved);
            if dependencies.is_empty() {
                continue;
            }
            let dir = dependency_base(&candidate);
            // reversed so the first declared dependency is expanded first
            pending.extend(dependencies.iter().rev().map(|dep| dir.join(dep)));
        }

        Ok(())
    }
}

/// Directory that an archive's declared dependencies are relative to.
fn dependency_base(archive: &Path) -> PathBuf {
    match archive.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => normalize(archive)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}
