//! Classpath sinks: where resolved locations are registered.
//!
//! A [`ClasspathSink`] records every location it is asked to register and
//! forwards it to a [`Loader`] that makes it usable. Once frozen, the sink
//! keeps recording but stops forwarding, so hosts can still inspect what
//! would have been added.

use crate::location::Location;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Separator between entries of a rendered classpath.
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';

/// Separator between entries of a rendered classpath.
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Failure reported by a loader collaborator.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The loader refused the location.
    #[error("{0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A location could not be made loadable. This aborts the whole operation.
#[derive(Error, Debug)]
#[error("failed to register '{location}': {source}")]
pub struct SinkError {
    /// The location that was being registered.
    pub location: Location,
    #[source]
    pub source: LoaderError,
}

/// The host capability that makes locations available to symbol lookups.
pub trait Loader {
    /// Make `location` available to future lookups.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be added.
    fn add_location(&mut self, location: &Location) -> Result<(), LoaderError>;

    /// Locations this loader currently consults, in order.
    fn registered_locations(&self) -> Vec<Location>;
}

/// A loader that keeps its locations in a plain list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListLoader {
    locations: Vec<Location>,
}

impl ListLoader {
    /// Create an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that already consults `locations`.
    #[must_use]
    pub fn with_locations(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    /// The locations added so far.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }
}

impl Loader for ListLoader {
    fn add_location(&mut self, location: &Location) -> Result<(), LoaderError> {
        self.locations.push(location.clone());
        Ok(())
    }

    fn registered_locations(&self) -> Vec<Location> {
        self.locations.clone()
    }
}

#[derive(Debug)]
struct SinkState<L> {
    recorded: Vec<Location>,
    frozen: bool,
    loader: L,
}

/// An append-only classpath with a one-way freeze switch.
///
/// Each register call is a single critical section, so one sink can be
/// shared between threads when its loader is `Send`.
#[derive(Debug)]
pub struct ClasspathSink<L = ListLoader> {
    state: Mutex<SinkState<L>>,
}

impl ClasspathSink<ListLoader> {
    /// A sink backed by a plain [`ListLoader`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(ListLoader::new())
    }
}

impl Default for ClasspathSink<ListLoader> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<L: Loader> ClasspathSink<L> {
    /// Wrap a loader in an unfrozen sink with an empty record.
    pub fn new(loader: L) -> Self {
        Self {
            state: Mutex::new(SinkState {
                recorded: Vec::new(),
                frozen: false,
                loader,
            }),
        }
    }

    // The record is append-only, so state behind a poisoned lock is still whole.
    fn lock(&self) -> MutexGuard<'_, SinkState<L>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `location` and, unless frozen, hand it to the loader.
    ///
    /// The record grows on every call, duplicates included.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader rejects the location. The location
    /// stays recorded.
    pub fn register(&self, location: Location) -> Result<(), SinkError> {
        let mut state = self.lock();
        state.recorded.push(location.clone());
        if state.frozen {
            log::trace!("Recorded {location} (frozen)");
            return Ok(());
        }
        log::trace!("Registering {location}");
        state
            .loader
            .add_location(&location)
            .map_err(|source| SinkError { location, source })
    }

    /// Stop forwarding locations to the loader. Cannot be undone.
    pub fn freeze(&self) {
        self.lock().frozen = true;
    }

    /// Returns true once [`freeze`](Self::freeze) has been called.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.lock().frozen
    }

    /// Every location passed to [`register`](Self::register), in order.
    #[must_use]
    pub fn recorded(&self) -> Vec<Location> {
        self.lock().recorded.clone()
    }

    /// Read back what the loader itself consults.
    #[must_use]
    pub fn registered_locations(&self) -> Vec<Location> {
        self.lock().loader.registered_locations()
    }

    /// Recorded file locations joined by [`PATH_SEPARATOR`].
    ///
    /// URIs are left out; duplicates are kept.
    #[must_use]
    pub fn classpath_string(&self) -> String {
        let state = self.lock();
        let mut classpath = String::new();
        for path in state.recorded.iter().filter_map(Location::as_path) {
            if !classpath.is_empty() {
                classpath.push(PATH_SEPARATOR);
            }
            classpath.push_str(&path.to_string_lossy());
        }
        classpath
    }

    /// Consume the sink and return its loader.
    pub fn into_loader(self) -> L {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .loader
    }
}

impl<L: Loader> fmt::Display for ClasspathSink<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClasspathSink(")?;
        for location in &self.lock().recorded {
            write!(f, " {location}")?;
        }
        write!(f, " )")
    }
}
