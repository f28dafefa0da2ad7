//! Runtime classpath assembly for modular applications.
//!
//! This crate provides:
//! - Versioned archive lookup (`foo.jar` requested, newest `foo-*.jar` found)
//! - Transitive expansion of `Class-Path` manifest declarations
//! - Recursive collection of archive directories, fat archives last
//! - Classpath sinks with append-only records and a freeze switch

mod archive;
mod classpath;
mod collector;
mod config;
mod listing;
mod location;
mod sink;
mod version;
mod walker;

pub use archive::{ArchiveMetadata, ManifestReader, MANIFEST_PATH};
pub use classpath::{locate_type, Classpath};
pub use collector::DirectoryCollector;
pub use config::{
    ClasspathConfig, ConfigError, CONFIG_FILE, DEFAULT_ARCHIVE_EXTENSION,
    DEFAULT_MANIFEST_ATTRIBUTE, DEFAULT_PROBLEMATIC_PATTERN,
};
pub use location::Location;
pub use sink::{ClasspathSink, ListLoader, Loader, LoaderError, SinkError, PATH_SEPARATOR};
pub use version::VersionResolver;
pub use walker::DependencyWalker;
