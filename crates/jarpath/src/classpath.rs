//! Host entry points for assembling a classpath under a base directory.
//!
//! The base directory is whatever the host considers its installation root;
//! this crate never tries to discover it.

use crate::archive::{contains_entry, ManifestReader};
use crate::collector::DirectoryCollector;
use crate::config::{ClasspathConfig, ConfigError};
use crate::location::Location;
use crate::sink::{ClasspathSink, Loader, SinkError};
use crate::version::VersionResolver;
use crate::walker::DependencyWalker;
use std::path::{Path, PathBuf};

/// Walker and collector configured from one [`ClasspathConfig`].
#[derive(Debug, Clone)]
pub struct Classpath {
    walker: DependencyWalker,
    collector: DirectoryCollector,
}

impl Classpath {
    /// Build from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &ClasspathConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = VersionResolver::new(config)?;
        let walker = DependencyWalker::new(resolver.clone(), ManifestReader::new(config));
        let collector = DirectoryCollector::new(
            resolver,
            config.problematic_regex()?,
            config.archive_suffix(),
            config.sorted_listing,
        );
        Ok(Self { walker, collector })
    }

    /// Build with `jarpath.toml` from `base` if present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is invalid.
    pub fn discover(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::new(&ClasspathConfig::discover(base)?)
    }

    /// The dependency walker.
    #[must_use]
    pub fn walker(&self) -> &DependencyWalker {
        &self.walker
    }

    /// The directory collector.
    #[must_use]
    pub fn collector(&self) -> &DirectoryCollector {
        &self.collector
    }

    /// Register the archives at `relative_paths` under `base` and everything
    /// their manifests pull in.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure.
    pub fn in_directory<L: Loader, P: AsRef<Path>>(
        &self,
        base: &Path,
        relative_paths: &[P],
        sink: &ClasspathSink<L>,
    ) -> Result<Vec<Location>, SinkError> {
        self.walker.walk(relative_paths, base, sink)
    }

    /// Register every archive below each of `relative_paths` under `base`.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure.
    pub fn recursively_in_directory<L: Loader, P: AsRef<Path>>(
        &self,
        base: &Path,
        only_archives: bool,
        relative_paths: &[P],
        sink: &ClasspathSink<L>,
    ) -> Result<(), SinkError> {
        for relative in relative_paths {
            self.collector
                .collect_recursive(&base.join(relative), only_archives, sink)?;
        }
        Ok(())
    }

    /// Register `base / relative` as is: no version lookup, no dedup.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the location.
    pub fn add_in_directory<L: Loader>(
        &self,
        base: &Path,
        relative: impl AsRef<Path>,
        sink: &ClasspathSink<L>,
    ) -> Result<(), SinkError> {
        sink.register(Location::from_path(base.join(relative)))
    }

    /// Register each of `paths` as is, in order.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure.
    pub fn add_all<L: Loader, P: AsRef<Path>>(
        &self,
        paths: &[P],
        sink: &ClasspathSink<L>,
    ) -> Result<(), SinkError> {
        for path in paths {
            sink.register(Location::from_path(path))?;
        }
        Ok(())
    }
}

/// Find the recorded location that provides `type_name` (`org.example.Foo`).
///
/// Archives are searched for the `org/example/Foo.class` entry and
/// directories for the matching file, in recorded order.
#[must_use]
pub fn locate_type<L: Loader>(sink: &ClasspathSink<L>, type_name: &str) -> Option<PathBuf> {
    let entry = format!("{}.class", type_name.replace('.', "/"));
    sink.recorded()
        .iter()
        .filter_map(Location::as_path)
        .find(|path| {
            if path.is_dir() {
                path.join(&entry).is_file()
            } else {
                contains_entry(path, &entry)
            }
        })
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::{write_archive, write_jar};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn in_directory_expands_manifests() {
        let tmp = TempDir::new().unwrap();
        write_jar(&tmp.path().join("jars/launcher.jar"), Some("core-2.0.jar"));
        write_jar(&tmp.path().join("jars/core-2.0.jar"), None);

        let classpath = Classpath::new(&ClasspathConfig::default()).unwrap();
        let sink = ClasspathSink::in_memory();
        let found = classpath
            .in_directory(tmp.path(), &["jars/launcher.jar"], &sink)
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn recursively_in_directory_visits_each_root() {
        let tmp = TempDir::new().unwrap();
        write_jar(&tmp.path().join("jars/a.jar"), None);
        write_jar(&tmp.path().join("plugins/b.jar"), None);
        write_jar(&tmp.path().join("ignored/c.jar"), None);

        let classpath = Classpath::new(&ClasspathConfig::default()).unwrap();
        let sink = ClasspathSink::in_memory();
        classpath
            .recursively_in_directory(tmp.path(), true, &["jars", "plugins"], &sink)
            .unwrap();
        assert_eq!(
            sink.recorded(),
            vec![
                Location::from_path(tmp.path().join("jars/a.jar")),
                Location::from_path(tmp.path().join("plugins/b.jar")),
            ]
        );
    }

    #[test]
    fn add_registers_verbatim() {
        let tmp = TempDir::new().unwrap();
        let classpath = Classpath::new(&ClasspathConfig::default()).unwrap();
        let sink = ClasspathSink::in_memory();

        classpath
            .add_in_directory(tmp.path(), "missing.jar", &sink)
            .unwrap();
        classpath
            .add_all(&[tmp.path().join("missing.jar")], &sink)
            .unwrap();

        let missing = Location::from_path(tmp.path().join("missing.jar"));
        assert_eq!(sink.recorded(), vec![missing.clone(), missing]);
    }

    #[test]
    fn discover_reads_config_from_base() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(crate::config::CONFIG_FILE),
            "problematic-pattern = 'late\\.jar'\nsorted-listing = true\n",
        )
        .unwrap();
        write_jar(&tmp.path().join("late.jar"), None);
        write_jar(&tmp.path().join("z.jar"), None);

        let classpath = Classpath::discover(tmp.path()).unwrap();
        let sink = ClasspathSink::in_memory();
        classpath
            .recursively_in_directory(tmp.path(), true, &[""], &sink)
            .unwrap();
        assert_eq!(
            sink.recorded().last(),
            Some(&Location::from_path(tmp.path().join("late.jar")))
        );
    }

    #[test]
    fn walker_and_collector_share_configuration() {
        let tmp = TempDir::new().unwrap();
        write_jar(&tmp.path().join("app.jar"), Some("dep.jar"));
        write_jar(&tmp.path().join("dep-1.0.jar"), None);

        let classpath = Classpath::new(&ClasspathConfig::default()).unwrap();
        let sink = ClasspathSink::in_memory();
        let found = classpath
            .walker()
            .walk(&["app.jar"], tmp.path(), &sink)
            .unwrap();
        assert_eq!(
            found,
            vec![
                Location::from_path(tmp.path().join("app.jar")),
                Location::from_path(tmp.path().join("dep-1.0.jar")),
            ]
        );
        assert!(classpath
            .collector()
            .is_problematic(Path::new("jython.jar")));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ClasspathConfig {
            problematic_pattern: "[".to_string(),
            ..ClasspathConfig::default()
        };
        assert!(Classpath::new(&config).is_err());
    }

    #[test]
    fn locate_type_in_archives_and_directories() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("a.jar");
        write_archive(&jar, &[("org/example/Foo.class", "")]);
        let classes = tmp.path().join("classes");
        fs::create_dir_all(classes.join("org/example")).unwrap();
        fs::write(classes.join("org/example/Bar.class"), b"").unwrap();

        let sink = ClasspathSink::in_memory();
        sink.register(Location::parse("http://host/remote.jar")).unwrap();
        sink.register(Location::from_path(&classes)).unwrap();
        sink.register(Location::from_path(&jar)).unwrap();

        assert_eq!(locate_type(&sink, "org.example.Foo"), Some(jar));
        assert_eq!(locate_type(&sink, "org.example.Bar"), Some(classes));
        assert_eq!(locate_type(&sink, "org.example.Missing"), None);
    }
}
