//! Classpath assembly settings (`jarpath.toml`).
//!
//! ```toml
//! archive-extension = "jar"
//! manifest-attribute = "Class-Path"
//! problematic-pattern = '(batik|jython|jython-standalone|jruby)(-[0-9].*)?\.jar'
//! sorted-listing = false
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The configuration filename.
pub const CONFIG_FILE: &str = "jarpath.toml";

/// Default extension of loadable archives.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "jar";

/// Default manifest attribute listing additional classpath entries.
pub const DEFAULT_MANIFEST_ATTRIBUTE: &str = "Class-Path";

/// Fat archives known to shadow classes from smaller, more specific archives.
pub const DEFAULT_PROBLEMATIC_PATTERN: &str = r"(batik|jython|jython-standalone|jruby)(-[0-9].*)?\.jar";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid problematic-archive pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid archive extension '{0}': {1}")]
    InvalidExtension(String, &'static str),
}

/// Settings shared by the resolver, the manifest reader and the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ClasspathConfig {
    /// Extension (without the dot) of files treated as archives.
    pub archive_extension: String,

    /// Manifest attribute holding whitespace-separated dependency paths.
    pub manifest_attribute: String,

    /// Archives whose full name matches this pattern load after their siblings.
    pub problematic_pattern: String,

    /// Sort directory listings by name before ordering and tie-breaking.
    pub sorted_listing: bool,
}

impl Default for ClasspathConfig {
    fn default() -> Self {
        Self {
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
            manifest_attribute: DEFAULT_MANIFEST_ATTRIBUTE.to_string(),
            problematic_pattern: DEFAULT_PROBLEMATIC_PATTERN.to_string(),
            sorted_listing: false,
        }
    }
}

impl ClasspathConfig {
    /// Load configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `jarpath.toml` from `dir`, falling back to defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(CONFIG_FILE);
        if path.is_file() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the extension is usable and the pattern compiles.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.archive_extension;
        if ext.is_empty() {
            return Err(ConfigError::InvalidExtension(
                ext.clone(),
                "extension cannot be empty",
            ));
        }
        if ext.contains('.') || ext.contains('/') || ext.contains('\\') {
            return Err(ConfigError::InvalidExtension(
                ext.clone(),
                "give the extension without dots or separators",
            ));
        }
        self.problematic_regex()?;
        Ok(())
    }

    /// The archive suffix including its leading dot.
    #[must_use]
    pub fn archive_suffix(&self) -> String {
        format!(".{}", self.archive_extension)
    }

    /// Compile the problematic-archive pattern, anchored to the whole name.
    pub(crate) fn problematic_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&format!("^(?:{})$", self.problematic_pattern)).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: self.problematic_pattern.clone(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ClasspathConfig::parse("").unwrap();
        assert_eq!(config, ClasspathConfig::default());
        assert_eq!(config.archive_suffix(), ".jar");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
archive-extension = "zip"
manifest-attribute = "Extra-Path"
problematic-pattern = 'fat-.*\.zip'
sorted-listing = true
"#;
        let config = ClasspathConfig::parse(toml).unwrap();
        assert_eq!(config.archive_extension, "zip");
        assert_eq!(config.manifest_attribute, "Extra-Path");
        assert_eq!(config.problematic_pattern, r"fat-.*\.zip");
        assert!(config.sorted_listing);
    }

    #[test]
    fn reject_unknown_keys() {
        let result = ClasspathConfig::parse("archive-ext = \"jar\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn reject_bad_pattern() {
        let result = ClasspathConfig::parse("problematic-pattern = '(unclosed'");
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn reject_bad_extension() {
        assert!(matches!(
            ClasspathConfig::parse("archive-extension = \"\""),
            Err(ConfigError::InvalidExtension(..))
        ));
        assert!(matches!(
            ClasspathConfig::parse("archive-extension = \".jar\""),
            Err(ConfigError::InvalidExtension(..))
        ));
    }

    #[test]
    fn problematic_pattern_matches_whole_names() {
        let regex = ClasspathConfig::default().problematic_regex().unwrap();
        assert!(regex.is_match("jython.jar"));
        assert!(regex.is_match("jruby-9.2.jar"));
        assert!(regex.is_match("jython-standalone-2.7.jar"));
        assert!(!regex.is_match("my-jython.jar"));
        assert!(!regex.is_match("batik-util.jar"));
    }

    #[test]
    fn written_config_reads_back() {
        let config = ClasspathConfig {
            archive_extension: "zip".to_string(),
            problematic_pattern: r"bundle-.*\.zip".to_string(),
            sorted_listing: true,
            ..ClasspathConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("sorted-listing = true"));
        assert_eq!(ClasspathConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ClasspathConfig::discover(tmp.path()).unwrap();
        assert_eq!(config, ClasspathConfig::default());

        fs::write(tmp.path().join(CONFIG_FILE), "sorted-listing = true\n").unwrap();
        let config = ClasspathConfig::discover(tmp.path()).unwrap();
        assert!(config.sorted_listing);
    }
}
