//! Loadable locations: archives and directories on disk, or opaque URIs.

use percent_encoding::percent_decode_str;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A resolved, loadable reference to an archive or directory.
///
/// File locations are stored in normalized absolute form so that two
/// spellings of the same path (`lib/../a.jar` and `a.jar`) compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    /// A local filesystem path.
    File(PathBuf),
    /// Any non-`file` URI, kept verbatim.
    Uri(String),
}

impl Location {
    /// Create a file location from a path, normalizing it.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::File(normalize(path.as_ref()))
    }

    /// Parse a plain path, a `file:` URI or any other URI.
    pub fn parse(value: &str) -> Self {
        match scheme_of(value) {
            Some(scheme) if scheme.eq_ignore_ascii_case("file") => {
                let rest = &value[scheme.len() + 1..];
                // file://host/path and file:///path both carry the path after the authority
                let path = match rest.strip_prefix("//") {
                    Some(authority_and_path) => authority_and_path
                        .find('/')
                        .map_or("", |slash| &authority_and_path[slash..]),
                    None => rest,
                };
                let decoded = percent_decode_str(path).decode_utf8_lossy();
                Self::from_path(decoded.as_ref())
            }
            Some(_) => Self::Uri(value.to_string()),
            None => Self::from_path(value),
        }
    }

    /// Returns true for local filesystem locations.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// The filesystem path, if this is a file location.
    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Uri(_) => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Uri(uri) => write!(f, "{uri}"),
        }
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Self::from_path(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

/// Returns the URI scheme of `value`, if it has one.
///
/// Single-letter schemes are treated as Windows drive letters.
fn scheme_of(value: &str) -> Option<&str> {
    let colon = value.find(':')?;
    let scheme = &value[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if scheme.len() < 2 || !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// Make `path` absolute against the working directory and fold `.` and `..`
/// lexically. Symlinks are not resolved.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_segments_fold_into_one_location() {
        let a = Location::from_path("/x/lib/../a.jar");
        let b = Location::from_path("/x/./a.jar");
        assert_eq!(a, b);
        assert_eq!(a.as_path(), Some(Path::new("/x/a.jar")));
    }

    #[test]
    fn relative_paths_become_absolute() {
        let location = Location::from_path("a.jar");
        let path = location.as_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("a.jar"));
    }

    #[test]
    fn parse_file_uri() {
        assert_eq!(
            Location::parse("file:/x/a%20b.jar"),
            Location::from_path("/x/a b.jar")
        );
        assert_eq!(
            Location::parse("file:///x/a.jar"),
            Location::from_path("/x/a.jar")
        );
    }

    #[test]
    fn parse_other_schemes_as_uri() {
        let location = Location::parse("http://host/c.jar");
        assert_eq!(location, Location::Uri("http://host/c.jar".to_string()));
        assert!(!location.is_file());
        assert_eq!(location.as_path(), None);
    }

    #[test]
    fn parse_plain_path() {
        let location = Location::parse("/x/a.jar");
        assert!(location.is_file());
        assert_eq!(location.to_string(), "/x/a.jar");
    }

    #[test]
    fn drive_letters_are_not_schemes() {
        assert_eq!(scheme_of("C:\\jars\\a.jar"), None);
        assert_eq!(scheme_of("https://host"), Some("https"));
        assert_eq!(scheme_of("no-scheme"), None);
    }
}
