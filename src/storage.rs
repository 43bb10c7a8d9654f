use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use url::Url;
use zarrs::{
    filesystem::FilesystemStore,
    storage::{ReadableWritableListableStorage, StoreKey, StorePrefix},
};

use crate::{Error, Result};

/// Where a group's data lives.
///
/// Only local filesystem stores are supported;
/// anything else is rejected by [check_store].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocator {
    /// A directory on the local filesystem.
    Local(PathBuf),
    /// A URL pointing at some other backend, e.g. `https://` or `s3://`.
    Remote(String),
}

impl StoreLocator {
    /// Classify a string as a local path or a remote URL.
    ///
    /// Strings with a URL scheme (other than `file://`) are remote.
    /// Single-letter schemes are treated as Windows drive letters.
    pub fn parse(s: &str) -> Self {
        match Url::parse(s) {
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(p) => Self::Local(p),
                Err(()) => Self::Remote(s.to_string()),
            },
            Ok(url) if url.scheme().len() > 1 => Self::Remote(s.to_string()),
            _ => Self::Local(PathBuf::from(s)),
        }
    }
}

impl fmt::Display for StoreLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocator::Local(p) => write!(f, "{}", p.display()),
            StoreLocator::Remote(u) => f.write_str(u),
        }
    }
}

impl From<&str> for StoreLocator {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for StoreLocator {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&Path> for StoreLocator {
    fn from(value: &Path) -> Self {
        Self::Local(value.to_path_buf())
    }
}

impl From<PathBuf> for StoreLocator {
    fn from(value: PathBuf) -> Self {
        Self::Local(value)
    }
}

impl From<&PathBuf> for StoreLocator {
    fn from(value: &PathBuf) -> Self {
        Self::Local(value.clone())
    }
}

/// Ensure the locator refers to a local store, returning its path unchanged.
pub fn check_store(locator: &StoreLocator) -> Result<&Path> {
    match locator {
        StoreLocator::Local(p) => Ok(p),
        StoreLocator::Remote(u) => Err(Error::UnsupportedBackend(format!(
            "RemoteStore is not yet supported (got {u}). Please use LocalStore."
        ))),
    }
}

/// Create a filesystem store rooted at `path`.
///
/// Nothing is created on disk until something is written.
pub(crate) fn filesystem_storage(path: &Path) -> Result<ReadableWritableListableStorage> {
    Ok(Arc::new(FilesystemStore::new(path)?))
}

/// Normalise a node path (`/`, `/a/b`, `a/b/`) to its key prefix form, without slashes.
fn trim_node_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Join a node path with a child name, returning an absolute node path.
///
/// The child must be a single path component.
pub(crate) fn join_node_path(parent: &str, child: &str) -> Result<String> {
    if child.is_empty() || child.contains('/') || child == "." || child == ".." {
        return Err(Error::InvalidNodeName(child.to_string()));
    }
    let parent = trim_node_path(parent);
    if parent.is_empty() {
        Ok(format!("/{child}"))
    } else {
        Ok(format!("/{parent}/{child}"))
    }
}

/// The store prefix under which everything belonging to a node lives.
pub(crate) fn node_prefix(path: &str) -> Result<StorePrefix> {
    let trimmed = trim_node_path(path);
    if trimmed.is_empty() {
        Ok(StorePrefix::root())
    } else {
        Ok(StorePrefix::new(format!("{trimmed}/"))?)
    }
}

/// The key of a metadata document belonging to a node.
pub(crate) fn node_key(path: &str, name: &str) -> Result<StoreKey> {
    let trimmed = trim_node_path(path);
    let key = if trimmed.is_empty() {
        StoreKey::new(name)?
    } else {
        StoreKey::new(format!("{trimmed}/{name}"))?
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_local_paths() {
        assert_eq!(
            StoreLocator::from("/tmp/data.zarr"),
            StoreLocator::Local(PathBuf::from("/tmp/data.zarr"))
        );
        assert_eq!(
            StoreLocator::from("relative/data.zarr"),
            StoreLocator::Local(PathBuf::from("relative/data.zarr"))
        );
        assert_eq!(
            StoreLocator::from(r"C:\data.zarr"),
            StoreLocator::Local(PathBuf::from(r"C:\data.zarr"))
        );
    }

    #[test]
    fn urls_are_remote() {
        for s in ["https://example.com/store", "s3://bucket/key.zarr"] {
            assert_eq!(StoreLocator::from(s), StoreLocator::Remote(s.to_string()));
        }
    }

    #[cfg(unix)]
    #[test]
    fn file_urls_are_local() {
        assert_eq!(
            StoreLocator::from("file:///tmp/data.zarr"),
            StoreLocator::Local(PathBuf::from("/tmp/data.zarr"))
        );
    }

    #[test]
    fn check_store_is_identity_for_paths() {
        let locator = StoreLocator::from(Path::new("some/where.zarr"));
        assert_eq!(
            check_store(&locator).unwrap(),
            Path::new("some/where.zarr")
        );
    }

    #[test]
    fn check_store_rejects_remote() {
        let locator = StoreLocator::from("https://example.com/store");
        let err = check_store(&locator).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBackend(_)));
        let msg = err.to_string();
        assert!(msg.contains("RemoteStore"));
        assert!(msg.contains("LocalStore"));
    }

    #[test]
    fn keys_and_prefixes() {
        assert_eq!(node_key("/", "zarr.json").unwrap().as_str(), "zarr.json");
        assert_eq!(node_key("/a/b", ".zgroup").unwrap().as_str(), "a/b/.zgroup");
        assert_eq!(node_prefix("/").unwrap().as_str(), "");
        assert_eq!(node_prefix("/a/b").unwrap().as_str(), "a/b/");
        assert_eq!(join_node_path("/", "tables").unwrap(), "/tables");
        assert_eq!(join_node_path("/tables", "roi").unwrap(), "/tables/roi");
    }

    #[test]
    fn child_names_are_single_components() {
        for name in ["", ".", "..", "a/b", "/", "roi/"] {
            assert!(
                matches!(
                    join_node_path("/tables", name),
                    Err(Error::InvalidNodeName(_))
                ),
                "{name:?}"
            );
        }
    }
}
