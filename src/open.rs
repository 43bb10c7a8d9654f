use std::path::{Path, PathBuf};

use crate::{
    AccessMode, Result, ZarrFormat,
    group::{ZarrGroup, open_group_v2_v3, pass_through_group},
    storage::{StoreLocator, check_store},
};

/// Either a store to open a group from, or an already-open group.
#[derive(Debug)]
pub enum StoreOrGroup {
    Store(StoreLocator),
    Group(ZarrGroup),
}

impl From<StoreLocator> for StoreOrGroup {
    fn from(value: StoreLocator) -> Self {
        Self::Store(value)
    }
}

impl From<ZarrGroup> for StoreOrGroup {
    fn from(value: ZarrGroup) -> Self {
        Self::Group(value)
    }
}

impl From<&str> for StoreOrGroup {
    fn from(value: &str) -> Self {
        Self::Store(value.into())
    }
}

impl From<String> for StoreOrGroup {
    fn from(value: String) -> Self {
        Self::Store(value.into())
    }
}

impl From<&Path> for StoreOrGroup {
    fn from(value: &Path) -> Self {
        Self::Store(value.into())
    }
}

impl From<PathBuf> for StoreOrGroup {
    fn from(value: PathBuf) -> Self {
        Self::Store(value.into())
    }
}

impl From<&PathBuf> for StoreOrGroup {
    fn from(value: &PathBuf) -> Self {
        Self::Store(value.into())
    }
}

/// Open a group in zarr format 2.
///
/// See [open_group_opt].
pub fn open_group(store: impl Into<StoreOrGroup>, mode: AccessMode) -> Result<ZarrGroup> {
    open_group_opt(store, mode, ZarrFormat::default())
}

/// Open a group from a local store, or reconcile an already-open group,
/// with the given mode and zarr format.
///
/// Remote stores are rejected with [Error::UnsupportedBackend](crate::Error::UnsupportedBackend).
/// Errors from opening the group are returned as-is.
pub fn open_group_opt(
    store: impl Into<StoreOrGroup>,
    mode: AccessMode,
    format: ZarrFormat,
) -> Result<ZarrGroup> {
    match store.into() {
        StoreOrGroup::Group(group) => pass_through_group(group, mode, format),
        StoreOrGroup::Store(locator) => {
            let path = check_store(&locator)?;
            open_group_v2_v3(path, mode, format)
        }
    }
}
