use std::{fmt, path::Path};

use serde_json::{Map, Value};
use zarrs::{
    group::{Group, GroupMetadataV3},
    metadata::{GroupMetadata, v2::GroupMetadataV2},
    node::NodePath,
    storage::{
        ListableStorageTraits, ReadableWritableListableStorage,
        ReadableWritableListableStorageTraits, WritableStorageTraits,
    },
};

use crate::{
    AccessMode, Error, Result, ZarrFormat,
    metadata::{StoredNode, inspect_node},
    storage::{filesystem_storage, join_node_path, node_prefix},
};

/// An open zarr group, along with the mode and format it was opened with.
pub struct ZarrGroup {
    storage: ReadableWritableListableStorage,
    group: Group<dyn ReadableWritableListableStorageTraits>,
    mode: AccessMode,
    format: ZarrFormat,
}

impl fmt::Debug for ZarrGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZarrGroup")
            .field("path", &self.path())
            .field("mode", &self.mode)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl ZarrGroup {
    /// Open (or create, depending on `mode`) the group at `path` in `storage`.
    pub fn open_in(
        storage: ReadableWritableListableStorage,
        path: &str,
        mode: AccessMode,
        format: ZarrFormat,
    ) -> Result<Self> {
        let node = inspect_node(&*storage, path, format)?;
        log::debug!("opening group {path} (mode {mode}, zarr format {format}), found {node:?}");

        match (mode, node) {
            (AccessMode::Overwrite, node) => {
                NodePath::new(path)?;
                if !node.is_missing() {
                    log::warn!("erasing existing node at {path}");
                }
                storage.erase_prefix(&node_prefix(path)?)?;
                Self::create(storage, path, mode, format)
            }
            (_, StoredNode::Array(_)) => Err(Error::ContainsArray {
                path: path.to_string(),
            }),
            (AccessMode::CreateNew, StoredNode::Group(_)) => Err(Error::ContainsGroup {
                path: path.to_string(),
            }),
            (AccessMode::Read | AccessMode::ReadWrite, StoredNode::Missing) => {
                Err(Error::GroupNotFound {
                    path: path.to_string(),
                })
            }
            (_, StoredNode::Missing) => Self::create(storage, path, mode, format),
            (_, StoredNode::Group(found)) if found != format => Err(Error::FormatMismatch {
                path: path.to_string(),
                expected: format,
                found,
            }),
            (_, StoredNode::Group(_)) => {
                let group = Group::open_opt(storage.clone(), path, &format.retrieve_version())?;
                Ok(Self {
                    storage,
                    group,
                    mode,
                    format,
                })
            }
        }
    }

    fn create(
        storage: ReadableWritableListableStorage,
        path: &str,
        mode: AccessMode,
        format: ZarrFormat,
    ) -> Result<Self> {
        log::debug!("creating zarr format {format} group at {path}");
        let metadata = match format {
            ZarrFormat::V2 => GroupMetadata::V2(GroupMetadataV2::new()),
            ZarrFormat::V3 => GroupMetadata::V3(GroupMetadataV3::default()),
        };
        let group = Group::new_with_metadata(storage.clone(), path, metadata)?;
        group.store_metadata()?;
        Ok(Self {
            storage,
            group,
            mode,
            format,
        })
    }

    /// Absolute path of this group within its store, e.g. `/` or `/tables`.
    pub fn path(&self) -> &str {
        self.group.path().as_str()
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn zarr_format(&self) -> ZarrFormat {
        self.format
    }

    pub fn is_read_only(&self) -> bool {
        !self.mode.is_writable()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        self.group.attributes()
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.is_read_only() {
            Err(Error::read_only(self.path()))
        } else {
            Ok(())
        }
    }

    /// Merge `attributes` into the group's attributes and store them.
    pub fn update_attributes(&mut self, attributes: Map<String, Value>) -> Result<()> {
        self.ensure_writable()?;
        self.group.attributes_mut().extend(attributes);
        self.group.store_metadata()?;
        Ok(())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let mut attributes = Map::new();
        attributes.insert(key.into(), value);
        self.update_attributes(attributes)
    }

    /// Whether a child group of the same format exists with this name.
    pub fn contains_group(&self, name: &str) -> Result<bool> {
        let child = join_node_path(self.path(), name)?;
        Ok(inspect_node(&*self.storage, &child, self.format)? == StoredNode::Group(self.format))
    }

    /// Names of the child groups with the same format as this one, sorted.
    pub fn group_keys(&self) -> Result<Vec<String>> {
        let prefix = node_prefix(self.path())?;
        let listing = self.storage.list_dir(&prefix)?;
        let mut keys = Vec::new();
        for child in listing.prefixes() {
            let name = child
                .as_str()
                .strip_prefix(prefix.as_str())
                .unwrap_or(child.as_str())
                .trim_end_matches('/');
            if self.contains_group(name)? {
                keys.push(name.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Mode given to children: they must exist, and are writable if this group is.
    fn child_mode(&self) -> AccessMode {
        if self.mode.is_writable() {
            AccessMode::ReadWrite
        } else {
            AccessMode::Read
        }
    }

    /// Open an existing child group.
    pub fn open_child(&self, name: &str) -> Result<ZarrGroup> {
        let child = join_node_path(self.path(), name)?;
        Self::open_in(self.storage.clone(), &child, self.child_mode(), self.format)
    }

    /// Create a child group in this group's format.
    ///
    /// With `overwrite`, anything already stored under the child is erased first.
    pub fn create_group(&self, name: &str, overwrite: bool) -> Result<ZarrGroup> {
        self.ensure_writable()?;
        let child = join_node_path(self.path(), name)?;
        let mode = if overwrite {
            AccessMode::Overwrite
        } else {
            AccessMode::CreateNew
        };
        let mut group = Self::open_in(self.storage.clone(), &child, mode, self.format)?;
        group.mode = self.child_mode();
        Ok(group)
    }
}

/// Open or create the root group of the local store at `path`.
pub fn open_group_v2_v3(path: &Path, mode: AccessMode, format: ZarrFormat) -> Result<ZarrGroup> {
    let storage = filesystem_storage(path)?;
    ZarrGroup::open_in(storage, "/", mode, format)
}

/// Reconcile an already-open group with a requested mode and format.
///
/// The handle is returned without touching storage,
/// with its mode set to the requested one.
pub fn pass_through_group(
    mut group: ZarrGroup,
    mode: AccessMode,
    format: ZarrFormat,
) -> Result<ZarrGroup> {
    if group.format != format {
        return Err(Error::FormatMismatch {
            path: group.path().to_string(),
            expected: format,
            found: group.format,
        });
    }
    if group.is_read_only() && mode.is_writable() {
        return Err(Error::read_only(group.path()));
    }
    log::debug!(
        "passing through group {} (mode {} -> {mode})",
        group.path(),
        group.mode
    );
    group.mode = mode;
    Ok(group)
}
