use bytes::Buf;
use serde::Deserialize;
use zarrs::storage::ReadableStorageTraits;

use crate::{Result, ZarrFormat, storage::node_key};

/// Zarr V3 node metadata document.
pub const ZARR_JSON: &str = "zarr.json";
/// Zarr V2 group metadata document.
pub const ZGROUP: &str = ".zgroup";
/// Zarr V2 array metadata document.
pub const ZARRAY: &str = ".zarray";
/// Zarr V2 user attributes document.
pub const ZATTRS: &str = ".zattrs";

/// The kind of node found in a `zarr.json` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Group,
    Array,
}

/// Just enough of a `zarr.json` document to tell what it describes.
#[derive(Debug, Clone, Deserialize)]
struct NodeHeaderV3 {
    zarr_format: u64,
    node_type: NodeType,
}

/// What is stored at a node path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredNode {
    Missing,
    Group(ZarrFormat),
    Array(ZarrFormat),
}

impl StoredNode {
    pub fn is_missing(&self) -> bool {
        matches!(self, StoredNode::Missing)
    }
}

/// Find out what is stored at `path`.
///
/// Metadata for the `preferred` format is checked first,
/// so a path holding both V2 and V3 metadata reports the preferred one.
pub fn inspect_node<R: ReadableStorageTraits + ?Sized>(
    storage: &R,
    path: &str,
    preferred: ZarrFormat,
) -> Result<StoredNode> {
    for format in [preferred, preferred.other()] {
        if let Some(node) = inspect_format(storage, path, format)? {
            return Ok(node);
        }
    }
    Ok(StoredNode::Missing)
}

fn inspect_format<R: ReadableStorageTraits + ?Sized>(
    storage: &R,
    path: &str,
    format: ZarrFormat,
) -> Result<Option<StoredNode>> {
    match format {
        ZarrFormat::V2 => {
            if storage.size_key(&node_key(path, ZGROUP)?)?.is_some() {
                Ok(Some(StoredNode::Group(ZarrFormat::V2)))
            } else if storage.size_key(&node_key(path, ZARRAY)?)?.is_some() {
                Ok(Some(StoredNode::Array(ZarrFormat::V2)))
            } else {
                Ok(None)
            }
        }
        ZarrFormat::V3 => {
            let Some(bytes) = storage.get(&node_key(path, ZARR_JSON)?)? else {
                return Ok(None);
            };
            let header: NodeHeaderV3 = serde_json::from_reader(bytes.reader())?;
            let found = ZarrFormat::try_from(header.zarr_format)?;
            let node = match header.node_type {
                NodeType::Group => StoredNode::Group(found),
                NodeType::Array => StoredNode::Array(found),
            };
            Ok(Some(node))
        }
    }
}
