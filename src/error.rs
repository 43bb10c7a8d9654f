use zarrs::{
    filesystem::FilesystemStoreCreateError,
    group::GroupCreateError,
    node::NodePathError,
    storage::{StorageError, StoreKeyError, StorePrefixError},
};

use crate::ZarrFormat;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    UnsupportedBackend(String),
    #[error("no group found at {path}")]
    GroupNotFound { path: String },
    #[error("a group already exists at {path}")]
    ContainsGroup { path: String },
    #[error("an array exists at {path}, expected a group")]
    ContainsArray { path: String },
    #[error("the group at {path} has zarr format {found}, expected {expected}")]
    FormatMismatch {
        path: String,
        expected: ZarrFormat,
        found: ZarrFormat,
    },
    #[error("the group at {path} is read only")]
    ReadOnly { path: String },
    #[error("invalid node name {0:?}, expected a single non-empty path component")]
    InvalidNodeName(String),
    #[error("invalid access mode {0:?}, expected one of r, r+, a, w, w-")]
    InvalidAccessMode(String),
    #[error("invalid zarr format {0}, expected 2 or 3")]
    InvalidZarrFormat(u64),
    #[error("{0}")]
    Table(String),
    #[error(transparent)]
    Store(#[from] FilesystemStoreCreateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    GroupCreate(#[from] GroupCreateError),
    #[error(transparent)]
    NodePath(#[from] NodePathError),
    #[error(transparent)]
    StoreKey(#[from] StoreKeyError),
    #[error(transparent)]
    StorePrefix(#[from] StorePrefixError),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    pub fn table(message: impl Into<String>) -> Self {
        Self::Table(message.into())
    }

    pub(crate) fn read_only(path: impl Into<String>) -> Self {
        Self::ReadOnly { path: path.into() }
    }
}
