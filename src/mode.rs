use std::{fmt, str::FromStr};

use zarrs::config::MetadataRetrieveVersion;

use crate::Error;

/// How a group is opened.
///
/// Mirrors the usual zarr access modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// `r`: read only, the group must exist.
    Read,
    /// `r+`: read and write, the group must exist.
    ReadWrite,
    /// `a`: read and write, the group is created if missing.
    Append,
    /// `w`: create the group, erasing anything already stored at its path.
    Overwrite,
    /// `w-`: create the group, failing if anything is already stored at its path.
    CreateNew,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "r",
            AccessMode::ReadWrite => "r+",
            AccessMode::Append => "a",
            AccessMode::Overwrite => "w",
            AccessMode::CreateNew => "w-",
        }
    }

    /// Whether handles opened in this mode may modify the store.
    pub fn is_writable(&self) -> bool {
        !matches!(self, AccessMode::Read)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(AccessMode::Read),
            "r+" => Ok(AccessMode::ReadWrite),
            "a" => Ok(AccessMode::Append),
            "w" => Ok(AccessMode::Overwrite),
            "w-" => Ok(AccessMode::CreateNew),
            other => Err(Error::InvalidAccessMode(other.to_string())),
        }
    }
}

/// Zarr storage format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ZarrFormat {
    #[default]
    V2 = 2,
    V3 = 3,
}

impl ZarrFormat {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// The other supported format.
    pub(crate) fn other(&self) -> Self {
        match self {
            ZarrFormat::V2 => ZarrFormat::V3,
            ZarrFormat::V3 => ZarrFormat::V2,
        }
    }

    pub(crate) fn retrieve_version(&self) -> MetadataRetrieveVersion {
        match self {
            ZarrFormat::V2 => MetadataRetrieveVersion::V2,
            ZarrFormat::V3 => MetadataRetrieveVersion::V3,
        }
    }
}

impl fmt::Display for ZarrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl TryFrom<u64> for ZarrFormat {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ZarrFormat::V2),
            3 => Ok(ZarrFormat::V3),
            n => Err(Error::InvalidZarrFormat(n)),
        }
    }
}

impl TryFrom<u8> for ZarrFormat {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        u64::from(value).try_into()
    }
}
