//! Open local zarr groups in either zarr format 2 or 3,
//! from a path or an already-open group.
//!
//! ```no_run
//! use zarrs_ngio::{AccessMode, ZarrFormat, open_group_opt};
//!
//! let group = open_group_opt("/tmp/data.zarr", AccessMode::Append, ZarrFormat::V3)?;
//! assert_eq!(group.zarr_format(), ZarrFormat::V3);
//! # Ok::<(), zarrs_ngio::Error>(())
//! ```
mod error;
pub mod group;
pub mod metadata;
mod mode;
pub mod open;
pub mod storage;
pub mod tables;

pub use zarrs;

pub use error::{Error, Result};
pub use group::ZarrGroup;
pub use mode::{AccessMode, ZarrFormat};
pub use open::{StoreOrGroup, open_group, open_group_opt};
pub use storage::{StoreLocator, check_store};
