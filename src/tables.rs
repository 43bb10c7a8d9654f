//! The `tables` group of an OME-NGFF image.
//!
//! The `tables` group lists its tables in a `tables` attribute.
//! Each table is a child group whose attributes carry the table type and
//! the version of the fractal table format it follows, e.g.
//!
//! ```json
//! {"type": "roi_table", "fractal_table_version": "1"}
//! ```
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    AccessMode, Error, Result, ZarrFormat, ZarrGroup,
    metadata::{StoredNode, inspect_node},
    open::StoreOrGroup,
    open_group_opt,
    storage::{check_store, filesystem_storage},
};

/// Name of the child group holding the tables.
pub const TABLES_GROUP: &str = "tables";
/// Attribute of the tables group listing the table names.
const TABLES_ATTRIBUTE: &str = "tables";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    RoiTable,
    FeatureTable,
    MaskingRoiTable,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::RoiTable => "roi_table",
            TableType::FeatureTable => "feature_table",
            TableType::MaskingRoiTable => "masking_roi_table",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            TableType::RoiTable => "ROI Table",
            TableType::FeatureTable => "Feature Table",
            TableType::MaskingRoiTable => "Masking ROI Table",
        }
    }

    /// Column used to index rows of this kind of table.
    pub fn index_key(&self) -> &'static str {
        match self {
            TableType::RoiTable => "FieldIndex",
            TableType::FeatureTable | TableType::MaskingRoiTable => "label",
        }
    }

    /// Table format versions which are implemented for this type.
    pub fn implemented_versions(&self) -> &'static [&'static str] {
        &["1"]
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TableType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roi_table" => Ok(TableType::RoiTable),
            "feature_table" => Ok(TableType::FeatureTable),
            "masking_roi_table" => Ok(TableType::MaskingRoiTable),
            other => Err(Error::table(format!(
                "Table type {other} not recognized. \
                 Allowed values are: 'roi_table', 'feature_table', 'masking_roi_table'."
            ))),
        }
    }
}

/// Metadata shared by all tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonMeta {
    #[serde(rename = "type")]
    pub table_type: TableType,
    pub fractal_table_version: String,
    /// Any other attributes of the table group.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommonMeta {
    pub fn new(table_type: TableType, version: impl Into<String>) -> Self {
        Self {
            table_type,
            fractal_table_version: version.into(),
            extra: Map::new(),
        }
    }

    fn from_attributes(attributes: &Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(attributes.clone()))?)
    }

    fn into_attributes(self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::table(format!(
                "Table metadata must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Check that a table implementation exists for this type and version.
fn check_table_impl(table_type: TableType, version: &str) -> Result<()> {
    if table_type.implemented_versions().iter().any(|v| *v == version) {
        Ok(())
    } else {
        Err(Error::table(format!(
            "{} version {version} not implemented.",
            table_type.title()
        )))
    }
}

/// A table stored in the tables group.
#[derive(Debug)]
pub struct Table {
    name: String,
    meta: CommonMeta,
    group: ZarrGroup,
}

impl Table {
    fn open(name: &str, group: ZarrGroup) -> Result<Self> {
        let meta = CommonMeta::from_attributes(group.attributes())?;
        check_table_impl(meta.table_type, &meta.fractal_table_version)?;
        Ok(Self {
            name: name.to_string(),
            meta,
            group,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &CommonMeta {
        &self.meta
    }

    pub fn table_type(&self) -> TableType {
        self.meta.table_type
    }

    pub fn group(&self) -> &ZarrGroup {
        &self.group
    }
}

/// Handle to the `tables` child group of an image group.
#[derive(Debug)]
pub struct TableGroup {
    group: ZarrGroup,
}

impl TableGroup {
    /// Open the tables group, creating it if missing.
    ///
    /// Stores are opened in append mode, in the format already stored there
    /// (zarr format 2 for an empty store).
    pub fn new(store: impl Into<StoreOrGroup>) -> Result<Self> {
        let parent = match store.into() {
            StoreOrGroup::Group(group) => group,
            StoreOrGroup::Store(locator) => {
                let path = check_store(&locator)?;
                let storage = filesystem_storage(path)?;
                let format = match inspect_node(&*storage, "/", ZarrFormat::default())? {
                    StoredNode::Group(found) => found,
                    StoredNode::Missing | StoredNode::Array(_) => ZarrFormat::default(),
                };
                open_group_opt(path, AccessMode::Append, format)?
            }
        };
        let group = if parent.contains_group(TABLES_GROUP)? {
            parent.open_child(TABLES_GROUP)?
        } else {
            log::debug!("creating tables group under {}", parent.path());
            parent.create_group(TABLES_GROUP, false)?
        };
        Ok(Self { group })
    }

    pub fn group(&self) -> &ZarrGroup {
        &self.group
    }

    /// Table names from the `tables` attribute, each checked to be a child group.
    fn listed_tables(&self) -> Result<Vec<String>> {
        let tables: Vec<String> = match self.group.attributes().get(TABLES_ATTRIBUTE) {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };
        let groups = self.group.group_keys()?;
        if let Some(missing) = tables.iter().find(|name| !groups.contains(*name)) {
            return Err(Error::table(format!("Table {missing} not found in the group.")));
        }
        Ok(tables)
    }

    /// List tables, optionally only those of one type.
    pub fn list(&self, table_type: Option<TableType>) -> Result<Vec<String>> {
        let tables = self.listed_tables()?;
        let Some(table_type) = table_type else {
            return Ok(tables);
        };
        let mut typed = Vec::new();
        for name in tables {
            let child = self.group.open_child(&name)?;
            let meta = CommonMeta::from_attributes(child.attributes())?;
            if meta.table_type == table_type {
                typed.push(name);
            }
        }
        Ok(typed)
    }

    pub fn get_table(&self, name: &str) -> Result<Table> {
        let tables = self.listed_tables()?;
        if !tables.iter().any(|t| t == name) {
            return Err(Error::table(format!("Table {name} not found in the group.")));
        }
        Table::open(name, self.group.open_child(name)?)
    }

    /// Add a new, empty table.
    pub fn new_table(
        &mut self,
        name: &str,
        table_type: TableType,
        overwrite: bool,
        version: &str,
    ) -> Result<Table> {
        let mut tables = self.listed_tables()?;
        let exists = tables.iter().any(|t| t == name);
        if exists && !overwrite {
            return Err(Error::table(format!(
                "Table {name} already exists in the group."
            )));
        }
        tables.retain(|t| t != name);
        check_table_impl(table_type, version)?;

        let mut child = self.group.create_group(name, overwrite)?;
        let mut meta = CommonMeta::new(table_type, version);
        meta.extra.insert(
            "instance_key".to_string(),
            Value::String(table_type.index_key().to_string()),
        );
        child.update_attributes(meta.clone().into_attributes()?)?;

        tables.push(name.to_string());
        self.group
            .set_attribute(TABLES_ATTRIBUTE, serde_json::to_value(&tables)?)?;
        log::debug!("added {table_type} {name} to {}", self.group.path());

        Ok(Table {
            name: name.to_string(),
            meta,
            group: child,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_meta_keeps_extra_attributes() {
        let attrs: Map<String, Value> = serde_json::from_str(
            r#"{"type": "feature_table", "fractal_table_version": "1", "region": {"path": "../labels/nuclei"}}"#,
        )
        .unwrap();
        let meta = CommonMeta::from_attributes(&attrs).unwrap();
        assert_eq!(meta.table_type, TableType::FeatureTable);
        assert_eq!(meta.fractal_table_version, "1");
        assert!(meta.extra.contains_key("region"));
        assert_eq!(meta.into_attributes().unwrap(), attrs);
    }

    #[test]
    fn unknown_versions_are_not_implemented() {
        assert!(check_table_impl(TableType::RoiTable, "1").is_ok());
        let err = check_table_impl(TableType::MaskingRoiTable, "2").unwrap_err();
        assert_eq!(err.to_string(), "Masking ROI Table version 2 not implemented.");
    }

    #[test]
    fn parse_table_types() {
        for t in [
            TableType::RoiTable,
            TableType::FeatureTable,
            TableType::MaskingRoiTable,
        ] {
            assert_eq!(t.as_str().parse::<TableType>().unwrap(), t);
        }
        assert!("roi".parse::<TableType>().is_err());
    }
}
