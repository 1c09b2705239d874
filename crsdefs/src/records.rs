//! Raw rows of the registry tables read over SQL.
use crate::RegistryRow;

/// One row of `crs_view`, the union of every CRS table in the registry
#[derive(RegistryRow, Debug, Clone, PartialEq)]
#[table_name = "crs_view"]
pub struct CrsRecord {
    pub table_name: String,
    pub auth_name: String,
    pub code: String,
    pub name: String,
    #[column = "type"]
    pub kind: String,
    pub deprecated: bool,
}

#[derive(RegistryRow, Debug, Clone, PartialEq)]
#[table_name = "metadata"]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}
