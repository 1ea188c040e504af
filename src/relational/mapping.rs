//! Mapping link objects
//!
//! Link objects connect one domain type to one store object and one property
//! to one column. They are constructed bottom-up during resolution and never
//! mutated afterwards; query translation and the update pipeline traverse
//! them in both directions.

use crate::ids::StoreObjectIdentifier;

/// Link between one property and one column of a store object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub property: String,
    pub column: String,
}

/// Link between one domain type and one table-like store object (table, view,
/// SQL query or store function).
#[derive(Debug, Clone, PartialEq)]
pub struct TableMapping {
    pub entity_type: String,
    pub store_object: StoreObjectIdentifier,
    pub column_mappings: Vec<ColumnMapping>,
    /// For a store object shared by several entity types, exactly one mapping
    /// is the principal. `None` when the store object is not shared.
    pub is_shared_table_principal: Option<bool>,
    /// For an entity type split across several store objects, exactly one
    /// mapping is the principal. `None` when the entity type is not split.
    pub is_split_entity_type_principal: Option<bool>,
    /// Whether this mapping's store object also carries the rows of the
    /// entity's derived types. `None` on leaf types.
    pub includes_derived_types: Option<bool>,
}

/// Link between one domain type and one store stored procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProcedureMapping {
    pub entity_type: String,
    pub store_object: StoreObjectIdentifier,
    /// (property, parameter name) pairs in parameter order.
    pub parameter_mappings: Vec<(String, String)>,
    /// (property, result column name) pairs in result-column order.
    pub result_column_mappings: Vec<(String, String)>,
}
