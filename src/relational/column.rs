//! Resolved columns
//!
//! A column belongs to one table-like store object and carries the property
//! mappings that resolve to it. On shared or inherited tables several
//! properties from different entity types can map to the same column; lookup
//! by entity type picks the first mapping whose declaring type is an ancestor
//! of (or equal to) the queried type.

use crate::types::{ClrType, Value};

/// A (property → column) link as seen from the column side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMapping {
    /// The entity type declaring the property.
    pub entity_type: String,
    pub property: String,
    /// The property's declared nullability; merge validation compares this,
    /// not the column's own widened nullability.
    pub is_nullable: bool,
}

/// A resolved column of a table, view, SQL query or store function.
///
/// The derived facets are resolved eagerly during the freeze step from the
/// first property mapping's facets for this store object.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub store_type: String,
    pub clr_type: ClrType,
    /// Nullable when any mapped property is nullable or when not every row of
    /// the store object carries this column.
    pub is_nullable: bool,
    pub property_mappings: Vec<PropertyMapping>,
    pub max_length: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub is_fixed_length: bool,
    pub collation: Option<String>,
    pub comment: Option<String>,
    pub default_value: Option<Value>,
    pub default_value_sql: Option<String>,
    pub computed_column_sql: Option<String>,
}

impl Column {
    /// The first mapping of the named property whose declaring entity type
    /// appears in the given ancestry chain (the queried type first, root
    /// last).
    pub fn find_property_mapping(
        &self,
        property: &str,
        ancestry: &[String],
    ) -> Option<&PropertyMapping> {
        self.property_mappings.iter().find(|mapping| {
            mapping.property == property
                && ancestry.iter().any(|entity| *entity == mapping.entity_type)
        })
    }
}
