//! Resolved table constraints, indexes and triggers
//!
//! All constraints are keyed by (table identifier, name) for deduplication
//! across inheritance mapping.

use crate::ids::StoreObjectIdentifier;
use crate::model::ReferentialAction;

/// A primary key or alternate (unique) constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
    pub is_primary: bool,
}

/// A foreign key constraint between two tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub name: String,
    pub table: StoreObjectIdentifier,
    pub principal_table: StoreObjectIdentifier,
    pub columns: Vec<String>,
    pub principal_columns: Vec<String>,
    /// Name of the unique constraint on the principal table the key targets.
    pub principal_unique_constraint: String,
    pub on_delete: ReferentialAction,
}

/// A resolved table index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIndex {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_descending: Option<Vec<bool>>,
    pub filter: Option<String>,
}

/// A resolved check constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    pub model_name: String,
    pub name: String,
    pub entity_type: String,
    pub sql: String,
}

/// A resolved trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub model_name: String,
    pub name: String,
    pub entity_type: String,
    pub table_name: String,
    pub table_schema: Option<String>,
}
