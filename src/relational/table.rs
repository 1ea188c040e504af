//! Resolved table-like store objects

use crate::ids::StoreObjectIdentifier;
use crate::relational::column::Column;
use crate::relational::constraint::{
    CheckConstraint, ForeignKeyConstraint, TableIndex, Trigger, UniqueConstraint,
};
use crate::relational::mapping::TableMapping;

/// A resolved table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    id: StoreObjectIdentifier,
    /// True when more than one entity type shares the table's rows or when a
    /// mapped entity type is split across this table and others.
    pub is_shared: bool,
    pub columns: Vec<Column>,
    pub entity_type_mappings: Vec<TableMapping>,
    pub primary_key: Option<UniqueConstraint>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub foreign_key_constraints: Vec<ForeignKeyConstraint>,
    /// Incoming constraints: (dependent table, constraint name) pairs.
    pub referencing_foreign_keys: Vec<(StoreObjectIdentifier, String)>,
    pub indexes: Vec<TableIndex>,
    pub check_constraints: Vec<CheckConstraint>,
    pub triggers: Vec<Trigger>,
    /// True only when every mapped entity type (or fragment) excludes the
    /// table from migrations.
    pub is_excluded_from_migrations: bool,
}

impl Table {
    pub(crate) fn new(id: StoreObjectIdentifier) -> Self {
        Table {
            id,
            is_shared: false,
            columns: Vec::new(),
            entity_type_mappings: Vec::new(),
            primary_key: None,
            unique_constraints: Vec::new(),
            foreign_key_constraints: Vec::new(),
            referencing_foreign_keys: Vec::new(),
            indexes: Vec::new(),
            check_constraints: Vec::new(),
            triggers: Vec::new(),
            is_excluded_from_migrations: true,
        }
    }

    pub fn id(&self) -> &StoreObjectIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn schema(&self) -> Option<&str> {
        self.id.schema()
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A resolved view. Views carry columns and mappings but no constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    id: StoreObjectIdentifier,
    pub is_shared: bool,
    pub columns: Vec<Column>,
    pub entity_type_mappings: Vec<TableMapping>,
}

impl View {
    pub(crate) fn new(id: StoreObjectIdentifier) -> Self {
        View {
            id,
            is_shared: false,
            columns: Vec::new(),
            entity_type_mappings: Vec::new(),
        }
    }

    pub fn id(&self) -> &StoreObjectIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn schema(&self) -> Option<&str> {
        self.id.schema()
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A resolved mapped SQL query.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    id: StoreObjectIdentifier,
    pub sql: String,
    pub columns: Vec<Column>,
    pub entity_type_mappings: Vec<TableMapping>,
}

impl SqlQuery {
    pub(crate) fn new(id: StoreObjectIdentifier, sql: String) -> Self {
        SqlQuery {
            id,
            sql,
            columns: Vec::new(),
            entity_type_mappings: Vec::new(),
        }
    }

    pub fn id(&self) -> &StoreObjectIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
