//! Store object identity
//!
//! Every database object the model can map to (table, view, SQL query,
//! function, or one of the three CUD stored procedures) is identified by a
//! [`StoreObjectIdentifier`]: kind plus name plus optional schema. Identifiers
//! are totally ordered so they can key deterministic collections.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use crate::error::{RelationalError, Result};

/// The kind of database object an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreObjectType {
    Table,
    View,
    SqlQuery,
    Function,
    InsertStoredProcedure,
    DeleteStoredProcedure,
    UpdateStoredProcedure,
}

impl StoreObjectType {
    /// Human-readable kind name used in messages and debug views.
    pub fn display_name(self) -> &'static str {
        match self {
            StoreObjectType::Table => "Table",
            StoreObjectType::View => "View",
            StoreObjectType::SqlQuery => "SqlQuery",
            StoreObjectType::Function => "Function",
            StoreObjectType::InsertStoredProcedure => "InsertStoredProcedure",
            StoreObjectType::DeleteStoredProcedure => "DeleteStoredProcedure",
            StoreObjectType::UpdateStoredProcedure => "UpdateStoredProcedure",
        }
    }
}

impl fmt::Display for StoreObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Identity of a store object. Two identifiers are equal iff kind, name and
/// schema all match; ordering is (kind, name, schema) with ordinal string
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreObjectIdentifier {
    object_type: StoreObjectType,
    name: String,
    schema: Option<String>,
}

impl StoreObjectIdentifier {
    fn create(
        object_type: StoreObjectType,
        name: impl Into<String>,
        schema: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "name",
                format!("{} name must not be empty", object_type),
            ));
        }
        if let Some(schema) = &schema {
            if schema.is_empty() {
                return Err(RelationalError::invalid_argument(
                    "schema",
                    format!("schema for {} '{}' must not be empty", object_type, name),
                ));
            }
        }
        Ok(StoreObjectIdentifier {
            object_type,
            name,
            schema,
        })
    }

    /// Identifier of a table.
    pub fn table(name: impl Into<String>, schema: Option<String>) -> Result<Self> {
        Self::create(StoreObjectType::Table, name, schema)
    }

    /// Identifier of a view.
    pub fn view(name: impl Into<String>, schema: Option<String>) -> Result<Self> {
        Self::create(StoreObjectType::View, name, schema)
    }

    /// Identifier of a mapped SQL query.
    pub fn sql_query(name: impl Into<String>) -> Result<Self> {
        Self::create(StoreObjectType::SqlQuery, name, None)
    }

    /// Identifier of a store function.
    pub fn function(name: impl Into<String>, schema: Option<String>) -> Result<Self> {
        Self::create(StoreObjectType::Function, name, schema)
    }

    /// Identifier of an insert stored procedure.
    pub fn insert_stored_procedure(name: impl Into<String>, schema: Option<String>) -> Result<Self> {
        Self::create(StoreObjectType::InsertStoredProcedure, name, schema)
    }

    /// Identifier of a delete stored procedure.
    pub fn delete_stored_procedure(name: impl Into<String>, schema: Option<String>) -> Result<Self> {
        Self::create(StoreObjectType::DeleteStoredProcedure, name, schema)
    }

    /// Identifier of an update stored procedure.
    pub fn update_stored_procedure(name: impl Into<String>, schema: Option<String>) -> Result<Self> {
        Self::create(StoreObjectType::UpdateStoredProcedure, name, schema)
    }

    pub fn object_type(&self) -> StoreObjectType {
        self.object_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// The `schema.name` display form, without the kind.
    pub fn display_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for StoreObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.object_type, self.display_name())
    }
}

/// A map keyed by [`StoreObjectIdentifier`] with deterministic iteration
/// order. Used wherever per-store-object state is held: mapping fragments,
/// property overrides, and the resolved store-object collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreObjectDictionary<T> {
    entries: BTreeMap<StoreObjectIdentifier, T>,
}

impl<T> StoreObjectDictionary<T> {
    pub fn new() -> Self {
        StoreObjectDictionary {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &StoreObjectIdentifier) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &StoreObjectIdentifier) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    pub fn get_or_insert_with(
        &mut self,
        id: StoreObjectIdentifier,
        create: impl FnOnce() -> T,
    ) -> &mut T {
        self.entries.entry(id).or_insert_with(create)
    }

    /// Inserts the value, returning the previous one if the identifier was
    /// already present.
    pub fn insert(&mut self, id: StoreObjectIdentifier, value: T) -> Option<T> {
        self.entries.insert(id, value)
    }

    pub fn remove(&mut self, id: &StoreObjectIdentifier) -> Option<T> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &StoreObjectIdentifier) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, StoreObjectIdentifier, T> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, StoreObjectIdentifier, T> {
        self.entries.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, StoreObjectIdentifier, T> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, StoreObjectIdentifier, T> {
        self.entries.values_mut()
    }
}

impl<'a, T> IntoIterator for &'a StoreObjectDictionary<T> {
    type Item = (&'a StoreObjectIdentifier, &'a T);
    type IntoIter = btree_map::Iter<'a, StoreObjectIdentifier, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
