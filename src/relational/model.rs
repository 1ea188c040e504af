//! The frozen relational model
//!
//! Built once from the mutable domain model and immutable thereafter: the
//! type exposes no mutators, so a single instance can be shared across
//! threads for the lifetime of the compiled model.

use std::collections::HashMap;

use crate::error::Result;
use crate::ids::{StoreObjectDictionary, StoreObjectIdentifier};
use crate::model::{DbFunction, Model, Sequence};
use crate::relational::builder;
use crate::relational::function::StoreFunction;
use crate::relational::mapping::TableMapping;
use crate::relational::stored_procedure::StoreStoredProcedure;
use crate::relational::table::{SqlQuery, Table, View};
use crate::relational::column::{Column, PropertyMapping};
use crate::type_mapping::RelationalTypeMappingSource;

/// The derived, immutable relational schema: every store object the domain
/// model maps to, with all cross-links resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalModel {
    pub(crate) tables: StoreObjectDictionary<Table>,
    pub(crate) views: StoreObjectDictionary<View>,
    pub(crate) queries: StoreObjectDictionary<SqlQuery>,
    pub(crate) functions: StoreObjectDictionary<StoreFunction>,
    pub(crate) stored_procedures: StoreObjectDictionary<StoreStoredProcedure>,
    pub(crate) sequences: Vec<Sequence>,
    pub(crate) db_functions: Vec<DbFunction>,
    /// Per entity type: the type itself first, then its ancestors up to the
    /// root. Used for assignability checks on frozen mappings.
    pub(crate) ancestry: HashMap<String, Vec<String>>,
    pub(crate) annotations: Vec<(String, String)>,
}

impl RelationalModel {
    /// Resolve the mutable domain model into its relational form. This is the
    /// freeze point: on success the result is safe for unsynchronized
    /// concurrent reads.
    pub fn create(
        model: &Model,
        type_mapping: &dyn RelationalTypeMappingSource,
    ) -> Result<RelationalModel> {
        builder::build(model, type_mapping)
    }

    pub fn find_table(&self, name: &str, schema: Option<&str>) -> Option<&Table> {
        let id = StoreObjectIdentifier::table(name, schema.map(str::to_string)).ok()?;
        self.tables.get(&id)
    }

    pub fn find_view(&self, name: &str, schema: Option<&str>) -> Option<&View> {
        let id = StoreObjectIdentifier::view(name, schema.map(str::to_string)).ok()?;
        self.views.get(&id)
    }

    pub fn find_query(&self, name: &str) -> Option<&SqlQuery> {
        let id = StoreObjectIdentifier::sql_query(name).ok()?;
        self.queries.get(&id)
    }

    /// Find a store function by its full signature.
    pub fn find_function(
        &self,
        name: &str,
        schema: Option<&str>,
        parameter_store_types: &[&str],
    ) -> Option<&StoreFunction> {
        let signature = builder::function_signature(name, parameter_store_types);
        let id = StoreObjectIdentifier::function(signature, schema.map(str::to_string)).ok()?;
        self.functions.get(&id)
    }

    pub fn find_stored_procedure(&self, id: &StoreObjectIdentifier) -> Option<&StoreStoredProcedure> {
        self.stored_procedures.get(id)
    }

    pub fn find_sequence(&self, name: &str, schema: Option<&str>) -> Option<&Sequence> {
        self.sequences
            .iter()
            .find(|s| s.name() == name && s.schema() == schema)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    pub fn queries(&self) -> impl Iterator<Item = &SqlQuery> {
        self.queries.values()
    }

    pub fn functions(&self) -> impl Iterator<Item = &StoreFunction> {
        self.functions.values()
    }

    pub fn stored_procedures(&self) -> impl Iterator<Item = &StoreStoredProcedure> {
        self.stored_procedures.values()
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn db_functions(&self) -> &[DbFunction] {
        &self.db_functions
    }

    pub fn annotations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.annotations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All table mappings of an entity type across the model, in table order.
    pub fn mappings_of(&self, entity_type: &str) -> Vec<&TableMapping> {
        let mut mappings = Vec::new();
        for table in self.tables.values() {
            mappings.extend(
                table
                    .entity_type_mappings
                    .iter()
                    .filter(|m| m.entity_type == entity_type),
            );
        }
        for view in self.views.values() {
            mappings.extend(
                view.entity_type_mappings
                    .iter()
                    .filter(|m| m.entity_type == entity_type),
            );
        }
        for query in self.queries.values() {
            mappings.extend(
                query
                    .entity_type_mappings
                    .iter()
                    .filter(|m| m.entity_type == entity_type),
            );
        }
        for function in self.functions.values() {
            mappings.extend(
                function
                    .entity_type_mappings
                    .iter()
                    .filter(|m| m.entity_type == entity_type),
            );
        }
        mappings
    }

    /// Find the column of a table that a property of the given entity type
    /// resolves to, honoring inheritance: the first property mapping whose
    /// declaring type is an ancestor of (or equal to) the queried type wins.
    pub fn find_column_mapping<'a>(
        &'a self,
        table: &'a Table,
        entity_type: &str,
        property: &str,
    ) -> Option<(&'a Column, &'a PropertyMapping)> {
        let ancestry = self.ancestry.get(entity_type)?;
        for column in &table.columns {
            if let Some(mapping) = column.find_property_mapping(property, ancestry) {
                return Some((column, mapping));
            }
        }
        None
    }
}
