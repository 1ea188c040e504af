//! Relational model resolution
//!
//! Turns the mutable domain model into the frozen [`RelationalModel`] in
//! staged passes: store functions first, then store objects and column
//! mappings per entity type (hierarchy roots before derived types), then
//! constraints, then the synthesized inheritance and splitting links, then
//! stored procedures, and finally the post-passes that set the sharing and
//! splitting flags and the foreign key backlinks.
//!
//! Every collection is keyed by [`StoreObjectIdentifier`] and every pass
//! walks entity types in (inheritance depth, declaration) order, so the
//! result is deterministic for a given model.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config_source::ConfigurationSource;
use crate::error::{RelationalError, Result};
use crate::ids::{StoreObjectDictionary, StoreObjectIdentifier, StoreObjectType};
use crate::model::{
    DbFunction, EntityTypeId, MappingStrategy, Model, Property, ReferentialAction,
    StoredProcedureKind,
};
use crate::naming;
use crate::relational::column::{Column, PropertyMapping};
use crate::relational::constraint::{
    CheckConstraint, ForeignKeyConstraint, TableIndex, Trigger, UniqueConstraint,
};
use crate::relational::function::{StoreFunction, StoreFunctionParameter};
use crate::relational::mapping::{ColumnMapping, StoredProcedureMapping, TableMapping};
use crate::relational::model::RelationalModel;
use crate::relational::stored_procedure::{
    StoreStoredProcedure, StoreStoredProcedureParameter, StoreStoredProcedureResultColumn,
};
use crate::relational::table::{SqlQuery, Table, View};
use crate::type_mapping::RelationalTypeMappingSource;

/// The full store signature of a function: `name(type, type, ...)`. Keying
/// store functions by signature keeps overloads distinct.
pub(crate) fn function_signature(name: &str, parameter_store_types: &[&str]) -> String {
    format!("{}({})", name, parameter_store_types.join(", "))
}

/// A configured constraint name that will survive resolution. Convention
/// names can still be overridden and reserve nothing.
fn configured_name(name: &Option<String>, source: Option<ConfigurationSource>) -> Option<&str> {
    match source {
        Some(source) if !source.is_strict() => None,
        _ => name.as_deref(),
    }
}

pub(crate) fn build(
    model: &Model,
    type_mapping: &dyn RelationalTypeMappingSource,
) -> Result<RelationalModel> {
    let mut builder = Builder::new(model, type_mapping);
    builder.order_entity_types()?;
    builder.resolve_store_objects()?;
    builder.add_functions()?;
    builder.add_mappings()?;
    builder.collect_explicit_constraint_names()?;
    builder.add_constraints()?;
    builder.add_foreign_keys()?;
    builder.add_inheritance_and_splitting_links()?;
    builder.add_stored_procedures()?;
    builder.apply_mapping_flags()?;
    builder.link_referencing_foreign_keys();
    builder.finish()
}

struct Builder<'a> {
    model: &'a Model,
    type_mapping: &'a dyn RelationalTypeMappingSource,
    tables: StoreObjectDictionary<Table>,
    views: StoreObjectDictionary<View>,
    queries: StoreObjectDictionary<SqlQuery>,
    functions: StoreObjectDictionary<StoreFunction>,
    stored_procedures: StoreObjectDictionary<StoreStoredProcedure>,
    /// Entity types in (inheritance depth, declaration) order, so every base
    /// type is processed before its derived types.
    ordered: Vec<EntityTypeId>,
    principal_objects: HashMap<EntityTypeId, Option<StoreObjectIdentifier>>,
    /// Table-like store objects per entity type, principal first.
    entity_objects: HashMap<EntityTypeId, Vec<StoreObjectIdentifier>>,
    /// Names reserved by explicitly named constraints, per table. Default
    /// names avoid these even when the named sibling is declared later.
    explicit_key_names: HashMap<StoreObjectIdentifier, HashSet<String>>,
    explicit_index_names: HashMap<StoreObjectIdentifier, HashSet<String>>,
    explicit_foreign_key_names: HashMap<StoreObjectIdentifier, HashSet<String>>,
}

impl<'a> Builder<'a> {
    fn new(model: &'a Model, type_mapping: &'a dyn RelationalTypeMappingSource) -> Self {
        Builder {
            model,
            type_mapping,
            tables: StoreObjectDictionary::new(),
            views: StoreObjectDictionary::new(),
            queries: StoreObjectDictionary::new(),
            functions: StoreObjectDictionary::new(),
            stored_procedures: StoreObjectDictionary::new(),
            ordered: Vec::new(),
            principal_objects: HashMap::new(),
            entity_objects: HashMap::new(),
            explicit_key_names: HashMap::new(),
            explicit_index_names: HashMap::new(),
            explicit_foreign_key_names: HashMap::new(),
        }
    }

    fn order_entity_types(&mut self) -> Result<()> {
        let mut ordered: Vec<(usize, EntityTypeId)> = Vec::new();
        for entity in self.model.entity_types() {
            ordered.push((self.model.depth_of(entity.id())?, entity.id()));
        }
        ordered.sort();
        self.ordered = ordered.into_iter().map(|(_, id)| id).collect();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Store object resolution
    // ------------------------------------------------------------------

    fn resolve_store_objects(&mut self) -> Result<()> {
        for id in self.ordered.clone() {
            self.principal_object(id)?;
        }
        Ok(())
    }

    fn principal_object(&mut self, id: EntityTypeId) -> Result<Option<StoreObjectIdentifier>> {
        if let Some(resolved) = self.principal_objects.get(&id) {
            return Ok(resolved.clone());
        }
        let resolved = self.resolve_principal_object(id)?;
        self.principal_objects.insert(id, resolved.clone());
        Ok(resolved)
    }

    /// The principal store object of an entity type: SQL query over function
    /// over view over table, the table being the default.
    fn resolve_principal_object(
        &mut self,
        id: EntityTypeId,
    ) -> Result<Option<StoreObjectIdentifier>> {
        let model = self.model;
        let entity = model.entity_type(id)?;
        if entity.sql_query.is_some() {
            return Ok(Some(StoreObjectIdentifier::sql_query(entity.name())?));
        }
        if let Some(function_name) = &entity.function_name {
            let function = model.find_function(function_name).ok_or_else(|| {
                RelationalError::invalid_argument(
                    "function",
                    format!(
                        "'{}' is mapped to an unknown function '{}'",
                        entity.name(),
                        function_name
                    ),
                )
            })?;
            return Ok(Some(self.function_store_id(function)?));
        }
        if let Some(view_name) = &entity.view_name {
            let schema = entity
                .view_schema
                .clone()
                .or_else(|| model.default_schema().map(str::to_string));
            return Ok(Some(StoreObjectIdentifier::view(view_name.clone(), schema)?));
        }

        let strategy = model.mapping_strategy(id)?;
        if entity.base_type().is_some()
            && strategy != MappingStrategy::Tph
            && model.primary_key_of(id)?.is_none()
        {
            return Err(RelationalError::InvalidInheritanceMapping {
                entity: entity.name().to_string(),
                message: format!(
                    "the {} strategy requires a primary key on the hierarchy",
                    strategy.display_name()
                ),
            });
        }
        if strategy == MappingStrategy::Tph && entity.base_type().is_some() {
            let root = model.root_of(id)?;
            let root_object = self.principal_object(root)?;
            let entity = model.entity_type(id)?;
            if let Some(explicit) = &entity.table_name {
                let matches_root = matches!(
                    &root_object,
                    Some(object)
                        if object.object_type() == StoreObjectType::Table
                            && object.name() == explicit.as_str()
                );
                if !matches_root {
                    return Err(RelationalError::InvalidInheritanceMapping {
                        entity: entity.name().to_string(),
                        message: "a TPH derived type must map to the same table as its root"
                            .to_string(),
                    });
                }
            }
            return Ok(root_object);
        }
        if strategy == MappingStrategy::Tpc && entity.is_abstract {
            return Ok(None);
        }

        let name = match &entity.table_name {
            Some(name) => name.clone(),
            None => self.default_table_name(id)?,
        };
        let entity = model.entity_type(id)?;
        let schema = entity
            .schema
            .clone()
            .or_else(|| model.default_schema().map(str::to_string));
        Ok(Some(StoreObjectIdentifier::table(name, schema)?))
    }

    /// Default table name: the short name, or `{ownerTable}_{navigation}` for
    /// an owned type with a table-mapped owner.
    fn default_table_name(&mut self, id: EntityTypeId) -> Result<String> {
        let model = self.model;
        let entity = model.entity_type(id)?;
        if let Some(ownership) = entity.ownership() {
            let owner = ownership.owner;
            let navigation = ownership.navigation.clone();
            if let Some(object) = self.principal_object(owner)? {
                if object.object_type() == StoreObjectType::Table {
                    return Ok(format!("{}_{}", object.name(), navigation));
                }
            }
        }
        Ok(model.entity_type(id)?.name().to_string())
    }

    fn function_store_id(&self, function: &DbFunction) -> Result<StoreObjectIdentifier> {
        let mut store_types = Vec::new();
        for parameter in function.parameters() {
            let mapping = self
                .type_mapping
                .find_mapping(parameter.clr_type, parameter.store_type.as_deref())
                .ok_or_else(|| {
                    RelationalError::invalid_argument(
                        "parameter",
                        format!(
                            "no store type mapping for parameter '{}' of function '{}'",
                            parameter.name,
                            function.model_name()
                        ),
                    )
                })?;
            store_types.push(mapping.store_type);
        }
        let store_types: Vec<&str> = store_types.iter().map(String::as_str).collect();
        let signature = function_signature(function.store_name(), &store_types);
        let schema = function
            .schema
            .clone()
            .or_else(|| self.model.default_schema().map(str::to_string));
        StoreObjectIdentifier::function(signature, schema)
    }

    // ------------------------------------------------------------------
    // Store functions
    // ------------------------------------------------------------------

    fn add_functions(&mut self) -> Result<()> {
        for function in self.model.functions() {
            let object = self.function_store_id(function)?;
            let return_store_type = match self
                .type_mapping
                .find_mapping(function.return_type, function.store_type.as_deref())
            {
                Some(mapping) => Some(mapping.store_type),
                None if function.is_scalar => {
                    return Err(RelationalError::invalid_argument(
                        "function",
                        format!(
                            "no store type mapping for the return type of function '{}'",
                            function.model_name()
                        ),
                    ));
                }
                None => function.store_type.clone(),
            };
            let mut parameters = Vec::new();
            for parameter in function.parameters() {
                let mapping = self
                    .type_mapping
                    .find_mapping(parameter.clr_type, parameter.store_type.as_deref())
                    .ok_or_else(|| {
                        RelationalError::invalid_argument(
                            "parameter",
                            format!(
                                "no store type mapping for parameter '{}' of function '{}'",
                                parameter.name,
                                function.model_name()
                            ),
                        )
                    })?;
                parameters.push(StoreFunctionParameter {
                    name: parameter.name.clone(),
                    clr_type: parameter.clr_type,
                    store_type: mapping.store_type,
                    propagates_nullability: parameter.propagates_nullability,
                });
            }

            let name = function.store_name().to_string();
            let schema = object.schema().map(str::to_string);
            let store = self
                .functions
                .get_or_insert_with(object.clone(), || {
                    StoreFunction::new(object.clone(), name, schema)
                });
            if store.db_functions.is_empty() {
                store.is_built_in = function.is_built_in;
                store.is_scalar = function.is_scalar;
                store.is_aggregate = function.is_aggregate;
                store.return_store_type = return_store_type;
                store.parameters = parameters;
            } else if store.return_store_type != return_store_type
                || store.is_scalar != function.is_scalar
                || store.is_aggregate != function.is_aggregate
                || store.is_built_in != function.is_built_in
            {
                return Err(RelationalError::invalid_argument(
                    "function",
                    format!(
                        "functions '{}' and '{}' map to the same store function '{}' \
                         but differ in return type or kind",
                        store.db_functions[0],
                        function.model_name(),
                        object.display_name(),
                    ),
                ));
            }
            store.db_functions.push(function.model_name().to_string());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entity type mappings and columns
    // ------------------------------------------------------------------

    fn add_mappings(&mut self) -> Result<()> {
        for id in self.ordered.clone() {
            let Some(principal) = self.principal_objects.get(&id).cloned().flatten() else {
                continue;
            };
            let entity = self.model.entity_type(id)?;
            let mut objects = vec![principal.clone()];
            for (fragment_id, _) in entity.mapping_fragments() {
                if *fragment_id != principal {
                    objects.push(fragment_id.clone());
                }
            }
            self.entity_objects.insert(id, objects.clone());
            self.ensure_store_objects(id, &objects)?;

            let placements = self.property_placements(id, &objects)?;
            for (object, properties) in placements {
                self.add_table_mapping(id, &object, &properties)?;
            }
        }
        Ok(())
    }

    fn ensure_store_objects(&mut self, id: EntityTypeId, objects: &[StoreObjectIdentifier]) -> Result<()> {
        let entity = self.model.entity_type(id)?;
        for object in objects {
            match object.object_type() {
                StoreObjectType::Table => {
                    self.tables
                        .get_or_insert_with(object.clone(), || Table::new(object.clone()));
                }
                StoreObjectType::View => {
                    self.views
                        .get_or_insert_with(object.clone(), || View::new(object.clone()));
                }
                StoreObjectType::SqlQuery => {
                    let sql = entity.sql_query.clone().unwrap_or_default();
                    self.queries
                        .get_or_insert_with(object.clone(), || SqlQuery::new(object.clone(), sql));
                }
                // Store functions are created from the model functions before
                // any mapping; stored procedures are never principal objects.
                _ => {}
            }
        }
        Ok(())
    }

    /// Distribute an entity type's properties over its store objects. The
    /// inheritance strategy decides the included set; mapping fragments pull
    /// redirected properties away from the principal; primary key properties
    /// go to every store object of the entity.
    fn property_placements(
        &self,
        id: EntityTypeId,
        objects: &[StoreObjectIdentifier],
    ) -> Result<Vec<(StoreObjectIdentifier, Vec<(EntityTypeId, &'a Property)>)>> {
        let model = self.model;
        let strategy = model.mapping_strategy(id)?;
        let entity = model.entity_type(id)?;
        let pk_properties: HashSet<&str> = model
            .primary_key_of(id)?
            .map(|key| key.properties.iter().map(String::as_str).collect())
            .unwrap_or_default();

        let included: Vec<(EntityTypeId, &Property)> = model
            .properties_of(id)?
            .into_iter()
            .filter(|(declaring, property)| {
                if strategy == MappingStrategy::Tpt && entity.base_type().is_some() {
                    *declaring == id || pk_properties.contains(property.name())
                } else {
                    true
                }
            })
            .collect();

        let mut placements: Vec<(StoreObjectIdentifier, Vec<(EntityTypeId, &'a Property)>)> =
            objects
                .iter()
                .map(|object| (object.clone(), Vec::new()))
                .collect();
        for (declaring, property) in included {
            if pk_properties.contains(property.name()) {
                for placement in &mut placements {
                    placement.1.push((declaring, property));
                }
                continue;
            }
            let target = objects
                .iter()
                .skip(1)
                .position(|object| property.overrides().contains(object));
            match target {
                Some(index) => placements[index + 1].1.push((declaring, property)),
                None => placements[0].1.push((declaring, property)),
            }
        }
        Ok(placements)
    }

    fn add_table_mapping(
        &mut self,
        id: EntityTypeId,
        object: &StoreObjectIdentifier,
        properties: &[(EntityTypeId, &Property)],
    ) -> Result<()> {
        let model = self.model;
        let entity_name = model.entity_type(id)?.name().to_string();
        let covers = self.covers_all_rows(id, object)?;

        let mut mapping = TableMapping {
            entity_type: entity_name,
            store_object: object.clone(),
            column_mappings: Vec::new(),
            is_shared_table_principal: None,
            is_split_entity_type_principal: None,
            includes_derived_types: None,
        };
        for (declaring, property) in properties {
            let declaring_name = model.entity_type(*declaring)?.name().to_string();
            let column_name = self.resolve_column_name(id, property, object)?;
            let store_type = self.resolve_store_type(property)?;
            self.merge_column(object, &column_name, store_type, covers, &declaring_name, property)?;
            mapping.column_mappings.push(ColumnMapping {
                property: property.name().to_string(),
                column: column_name,
            });
        }
        self.push_mapping(object, mapping)
    }

    /// The column name a property resolves to on a store object: the
    /// per-store-object override, else the globally configured name, else the
    /// default, which is the property name, prefixed with the owning
    /// navigation when an owned type shares its owner's store object.
    fn resolve_column_name(
        &self,
        id: EntityTypeId,
        property: &Property,
        object: &StoreObjectIdentifier,
    ) -> Result<String> {
        if let Some(overrides) = property.find_overrides(object) {
            if let Some(name) = &overrides.column_name {
                return Ok(name.clone());
            }
        }
        if let Some(name) = property.column_name() {
            return Ok(name.to_string());
        }
        let entity = self.model.entity_type(id)?;
        if let Some(ownership) = entity.ownership() {
            if let Some(Some(owner_object)) = self.principal_objects.get(&ownership.owner) {
                if owner_object == object {
                    return Ok(format!("{}_{}", ownership.navigation, property.name()));
                }
            }
        }
        Ok(property.name().to_string())
    }

    fn resolve_store_type(&self, property: &Property) -> Result<String> {
        self.type_mapping
            .find_mapping(property.clr_type(), property.store_type.as_deref())
            .map(|mapping| mapping.store_type)
            .ok_or_else(|| {
                RelationalError::invalid_argument(
                    "property",
                    format!(
                        "no store type mapping for property '{}.{}'",
                        property.declaring_type(),
                        property.name()
                    ),
                )
            })
    }

    /// Whether every row of the store object has a value for the columns of
    /// this entity type. False when another entity type outside this type's
    /// own subtree is already mapped to the same store object: a TPH strict
    /// ancestor (the derived rows are a subset) or an unrelated row sharer
    /// (the shared row may not carry this type at all). Base types and
    /// earlier-declared sharers are processed first, so the mappings created
    /// so far are the ones that matter.
    fn covers_all_rows(&self, id: EntityTypeId, object: &StoreObjectIdentifier) -> Result<bool> {
        let model = self.model;
        for name in self.mapped_entity_names(object) {
            if let Some(other) = model.find_entity_type(&name) {
                if other != id && !model.is_assignable_from(id, other)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn merge_column(
        &mut self,
        object: &StoreObjectIdentifier,
        name: &str,
        store_type: String,
        covers: bool,
        declaring: &str,
        property: &Property,
    ) -> Result<()> {
        let declared_nullable = property.is_nullable;
        let columns = self.columns_mut(object)?;
        if let Some(column) = columns.iter_mut().find(|c| c.name == name) {
            if let Some(first) = column.property_mappings.first() {
                if column.store_type != store_type {
                    return Err(RelationalError::MappingConflict {
                        first_entity: first.entity_type.clone(),
                        first_property: first.property.clone(),
                        second_entity: declaring.to_string(),
                        second_property: property.name().to_string(),
                        column: name.to_string(),
                        table: object.display_name(),
                        facet: "ColumnType".to_string(),
                    });
                }
                if first.is_nullable != declared_nullable {
                    return Err(RelationalError::MappingConflict {
                        first_entity: first.entity_type.clone(),
                        first_property: first.property.clone(),
                        second_entity: declaring.to_string(),
                        second_property: property.name().to_string(),
                        column: name.to_string(),
                        table: object.display_name(),
                        facet: "IsNullable".to_string(),
                    });
                }
            }
            column.is_nullable = column.is_nullable && (declared_nullable || !covers);
            let already_mapped = column
                .property_mappings
                .iter()
                .any(|m| m.entity_type == declaring && m.property == property.name());
            if !already_mapped {
                column.property_mappings.push(PropertyMapping {
                    entity_type: declaring.to_string(),
                    property: property.name().to_string(),
                    is_nullable: declared_nullable,
                });
            }
            return Ok(());
        }
        columns.push(Column {
            name: name.to_string(),
            store_type,
            clr_type: property.clr_type(),
            is_nullable: declared_nullable || !covers,
            property_mappings: vec![PropertyMapping {
                entity_type: declaring.to_string(),
                property: property.name().to_string(),
                is_nullable: declared_nullable,
            }],
            max_length: property.max_length,
            precision: property.precision,
            scale: property.scale,
            is_fixed_length: property.is_fixed_length,
            collation: property.collation.clone(),
            comment: property.comment.clone(),
            default_value: property.default_value().cloned(),
            default_value_sql: property.default_value_sql().map(str::to_string),
            computed_column_sql: property.computed_column_sql().map(str::to_string),
        });
        Ok(())
    }

    fn columns_mut(&mut self, object: &StoreObjectIdentifier) -> Result<&mut Vec<Column>> {
        let missing = || {
            RelationalError::invalid_argument(
                "store object",
                format!("'{}' has not been resolved", object),
            )
        };
        match object.object_type() {
            StoreObjectType::Table => self
                .tables
                .get_mut(object)
                .map(|t| &mut t.columns)
                .ok_or_else(missing),
            StoreObjectType::View => self
                .views
                .get_mut(object)
                .map(|v| &mut v.columns)
                .ok_or_else(missing),
            StoreObjectType::SqlQuery => self
                .queries
                .get_mut(object)
                .map(|q| &mut q.columns)
                .ok_or_else(missing),
            StoreObjectType::Function => self
                .functions
                .get_mut(object)
                .map(|f| &mut f.columns)
                .ok_or_else(missing),
            _ => Err(missing()),
        }
    }

    fn push_mapping(&mut self, object: &StoreObjectIdentifier, mapping: TableMapping) -> Result<()> {
        let missing = || {
            RelationalError::invalid_argument(
                "store object",
                format!("'{}' has not been resolved", object),
            )
        };
        match object.object_type() {
            StoreObjectType::Table => self
                .tables
                .get_mut(object)
                .map(|t| t.entity_type_mappings.push(mapping))
                .ok_or_else(missing),
            StoreObjectType::View => self
                .views
                .get_mut(object)
                .map(|v| v.entity_type_mappings.push(mapping))
                .ok_or_else(missing),
            StoreObjectType::SqlQuery => self
                .queries
                .get_mut(object)
                .map(|q| q.entity_type_mappings.push(mapping))
                .ok_or_else(missing),
            StoreObjectType::Function => self
                .functions
                .get_mut(object)
                .map(|f| f.entity_type_mappings.push(mapping))
                .ok_or_else(missing),
            _ => Err(missing()),
        }
    }

    fn mapped_entity_names(&self, object: &StoreObjectIdentifier) -> Vec<String> {
        let mappings = match object.object_type() {
            StoreObjectType::Table => self.tables.get(object).map(|t| &t.entity_type_mappings),
            StoreObjectType::View => self.views.get(object).map(|v| &v.entity_type_mappings),
            StoreObjectType::SqlQuery => self.queries.get(object).map(|q| &q.entity_type_mappings),
            StoreObjectType::Function => self.functions.get(object).map(|f| &f.entity_type_mappings),
            _ => None,
        };
        mappings
            .map(|mappings| mappings.iter().map(|m| m.entity_type.clone()).collect())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------------

    /// Collects, per table, the names that explicitly named keys, indexes and
    /// foreign keys will take. Default names must stay clear of these even
    /// when the named sibling is declared after the constraint being named.
    fn collect_explicit_constraint_names(&mut self) -> Result<()> {
        let model = self.model;
        let max_length = model.max_identifier_length();
        for id in self.ordered.clone() {
            let Some(objects) = self.entity_objects.get(&id) else {
                continue;
            };
            if objects[0].object_type() != StoreObjectType::Table {
                continue;
            }
            let principal = objects[0].clone();
            let entity = model.entity_type(id)?;
            for key in entity.keys() {
                if let Some(name) = configured_name(&key.name, key.name_source) {
                    self.explicit_key_names
                        .entry(principal.clone())
                        .or_default()
                        .insert(naming::truncate_identifier(name, max_length));
                }
            }
            for index in entity.indexes() {
                if let Some(name) = configured_name(&index.name, index.name_source) {
                    self.explicit_index_names
                        .entry(principal.clone())
                        .or_default()
                        .insert(naming::truncate_identifier(name, max_length));
                }
            }
            for foreign_key in entity.foreign_keys() {
                if let Some(name) = configured_name(&foreign_key.name, foreign_key.name_source) {
                    self.explicit_foreign_key_names
                        .entry(principal.clone())
                        .or_default()
                        .insert(naming::truncate_identifier(name, max_length));
                }
            }
        }
        Ok(())
    }

    fn add_constraints(&mut self) -> Result<()> {
        let model = self.model;
        let max_length = model.max_identifier_length();
        for id in self.ordered.clone() {
            let Some(objects) = self.entity_objects.get(&id).cloned() else {
                continue;
            };
            if objects[0].object_type() != StoreObjectType::Table {
                continue;
            }
            let principal = objects[0].clone();
            let table_objects: Vec<StoreObjectIdentifier> = objects
                .iter()
                .filter(|o| o.object_type() == StoreObjectType::Table)
                .cloned()
                .collect();
            let entity = model.entity_type(id)?;

            // Keys: the primary key materializes on every table of the entity,
            // alternate keys on the principal table only.
            if let Some(key) = model.primary_key_of(id)?.cloned() {
                for object in &table_objects {
                    let columns = self.map_columns(id, &key.properties, object)?;
                    let explicit = if *object == principal { key.name.clone() } else { None };
                    let name = explicit
                        .unwrap_or_else(|| naming::key_name(object.name(), &columns, true));
                    let name = naming::truncate_identifier(&name, max_length);
                    let table = self.table_mut(object)?;
                    if table.primary_key.is_none() {
                        table.primary_key = Some(UniqueConstraint {
                            name,
                            columns,
                            is_primary: true,
                        });
                    }
                }
            }
            for key in entity.keys().iter().filter(|k| !k.is_primary) {
                let columns = self.map_columns(id, &key.properties, &principal)?;
                let reserved = self
                    .explicit_key_names
                    .get(&principal)
                    .cloned()
                    .unwrap_or_default();
                let table = self.table_mut(&principal)?;
                if table.unique_constraints.iter().any(|c| c.columns == columns) {
                    continue;
                }
                let name = match configured_name(&key.name, key.name_source) {
                    Some(name) => naming::truncate_identifier(name, max_length),
                    None => {
                        let mut taken: HashSet<String> = table
                            .unique_constraints
                            .iter()
                            .map(|c| c.name.clone())
                            .collect();
                        if let Some(primary) = &table.primary_key {
                            taken.insert(primary.name.clone());
                        }
                        taken.extend(reserved);
                        naming::uniquify(
                            &naming::key_name(principal.name(), &columns, false),
                            &taken,
                            max_length,
                        )
                    }
                };
                table.unique_constraints.push(UniqueConstraint {
                    name,
                    columns,
                    is_primary: false,
                });
            }

            for index in entity.indexes() {
                let columns = self.map_columns(id, &index.properties, &principal)?;
                let reserved = self
                    .explicit_index_names
                    .get(&principal)
                    .cloned()
                    .unwrap_or_default();
                let table = self.table_mut(&principal)?;
                if table.indexes.iter().any(|i| {
                    i.columns == columns && i.is_unique == index.is_unique && i.filter == index.filter
                }) {
                    continue;
                }
                let name = match configured_name(&index.name, index.name_source) {
                    Some(name) => naming::truncate_identifier(name, max_length),
                    None => {
                        let mut taken: HashSet<String> =
                            table.indexes.iter().map(|i| i.name.clone()).collect();
                        taken.extend(reserved);
                        naming::uniquify(
                            &naming::index_name(principal.name(), &columns),
                            &taken,
                            max_length,
                        )
                    }
                };
                table.indexes.push(TableIndex {
                    name,
                    columns,
                    is_unique: index.is_unique,
                    is_descending: index.is_descending.clone(),
                    filter: index.filter.clone(),
                });
            }

            for constraint in entity.check_constraints() {
                let name = constraint.name.clone().unwrap_or_else(|| {
                    naming::check_constraint_name(principal.name(), &constraint.model_name, max_length)
                });
                let name = naming::truncate_identifier(&name, max_length);
                let entity_name = entity.name().to_string();
                let table = self.table_mut(&principal)?;
                if table.check_constraints.iter().any(|c| c.name == name) {
                    continue;
                }
                table.check_constraints.push(CheckConstraint {
                    model_name: constraint.model_name.clone(),
                    name,
                    entity_type: entity_name,
                    sql: constraint.sql.clone(),
                });
            }

            for trigger in entity.triggers() {
                let table_name = trigger
                    .table_name
                    .clone()
                    .unwrap_or_else(|| principal.name().to_string());
                let table_schema = if trigger.table_name.is_some() {
                    trigger.table_schema.clone()
                } else {
                    principal.schema().map(str::to_string)
                };
                let object = StoreObjectIdentifier::table(table_name.clone(), table_schema.clone())?;
                let entity_name = entity.name().to_string();
                let table = self.tables.get_mut(&object).ok_or_else(|| {
                    RelationalError::invalid_argument(
                        "trigger",
                        format!(
                            "trigger '{}' on '{}' targets the unmapped table '{}'",
                            trigger.model_name,
                            entity_name,
                            object.display_name()
                        ),
                    )
                })?;
                table.triggers.push(Trigger {
                    model_name: trigger.model_name.clone(),
                    name: trigger
                        .name
                        .clone()
                        .unwrap_or_else(|| trigger.model_name.clone()),
                    entity_type: entity_name,
                    table_name,
                    table_schema,
                });
            }
        }
        Ok(())
    }

    fn add_foreign_keys(&mut self) -> Result<()> {
        let model = self.model;
        for id in self.ordered.clone() {
            let Some(objects) = self.entity_objects.get(&id).cloned() else {
                continue;
            };
            if objects[0].object_type() != StoreObjectType::Table {
                continue;
            }
            let dependent = objects[0].clone();
            let entity = model.entity_type(id)?;
            for foreign_key in entity.foreign_keys() {
                let principal_entity = foreign_key.principal_entity;
                let Some(principal) = self.principal_objects.get(&principal_entity).cloned().flatten()
                else {
                    continue;
                };
                if principal.object_type() != StoreObjectType::Table {
                    continue;
                }
                let columns = self.map_columns(id, &foreign_key.properties, &dependent)?;
                let principal_properties = if foreign_key.principal_properties.is_empty() {
                    let principal_name = model.entity_type(principal_entity)?.name();
                    model
                        .primary_key_of(principal_entity)?
                        .ok_or_else(|| {
                            RelationalError::invalid_argument(
                                "foreign key",
                                format!(
                                    "a foreign key on '{}' targets the keyless entity type '{}'",
                                    entity.name(),
                                    principal_name
                                ),
                            )
                        })?
                        .properties
                        .clone()
                } else {
                    foreign_key.principal_properties.clone()
                };
                let principal_columns =
                    self.map_columns(principal_entity, &principal_properties, &principal)?;
                self.create_foreign_key(
                    &dependent,
                    &principal,
                    columns,
                    principal_columns,
                    foreign_key.on_delete,
                    foreign_key.name.clone(),
                )?;
            }
        }
        Ok(())
    }

    /// Synthesized constraints: the TPT link from a derived type's table to
    /// its base type's table, and the splitting link from each fragment table
    /// back to the entity's principal table. Both ride on the primary key and
    /// cascade on delete.
    fn add_inheritance_and_splitting_links(&mut self) -> Result<()> {
        let model = self.model;
        for id in self.ordered.clone() {
            let Some(objects) = self.entity_objects.get(&id).cloned() else {
                continue;
            };
            if objects[0].object_type() != StoreObjectType::Table {
                continue;
            }
            let principal = objects[0].clone();
            let Some(key) = model.primary_key_of(id)?.cloned() else {
                continue;
            };

            for fragment in objects[1..]
                .iter()
                .filter(|o| o.object_type() == StoreObjectType::Table)
            {
                let columns = self.map_columns(id, &key.properties, fragment)?;
                let principal_columns = self.map_columns(id, &key.properties, &principal)?;
                self.create_foreign_key(
                    fragment,
                    &principal,
                    columns,
                    principal_columns,
                    ReferentialAction::Cascade,
                    None,
                )?;
            }

            let entity = model.entity_type(id)?;
            let strategy = model.mapping_strategy(id)?;
            if strategy == MappingStrategy::Tpt {
                if let Some(base) = entity.base_type() {
                    if let Some(base_object) = self.principal_objects.get(&base).cloned().flatten() {
                        if base_object.object_type() == StoreObjectType::Table
                            && base_object != principal
                        {
                            let columns = self.map_columns(id, &key.properties, &principal)?;
                            let principal_columns =
                                self.map_columns(base, &key.properties, &base_object)?;
                            self.create_foreign_key(
                                &principal,
                                &base_object,
                                columns,
                                principal_columns,
                                ReferentialAction::Cascade,
                                None,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn create_foreign_key(
        &mut self,
        dependent: &StoreObjectIdentifier,
        principal: &StoreObjectIdentifier,
        columns: Vec<String>,
        principal_columns: Vec<String>,
        on_delete: ReferentialAction,
        explicit_name: Option<String>,
    ) -> Result<()> {
        // A key mapped to the same columns on both ends is the row-sharing
        // link itself, not a constraint.
        if dependent == principal && columns == principal_columns {
            return Ok(());
        }
        let max_length = self.model.max_identifier_length();
        let principal_constraint = {
            let table = self.table_mut(principal)?;
            table
                .primary_key
                .iter()
                .chain(table.unique_constraints.iter())
                .find(|c| c.columns == principal_columns)
                .map(|c| c.name.clone())
                .ok_or_else(|| {
                    RelationalError::invalid_argument(
                        "foreign key",
                        format!(
                            "no unique constraint on '{}' covers the columns ({})",
                            principal.display_name(),
                            principal_columns.join(", ")
                        ),
                    )
                })?
        };
        let default_name = naming::foreign_key_name(dependent.name(), principal.name(), &columns);
        let reserved = self
            .explicit_foreign_key_names
            .get(dependent)
            .cloned()
            .unwrap_or_default();
        let table = self.table_mut(dependent)?;
        let duplicate = table.foreign_key_constraints.iter().any(|fk| {
            fk.columns == columns
                && fk.principal_table == *principal
                && fk.principal_columns == principal_columns
        });
        if duplicate {
            return Ok(());
        }
        let name = match explicit_name {
            Some(name) => naming::truncate_identifier(&name, max_length),
            None => {
                let mut taken: HashSet<String> = table
                    .foreign_key_constraints
                    .iter()
                    .map(|fk| fk.name.clone())
                    .collect();
                taken.extend(reserved);
                naming::uniquify(&default_name, &taken, max_length)
            }
        };
        table.foreign_key_constraints.push(ForeignKeyConstraint {
            name,
            table: dependent.clone(),
            principal_table: principal.clone(),
            columns,
            principal_columns,
            principal_unique_constraint: principal_constraint,
            on_delete,
        });
        Ok(())
    }

    /// Map key or index properties to their column names on a store object.
    fn map_columns(
        &self,
        id: EntityTypeId,
        properties: &[String],
        object: &StoreObjectIdentifier,
    ) -> Result<Vec<String>> {
        let model = self.model;
        let entity_name = model.entity_type(id)?.name();
        let mut columns = Vec::new();
        for name in properties {
            let (_, property) = model.find_property(id, name)?.ok_or_else(|| {
                RelationalError::invalid_argument(
                    "property",
                    format!("'{}' has no property named '{}'", entity_name, name),
                )
            })?;
            columns.push(self.resolve_column_name(id, property, object)?);
        }
        Ok(columns)
    }

    fn table_mut(&mut self, object: &StoreObjectIdentifier) -> Result<&mut Table> {
        self.tables.get_mut(object).ok_or_else(|| {
            RelationalError::invalid_argument(
                "table",
                format!("'{}' is not a mapped table", object.display_name()),
            )
        })
    }

    // ------------------------------------------------------------------
    // Stored procedures
    // ------------------------------------------------------------------

    fn add_stored_procedures(&mut self) -> Result<()> {
        let model = self.model;
        for id in self.ordered.clone() {
            let entity = model.entity_type(id)?;
            for kind in [
                StoredProcedureKind::Insert,
                StoredProcedureKind::Delete,
                StoredProcedureKind::Update,
            ] {
                let Some(procedure) = entity.stored_procedure(kind) else {
                    continue;
                };
                let name = procedure
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}_{}", entity.name(), kind.display_name()));
                let schema = procedure
                    .schema
                    .clone()
                    .or_else(|| model.default_schema().map(str::to_string));
                let object = match kind {
                    StoredProcedureKind::Insert => {
                        StoreObjectIdentifier::insert_stored_procedure(name, schema)?
                    }
                    StoredProcedureKind::Delete => {
                        StoreObjectIdentifier::delete_stored_procedure(name, schema)?
                    }
                    StoredProcedureKind::Update => {
                        StoreObjectIdentifier::update_stored_procedure(name, schema)?
                    }
                };

                let mut parameters = Vec::new();
                let mut parameter_mappings = Vec::new();
                for (position, parameter) in procedure.parameters().iter().enumerate() {
                    if parameter.for_rows_affected {
                        parameters.push(StoreStoredProcedureParameter {
                            name: parameter
                                .name
                                .clone()
                                .unwrap_or_else(|| "RowsAffected".to_string()),
                            position,
                            direction: parameter.direction,
                            store_type: "int".to_string(),
                            for_original_value: false,
                            for_rows_affected: true,
                        });
                        continue;
                    }
                    let property_name = parameter.property.as_deref().ok_or_else(|| {
                        RelationalError::invalid_argument(
                            "parameter",
                            format!(
                                "a parameter of '{}' is bound to neither a property nor the \
                                 rows-affected count",
                                object.display_name()
                            ),
                        )
                    })?;
                    let (_, property) =
                        model.find_property(id, property_name)?.ok_or_else(|| {
                            RelationalError::invalid_argument(
                                "parameter",
                                format!(
                                    "'{}' has no property named '{}'",
                                    entity.name(),
                                    property_name
                                ),
                            )
                        })?;
                    let column_name = property
                        .column_name()
                        .unwrap_or(property.name())
                        .to_string();
                    let default_name = if parameter.for_original_value {
                        format!("Original_{}", column_name)
                    } else {
                        column_name
                    };
                    let parameter_name = parameter.name.clone().unwrap_or(default_name);
                    let store_type = self.resolve_store_type(property)?;
                    parameters.push(StoreStoredProcedureParameter {
                        name: parameter_name.clone(),
                        position,
                        direction: parameter.direction,
                        store_type,
                        for_original_value: parameter.for_original_value,
                        for_rows_affected: false,
                    });
                    parameter_mappings.push((property.name().to_string(), parameter_name));
                }

                let mut result_columns = Vec::new();
                let mut result_column_mappings = Vec::new();
                for (position, column) in procedure.result_columns().iter().enumerate() {
                    if column.for_rows_affected {
                        result_columns.push(StoreStoredProcedureResultColumn {
                            name: column
                                .name
                                .clone()
                                .unwrap_or_else(|| "RowsAffected".to_string()),
                            position,
                            store_type: "int".to_string(),
                            for_rows_affected: true,
                        });
                        continue;
                    }
                    let property_name = column.property.as_deref().ok_or_else(|| {
                        RelationalError::invalid_argument(
                            "result column",
                            format!(
                                "a result column of '{}' is bound to neither a property nor the \
                                 rows-affected count",
                                object.display_name()
                            ),
                        )
                    })?;
                    let (_, property) =
                        model.find_property(id, property_name)?.ok_or_else(|| {
                            RelationalError::invalid_argument(
                                "result column",
                                format!(
                                    "'{}' has no property named '{}'",
                                    entity.name(),
                                    property_name
                                ),
                            )
                        })?;
                    let column_name = property
                        .column_name()
                        .unwrap_or(property.name())
                        .to_string();
                    let result_name = column.name.clone().unwrap_or(column_name);
                    let store_type = self.resolve_store_type(property)?;
                    result_columns.push(StoreStoredProcedureResultColumn {
                        name: result_name.clone(),
                        position,
                        store_type,
                        for_rows_affected: false,
                    });
                    result_column_mappings.push((property.name().to_string(), result_name));
                }

                let store = self
                    .stored_procedures
                    .get_or_insert_with(object.clone(), || StoreStoredProcedure::new(object.clone()));
                if store.entity_type_mappings.is_empty() {
                    store.parameters = parameters;
                    store.result_columns = result_columns;
                }
                store.entity_type_mappings.push(StoredProcedureMapping {
                    entity_type: entity.name().to_string(),
                    store_object: object,
                    parameter_mappings,
                    result_column_mappings,
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Post-passes
    // ------------------------------------------------------------------

    /// Set the per-mapping sharing, splitting and derived-type flags, and the
    /// per-table migration exclusion flag.
    fn apply_mapping_flags(&mut self) -> Result<()> {
        let model = self.model;
        let mut split: HashMap<String, StoreObjectIdentifier> = HashMap::new();
        let mut includes_derived: HashMap<String, Option<bool>> = HashMap::new();
        let mut excluded: HashMap<(String, StoreObjectIdentifier), bool> = HashMap::new();
        for id in self.ordered.clone() {
            let entity = model.entity_type(id)?;
            let name = entity.name().to_string();
            let Some(objects) = self.entity_objects.get(&id) else {
                continue;
            };
            if objects.len() > 1 {
                split.insert(name.clone(), objects[0].clone());
            }
            let value = if !model.has_derived_types(id) {
                None
            } else if model.mapping_strategy(id)? == MappingStrategy::Tpc {
                Some(false)
            } else {
                Some(true)
            };
            includes_derived.insert(name.clone(), value);
            for object in objects {
                let flag = entity
                    .mapping_fragments()
                    .get(object)
                    .and_then(|f| f.is_excluded_from_migrations)
                    .unwrap_or(entity.is_excluded_from_migrations);
                excluded.insert((name.clone(), object.clone()), flag);
            }
        }

        let apply = |mappings: &mut Vec<TableMapping>, object: &StoreObjectIdentifier, shared: bool| {
            for (index, mapping) in mappings.iter_mut().enumerate() {
                mapping.includes_derived_types = includes_derived
                    .get(&mapping.entity_type)
                    .copied()
                    .flatten();
                mapping.is_split_entity_type_principal = split
                    .get(&mapping.entity_type)
                    .map(|principal| principal == object);
                mapping.is_shared_table_principal = if shared { Some(index == 0) } else { None };
            }
        };

        let table_ids: Vec<StoreObjectIdentifier> = self.tables.keys().cloned().collect();
        for object in table_ids {
            let shared = self.is_shared(&object, &split)?;
            if let Some(table) = self.tables.get_mut(&object) {
                table.is_shared = shared;
                apply(&mut table.entity_type_mappings, &object, shared);
                let mut excluded_all = !table.entity_type_mappings.is_empty();
                for mapping in &table.entity_type_mappings {
                    excluded_all = excluded_all
                        && excluded
                            .get(&(mapping.entity_type.clone(), object.clone()))
                            .copied()
                            .unwrap_or(false);
                }
                table.is_excluded_from_migrations = excluded_all;
            }
        }
        let view_ids: Vec<StoreObjectIdentifier> = self.views.keys().cloned().collect();
        for object in view_ids {
            let shared = self.is_shared(&object, &split)?;
            if let Some(view) = self.views.get_mut(&object) {
                view.is_shared = shared;
                apply(&mut view.entity_type_mappings, &object, shared);
            }
        }
        let query_ids: Vec<StoreObjectIdentifier> = self.queries.keys().cloned().collect();
        for object in query_ids {
            if let Some(query) = self.queries.get_mut(&object) {
                apply(&mut query.entity_type_mappings, &object, false);
            }
        }
        let function_ids: Vec<StoreObjectIdentifier> = self.functions.keys().cloned().collect();
        for object in function_ids {
            if let Some(function) = self.functions.get_mut(&object) {
                apply(&mut function.entity_type_mappings, &object, false);
            }
        }
        Ok(())
    }

    /// A store object is shared when entity types from more than one
    /// hierarchy map to it, or when any mapped entity type is split across
    /// this and other store objects.
    fn is_shared(
        &self,
        object: &StoreObjectIdentifier,
        split: &HashMap<String, StoreObjectIdentifier>,
    ) -> Result<bool> {
        let model = self.model;
        let names = self.mapped_entity_names(object);
        let mut roots = BTreeSet::new();
        for name in &names {
            if let Some(id) = model.find_entity_type(name) {
                roots.insert(model.root_of(id)?);
            }
        }
        Ok(roots.len() > 1 || names.iter().any(|name| split.contains_key(name)))
    }

    fn link_referencing_foreign_keys(&mut self) {
        let mut backlinks: Vec<(StoreObjectIdentifier, (StoreObjectIdentifier, String))> =
            Vec::new();
        for table in self.tables.values() {
            for foreign_key in &table.foreign_key_constraints {
                backlinks.push((
                    foreign_key.principal_table.clone(),
                    (foreign_key.table.clone(), foreign_key.name.clone()),
                ));
            }
        }
        for (principal, link) in backlinks {
            if let Some(table) = self.tables.get_mut(&principal) {
                table.referencing_foreign_keys.push(link);
            }
        }
    }

    fn finish(self) -> Result<RelationalModel> {
        let mut ancestry = HashMap::new();
        for entity in self.model.entity_types() {
            let mut chain = Vec::new();
            let mut current = Some(entity.id());
            while let Some(id) = current {
                let ancestor = self.model.entity_type(id)?;
                chain.push(ancestor.name().to_string());
                current = ancestor.base_type();
            }
            ancestry.insert(entity.name().to_string(), chain);
        }
        Ok(RelationalModel {
            tables: self.tables,
            views: self.views,
            queries: self.queries,
            functions: self.functions,
            stored_procedures: self.stored_procedures,
            sequences: self.model.sequences().to_vec(),
            db_functions: self.model.functions().to_vec(),
            ancestry,
            annotations: self
                .model
                .annotations()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        })
    }
}
