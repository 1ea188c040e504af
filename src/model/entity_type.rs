//! Mutable entity type metadata
//!
//! An entity type records its mapping directives (table/view/query/function),
//! declared properties, keys, foreign keys, indexes, check constraints,
//! triggers, mapping fragments and stored procedures. Cross-entity concerns
//! such as inheritance, discriminators and strategy resolution live on
//! [`crate::model::Model`], which owns the types.

use crate::config_source::ConfigurationSource;
use crate::error::{RelationalError, Result};
use crate::ids::{StoreObjectDictionary, StoreObjectIdentifier};
use crate::model::fragment::EntityTypeMappingFragment;
use crate::model::property::Property;
use crate::model::stored_procedure::{StoredProcedure, StoredProcedureKind};
use crate::types::Value;

/// Index of an entity type within its model. Stable for the lifetime of the
/// model; removal tombstones the slot.
pub type EntityTypeId = usize;

/// How an inheritance hierarchy maps to tables. Read at the root of the
/// hierarchy and applied to all derived types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingStrategy {
    /// Table-per-hierarchy: one table for the whole hierarchy, discriminated
    /// by a column.
    Tph,
    /// Table-per-type: each type gets its own table, linked to the root's
    /// table by a foreign key on the primary key.
    Tpt,
    /// Table-per-concrete-type: each concrete type gets its own table with all
    /// inherited properties duplicated as columns.
    Tpc,
}

impl MappingStrategy {
    pub fn display_name(self) -> &'static str {
        match self {
            MappingStrategy::Tph => "TPH",
            MappingStrategy::Tpt => "TPT",
            MappingStrategy::Tpc => "TPC",
        }
    }
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub fn display_name(self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// Ownership link of an owned entity type: the owner plus the navigation that
/// reaches this type. Drives the `{ownerTable}_{navigation}` default table
/// name and owned column-name prefixing.
#[derive(Debug, Clone, PartialEq)]
pub struct Ownership {
    pub owner: EntityTypeId,
    pub navigation: String,
}

/// A primary or alternate key declared on an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub properties: Vec<String>,
    pub is_primary: bool,
    pub name: Option<String>,
    pub name_source: Option<ConfigurationSource>,
}

/// A domain foreign key declared on an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub properties: Vec<String>,
    pub principal_entity: EntityTypeId,
    /// Referenced properties on the principal; the principal's primary key
    /// when empty.
    pub principal_properties: Vec<String>,
    pub on_delete: ReferentialAction,
    pub name: Option<String>,
    pub name_source: Option<ConfigurationSource>,
}

/// A domain index declared on an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelIndex {
    pub properties: Vec<String>,
    pub is_unique: bool,
    pub is_descending: Option<Vec<bool>>,
    pub filter: Option<String>,
    pub name: Option<String>,
    pub name_source: Option<ConfigurationSource>,
}

/// A check constraint declared on an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConstraint {
    pub model_name: String,
    pub sql: String,
    pub name: Option<String>,
    pub name_source: Option<ConfigurationSource>,
}

/// A trigger declared on an entity type, attached to one of its tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTrigger {
    pub model_name: String,
    /// Store name; defaults to the model name.
    pub name: Option<String>,
    /// Table the trigger is attached to; defaults to the entity's table.
    pub table_name: Option<String>,
    pub table_schema: Option<String>,
}

/// A domain entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    id: EntityTypeId,
    name: String,
    pub(crate) base: Option<EntityTypeId>,
    pub is_abstract: bool,
    pub(crate) mapping_strategy: Option<(MappingStrategy, ConfigurationSource)>,
    pub(crate) table_name: Option<String>,
    pub(crate) table_name_source: Option<ConfigurationSource>,
    pub(crate) schema: Option<String>,
    pub(crate) view_name: Option<String>,
    pub(crate) view_schema: Option<String>,
    pub(crate) sql_query: Option<String>,
    /// Model name of a table-valued function the type is mapped to.
    pub(crate) function_name: Option<String>,
    pub is_excluded_from_migrations: bool,
    pub(crate) discriminator_property: Option<String>,
    pub(crate) discriminator_value: Option<Value>,
    pub(crate) ownership: Option<Ownership>,
    properties: Vec<Property>,
    keys: Vec<Key>,
    foreign_keys: Vec<ForeignKey>,
    indexes: Vec<ModelIndex>,
    check_constraints: Vec<CheckConstraint>,
    triggers: Vec<ModelTrigger>,
    mapping_fragments: StoreObjectDictionary<EntityTypeMappingFragment>,
    insert_stored_procedure: Option<StoredProcedure>,
    delete_stored_procedure: Option<StoredProcedure>,
    update_stored_procedure: Option<StoredProcedure>,
}

impl EntityType {
    pub(crate) fn new(id: EntityTypeId, name: String) -> Self {
        EntityType {
            id,
            name,
            base: None,
            is_abstract: false,
            mapping_strategy: None,
            table_name: None,
            table_name_source: None,
            schema: None,
            view_name: None,
            view_schema: None,
            sql_query: None,
            function_name: None,
            is_excluded_from_migrations: false,
            discriminator_property: None,
            discriminator_value: None,
            ownership: None,
            properties: Vec::new(),
            keys: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            check_constraints: Vec::new(),
            triggers: Vec::new(),
            mapping_fragments: StoreObjectDictionary::new(),
            insert_stored_procedure: None,
            delete_stored_procedure: None,
            update_stored_procedure: None,
        }
    }

    pub fn id(&self) -> EntityTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_type(&self) -> Option<EntityTypeId> {
        self.base
    }

    pub fn ownership(&self) -> Option<&Ownership> {
        self.ownership.as_ref()
    }

    // ------------------------------------------------------------------
    // Mapping directives
    // ------------------------------------------------------------------

    /// Configure the table this type maps to.
    pub fn set_table(
        &mut self,
        name: impl Into<String>,
        schema: Option<String>,
        source: ConfigurationSource,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "table",
                format!("table name for '{}' must not be empty", self.name),
            ));
        }
        if source.overrides(self.table_name_source) {
            self.table_name = Some(name);
            self.schema = schema;
            self.table_name_source = Some(source.max(self.table_name_source));
        }
        Ok(())
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Configure the view this type maps to instead of a table.
    pub fn set_view(&mut self, name: impl Into<String>, schema: Option<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "view",
                format!("view name for '{}' must not be empty", self.name),
            ));
        }
        self.view_name = Some(name);
        self.view_schema = schema;
        Ok(())
    }

    /// Map this type to a raw SQL query.
    pub fn set_sql_query(&mut self, sql: impl Into<String>) -> Result<()> {
        let sql = sql.into();
        if sql.is_empty() {
            return Err(RelationalError::invalid_argument(
                "sql",
                format!("SQL query for '{}' must not be empty", self.name),
            ));
        }
        self.sql_query = Some(sql);
        Ok(())
    }

    /// Map this type to a table-valued function declared on the model.
    pub fn set_mapped_function(&mut self, model_name: impl Into<String>) {
        self.function_name = Some(model_name.into());
    }

    /// Mark this type as owned by another entity type through a navigation.
    /// Drives the default table name and column-name prefixing of owned types.
    pub fn set_ownership(&mut self, owner: EntityTypeId, navigation: impl Into<String>) {
        self.ownership = Some(Ownership {
            owner,
            navigation: navigation.into(),
        });
    }

    pub fn discriminator_property(&self) -> Option<&str> {
        self.discriminator_property.as_deref()
    }

    pub fn discriminator_value(&self) -> Option<&Value> {
        self.discriminator_value.as_ref()
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Add a declared property. The property remembers its declaring type for
    /// error messages.
    pub fn add_property(&mut self, mut property: Property) -> Result<()> {
        if self.properties.iter().any(|p| p.name() == property.name()) {
            return Err(RelationalError::invalid_argument(
                "property",
                format!(
                    "'{}' already declares a property named '{}'",
                    self.name,
                    property.name()
                ),
            ));
        }
        property.declaring_type = self.name.clone();
        self.properties.push(property);
        Ok(())
    }

    pub fn declared_properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn find_declared_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn find_declared_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name() == name)
    }

    /// Declare the primary key. Replaces a previously declared one.
    pub fn set_primary_key(&mut self, properties: Vec<String>) -> Result<()> {
        self.validate_key_properties(&properties)?;
        self.keys.retain(|k| !k.is_primary);
        self.keys.insert(
            0,
            Key {
                properties,
                is_primary: true,
                name: None,
                name_source: None,
            },
        );
        Ok(())
    }

    /// Declare an alternate key.
    pub fn add_alternate_key(&mut self, properties: Vec<String>) -> Result<()> {
        self.validate_key_properties(&properties)?;
        self.keys.push(Key {
            properties,
            is_primary: false,
            name: None,
            name_source: None,
        });
        Ok(())
    }

    fn validate_key_properties(&self, properties: &[String]) -> Result<()> {
        if properties.is_empty() {
            return Err(RelationalError::invalid_argument(
                "key",
                format!("a key on '{}' must use at least one property", self.name),
            ));
        }
        Ok(())
    }

    pub fn primary_key(&self) -> Option<&Key> {
        self.keys.iter().find(|k| k.is_primary)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut [Key] {
        &mut self.keys
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) -> Result<()> {
        if foreign_key.properties.is_empty() {
            return Err(RelationalError::invalid_argument(
                "foreign key",
                format!(
                    "a foreign key on '{}' must use at least one property",
                    self.name
                ),
            ));
        }
        self.foreign_keys.push(foreign_key);
        Ok(())
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn add_index(&mut self, index: ModelIndex) -> Result<()> {
        if index.properties.is_empty() {
            return Err(RelationalError::invalid_argument(
                "index",
                format!("an index on '{}' must use at least one property", self.name),
            ));
        }
        self.indexes.push(index);
        Ok(())
    }

    pub fn indexes(&self) -> &[ModelIndex] {
        &self.indexes
    }

    pub fn add_check_constraint(&mut self, constraint: CheckConstraint) -> Result<()> {
        if constraint.model_name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "check constraint",
                "check constraint model name must not be empty",
            ));
        }
        if self
            .check_constraints
            .iter()
            .any(|c| c.model_name == constraint.model_name)
        {
            return Err(RelationalError::invalid_argument(
                "check constraint",
                format!(
                    "'{}' already has a check constraint named '{}'",
                    self.name, constraint.model_name
                ),
            ));
        }
        self.check_constraints.push(constraint);
        Ok(())
    }

    pub fn check_constraints(&self) -> &[CheckConstraint] {
        &self.check_constraints
    }

    pub fn add_trigger(&mut self, trigger: ModelTrigger) -> Result<()> {
        if trigger.model_name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "trigger",
                "trigger model name must not be empty",
            ));
        }
        self.triggers.push(trigger);
        Ok(())
    }

    pub fn triggers(&self) -> &[ModelTrigger] {
        &self.triggers
    }

    // ------------------------------------------------------------------
    // Splitting and stored procedures
    // ------------------------------------------------------------------

    /// Get or create the mapping fragment for an auxiliary store object,
    /// marking this entity type as split.
    pub fn get_or_create_mapping_fragment(
        &mut self,
        store_object: StoreObjectIdentifier,
    ) -> &mut EntityTypeMappingFragment {
        self.mapping_fragments
            .get_or_insert_with(store_object.clone(), || {
                EntityTypeMappingFragment::new(store_object)
            })
    }

    pub fn mapping_fragments(&self) -> &StoreObjectDictionary<EntityTypeMappingFragment> {
        &self.mapping_fragments
    }

    pub fn set_stored_procedure(&mut self, procedure: StoredProcedure) {
        match procedure.kind() {
            StoredProcedureKind::Insert => self.insert_stored_procedure = Some(procedure),
            StoredProcedureKind::Delete => self.delete_stored_procedure = Some(procedure),
            StoredProcedureKind::Update => self.update_stored_procedure = Some(procedure),
        }
    }

    pub fn stored_procedure(&self, kind: StoredProcedureKind) -> Option<&StoredProcedure> {
        match kind {
            StoredProcedureKind::Insert => self.insert_stored_procedure.as_ref(),
            StoredProcedureKind::Delete => self.delete_stored_procedure.as_ref(),
            StoredProcedureKind::Update => self.update_stored_procedure.as_ref(),
        }
    }
}
