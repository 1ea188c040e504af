//! The mutable domain model root
//!
//! The model owns every entity type, sequence and function in declaration
//! order, plus cross-entity operations: inheritance links, mapping strategy
//! and discriminator configuration. Configuration is single-threaded by
//! design; the model is never shared until it has been resolved into a frozen
//! [`crate::relational::RelationalModel`].

use std::collections::{BTreeMap, HashMap};

use crate::config_source::ConfigurationSource;
use crate::error::{RelationalError, Result};
use crate::model::entity_type::{EntityType, EntityTypeId, MappingStrategy};
use crate::model::function::DbFunction;
use crate::model::property::Property;
use crate::model::sequence::Sequence;
use crate::types::Value;

/// The root of the mutable domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    default_schema: Option<String>,
    max_identifier_length: usize,
    /// Declaration-ordered slots; a removed entity type leaves a tombstone so
    /// stale ids fail with `ElementRemoved` instead of resolving to a
    /// different element.
    entity_types: Vec<Option<EntityType>>,
    names: HashMap<String, EntityTypeId>,
    sequences: Vec<Sequence>,
    functions: Vec<DbFunction>,
    /// Residual open extension map for provider-specific annotations.
    annotations: BTreeMap<String, String>,
}

impl Default for Model {
    fn default() -> Self {
        Model {
            default_schema: None,
            max_identifier_length: 128,
            entity_types: Vec::new(),
            names: HashMap::new(),
            sequences: Vec::new(),
            functions: Vec::new(),
            annotations: BTreeMap::new(),
        }
    }
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    pub fn set_default_schema(&mut self, schema: impl Into<String>) {
        self.default_schema = Some(schema.into());
    }

    pub fn max_identifier_length(&self) -> usize {
        self.max_identifier_length
    }

    pub fn set_max_identifier_length(&mut self, length: usize) {
        self.max_identifier_length = length;
    }

    // ------------------------------------------------------------------
    // Entity types
    // ------------------------------------------------------------------

    /// Add an entity type with the given short name.
    pub fn add_entity_type(&mut self, name: impl Into<String>) -> Result<EntityTypeId> {
        let name = name.into();
        if name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "name",
                "entity type name must not be empty",
            ));
        }
        if self.names.contains_key(&name) {
            return Err(RelationalError::invalid_argument(
                "name",
                format!("the model already contains an entity type named '{}'", name),
            ));
        }
        let id = self.entity_types.len();
        self.entity_types.push(Some(EntityType::new(id, name.clone())));
        self.names.insert(name, id);
        Ok(id)
    }

    pub fn entity_type(&self, id: EntityTypeId) -> Result<&EntityType> {
        self.entity_types
            .get(id)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| RelationalError::ElementRemoved {
                kind: "entity type".to_string(),
                name: format!("#{}", id),
            })
    }

    pub fn entity_type_mut(&mut self, id: EntityTypeId) -> Result<&mut EntityType> {
        self.entity_types
            .get_mut(id)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| RelationalError::ElementRemoved {
                kind: "entity type".to_string(),
                name: format!("#{}", id),
            })
    }

    pub fn find_entity_type(&self, name: &str) -> Option<EntityTypeId> {
        self.names.get(name).copied()
    }

    /// Remove an entity type. Fails while other types still derive from it.
    pub fn remove_entity_type(&mut self, id: EntityTypeId) -> Result<EntityType> {
        let name = self.entity_type(id)?.name().to_string();
        if self
            .entity_types()
            .any(|et| et.base_type() == Some(id) && et.id() != id)
        {
            return Err(RelationalError::invalid_argument(
                "entity type",
                format!("'{}' cannot be removed while other types derive from it", name),
            ));
        }
        self.names.remove(&name);
        let slot = self.entity_types.get_mut(id).and_then(Option::take);
        slot.ok_or(RelationalError::ElementRemoved {
            kind: "entity type".to_string(),
            name,
        })
    }

    /// Live entity types in declaration order.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entity_types.iter().filter_map(|slot| slot.as_ref())
    }

    // ------------------------------------------------------------------
    // Inheritance
    // ------------------------------------------------------------------

    /// Link `derived` under `base` (single inheritance).
    pub fn set_base_type(&mut self, derived: EntityTypeId, base: EntityTypeId) -> Result<()> {
        if derived == base || self.is_assignable_from(derived, base)? {
            let name = self.entity_type(derived)?.name().to_string();
            return Err(RelationalError::invalid_argument(
                "base type",
                format!("setting the base type of '{}' would create a cycle", name),
            ));
        }
        self.entity_type(base)?;
        self.entity_type_mut(derived)?.base = Some(base);
        Ok(())
    }

    /// The root of the hierarchy containing `id`.
    pub fn root_of(&self, id: EntityTypeId) -> Result<EntityTypeId> {
        let mut current = id;
        while let Some(base) = self.entity_type(current)?.base_type() {
            current = base;
        }
        Ok(current)
    }

    /// Inheritance depth: 0 for roots.
    pub fn depth_of(&self, id: EntityTypeId) -> Result<usize> {
        let mut depth = 0;
        let mut current = id;
        while let Some(base) = self.entity_type(current)?.base_type() {
            depth += 1;
            current = base;
        }
        Ok(depth)
    }

    /// Whether `descendant` is `ancestor` or derives from it.
    pub fn is_assignable_from(
        &self,
        ancestor: EntityTypeId,
        descendant: EntityTypeId,
    ) -> Result<bool> {
        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.entity_type(id)?.base_type();
        }
        Ok(false)
    }

    /// Directly derived types of `id`, in declaration order.
    pub fn directly_derived_types(&self, id: EntityTypeId) -> Vec<EntityTypeId> {
        self.entity_types()
            .filter(|et| et.base_type() == Some(id))
            .map(|et| et.id())
            .collect()
    }

    /// Whether `id` has any derived types.
    pub fn has_derived_types(&self, id: EntityTypeId) -> bool {
        self.entity_types().any(|et| et.base_type() == Some(id))
    }

    /// The mapping strategy of the hierarchy containing `id`, read at the
    /// root. Defaults to TPH.
    pub fn mapping_strategy(&self, id: EntityTypeId) -> Result<MappingStrategy> {
        let root = self.root_of(id)?;
        Ok(self
            .entity_type(root)?
            .mapping_strategy
            .map(|(strategy, _)| strategy)
            .unwrap_or(MappingStrategy::Tph))
    }

    /// Configure the mapping strategy. Only valid on hierarchy roots.
    pub fn set_mapping_strategy(
        &mut self,
        id: EntityTypeId,
        strategy: MappingStrategy,
        source: ConfigurationSource,
    ) -> Result<()> {
        let entity = self.entity_type(id)?;
        if entity.base_type().is_some() {
            let name = entity.name().to_string();
            return Err(RelationalError::InvalidInheritanceMapping {
                entity: name,
                message: "the mapping strategy can only be configured on the root of a hierarchy"
                    .to_string(),
            });
        }
        let entity = self.entity_type_mut(id)?;
        let existing = entity.mapping_strategy.map(|(_, s)| s);
        if source.overrides(existing) {
            entity.mapping_strategy = Some((strategy, source.max(existing)));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Discriminator
    // ------------------------------------------------------------------

    /// Configure the discriminator property. Only valid on hierarchy roots;
    /// the property must be declared on the root.
    pub fn set_discriminator_property(&mut self, id: EntityTypeId, property: &str) -> Result<()> {
        let entity = self.entity_type(id)?;
        if entity.base_type().is_some() {
            let root = self.root_of(id)?;
            return Err(RelationalError::DiscriminatorPropertyMustBeOnRoot {
                entity: entity.name().to_string(),
                root: self.entity_type(root)?.name().to_string(),
            });
        }
        if entity.find_declared_property(property).is_none() {
            return Err(RelationalError::invalid_argument(
                "discriminator",
                format!(
                    "'{}' does not declare a property named '{}'",
                    entity.name(),
                    property
                ),
            ));
        }
        self.entity_type_mut(id)?.discriminator_property = Some(property.to_string());
        Ok(())
    }

    /// Configure the discriminator value for an entity type. The value must
    /// be assignable to the discriminator property declared on the root.
    pub fn set_discriminator_value(&mut self, id: EntityTypeId, value: Value) -> Result<()> {
        let root = self.root_of(id)?;
        let root_entity = self.entity_type(root)?;
        let property_name = root_entity.discriminator_property().ok_or_else(|| {
            RelationalError::invalid_argument(
                "discriminator",
                format!(
                    "the hierarchy of '{}' has no discriminator property",
                    root_entity.name()
                ),
            )
        })?;
        let property = root_entity
            .find_declared_property(property_name)
            .ok_or_else(|| {
                RelationalError::invalid_argument(
                    "discriminator",
                    format!(
                        "'{}' does not declare a property named '{}'",
                        root_entity.name(),
                        property_name
                    ),
                )
            })?;
        if !value.is_assignable_to(property.clr_type()) {
            return Err(RelationalError::DiscriminatorValueIncompatible {
                entity: self.entity_type(id)?.name().to_string(),
                value: value.to_string(),
                clr_type: property.clr_type().name().to_string(),
            });
        }
        self.entity_type_mut(id)?.discriminator_value = Some(value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Properties across inheritance
    // ------------------------------------------------------------------

    /// Find a property declared on `id` or any of its ancestors, returning
    /// the declaring entity type id as well.
    pub fn find_property(
        &self,
        id: EntityTypeId,
        name: &str,
    ) -> Result<Option<(EntityTypeId, &Property)>> {
        let mut current = Some(id);
        while let Some(entity_id) = current {
            let entity = self.entity_type(entity_id)?;
            if let Some(property) = entity.find_declared_property(name) {
                return Ok(Some((entity_id, property)));
            }
            current = entity.base_type();
        }
        Ok(None)
    }

    /// All properties of `id`, inherited first (root downwards), each with its
    /// declaring entity type id, in declaration order within each type.
    pub fn properties_of(&self, id: EntityTypeId) -> Result<Vec<(EntityTypeId, &Property)>> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(entity_id) = current {
            chain.push(entity_id);
            current = self.entity_type(entity_id)?.base_type();
        }
        chain.reverse();

        let mut properties = Vec::new();
        for entity_id in chain {
            for property in self.entity_type(entity_id)?.declared_properties() {
                properties.push((entity_id, property));
            }
        }
        Ok(properties)
    }

    /// The primary key of `id`, declared on the type itself or inherited from
    /// the hierarchy root.
    pub fn primary_key_of(&self, id: EntityTypeId) -> Result<Option<&crate::model::entity_type::Key>> {
        let mut current = Some(id);
        while let Some(entity_id) = current {
            let entity = self.entity_type(entity_id)?;
            if let Some(key) = entity.primary_key() {
                return Ok(Some(key));
            }
            current = entity.base_type();
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Sequences and functions
    // ------------------------------------------------------------------

    /// Add a sequence. Identity is (name, schema) within the model.
    pub fn add_sequence(&mut self, mut sequence: Sequence) -> Result<()> {
        if self
            .find_sequence(sequence.name(), sequence.schema())
            .is_some()
        {
            return Err(RelationalError::invalid_argument(
                "sequence",
                format!(
                    "the model already contains a sequence named '{}'",
                    sequence.name()
                ),
            ));
        }
        sequence.model_schema = self.default_schema.clone();
        self.sequences.push(sequence);
        Ok(())
    }

    pub fn find_sequence(&self, name: &str, schema: Option<&str>) -> Option<&Sequence> {
        self.sequences
            .iter()
            .find(|s| s.name() == name && s.schema() == schema)
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Add a model function, keyed by model name.
    pub fn add_function(&mut self, function: DbFunction) -> Result<()> {
        if self.find_function(function.model_name()).is_some() {
            return Err(RelationalError::invalid_argument(
                "function",
                format!(
                    "the model already contains a function named '{}'",
                    function.model_name()
                ),
            ));
        }
        self.functions.push(function);
        Ok(())
    }

    pub fn find_function(&self, model_name: &str) -> Option<&DbFunction> {
        self.functions.iter().find(|f| f.model_name() == model_name)
    }

    pub fn functions(&self) -> &[DbFunction] {
        &self.functions
    }

    // ------------------------------------------------------------------
    // Residual annotations
    // ------------------------------------------------------------------

    pub fn set_annotation(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.annotations.insert(name.into(), value.into());
    }

    pub fn find_annotation(&self, name: &str) -> Option<&str> {
        self.annotations.get(name).map(String::as_str)
    }

    pub fn annotations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.annotations
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
