//! Mutable property metadata
//!
//! A property carries its column facets plus provenance for each overridable
//! one. The three server-generation facets (default value, default value SQL
//! and computed column SQL) are mutually exclusive: configuring one of them
//! explicitly while another is set fails, while a convention-sourced
//! configuration silently clears the other two. Explicit user configuration
//! must never be silently overwritten; convention-derived defaults may be.

use crate::config_source::ConfigurationSource;
use crate::error::{RelationalError, Result};
use crate::ids::{StoreObjectDictionary, StoreObjectIdentifier};
use crate::model::fragment::RelationalPropertyOverrides;
use crate::types::{ClrType, Value};

/// A scalar property of an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    clr_type: ClrType,
    /// Set when the property is added to an entity type; used in messages.
    pub(crate) declaring_type: String,
    pub is_nullable: bool,
    column_name: Option<String>,
    column_name_source: Option<ConfigurationSource>,
    pub store_type: Option<String>,
    pub max_length: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub is_fixed_length: bool,
    pub collation: Option<String>,
    pub comment: Option<String>,
    default_value: Option<Value>,
    default_value_source: Option<ConfigurationSource>,
    default_value_sql: Option<String>,
    default_value_sql_source: Option<ConfigurationSource>,
    computed_column_sql: Option<String>,
    computed_column_sql_source: Option<ConfigurationSource>,
    overrides: StoreObjectDictionary<RelationalPropertyOverrides>,
}

impl Property {
    pub fn new(name: impl Into<String>, clr_type: ClrType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "name",
                "property name must not be empty",
            ));
        }
        Ok(Property {
            name,
            clr_type,
            declaring_type: String::new(),
            is_nullable: false,
            column_name: None,
            column_name_source: None,
            store_type: None,
            max_length: None,
            precision: None,
            scale: None,
            is_fixed_length: false,
            collation: None,
            comment: None,
            default_value: None,
            default_value_source: None,
            default_value_sql: None,
            default_value_sql_source: None,
            computed_column_sql: None,
            computed_column_sql_source: None,
            overrides: StoreObjectDictionary::new(),
        })
    }

    /// Consuming nullability helper for fluent construction in configuration
    /// code and tests.
    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clr_type(&self) -> ClrType {
        self.clr_type
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// The globally configured column name, if any. Store-object-specific
    /// overrides take precedence during resolution.
    pub fn column_name(&self) -> Option<&str> {
        self.column_name.as_deref()
    }

    pub fn set_column_name(&mut self, name: impl Into<String>, source: ConfigurationSource) {
        if source.overrides(self.column_name_source) {
            self.column_name = Some(name.into());
            self.column_name_source = Some(source.max(self.column_name_source));
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn default_value_sql(&self) -> Option<&str> {
        self.default_value_sql.as_deref()
    }

    pub fn computed_column_sql(&self) -> Option<&str> {
        self.computed_column_sql.as_deref()
    }

    /// Configure a constant default value. The value is coerced to the
    /// property type, unwrapping enum values to their underlying integer.
    pub fn set_default_value(&mut self, value: Value, source: ConfigurationSource) -> Result<()> {
        let coerced = value.clone().coerce(self.clr_type).ok_or_else(|| {
            RelationalError::IncorrectDefaultValueType {
                entity: self.declaring_type.clone(),
                property: self.name.clone(),
                value: value.to_string(),
                clr_type: self.clr_type.name().to_string(),
            }
        })?;
        self.check_server_generation_conflict("DefaultValue", source)?;
        if !source.overrides(self.default_value_source) {
            return Ok(());
        }
        self.default_value = Some(coerced);
        self.default_value_source = Some(source.max(self.default_value_source));
        Ok(())
    }

    /// Configure a SQL expression evaluated by the store for the default.
    pub fn set_default_value_sql(
        &mut self,
        sql: impl Into<String>,
        source: ConfigurationSource,
    ) -> Result<()> {
        self.check_server_generation_conflict("DefaultValueSql", source)?;
        if !source.overrides(self.default_value_sql_source) {
            return Ok(());
        }
        self.default_value_sql = Some(sql.into());
        self.default_value_sql_source = Some(source.max(self.default_value_sql_source));
        Ok(())
    }

    /// Configure the column as computed from a SQL expression.
    pub fn set_computed_column_sql(
        &mut self,
        sql: impl Into<String>,
        source: ConfigurationSource,
    ) -> Result<()> {
        self.check_server_generation_conflict("ComputedColumnSql", source)?;
        if !source.overrides(self.computed_column_sql_source) {
            return Ok(());
        }
        self.computed_column_sql = Some(sql.into());
        self.computed_column_sql_source = Some(source.max(self.computed_column_sql_source));
        Ok(())
    }

    /// Enforce mutual exclusivity of the server-generation trio. A strict
    /// (explicit or data-annotation) configuration fails when a sibling facet
    /// is set; a convention configuration clears the siblings instead.
    fn check_server_generation_conflict(
        &mut self,
        incoming: &str,
        source: ConfigurationSource,
    ) -> Result<()> {
        let conflicting = [
            ("DefaultValue", self.default_value.is_some()),
            ("DefaultValueSql", self.default_value_sql.is_some()),
            ("ComputedColumnSql", self.computed_column_sql.is_some()),
        ]
        .into_iter()
        .find(|(facet, set)| *set && *facet != incoming);

        let Some((existing, _)) = conflicting else {
            return Ok(());
        };

        if source.is_strict() {
            return Err(RelationalError::ConflictingColumnServerGeneration {
                entity: self.declaring_type.clone(),
                property: self.name.clone(),
                existing: existing.to_string(),
                incoming: incoming.to_string(),
            });
        }

        if incoming != "DefaultValue" {
            self.default_value = None;
            self.default_value_source = None;
        }
        if incoming != "DefaultValueSql" {
            self.default_value_sql = None;
            self.default_value_sql_source = None;
        }
        if incoming != "ComputedColumnSql" {
            self.computed_column_sql = None;
            self.computed_column_sql_source = None;
        }
        Ok(())
    }

    /// The overrides entry for a store object, if configured.
    pub fn find_overrides(&self, store_object: &StoreObjectIdentifier) -> Option<&RelationalPropertyOverrides> {
        self.overrides.get(store_object)
    }

    /// Get or create the overrides entry for a store object. Owning an entry
    /// for a non-primary store object redirects the property there.
    pub fn get_or_create_overrides(
        &mut self,
        store_object: StoreObjectIdentifier,
    ) -> &mut RelationalPropertyOverrides {
        self.overrides
            .get_or_insert_with(store_object.clone(), || {
                RelationalPropertyOverrides::new(store_object)
            })
    }

    pub fn overrides(&self) -> &StoreObjectDictionary<RelationalPropertyOverrides> {
        &self.overrides
    }
}
