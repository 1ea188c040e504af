//! Store-object-specific facet overrides
//!
//! When an entity type is split across several store objects, or a property
//! deviates from its defaults for one specific table, the deviation is
//! recorded here rather than on the element itself.

use crate::config_source::ConfigurationSource;
use crate::ids::StoreObjectIdentifier;

/// Per-(entity type, store object) mapping fragment. Created when an entity
/// type is explicitly mapped to a non-primary store object; owning a fragment
/// is what makes an entity type "split".
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypeMappingFragment {
    store_object: StoreObjectIdentifier,
    /// Override of the entity's excluded-from-migrations flag for this store
    /// object only.
    pub is_excluded_from_migrations: Option<bool>,
}

impl EntityTypeMappingFragment {
    pub fn new(store_object: StoreObjectIdentifier) -> Self {
        EntityTypeMappingFragment {
            store_object,
            is_excluded_from_migrations: None,
        }
    }

    pub fn store_object(&self) -> &StoreObjectIdentifier {
        &self.store_object
    }
}

/// Per-(property, store object) facet overrides. A property carrying an
/// override for a non-primary store object is persisted to that store object
/// instead of the entity's principal one.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationalPropertyOverrides {
    store_object: StoreObjectIdentifier,
    pub column_name: Option<String>,
    pub column_name_source: Option<ConfigurationSource>,
}

impl RelationalPropertyOverrides {
    pub fn new(store_object: StoreObjectIdentifier) -> Self {
        RelationalPropertyOverrides {
            store_object,
            column_name: None,
            column_name_source: None,
        }
    }

    pub fn store_object(&self) -> &StoreObjectIdentifier {
        &self.store_object
    }

    pub fn set_column_name(&mut self, name: impl Into<String>, source: ConfigurationSource) {
        if source.overrides(self.column_name_source) {
            self.column_name = Some(name.into());
            self.column_name_source = Some(source.max(self.column_name_source));
        }
    }
}
