//! Resolved store functions
//!
//! Each model function resolves to exactly one store function. Model
//! functions with an identical store signature (name, schema, parameter store
//! types) are merged onto one store function.

use crate::ids::StoreObjectIdentifier;
use crate::relational::column::Column;
use crate::relational::mapping::TableMapping;
use crate::types::ClrType;

/// An ordered parameter of a resolved store function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFunctionParameter {
    pub name: String,
    pub clr_type: ClrType,
    pub store_type: String,
    pub propagates_nullability: bool,
}

/// A resolved store function.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreFunction {
    /// Identifier keyed by the full store signature `name(paramtypes)` so
    /// overloads stay distinct.
    id: StoreObjectIdentifier,
    pub name: String,
    pub schema: Option<String>,
    pub is_built_in: bool,
    pub is_scalar: bool,
    pub is_aggregate: bool,
    pub return_store_type: Option<String>,
    pub parameters: Vec<StoreFunctionParameter>,
    /// Model names of the functions merged onto this store function.
    pub db_functions: Vec<String>,
    /// Result columns when the function is table-valued and mapped.
    pub columns: Vec<Column>,
    pub entity_type_mappings: Vec<TableMapping>,
}

impl StoreFunction {
    pub(crate) fn new(id: StoreObjectIdentifier, name: String, schema: Option<String>) -> Self {
        StoreFunction {
            id,
            name,
            schema,
            is_built_in: false,
            is_scalar: true,
            is_aggregate: false,
            return_store_type: None,
            parameters: Vec::new(),
            db_functions: Vec::new(),
            columns: Vec::new(),
            entity_type_mappings: Vec::new(),
        }
    }

    pub fn id(&self) -> &StoreObjectIdentifier {
        &self.id
    }

    pub fn find_parameter(&self, name: &str) -> Option<&StoreFunctionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
