//! Model-level database functions

use crate::error::{RelationalError, Result};
use crate::types::ClrType;

/// An ordered parameter of a [`DbFunction`].
#[derive(Debug, Clone, PartialEq)]
pub struct DbFunctionParameter {
    pub name: String,
    pub clr_type: ClrType,
    /// Explicit store type; derived from the type mapping source when absent.
    pub store_type: Option<String>,
    /// Whether a null argument makes the function return null, which lets SQL
    /// null-propagation optimizations apply.
    pub propagates_nullability: bool,
}

impl DbFunctionParameter {
    pub fn new(name: impl Into<String>, clr_type: ClrType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "name",
                "function parameter name must not be empty",
            ));
        }
        Ok(DbFunctionParameter {
            name,
            clr_type,
            store_type: None,
            propagates_nullability: false,
        })
    }
}

/// A function declared on the model, resolved to exactly one store function
/// during relational model build. Functions with an identical store signature
/// (name, schema, parameter store types) are merged onto one store function.
#[derive(Debug, Clone, PartialEq)]
pub struct DbFunction {
    model_name: String,
    /// Store name; defaults to the model name.
    pub name: Option<String>,
    pub schema: Option<String>,
    pub is_built_in: bool,
    pub is_scalar: bool,
    pub is_aggregate: bool,
    pub is_nullable: bool,
    /// Explicit return store type.
    pub store_type: Option<String>,
    pub return_type: ClrType,
    parameters: Vec<DbFunctionParameter>,
}

impl DbFunction {
    pub fn new(model_name: impl Into<String>, return_type: ClrType) -> Result<Self> {
        let model_name = model_name.into();
        if model_name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "model_name",
                "function model name must not be empty",
            ));
        }
        Ok(DbFunction {
            model_name,
            name: None,
            schema: None,
            is_built_in: false,
            is_scalar: true,
            is_aggregate: false,
            is_nullable: true,
            store_type: None,
            return_type,
            parameters: Vec::new(),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Store name: the explicit name, else the model name.
    pub fn store_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.model_name)
    }

    pub fn add_parameter(&mut self, parameter: DbFunctionParameter) -> Result<()> {
        if self.parameters.iter().any(|p| p.name == parameter.name) {
            return Err(RelationalError::invalid_argument(
                "parameter",
                format!(
                    "function '{}' already has a parameter named '{}'",
                    self.model_name, parameter.name
                ),
            ));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn parameters(&self) -> &[DbFunctionParameter] {
        &self.parameters
    }
}
