//! Entity stored procedure mappings
//!
//! An entity type can route its insert, delete and update operations through
//! stored procedures. Each procedure carries an ordered parameter list and an
//! ordered result-column list, with members bound to a property's current or
//! original value or to the rows-affected count.

use crate::error::{RelationalError, Result};

/// Which of the three CUD operations a stored procedure serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredProcedureKind {
    Insert,
    Delete,
    Update,
}

impl StoredProcedureKind {
    pub fn display_name(self) -> &'static str {
        match self {
            StoredProcedureKind::Insert => "Insert",
            StoredProcedureKind::Delete => "Delete",
            StoredProcedureKind::Update => "Update",
        }
    }
}

/// Direction of a stored procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterDirection {
    Input,
    Output,
    InputOutput,
}

/// An ordered stored procedure parameter, bound to a property value or to the
/// rows-affected count.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProcedureParameter {
    /// Explicit parameter name; defaults to the bound property's column name.
    pub name: Option<String>,
    /// Name of the bound property; `None` for a rows-affected parameter.
    pub property: Option<String>,
    /// Bind to the property's original (pre-update) value. Only meaningful on
    /// update and delete procedures.
    pub for_original_value: bool,
    pub for_rows_affected: bool,
    pub direction: ParameterDirection,
}

impl StoredProcedureParameter {
    /// Input parameter bound to a property's current value.
    pub fn current_value(property: impl Into<String>) -> Self {
        StoredProcedureParameter {
            name: None,
            property: Some(property.into()),
            for_original_value: false,
            for_rows_affected: false,
            direction: ParameterDirection::Input,
        }
    }

    /// Input parameter bound to a property's original value.
    pub fn original_value(property: impl Into<String>) -> Self {
        StoredProcedureParameter {
            name: None,
            property: Some(property.into()),
            for_original_value: true,
            for_rows_affected: false,
            direction: ParameterDirection::Input,
        }
    }

    /// Output parameter carrying the rows-affected count.
    pub fn rows_affected() -> Self {
        StoredProcedureParameter {
            name: None,
            property: None,
            for_original_value: false,
            for_rows_affected: true,
            direction: ParameterDirection::Output,
        }
    }
}

/// An ordered stored procedure result column, bound to a property or to the
/// rows-affected count.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProcedureResultColumn {
    pub name: Option<String>,
    pub property: Option<String>,
    pub for_rows_affected: bool,
}

impl StoredProcedureResultColumn {
    pub fn for_property(property: impl Into<String>) -> Self {
        StoredProcedureResultColumn {
            name: None,
            property: Some(property.into()),
            for_rows_affected: false,
        }
    }

    pub fn rows_affected() -> Self {
        StoredProcedureResultColumn {
            name: None,
            property: None,
            for_rows_affected: true,
        }
    }
}

/// One of an entity type's up-to-three stored procedures.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProcedure {
    kind: StoredProcedureKind,
    /// Store name; defaults to `{EntityType}_{Kind}`.
    pub name: Option<String>,
    pub schema: Option<String>,
    parameters: Vec<StoredProcedureParameter>,
    result_columns: Vec<StoredProcedureResultColumn>,
}

impl StoredProcedure {
    pub fn new(kind: StoredProcedureKind) -> Self {
        StoredProcedure {
            kind,
            name: None,
            schema: None,
            parameters: Vec::new(),
            result_columns: Vec::new(),
        }
    }

    pub fn kind(&self) -> StoredProcedureKind {
        self.kind
    }

    pub fn add_parameter(&mut self, parameter: StoredProcedureParameter) -> Result<()> {
        if parameter.for_original_value && self.kind == StoredProcedureKind::Insert {
            return Err(RelationalError::invalid_argument(
                "parameter",
                "original value parameters are only supported on update and delete stored \
                 procedures",
            ));
        }
        if parameter.for_rows_affected && self.has_rows_affected() {
            return Err(RelationalError::invalid_argument(
                "parameter",
                "a stored procedure can only have one rows-affected parameter or result column",
            ));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn add_result_column(&mut self, column: StoredProcedureResultColumn) -> Result<()> {
        if column.for_rows_affected && self.has_rows_affected() {
            return Err(RelationalError::invalid_argument(
                "result column",
                "a stored procedure can only have one rows-affected parameter or result column",
            ));
        }
        self.result_columns.push(column);
        Ok(())
    }

    pub fn parameters(&self) -> &[StoredProcedureParameter] {
        &self.parameters
    }

    pub fn result_columns(&self) -> &[StoredProcedureResultColumn] {
        &self.result_columns
    }

    fn has_rows_affected(&self) -> bool {
        self.parameters.iter().any(|p| p.for_rows_affected)
            || self.result_columns.iter().any(|c| c.for_rows_affected)
    }
}
