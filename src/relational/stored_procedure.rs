//! Resolved store stored procedures

use crate::ids::StoreObjectIdentifier;
use crate::model::ParameterDirection;
use crate::relational::mapping::StoredProcedureMapping;

/// An ordered parameter of a resolved stored procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStoredProcedureParameter {
    pub name: String,
    pub position: usize,
    pub direction: ParameterDirection,
    pub store_type: String,
    pub for_original_value: bool,
    pub for_rows_affected: bool,
}

/// An ordered result column of a resolved stored procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStoredProcedureResultColumn {
    pub name: String,
    pub position: usize,
    pub store_type: String,
    pub for_rows_affected: bool,
}

/// A resolved stored procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStoredProcedure {
    id: StoreObjectIdentifier,
    pub parameters: Vec<StoreStoredProcedureParameter>,
    pub result_columns: Vec<StoreStoredProcedureResultColumn>,
    pub entity_type_mappings: Vec<StoredProcedureMapping>,
}

impl StoreStoredProcedure {
    pub(crate) fn new(id: StoreObjectIdentifier) -> Self {
        StoreStoredProcedure {
            id,
            parameters: Vec::new(),
            result_columns: Vec::new(),
            entity_type_mappings: Vec::new(),
        }
    }

    pub fn id(&self) -> &StoreObjectIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    pub fn schema(&self) -> Option<&str> {
        self.id.schema()
    }

    pub fn find_parameter(&self, name: &str) -> Option<&StoreStoredProcedureParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
