//! The frozen (resolution-phase) relational model

mod builder;
mod column;
mod constraint;
mod function;
mod mapping;
mod model;
mod stored_procedure;
mod table;

pub use column::{Column, PropertyMapping};
pub use constraint::{
    CheckConstraint, ForeignKeyConstraint, TableIndex, Trigger, UniqueConstraint,
};
pub use function::{StoreFunction, StoreFunctionParameter};
pub use mapping::{ColumnMapping, StoredProcedureMapping, TableMapping};
pub use model::RelationalModel;
pub use stored_procedure::{
    StoreStoredProcedure, StoreStoredProcedureParameter, StoreStoredProcedureResultColumn,
};
pub use table::{SqlQuery, Table, View};
