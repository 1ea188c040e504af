//! The mutable (configuration-phase) domain model

mod entity_type;
mod fragment;
mod function;
mod model;
mod property;
mod sequence;
mod stored_procedure;

pub use entity_type::{
    CheckConstraint, EntityType, EntityTypeId, ForeignKey, Key, MappingStrategy, ModelIndex,
    ModelTrigger, Ownership, ReferentialAction,
};
pub use fragment::{EntityTypeMappingFragment, RelationalPropertyOverrides};
pub use function::{DbFunction, DbFunctionParameter};
pub use model::Model;
pub use property::Property;
pub use sequence::Sequence;
pub use stored_procedure::{
    ParameterDirection, StoredProcedure, StoredProcedureKind, StoredProcedureParameter,
    StoredProcedureResultColumn,
};
