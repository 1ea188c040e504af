//! Error types for relmodel

use thiserror::Error;

/// Errors that can occur while configuring a model or resolving it into a
/// relational model.
///
/// Every failure is immediate and carries the names of the elements involved;
/// there is no recovered or degraded path. Resolution either fully succeeds or
/// the whole model build aborts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelationalError {
    #[error("invalid {argument}: {message}")]
    InvalidArgument { argument: String, message: String },

    #[error(
        "'{first_entity}.{first_property}' and '{second_entity}.{second_property}' are both \
         mapped to column '{column}' on '{table}' but are configured with a different {facet}"
    )]
    MappingConflict {
        first_entity: String,
        first_property: String,
        second_entity: String,
        second_property: String,
        column: String,
        table: String,
        facet: String,
    },

    #[error(
        "'{entity}.{property}' already has '{existing}' configured; '{incoming}' cannot also be \
         set because a column can only use one server-generation strategy"
    )]
    ConflictingColumnServerGeneration {
        entity: String,
        property: String,
        existing: String,
        incoming: String,
    },

    #[error(
        "default value '{value}' for '{entity}.{property}' cannot be converted to the property \
         type '{clr_type}'"
    )]
    IncorrectDefaultValueType {
        entity: String,
        property: String,
        value: String,
        clr_type: String,
    },

    #[error(
        "the discriminator property can only be configured on the root of a hierarchy; \
         '{entity}' derives from '{root}'"
    )]
    DiscriminatorPropertyMustBeOnRoot { entity: String, root: String },

    #[error(
        "discriminator value '{value}' for '{entity}' is not assignable to the discriminator \
         property type '{clr_type}'"
    )]
    DiscriminatorValueIncompatible {
        entity: String,
        value: String,
        clr_type: String,
    },

    #[error("invalid inheritance mapping for '{entity}': {message}")]
    InvalidInheritanceMapping { entity: String, message: String },

    #[error("badly formed sequence annotation string: {message}")]
    BadSequenceString { message: String },

    #[error(
        "'{clr_type}' is not a supported sequence type; sequences can only use byte, short, int \
         or long"
    )]
    BadSequenceType { clr_type: String },

    #[error("the {kind} '{name}' has been removed from the model")]
    ElementRemoved { kind: String, name: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RelationalError>;

impl RelationalError {
    /// Shorthand for the `InvalidArgument` variant.
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        RelationalError::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }
}
