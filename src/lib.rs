//! relmodel: Relational mapping metadata and model resolution
//!
//! This library holds the relational half of an object-relational mapper's
//! metadata: the mutable model configured by the application (entity types,
//! properties, inheritance, mapping directives, sequences, functions and
//! stored procedures) and the frozen relational model derived from it
//! (tables, views, queries, store functions and stored procedures with all
//! columns, constraints and mapping links resolved).
//!
//! The two phases are separated by construction: configuration happens on
//! [`model::Model`], and [`relational::RelationalModel::create`] freezes it
//! into an immutable shape that is safe to share across threads.

pub mod config_source;
pub mod debug;
pub mod error;
pub mod ids;
pub mod model;
pub mod naming;
pub mod relational;
pub mod type_mapping;
pub mod types;

pub use config_source::ConfigurationSource;
pub use error::{RelationalError, Result};
pub use ids::{StoreObjectDictionary, StoreObjectIdentifier, StoreObjectType};
pub use model::Model;
pub use relational::RelationalModel;
pub use type_mapping::{DefaultTypeMappingSource, RelationalTypeMappingSource, TypeMapping};
pub use types::{ClrType, Value};
