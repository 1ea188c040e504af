//! Store type mapping lookup
//!
//! The resolution engine needs a store type for every column and parameter.
//! Providers supply that through [`RelationalTypeMappingSource`]; the bundled
//! [`DefaultTypeMappingSource`] covers the closed [`ClrType`] set with
//! SQL-Server-flavoured defaults and is what the tests use.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::types::ClrType;

/// A resolved (CLR type, store type) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub clr_type: ClrType,
    pub store_type: String,
}

/// Capability interface implemented by providers: find the store type mapping
/// for a property type, optionally constrained to an explicitly configured
/// store type.
pub trait RelationalTypeMappingSource {
    fn find_mapping(&self, clr_type: ClrType, store_type: Option<&str>) -> Option<TypeMapping>;
}

static DEFAULT_STORE_TYPES: Lazy<HashMap<ClrType, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(ClrType::Bool, "bit");
    map.insert(ClrType::UInt8, "tinyint");
    map.insert(ClrType::Int16, "smallint");
    map.insert(ClrType::Int32, "int");
    map.insert(ClrType::Int64, "bigint");
    map.insert(ClrType::Float64, "float");
    map.insert(ClrType::Decimal, "decimal(18,2)");
    map.insert(ClrType::String, "nvarchar(max)");
    map.insert(ClrType::Bytes, "varbinary(max)");
    map.insert(ClrType::DateTime, "datetime2");
    map.insert(ClrType::Guid, "uniqueidentifier");
    map
});

/// Default mapping source covering every [`ClrType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeMappingSource;

impl RelationalTypeMappingSource for DefaultTypeMappingSource {
    fn find_mapping(&self, clr_type: ClrType, store_type: Option<&str>) -> Option<TypeMapping> {
        let store_type = match store_type {
            Some(explicit) => explicit.to_string(),
            None => DEFAULT_STORE_TYPES.get(&clr_type)?.to_string(),
        };
        Some(TypeMapping {
            clr_type,
            store_type,
        })
    }
}
