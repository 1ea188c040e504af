//! Value domain for the metadata layer
//!
//! The relational metadata layer only ever needs a small closed set of
//! property types and literal values (default values, discriminator values,
//! sequence bounds), so both are modelled as closed enums rather than a
//! reflection surface.

use std::fmt;

/// The closed set of property types the relational layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClrType {
    Bool,
    UInt8,
    Int16,
    Int32,
    Int64,
    Float64,
    Decimal,
    String,
    Bytes,
    DateTime,
    Guid,
}

impl ClrType {
    /// Short type name used in messages and in the sequence annotation string.
    pub fn name(self) -> &'static str {
        match self {
            ClrType::Bool => "bool",
            ClrType::UInt8 => "byte",
            ClrType::Int16 => "short",
            ClrType::Int32 => "int",
            ClrType::Int64 => "long",
            ClrType::Float64 => "double",
            ClrType::Decimal => "decimal",
            ClrType::String => "string",
            ClrType::Bytes => "byte[]",
            ClrType::DateTime => "DateTime",
            ClrType::Guid => "Guid",
        }
    }

    /// Inverse of [`ClrType::name`], used when reading persisted annotations.
    pub fn parse(name: &str) -> Option<ClrType> {
        match name {
            "bool" => Some(ClrType::Bool),
            "byte" => Some(ClrType::UInt8),
            "short" => Some(ClrType::Int16),
            "int" => Some(ClrType::Int32),
            "long" => Some(ClrType::Int64),
            "double" => Some(ClrType::Float64),
            "decimal" => Some(ClrType::Decimal),
            "string" => Some(ClrType::String),
            "byte[]" => Some(ClrType::Bytes),
            "DateTime" => Some(ClrType::DateTime),
            "Guid" => Some(ClrType::Guid),
            _ => None,
        }
    }

    /// Whether this is one of the integer types a sequence may use.
    pub fn is_sequence_type(self) -> bool {
        matches!(
            self,
            ClrType::UInt8 | ClrType::Int16 | ClrType::Int32 | ClrType::Int64
        )
    }

    fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            ClrType::UInt8 => Some((0, u8::MAX as i64)),
            ClrType::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            ClrType::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            ClrType::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for ClrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal value attached to the model: a default value, a discriminator
/// value or a seed constant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// An enum member, carried with its underlying integer value so it can be
    /// unwrapped when assigned to an integer-typed property.
    Enum { type_name: String, value: i64 },
}

impl Value {
    /// Whether this value can be stored in a property of the given type
    /// without conversion loss.
    pub fn is_assignable_to(&self, clr_type: ClrType) -> bool {
        self.clone().coerce(clr_type).is_some()
    }

    /// Convert this value to the given property type, unwrapping enum values
    /// to their underlying integer. Returns `None` when no standard conversion
    /// exists.
    pub fn coerce(self, clr_type: ClrType) -> Option<Value> {
        match (self, clr_type) {
            (Value::Bool(v), ClrType::Bool) => Some(Value::Bool(v)),
            (Value::Int(v), t) => match t.integer_range() {
                Some((min, max)) if v >= min && v <= max => Some(Value::Int(v)),
                Some(_) => None,
                None => match t {
                    ClrType::Float64 => Some(Value::Float(v as f64)),
                    ClrType::Decimal => Some(Value::Int(v)),
                    _ => None,
                },
            },
            (Value::Float(v), ClrType::Float64) => Some(Value::Float(v)),
            (Value::String(v), ClrType::String) => Some(Value::String(v)),
            (Value::Bytes(v), ClrType::Bytes) => Some(Value::Bytes(v)),
            // DateTime and Guid literals travel as strings in this layer.
            (Value::String(v), ClrType::DateTime) => Some(Value::String(v)),
            (Value::String(v), ClrType::Guid) => Some(Value::String(v)),
            (Value::Enum { value, .. }, t) => Value::Int(value).coerce(t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            Value::Enum { type_name, value } => write!(f, "{}({})", type_name, value),
        }
    }
}
