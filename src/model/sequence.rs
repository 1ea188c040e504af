//! Sequence metadata
//!
//! In the mutable model a sequence's full configuration is persisted as a
//! single annotation string (see [`Sequence::serialize`]); the compiled model
//! materializes it into a first-class object. The string format is a
//! backward-compatibility contract and must be reproduced exactly: ordered,
//! single-quote-delimited, comma-separated fields with embedded quotes doubled
//! and `null` represented as an empty quoted field.

use crate::error::{RelationalError, Result};
use crate::types::ClrType;

/// A database sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    name: String,
    schema: Option<String>,
    /// The model's default schema at the time the sequence was added, used
    /// when no schema is configured.
    pub model_schema: Option<String>,
    pub start_value: i64,
    pub increment_by: i64,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    clr_type: ClrType,
    pub is_cyclic: bool,
    pub is_cached: bool,
    pub cache_size: Option<i32>,
}

impl Sequence {
    /// Create a sequence with the default configuration: starts at 1,
    /// increments by 1, produces `long` values.
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RelationalError::invalid_argument(
                "name",
                "sequence name must not be empty",
            ));
        }
        Ok(Sequence {
            name,
            schema,
            model_schema: None,
            start_value: 1,
            increment_by: 1,
            min_value: None,
            max_value: None,
            clr_type: ClrType::Int64,
            is_cyclic: false,
            is_cached: false,
            cache_size: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured schema, else the model schema captured at creation.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref().or(self.model_schema.as_deref())
    }

    pub fn clr_type(&self) -> ClrType {
        self.clr_type
    }

    /// Set the value type produced by the sequence. Only the integer types
    /// byte, short, int and long are supported.
    pub fn set_clr_type(&mut self, clr_type: ClrType) -> Result<()> {
        if !clr_type.is_sequence_type() {
            return Err(RelationalError::BadSequenceType {
                clr_type: clr_type.name().to_string(),
            });
        }
        self.clr_type = clr_type;
        Ok(())
    }

    /// Serialize to the persisted annotation string. `is_cached`/`cache_size`
    /// are in-memory-only facets and are not part of the persisted format.
    pub fn serialize(&self) -> String {
        let fields = [
            Some(self.name.clone()),
            self.schema.clone(),
            Some(self.start_value.to_string()),
            Some(self.increment_by.to_string()),
            self.min_value.map(|v| v.to_string()),
            self.max_value.map(|v| v.to_string()),
            Some(self.clr_type.name().to_string()),
            Some(if self.is_cyclic { "True" } else { "False" }.to_string()),
        ];
        fields
            .iter()
            .map(|field| match field {
                Some(value) => format!("'{}'", value.replace('\'', "''")),
                None => "''".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse the persisted annotation string. Strictly positional; any
    /// deviation from the format fails with `BadSequenceString`.
    pub fn deserialize(value: &str) -> Result<Sequence> {
        let fields = split_quoted_fields(value)?;
        if fields.len() != 8 {
            return Err(RelationalError::BadSequenceString {
                message: format!("expected 8 fields, found {}", fields.len()),
            });
        }

        let name = match &fields[0] {
            Some(name) if !name.is_empty() => name.clone(),
            _ => {
                return Err(RelationalError::BadSequenceString {
                    message: "sequence name must not be empty".to_string(),
                })
            }
        };
        let schema = fields[1].clone();
        let start_value = parse_required_i64(&fields[2], "StartValue")?;
        let increment_by = parse_required_i64(&fields[3], "IncrementBy")?;
        let min_value = parse_optional_i64(&fields[4], "MinValue")?;
        let max_value = parse_optional_i64(&fields[5], "MaxValue")?;

        let type_name = fields[6]
            .as_deref()
            .ok_or_else(|| RelationalError::BadSequenceString {
                message: "missing sequence type".to_string(),
            })?;
        let clr_type = ClrType::parse(type_name).ok_or_else(|| RelationalError::BadSequenceType {
            clr_type: type_name.to_string(),
        })?;
        if !clr_type.is_sequence_type() {
            return Err(RelationalError::BadSequenceType {
                clr_type: clr_type.name().to_string(),
            });
        }

        let is_cyclic = match fields[7].as_deref() {
            Some("True") => true,
            Some("False") => false,
            other => {
                return Err(RelationalError::BadSequenceString {
                    message: format!("invalid IsCyclic field '{}'", other.unwrap_or("")),
                })
            }
        };

        let mut sequence = Sequence::new(name, schema)?;
        sequence.start_value = start_value;
        sequence.increment_by = increment_by;
        sequence.min_value = min_value;
        sequence.max_value = max_value;
        sequence.clr_type = clr_type;
        sequence.is_cyclic = is_cyclic;
        Ok(sequence)
    }
}

/// Split `'a', 'b', ...` into fields, un-doubling embedded quotes. An empty
/// quoted field becomes `None`.
fn split_quoted_fields(value: &str) -> Result<Vec<Option<String>>> {
    let mut fields = Vec::new();
    let mut chars = value.chars().peekable();

    loop {
        match chars.next() {
            Some('\'') => {}
            other => {
                return Err(RelationalError::BadSequenceString {
                    message: match other {
                        Some(c) => format!("expected opening quote, found '{}'", c),
                        None => "expected opening quote, found end of string".to_string(),
                    },
                })
            }
        }

        let mut field = String::new();
        loop {
            match chars.next() {
                Some('\'') => {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        field.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => field.push(c),
                None => {
                    return Err(RelationalError::BadSequenceString {
                        message: "unterminated quoted field".to_string(),
                    })
                }
            }
        }

        fields.push(if field.is_empty() { None } else { Some(field) });

        match chars.next() {
            None => break,
            Some(',') => {
                // Optional single space after the separator.
                if chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            Some(c) => {
                return Err(RelationalError::BadSequenceString {
                    message: format!("expected field separator, found '{}'", c),
                })
            }
        }
    }

    Ok(fields)
}

fn parse_required_i64(field: &Option<String>, name: &str) -> Result<i64> {
    match field {
        Some(text) => text
            .parse::<i64>()
            .map_err(|_| RelationalError::BadSequenceString {
                message: format!("invalid {} '{}'", name, text),
            }),
        None => Err(RelationalError::BadSequenceString {
            message: format!("missing {}", name),
        }),
    }
}

fn parse_optional_i64(field: &Option<String>, name: &str) -> Result<Option<i64>> {
    match field {
        Some(text) => text.parse::<i64>().map(Some).map_err(|_| {
            RelationalError::BadSequenceString {
                message: format!("invalid {} '{}'", name, text),
            }
        }),
        None => Ok(None),
    }
}
