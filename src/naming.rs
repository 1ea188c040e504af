//! Default store-object naming
//!
//! Computes deterministic default names for constraints and indexes when no
//! explicit name is configured, including collision avoidance with integer
//! suffixes and truncation to the provider's maximum identifier length.

use std::collections::HashSet;

/// Truncate an identifier to the maximum length, by characters.
pub fn truncate_identifier(name: &str, max_length: usize) -> String {
    if name.chars().count() <= max_length {
        return name.to_string();
    }
    name.chars().take(max_length).collect()
}

/// Default key constraint name: `PK_{table}` for primary keys,
/// `AK_{table}_{columns}` for alternate keys.
pub fn key_name(table: &str, columns: &[String], is_primary: bool) -> String {
    if is_primary {
        format!("PK_{}", table)
    } else {
        format!("AK_{}_{}", table, columns.join("_"))
    }
}

/// Default foreign key constraint name:
/// `FK_{dependentTable}_{principalTable}_{columns}`.
pub fn foreign_key_name(dependent_table: &str, principal_table: &str, columns: &[String]) -> String {
    format!(
        "FK_{}_{}_{}",
        dependent_table,
        principal_table,
        columns.join("_")
    )
}

/// Default index name: `IX_{table}_{columns}`.
pub fn index_name(table: &str, columns: &[String]) -> String {
    format!("IX_{}_{}", table, columns.join("_"))
}

/// Default check constraint name: `CK_{table}_{modelName}`, truncated to the
/// maximum identifier length. A model name that already starts with
/// `CK_{table}_` is used verbatim before truncation so the prefix is never
/// doubled.
pub fn check_constraint_name(table: &str, model_name: &str, max_length: usize) -> String {
    let prefix = format!("CK_{}_", table);
    let name = if model_name.starts_with(&prefix) {
        model_name.to_string()
    } else {
        format!("{}{}", prefix, model_name)
    };
    truncate_identifier(&name, max_length)
}

/// Make `base` unique against the set of taken names by appending an
/// increasing integer suffix (`0`, `1`, `2`, …), keeping the result within the
/// maximum identifier length. The base itself is used when free.
pub fn uniquify(base: &str, taken: &HashSet<String>, max_length: usize) -> String {
    let candidate = truncate_identifier(base, max_length);
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut suffix = 0usize;
    loop {
        let suffix_text = suffix.to_string();
        let budget = max_length.saturating_sub(suffix_text.len());
        let candidate = format!("{}{}", truncate_identifier(base, budget), suffix_text);
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
