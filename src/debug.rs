//! Human-readable debug view of a resolved relational model
//!
//! Prints every store object with its columns, constraints and entity type
//! mappings as an indented tree, in the deterministic store object order.
//! Intended for tests and diagnostics, not for machine consumption.

use std::fmt::Write;

use crate::relational::{
    Column, RelationalModel, Table, TableMapping, UniqueConstraint,
};

/// Options controlling the debug view output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugViewOptions {
    /// Emit a one-line summary instead of the full tree.
    pub single_line: bool,
    /// Append the model's residual annotations.
    pub include_annotations: bool,
}

/// Render the model as a debug string.
pub fn to_debug_string(model: &RelationalModel, options: DebugViewOptions) -> String {
    if options.single_line {
        return format!(
            "RelationalModel: {} tables, {} views, {} queries, {} functions, {} stored procedures, {} sequences",
            model.tables().count(),
            model.views().count(),
            model.queries().count(),
            model.functions().count(),
            model.stored_procedures().count(),
            model.sequences().len(),
        );
    }

    let mut out = String::new();
    let _ = writeln!(out, "RelationalModel");
    for table in model.tables() {
        write_table(&mut out, table);
    }
    for view in model.views() {
        let _ = writeln!(out, "  View: {}{}", view.id().display_name(), shared_suffix(view.is_shared));
        for column in &view.columns {
            write_column(&mut out, column);
        }
        for mapping in &view.entity_type_mappings {
            write_mapping(&mut out, mapping);
        }
    }
    for query in model.queries() {
        let _ = writeln!(out, "  SqlQuery: {}", query.id().display_name());
        for column in &query.columns {
            write_column(&mut out, column);
        }
        for mapping in &query.entity_type_mappings {
            write_mapping(&mut out, mapping);
        }
    }
    for function in model.functions() {
        let _ = writeln!(
            out,
            "  Function: {}{}",
            function.id().display_name(),
            function
                .return_store_type
                .as_deref()
                .map(|t| format!(" -> {}", t))
                .unwrap_or_default(),
        );
        for column in &function.columns {
            write_column(&mut out, column);
        }
        for mapping in &function.entity_type_mappings {
            write_mapping(&mut out, mapping);
        }
    }
    for procedure in model.stored_procedures() {
        let _ = writeln!(
            out,
            "  {}: {}",
            procedure.id().object_type(),
            procedure.id().display_name()
        );
        for parameter in &procedure.parameters {
            let _ = writeln!(
                out,
                "    Parameter: {} {}{}{}",
                parameter.name,
                parameter.store_type,
                if parameter.for_original_value { " ORIGINAL" } else { "" },
                if parameter.for_rows_affected { " ROWS_AFFECTED" } else { "" },
            );
        }
        for column in &procedure.result_columns {
            let _ = writeln!(
                out,
                "    ResultColumn: {} {}{}",
                column.name,
                column.store_type,
                if column.for_rows_affected { " ROWS_AFFECTED" } else { "" },
            );
        }
        for mapping in &procedure.entity_type_mappings {
            let _ = writeln!(out, "    Mapping: {}", mapping.entity_type);
        }
    }
    for sequence in model.sequences() {
        let schema = sequence
            .schema()
            .map(|s| format!("{}.", s))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  Sequence: {}{} {} start {} increment {}",
            schema,
            sequence.name(),
            sequence.clr_type().name(),
            sequence.start_value,
            sequence.increment_by,
        );
    }
    if options.include_annotations {
        for (name, value) in model.annotations() {
            let _ = writeln!(out, "  Annotation: {} = {}", name, value);
        }
    }
    out
}

fn write_table(out: &mut String, table: &Table) {
    let mut flags = shared_suffix(table.is_shared);
    if table.is_excluded_from_migrations {
        flags.push_str(" ExcludedFromMigrations");
    }
    let _ = writeln!(out, "  Table: {}{}", table.id().display_name(), flags);
    for column in &table.columns {
        write_column(out, column);
    }
    if let Some(key) = &table.primary_key {
        write_key(out, key);
    }
    for key in &table.unique_constraints {
        write_key(out, key);
    }
    for foreign_key in &table.foreign_key_constraints {
        let _ = writeln!(
            out,
            "    FK: {} ({}) -> {} ({}) ON DELETE {}",
            foreign_key.name,
            foreign_key.columns.join(", "),
            foreign_key.principal_table.display_name(),
            foreign_key.principal_columns.join(", "),
            foreign_key.on_delete.display_name(),
        );
    }
    for index in &table.indexes {
        let _ = writeln!(
            out,
            "    IX: {} ({}){}",
            index.name,
            index.columns.join(", "),
            if index.is_unique { " UNIQUE" } else { "" },
        );
    }
    for constraint in &table.check_constraints {
        let _ = writeln!(out, "    CK: {} {}", constraint.name, constraint.sql);
    }
    for trigger in &table.triggers {
        let _ = writeln!(out, "    TR: {}", trigger.name);
    }
    for mapping in &table.entity_type_mappings {
        write_mapping(out, mapping);
    }
}

fn write_column(out: &mut String, column: &Column) {
    let _ = writeln!(
        out,
        "    Column: {} {} {}",
        column.name,
        column.store_type,
        if column.is_nullable { "NULL" } else { "NOT NULL" },
    );
}

fn write_key(out: &mut String, key: &UniqueConstraint) {
    let _ = writeln!(
        out,
        "    {}: {} ({})",
        if key.is_primary { "PK" } else { "UC" },
        key.name,
        key.columns.join(", "),
    );
}

fn write_mapping(out: &mut String, mapping: &TableMapping) {
    let mut flags = String::new();
    if mapping.includes_derived_types == Some(true) {
        flags.push_str(" IncludesDerivedTypes");
    }
    if mapping.is_shared_table_principal == Some(true) {
        flags.push_str(" SharedPrincipal");
    }
    if mapping.is_split_entity_type_principal == Some(true) {
        flags.push_str(" SplitPrincipal");
    }
    let _ = writeln!(out, "    Mapping: {}{}", mapping.entity_type, flags);
}

fn shared_suffix(is_shared: bool) -> String {
    if is_shared {
        " Shared".to_string()
    } else {
        String::new()
    }
}
