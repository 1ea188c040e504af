//! Tests for default constraint and index naming

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use relmodel::naming;

#[test]
fn primary_key_name_uses_table_only() {
    assert_eq!(
        naming::key_name("Orders", &["Id".to_string()], true),
        "PK_Orders"
    );
}

#[test]
fn alternate_key_name_includes_columns() {
    let columns = vec!["Region".to_string(), "Code".to_string()];
    assert_eq!(naming::key_name("Orders", &columns, false), "AK_Orders_Region_Code");
}

#[test]
fn foreign_key_name_includes_both_tables_and_columns() {
    let columns = vec!["CustomerId".to_string()];
    assert_eq!(
        naming::foreign_key_name("Orders", "Customers", &columns),
        "FK_Orders_Customers_CustomerId"
    );
}

#[test]
fn index_name_includes_columns() {
    let columns = vec!["Region".to_string(), "Code".to_string()];
    assert_eq!(naming::index_name("Orders", &columns), "IX_Orders_Region_Code");
}

#[test]
fn check_constraint_name_prefixes_model_name() {
    assert_eq!(
        naming::check_constraint_name("Orders", "PositiveTotal", 128),
        "CK_Orders_PositiveTotal"
    );
}

#[test]
fn check_constraint_prefix_is_never_doubled() {
    assert_eq!(
        naming::check_constraint_name("Orders", "CK_Orders_PositiveTotal", 128),
        "CK_Orders_PositiveTotal"
    );
}

#[test]
fn check_constraint_name_is_truncated() {
    let name = naming::check_constraint_name("Orders", "AVeryLongConstraintName", 12);
    assert_eq!(name, "CK_Orders_AV");
}

#[test]
fn truncation_counts_characters_not_bytes() {
    assert_eq!(naming::truncate_identifier("åäöåäö", 3), "åäö");
    assert_eq!(naming::truncate_identifier("short", 10), "short");
}

#[test]
fn uniquify_returns_base_when_free() {
    let taken = HashSet::new();
    assert_eq!(naming::uniquify("IX_T_A", &taken, 128), "IX_T_A");
}

#[test]
fn uniquify_appends_increasing_suffixes() {
    let mut taken = HashSet::new();
    taken.insert("IX_T_A".to_string());
    assert_eq!(naming::uniquify("IX_T_A", &taken, 128), "IX_T_A0");
    taken.insert("IX_T_A0".to_string());
    assert_eq!(naming::uniquify("IX_T_A", &taken, 128), "IX_T_A1");
}

#[test]
fn uniquify_truncates_to_make_room_for_the_suffix() {
    let mut taken = HashSet::new();
    taken.insert("ABCDEFGHIJ".to_string());
    assert_eq!(naming::uniquify("ABCDEFGHIJKL", &taken, 10), "ABCDEFGHI0");
}
