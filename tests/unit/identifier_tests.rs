//! Tests for store object identity and the identifier-keyed dictionary

use pretty_assertions::assert_eq;
use relmodel::{RelationalError, StoreObjectDictionary, StoreObjectIdentifier, StoreObjectType};

#[test]
fn table_identifier_carries_kind_name_and_schema() {
    let id = StoreObjectIdentifier::table("Orders", Some("sales".to_string())).unwrap();
    assert_eq!(id.object_type(), StoreObjectType::Table);
    assert_eq!(id.name(), "Orders");
    assert_eq!(id.schema(), Some("sales"));
    assert_eq!(id.display_name(), "sales.Orders");
    assert_eq!(id.to_string(), "Table sales.Orders");
}

#[test]
fn schemaless_identifier_displays_bare_name() {
    let id = StoreObjectIdentifier::view("Orders", None).unwrap();
    assert_eq!(id.display_name(), "Orders");
    assert_eq!(id.to_string(), "View Orders");
}

#[test]
fn identifiers_with_equal_name_but_different_kind_are_distinct() {
    let table = StoreObjectIdentifier::table("Orders", None).unwrap();
    let view = StoreObjectIdentifier::view("Orders", None).unwrap();
    assert_ne!(table, view);
}

#[test]
fn identifiers_with_different_schema_are_distinct() {
    let dbo = StoreObjectIdentifier::table("Orders", Some("dbo".to_string())).unwrap();
    let sales = StoreObjectIdentifier::table("Orders", Some("sales".to_string())).unwrap();
    assert_ne!(dbo, sales);
}

#[test]
fn identifiers_order_by_kind_then_name_then_schema() {
    let mut ids = vec![
        StoreObjectIdentifier::view("A", None).unwrap(),
        StoreObjectIdentifier::table("B", Some("dbo".to_string())).unwrap(),
        StoreObjectIdentifier::table("B", None).unwrap(),
        StoreObjectIdentifier::table("A", None).unwrap(),
    ];
    ids.sort();
    assert_eq!(
        ids,
        vec![
            StoreObjectIdentifier::table("A", None).unwrap(),
            StoreObjectIdentifier::table("B", None).unwrap(),
            StoreObjectIdentifier::table("B", Some("dbo".to_string())).unwrap(),
            StoreObjectIdentifier::view("A", None).unwrap(),
        ]
    );
}

#[test]
fn empty_name_is_rejected() {
    let result = StoreObjectIdentifier::table("", None);
    assert!(matches!(
        result,
        Err(RelationalError::InvalidArgument { .. })
    ));
}

#[test]
fn empty_schema_is_rejected() {
    let result = StoreObjectIdentifier::table("Orders", Some(String::new()));
    assert!(matches!(
        result,
        Err(RelationalError::InvalidArgument { .. })
    ));
}

#[test]
fn stored_procedure_identifiers_are_kind_specific() {
    let insert = StoreObjectIdentifier::insert_stored_procedure("Order_Insert", None).unwrap();
    let update = StoreObjectIdentifier::update_stored_procedure("Order_Insert", None).unwrap();
    assert_eq!(insert.object_type(), StoreObjectType::InsertStoredProcedure);
    assert_ne!(insert, update);
}

#[test]
fn dictionary_iterates_in_identifier_order() {
    let mut dictionary = StoreObjectDictionary::new();
    dictionary.insert(StoreObjectIdentifier::view("V", None).unwrap(), 1);
    dictionary.insert(StoreObjectIdentifier::table("B", None).unwrap(), 2);
    dictionary.insert(StoreObjectIdentifier::table("A", None).unwrap(), 3);
    let names: Vec<String> = dictionary
        .keys()
        .map(|id| format!("{}", id))
        .collect();
    assert_eq!(names, vec!["Table A", "Table B", "View V"]);
}

#[test]
fn dictionary_insert_replaces_by_identity() {
    let mut dictionary = StoreObjectDictionary::new();
    let id = StoreObjectIdentifier::table("A", None).unwrap();
    assert_eq!(dictionary.insert(id.clone(), 1), None);
    assert_eq!(dictionary.insert(id.clone(), 2), Some(1));
    assert_eq!(dictionary.get(&id), Some(&2));
    assert_eq!(dictionary.len(), 1);
}
