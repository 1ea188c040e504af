//! Tests for the debug view rendering

use pretty_assertions::assert_eq;
use relmodel::debug::{to_debug_string, DebugViewOptions};
use relmodel::model::Sequence;

use crate::common::{animal_hierarchy, resolve, split_order_model};

#[test]
fn single_line_summary_counts_the_store_objects() {
    let relational = resolve(&animal_hierarchy());
    let line = to_debug_string(
        &relational,
        DebugViewOptions {
            single_line: true,
            include_annotations: false,
        },
    );
    assert_eq!(
        line,
        "RelationalModel: 1 tables, 0 views, 0 queries, 0 functions, 0 stored procedures, \
         0 sequences"
    );
}

#[test]
fn tree_view_lists_columns_keys_and_mappings() {
    let relational = resolve(&animal_hierarchy());
    let view = to_debug_string(&relational, DebugViewOptions::default());

    assert!(view.starts_with("RelationalModel\n"));
    assert!(view.contains("  Table: Animals\n"));
    assert!(view.contains("    Column: Id int NOT NULL\n"));
    assert!(view.contains("    Column: Breed nvarchar(max) NULL\n"));
    assert!(view.contains("    PK: PK_Animals (Id)\n"));
    assert!(view.contains("    Mapping: Animal IncludesDerivedTypes\n"));
    assert!(view.contains("    Mapping: Dog\n"));
}

#[test]
fn tree_view_marks_shared_tables_and_split_principals() {
    let relational = resolve(&split_order_model());
    let view = to_debug_string(&relational, DebugViewOptions::default());

    assert!(view.contains("  Table: Orders Shared\n"));
    assert!(view.contains("  Table: OrderDetails Shared\n"));
    assert!(view.contains("    Mapping: Order SharedPrincipal SplitPrincipal\n"));
    assert!(view.contains(
        "    FK: FK_OrderDetails_Orders_Id (Id) -> Orders (Id) ON DELETE CASCADE\n"
    ));
}

#[test]
fn tree_view_includes_sequences() {
    let mut model = animal_hierarchy();
    model
        .add_sequence(Sequence::new("AnimalSeq", Some("dbo".to_string())).unwrap())
        .unwrap();
    let relational = resolve(&model);
    let view = to_debug_string(&relational, DebugViewOptions::default());
    assert!(view.contains("  Sequence: dbo.AnimalSeq long start 1 increment 1\n"));
}

#[test]
fn annotations_are_appended_only_on_request() {
    let mut model = animal_hierarchy();
    model.set_annotation("Provider:Compatibility", "150");
    let relational = resolve(&model);

    let without = to_debug_string(&relational, DebugViewOptions::default());
    assert!(!without.contains("Annotation"));

    let with = to_debug_string(
        &relational,
        DebugViewOptions {
            single_line: false,
            include_annotations: true,
        },
    );
    assert!(with.contains("  Annotation: Provider:Compatibility = 150\n"));
}
