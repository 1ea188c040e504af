//! End-to-end tests for relational model resolution: inheritance strategies,
//! entity splitting, table sharing, column merging and default naming

use pretty_assertions::assert_eq;
use relmodel::model::{
    ForeignKey, MappingStrategy, Model, ModelIndex, ModelTrigger, ReferentialAction,
};
use relmodel::{
    ClrType, ConfigurationSource, DefaultTypeMappingSource, RelationalError, RelationalModel,
    StoreObjectIdentifier,
};

use crate::common::{animal_hierarchy, property, resolve, split_order_model};

// ============================================================================
// Inheritance strategies
// ============================================================================

#[test]
fn tph_hierarchy_maps_to_a_single_table() {
    let model = animal_hierarchy();
    let relational = resolve(&model);

    assert_eq!(relational.tables().count(), 1);
    let table = relational.find_table("Animals", None).unwrap();
    let columns: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Id", "Name", "Kind", "Breed"]);

    let key = table.primary_key.as_ref().unwrap();
    assert_eq!(key.name, "PK_Animals");
    assert_eq!(key.columns, vec!["Id".to_string()]);

    assert_eq!(table.entity_type_mappings.len(), 2);
    assert_eq!(table.entity_type_mappings[0].entity_type, "Animal");
    assert_eq!(table.entity_type_mappings[1].entity_type, "Dog");
    // The root's rows include the derived types; the leaf has no flag at all.
    assert_eq!(table.entity_type_mappings[0].includes_derived_types, Some(true));
    assert_eq!(table.entity_type_mappings[1].includes_derived_types, None);
    // TPH within one hierarchy is not table sharing.
    assert!(!table.is_shared);
    assert_eq!(table.entity_type_mappings[0].is_shared_table_principal, None);
}

#[test]
fn tph_derived_only_columns_are_widened_to_nullable() {
    let model = animal_hierarchy();
    let relational = resolve(&model);
    let table = relational.find_table("Animals", None).unwrap();

    // Declared non-nullable on the root, present in every row.
    assert!(!table.find_column("Name").unwrap().is_nullable);
    // Declared non-nullable on Dog, but Animal rows have no value for it.
    assert!(table.find_column("Breed").unwrap().is_nullable);
}

#[test]
fn tph_derived_type_cannot_map_to_its_own_table() {
    let mut model = animal_hierarchy();
    let dog = model.find_entity_type("Dog").unwrap();
    model
        .entity_type_mut(dog)
        .unwrap()
        .set_table("Dogs", None, ConfigurationSource::Explicit)
        .unwrap();
    let result = RelationalModel::create(&model, &DefaultTypeMappingSource);
    assert!(matches!(
        result,
        Err(RelationalError::InvalidInheritanceMapping { .. })
    ));
}

#[test]
fn tpt_links_the_derived_table_to_the_base_table() {
    let mut model = Model::new();
    let animal = model.add_entity_type("Animal").unwrap();
    {
        let entity = model.entity_type_mut(animal).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Name", ClrType::String))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }
    let dog = model.add_entity_type("Dog").unwrap();
    model
        .entity_type_mut(dog)
        .unwrap()
        .add_property(property("Breed", ClrType::String))
        .unwrap();
    model.set_base_type(dog, animal).unwrap();
    model
        .set_mapping_strategy(animal, MappingStrategy::Tpt, ConfigurationSource::Explicit)
        .unwrap();

    let relational = resolve(&model);
    assert_eq!(relational.tables().count(), 2);

    let animal_table = relational.find_table("Animal", None).unwrap();
    let dog_table = relational.find_table("Dog", None).unwrap();

    // The derived table carries only the declared properties plus the key.
    let columns: Vec<&str> = dog_table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Id", "Breed"]);
    assert_eq!(dog_table.primary_key.as_ref().unwrap().name, "PK_Dog");

    let link = &dog_table.foreign_key_constraints[0];
    assert_eq!(link.name, "FK_Dog_Animal_Id");
    assert_eq!(link.columns, vec!["Id".to_string()]);
    assert_eq!(link.principal_columns, vec!["Id".to_string()]);
    assert_eq!(link.principal_unique_constraint, "PK_Animal");
    assert_eq!(link.on_delete, ReferentialAction::Cascade);

    assert_eq!(
        animal_table.referencing_foreign_keys,
        vec![(dog_table.id().clone(), "FK_Dog_Animal_Id".to_string())]
    );
    assert_eq!(
        animal_table.entity_type_mappings[0].includes_derived_types,
        Some(true)
    );
}

#[test]
fn tpt_requires_a_primary_key() {
    let mut model = Model::new();
    let base = model.add_entity_type("Base").unwrap();
    model
        .entity_type_mut(base)
        .unwrap()
        .add_property(property("Id", ClrType::Int32))
        .unwrap();
    let derived = model.add_entity_type("Derived").unwrap();
    model.set_base_type(derived, base).unwrap();
    model
        .set_mapping_strategy(base, MappingStrategy::Tpt, ConfigurationSource::Explicit)
        .unwrap();

    let result = RelationalModel::create(&model, &DefaultTypeMappingSource);
    assert!(matches!(
        result,
        Err(RelationalError::InvalidInheritanceMapping { .. })
    ));
}

#[test]
fn tpc_duplicates_inherited_columns_per_concrete_table() {
    let mut model = Model::new();
    let animal = model.add_entity_type("Animal").unwrap();
    {
        let entity = model.entity_type_mut(animal).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Name", ClrType::String))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }
    let dog = model.add_entity_type("Dog").unwrap();
    model
        .entity_type_mut(dog)
        .unwrap()
        .add_property(property("Breed", ClrType::String))
        .unwrap();
    model.set_base_type(dog, animal).unwrap();
    model
        .set_mapping_strategy(animal, MappingStrategy::Tpc, ConfigurationSource::Explicit)
        .unwrap();

    let relational = resolve(&model);
    let animal_table = relational.find_table("Animal", None).unwrap();
    let dog_table = relational.find_table("Dog", None).unwrap();

    let columns: Vec<&str> = dog_table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Id", "Name", "Breed"]);
    // Inherited columns cover every row of the concrete table.
    assert!(!dog_table.find_column("Name").unwrap().is_nullable);
    // No linking constraint between the concrete tables.
    assert!(dog_table.foreign_key_constraints.is_empty());

    // A concrete root with derived types explicitly does not carry their rows.
    assert_eq!(
        animal_table.entity_type_mappings[0].includes_derived_types,
        Some(false)
    );
    assert_eq!(dog_table.entity_type_mappings[0].includes_derived_types, None);
}

#[test]
fn tpc_abstract_types_are_not_mapped() {
    let mut model = Model::new();
    let animal = model.add_entity_type("Animal").unwrap();
    {
        let entity = model.entity_type_mut(animal).unwrap();
        entity.is_abstract = true;
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }
    let dog = model.add_entity_type("Dog").unwrap();
    model.set_base_type(dog, animal).unwrap();
    model
        .set_mapping_strategy(animal, MappingStrategy::Tpc, ConfigurationSource::Explicit)
        .unwrap();

    let relational = resolve(&model);
    assert!(relational.find_table("Animal", None).is_none());
    assert!(relational.find_table("Dog", None).is_some());
}

// ============================================================================
// Entity splitting
// ============================================================================

#[test]
fn split_entity_type_spans_two_tables() {
    let model = split_order_model();
    let relational = resolve(&model);

    let orders = relational.find_table("Orders", None).unwrap();
    let details = relational.find_table("OrderDetails", None).unwrap();

    let order_columns: Vec<&str> = orders.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(order_columns, vec!["Id", "CustomerName"]);
    let detail_columns: Vec<&str> = details.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(detail_columns, vec!["Id", "Details"]);

    // The key materializes on both tables, named per table.
    assert_eq!(orders.primary_key.as_ref().unwrap().name, "PK_Orders");
    assert_eq!(details.primary_key.as_ref().unwrap().name, "PK_OrderDetails");

    // Exactly one mapping is the split principal.
    assert_eq!(
        orders.entity_type_mappings[0].is_split_entity_type_principal,
        Some(true)
    );
    assert_eq!(
        details.entity_type_mappings[0].is_split_entity_type_principal,
        Some(false)
    );
    assert!(orders.is_shared);
    assert!(details.is_shared);

    assert_eq!(relational.mappings_of("Order").len(), 2);
}

#[test]
fn split_fragment_is_linked_back_by_a_cascading_foreign_key() {
    let model = split_order_model();
    let relational = resolve(&model);
    let details = relational.find_table("OrderDetails", None).unwrap();

    let link = &details.foreign_key_constraints[0];
    assert_eq!(link.name, "FK_OrderDetails_Orders_Id");
    assert_eq!(link.principal_table.name(), "Orders");
    assert_eq!(link.columns, vec!["Id".to_string()]);
    assert_eq!(link.principal_unique_constraint, "PK_Orders");
    assert_eq!(link.on_delete, ReferentialAction::Cascade);
}

// ============================================================================
// Table sharing and column merging
// ============================================================================

fn shared_table_model(second_name_type: ClrType, second_nullable: bool) -> Model {
    let mut model = Model::new();
    let order = model.add_entity_type("Order").unwrap();
    {
        let entity = model.entity_type_mut(order).unwrap();
        entity
            .set_table("Shared", None, ConfigurationSource::Explicit)
            .unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Name", ClrType::String))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }
    let invoice = model.add_entity_type("Invoice").unwrap();
    {
        let entity = model.entity_type_mut(invoice).unwrap();
        entity
            .set_table("Shared", None, ConfigurationSource::Explicit)
            .unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Name", second_name_type).nullable(second_nullable))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }
    model
}

#[test]
fn shared_table_has_exactly_one_principal_mapping() {
    let model = shared_table_model(ClrType::String, false);
    let relational = resolve(&model);

    let table = relational.find_table("Shared", None).unwrap();
    assert!(table.is_shared);
    assert_eq!(table.entity_type_mappings.len(), 2);
    assert_eq!(table.entity_type_mappings[0].entity_type, "Order");
    assert_eq!(table.entity_type_mappings[0].is_shared_table_principal, Some(true));
    assert_eq!(table.entity_type_mappings[1].is_shared_table_principal, Some(false));

    // Both Name properties merged onto one column.
    let name = table.find_column("Name").unwrap();
    assert_eq!(name.property_mappings.len(), 2);
}

#[test]
fn nonprincipal_sharer_columns_are_widened_to_nullable() {
    let mut model = shared_table_model(ClrType::String, false);
    let invoice = model.find_entity_type("Invoice").unwrap();
    model
        .entity_type_mut(invoice)
        .unwrap()
        .add_property(property("InvoiceNumber", ClrType::String))
        .unwrap();

    let relational = resolve(&model);
    let table = relational.find_table("Shared", None).unwrap();

    // The principal mapping covers every row, so its requirement sticks.
    assert!(!table.find_column("Name").unwrap().is_nullable);
    // Rows without an Invoice part have no value for its declared columns,
    // even though the property itself is not nullable.
    assert!(table.find_column("InvoiceNumber").unwrap().is_nullable);
}

#[test]
fn merged_column_with_mismatched_nullability_is_rejected() {
    let model = shared_table_model(ClrType::String, true);
    let result = RelationalModel::create(&model, &DefaultTypeMappingSource);
    assert!(matches!(
        result,
        Err(RelationalError::MappingConflict { facet, column, .. })
            if facet == "IsNullable" && column == "Name"
    ));
}

#[test]
fn merged_column_with_mismatched_store_type_is_rejected() {
    let model = shared_table_model(ClrType::Int32, false);
    let result = RelationalModel::create(&model, &DefaultTypeMappingSource);
    assert!(matches!(
        result,
        Err(RelationalError::MappingConflict { facet, .. }) if facet == "ColumnType"
    ));
}

// ============================================================================
// Owned types
// ============================================================================

#[test]
fn owned_type_defaults_to_an_owner_derived_table_name() {
    let mut model = Model::new();
    let customer = model.add_entity_type("Customer").unwrap();
    {
        let entity = model.entity_type_mut(customer).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }
    let address = model.add_entity_type("Address").unwrap();
    {
        let entity = model.entity_type_mut(address).unwrap();
        entity.set_ownership(customer, "ShippingAddress");
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Street", ClrType::String))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }

    let relational = resolve(&model);
    let table = relational.find_table("Customer_ShippingAddress", None).unwrap();
    assert!(table.find_column("Street").is_some());
}

#[test]
fn owned_type_sharing_the_owner_table_prefixes_its_columns() {
    let mut model = Model::new();
    let customer = model.add_entity_type("Customer").unwrap();
    {
        let entity = model.entity_type_mut(customer).unwrap();
        entity
            .set_table("Customers", None, ConfigurationSource::Explicit)
            .unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }
    let address = model.add_entity_type("Address").unwrap();
    {
        let entity = model.entity_type_mut(address).unwrap();
        entity.set_ownership(customer, "ShippingAddress");
        entity
            .set_table("Customers", None, ConfigurationSource::Explicit)
            .unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Street", ClrType::String))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }

    let relational = resolve(&model);
    let table = relational.find_table("Customers", None).unwrap();
    assert!(table.is_shared);
    assert!(table.find_column("ShippingAddress_Street").is_some());
    assert!(table.find_column("Street").is_none());
}

// ============================================================================
// Constraint naming and deduplication
// ============================================================================

#[test]
fn colliding_default_foreign_key_names_get_integer_suffixes() {
    let mut model = Model::new();
    let principal = model.add_entity_type("P").unwrap();
    {
        let entity = model.entity_type_mut(principal).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Code", ClrType::Int32))
            .unwrap();
        entity.add_property(property("Ref", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
        entity.add_alternate_key(vec!["Code".to_string()]).unwrap();
        entity.add_alternate_key(vec!["Ref".to_string()]).unwrap();
    }
    let dependent = model.add_entity_type("D").unwrap();
    {
        let entity = model.entity_type_mut(dependent).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity.add_property(property("PId", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
        for principal_properties in [vec![], vec!["Code".to_string()], vec!["Ref".to_string()]] {
            entity
                .add_foreign_key(ForeignKey {
                    properties: vec!["PId".to_string()],
                    principal_entity: principal,
                    principal_properties,
                    on_delete: ReferentialAction::NoAction,
                    name: None,
                    name_source: None,
                })
                .unwrap();
        }
    }

    let relational = resolve(&model);
    let table = relational.find_table("D", None).unwrap();
    let names: Vec<&str> = table
        .foreign_key_constraints
        .iter()
        .map(|fk| fk.name.as_str())
        .collect();
    assert_eq!(names, vec!["FK_D_P_PId", "FK_D_P_PId0", "FK_D_P_PId1"]);

    // Each constraint targets the matching unique constraint on P.
    let targets: Vec<&str> = table
        .foreign_key_constraints
        .iter()
        .map(|fk| fk.principal_unique_constraint.as_str())
        .collect();
    assert_eq!(targets, vec!["PK_P", "AK_P_Code", "AK_P_Ref"]);
}

#[test]
fn default_foreign_key_names_avoid_explicitly_named_later_siblings() {
    let mut model = Model::new();
    let principal = model.add_entity_type("P").unwrap();
    {
        let entity = model.entity_type_mut(principal).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Code", ClrType::Int32))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
        entity.add_alternate_key(vec!["Code".to_string()]).unwrap();
    }
    let dependent = model.add_entity_type("D").unwrap();
    {
        let entity = model.entity_type_mut(dependent).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity.add_property(property("PId", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
        // Declared first, no name: the default would be FK_D_P_PId.
        entity
            .add_foreign_key(ForeignKey {
                properties: vec!["PId".to_string()],
                principal_entity: principal,
                principal_properties: vec![],
                on_delete: ReferentialAction::NoAction,
                name: None,
                name_source: None,
            })
            .unwrap();
        // Declared second, explicitly claiming that exact name.
        entity
            .add_foreign_key(ForeignKey {
                properties: vec!["PId".to_string()],
                principal_entity: principal,
                principal_properties: vec!["Code".to_string()],
                on_delete: ReferentialAction::NoAction,
                name: Some("FK_D_P_PId".to_string()),
                name_source: Some(ConfigurationSource::Explicit),
            })
            .unwrap();
    }

    let relational = resolve(&model);
    let table = relational.find_table("D", None).unwrap();
    let names: Vec<&str> = table
        .foreign_key_constraints
        .iter()
        .map(|fk| fk.name.as_str())
        .collect();
    // The explicit name wins regardless of declaration order; the default
    // steps aside even though it was materialized first.
    assert_eq!(names, vec!["FK_D_P_PId0", "FK_D_P_PId"]);
}

#[test]
fn default_index_names_avoid_explicitly_named_later_siblings() {
    let mut model = Model::new();
    let thing = model.add_entity_type("T").unwrap();
    {
        let entity = model.entity_type_mut(thing).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity.add_property(property("A", ClrType::Int32)).unwrap();
        entity.add_property(property("B", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
        entity
            .add_index(ModelIndex {
                properties: vec!["A".to_string()],
                is_unique: false,
                is_descending: None,
                filter: None,
                name: None,
                name_source: None,
            })
            .unwrap();
        entity
            .add_index(ModelIndex {
                properties: vec!["B".to_string()],
                is_unique: false,
                is_descending: None,
                filter: None,
                name: Some("IX_T_A".to_string()),
                name_source: Some(ConfigurationSource::Explicit),
            })
            .unwrap();
    }

    let relational = resolve(&model);
    let table = relational.find_table("T", None).unwrap();
    let names: Vec<&str> = table.indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["IX_T_A0", "IX_T_A"]);
}

#[test]
fn duplicate_indexes_are_deduplicated_per_table() {
    let mut model = animal_hierarchy();
    let animal = model.find_entity_type("Animal").unwrap();
    let dog = model.find_entity_type("Dog").unwrap();
    for id in [animal, dog] {
        model
            .entity_type_mut(id)
            .unwrap()
            .add_index(ModelIndex {
                properties: vec!["Name".to_string()],
                is_unique: false,
                is_descending: None,
                filter: None,
                name: None,
                name_source: None,
            })
            .unwrap();
    }

    let relational = resolve(&model);
    let table = relational.find_table("Animals", None).unwrap();
    assert_eq!(table.indexes.len(), 1);
    assert_eq!(table.indexes[0].name, "IX_Animals_Name");
}

#[test]
fn check_constraints_are_named_and_scoped_to_the_table() {
    let mut model = animal_hierarchy();
    let animal = model.find_entity_type("Animal").unwrap();
    model
        .entity_type_mut(animal)
        .unwrap()
        .add_check_constraint(relmodel::model::CheckConstraint {
            model_name: "NonEmptyName".to_string(),
            sql: "LEN([Name]) > 0".to_string(),
            name: None,
            name_source: None,
        })
        .unwrap();

    let relational = resolve(&model);
    let table = relational.find_table("Animals", None).unwrap();
    assert_eq!(table.check_constraints.len(), 1);
    assert_eq!(table.check_constraints[0].name, "CK_Animals_NonEmptyName");
    assert_eq!(table.check_constraints[0].entity_type, "Animal");
}

#[test]
fn triggers_attach_to_the_entity_table_by_default() {
    let mut model = animal_hierarchy();
    let animal = model.find_entity_type("Animal").unwrap();
    model
        .entity_type_mut(animal)
        .unwrap()
        .add_trigger(ModelTrigger {
            model_name: "Animals_Audit".to_string(),
            name: None,
            table_name: None,
            table_schema: None,
        })
        .unwrap();

    let relational = resolve(&model);
    let table = relational.find_table("Animals", None).unwrap();
    assert_eq!(table.triggers.len(), 1);
    assert_eq!(table.triggers[0].name, "Animals_Audit");
    assert_eq!(table.triggers[0].table_name, "Animals");
}

// ============================================================================
// Views, queries, schemas and determinism
// ============================================================================

#[test]
fn view_mapped_entity_resolves_to_a_view() {
    let mut model = Model::new();
    let report = model.add_entity_type("Report").unwrap();
    {
        let entity = model.entity_type_mut(report).unwrap();
        entity.set_view("Reports", Some("dbo".to_string())).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Title", ClrType::String))
            .unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }

    let relational = resolve(&model);
    assert_eq!(relational.tables().count(), 0);
    let view = relational.find_view("Reports", Some("dbo")).unwrap();
    let columns: Vec<&str> = view.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["Id", "Title"]);
    assert_eq!(view.entity_type_mappings[0].entity_type, "Report");
}

#[test]
fn query_mapped_entity_resolves_to_a_sql_query() {
    let mut model = Model::new();
    let summary = model.add_entity_type("OrderSummary").unwrap();
    {
        let entity = model.entity_type_mut(summary).unwrap();
        entity
            .set_sql_query("SELECT [Id], [Total] FROM [Orders]")
            .unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity
            .add_property(property("Total", ClrType::Decimal))
            .unwrap();
    }

    let relational = resolve(&model);
    let query = relational.find_query("OrderSummary").unwrap();
    assert_eq!(query.sql, "SELECT [Id], [Total] FROM [Orders]");
    assert_eq!(query.columns.len(), 2);
}

#[test]
fn default_schema_applies_to_unqualified_tables() {
    let mut model = Model::new();
    model.set_default_schema("sales");
    let order = model.add_entity_type("Order").unwrap();
    {
        let entity = model.entity_type_mut(order).unwrap();
        entity.add_property(property("Id", ClrType::Int32)).unwrap();
        entity.set_primary_key(vec!["Id".to_string()]).unwrap();
    }

    let relational = resolve(&model);
    assert!(relational.find_table("Order", Some("sales")).is_some());
    assert!(relational.find_table("Order", None).is_none());
}

#[test]
fn explicit_column_name_and_override_take_precedence() {
    let mut model = split_order_model();
    let order = model.find_entity_type("Order").unwrap();
    {
        let entity = model.entity_type_mut(order).unwrap();
        entity
            .find_declared_property_mut("CustomerName")
            .unwrap()
            .set_column_name("Customer", ConfigurationSource::Explicit);
        let details_table = StoreObjectIdentifier::table("OrderDetails", None).unwrap();
        entity
            .find_declared_property_mut("Details")
            .unwrap()
            .get_or_create_overrides(details_table)
            .set_column_name("Blob", ConfigurationSource::Explicit);
    }

    let relational = resolve(&model);
    let orders = relational.find_table("Orders", None).unwrap();
    assert!(orders.find_column("Customer").is_some());
    let details = relational.find_table("OrderDetails", None).unwrap();
    assert!(details.find_column("Blob").is_some());
    assert!(details.find_column("Details").is_none());
}

#[test]
fn resolution_is_deterministic() {
    let model = animal_hierarchy();
    assert_eq!(resolve(&model), resolve(&model));

    let split = split_order_model();
    assert_eq!(resolve(&split), resolve(&split));
}

#[test]
fn find_column_mapping_honors_inheritance() {
    let model = animal_hierarchy();
    let relational = resolve(&model);
    let table = relational.find_table("Animals", None).unwrap();

    // Name is declared on Animal but reachable through Dog.
    let (column, mapping) = relational
        .find_column_mapping(table, "Dog", "Name")
        .unwrap();
    assert_eq!(column.name, "Name");
    assert_eq!(mapping.entity_type, "Animal");
    assert!(relational.find_column_mapping(table, "Animal", "Breed").is_none());

    // The column-side lookup applies the same ancestry rule.
    let ancestry = ["Dog".to_string(), "Animal".to_string()];
    let mapping = column.find_property_mapping("Name", &ancestry).unwrap();
    assert_eq!(mapping.entity_type, "Animal");
    assert!(column.find_property_mapping("Breed", &ancestry).is_none());
}

#[test]
fn excluded_from_migrations_requires_every_mapping_to_opt_out() {
    let mut model = shared_table_model(ClrType::String, false);
    let order = model.find_entity_type("Order").unwrap();
    model.entity_type_mut(order).unwrap().is_excluded_from_migrations = true;
    let relational = resolve(&model);
    assert!(!relational.find_table("Shared", None).unwrap().is_excluded_from_migrations);

    let invoice = model.find_entity_type("Invoice").unwrap();
    model.entity_type_mut(invoice).unwrap().is_excluded_from_migrations = true;
    let relational = resolve(&model);
    assert!(relational.find_table("Shared", None).unwrap().is_excluded_from_migrations);
}
