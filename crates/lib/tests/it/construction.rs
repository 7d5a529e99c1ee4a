//! Construction and recursive conversion tests.

use rowset::{Encoding, Key, Options, Rowset, Value, list, record};

use crate::helpers::people;

#[test]
fn scalars_store_as_is() {
    let rows = Rowset::new(list![1, "two", 3.5, true, Value::Null]).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.read(0).raw(), Value::Int(1));
    assert_eq!(rows.read(1).raw(), Value::Text("two".to_string()));
    assert_eq!(rows.read(2).raw(), Value::Float(3.5));
    assert_eq!(rows.read(3).raw(), Value::Bool(true));
    assert_eq!(rows.read(4).raw(), Value::Null);
}

#[test]
fn nested_structures_become_child_containers() {
    let rows = people();
    let first = rows.read(0);
    assert!(first.is_rows());
    let first = first.as_rows().unwrap();
    assert_eq!(first.read("name").raw(), Value::Text("Ada".to_string()));
}

#[test]
fn record_input_preserves_insertion_order() {
    let rows = Rowset::new(record! { "z" => 1, "a" => 2, "m" => 3 }).unwrap();
    let keys: Vec<String> = rows.keys_iter().map(Key::to_string).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn positions_reflect_the_construction_pass() {
    let rows = people();
    let first = rows.first();
    let first = first.as_rows().unwrap();
    assert!(first.is_first());
    assert!(!first.is_last());
    assert_eq!(first.position().unwrap().ordinal, 1);

    let last = rows.last();
    let last = last.as_rows().unwrap();
    assert!(last.is_last());
    assert_eq!(last.position().unwrap().ordinal, 3);
}

#[test]
fn positions_survive_reuse_elsewhere() {
    // Position reflects the pass that placed the child; later operations on
    // the parent never recompute it.
    let rows = people();
    let second = rows.read(1);
    let second = second.as_rows().unwrap().clone();
    let _shrunk = rows.filter(|_, _| false);
    assert_eq!(second.position().unwrap().ordinal, 2);
}

#[test]
fn top_level_scalar_fails() {
    let err = Rowset::new(Value::Text("not a table".to_string())).unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn options_set_the_initial_bag() {
    let mut annotations = rowset::Annotations::new();
    annotations.insert("source".to_string(), Value::Text("users".to_string()));
    let rows = Rowset::with_options(
        list![1],
        Options::new()
            .mode(Encoding::Safe)
            .annotations(annotations),
    )
    .unwrap();
    assert_eq!(rows.mode(), Encoding::Safe);
    assert_eq!(
        rows.annotations().get("source"),
        Some(&Value::Text("users".to_string()))
    );
}

#[test]
fn annotations_inherit_verbatim_through_transformations() {
    let mut annotations = rowset::Annotations::new();
    annotations.insert("page".to_string(), Value::Int(4));
    let rows = Rowset::with_options(
        crate::helpers::people_raw(),
        Options::new().annotations(annotations),
    )
    .unwrap();

    let derived = rows
        .rows_where_eq("team", "compilers")
        .unwrap()
        .pluck("name", None)
        .unwrap();
    assert_eq!(derived.annotations().get("page"), Some(&Value::Int(4)));
}

#[test]
fn ancestor_is_stable_across_transformation_chains() {
    let rows = people();
    let derived = rows
        .sort_by("name", rowset::Sort::Regular)
        .unwrap()
        .group_by("team")
        .unwrap();
    assert!(derived.ancestor().ptr_eq(&rows));
}
