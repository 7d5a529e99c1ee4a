//! Missing-element delegation tests: the sentinel is permanently empty
//! and fully chainable.

use rowset::{Element, Encoding, Options, Rowset, Sort, Value, list, record};

use crate::helpers::people;

#[test]
fn missing_key_yields_the_sentinel() {
    let rows = people();
    let missing = rows.read("no_such_key");
    assert!(missing.is_missing());
    assert_eq!(missing.raw(), Value::Null);
    assert_eq!(missing.render(), "");
}

#[test]
fn sentinel_chains_through_accessors() {
    let rows = people();
    let deep = rows.read("a").read("b").nth(7).read("c");
    assert!(deep.is_missing());
}

#[test]
fn sentinel_chains_through_transformations() {
    let rows = people();
    let result = rows.read("absent").pluck("name", None).unwrap();
    assert!(result.is_empty());

    let result = rows.read("absent").group_by("team").unwrap();
    assert!(result.is_empty());

    let result = rows.read("absent").sort(Sort::Regular).unwrap();
    assert!(result.is_empty());
}

#[test]
fn sentinel_counts_and_existence() {
    let rows = people();
    let missing = rows.read("absent");
    assert_eq!(missing.len(), 0);
    assert!(missing.is_empty());
    assert!(!missing.contains_key("anything"));
}

#[test]
fn sentinel_carries_the_producing_bag() {
    let rows = Rowset::with_options(
        record! { "a" => 1 },
        Options::new().mode(Encoding::Safe),
    )
    .unwrap();
    let missing = rows.read("absent");
    let empty = missing.rows();
    assert_eq!(empty.mode(), Encoding::Safe);
    assert!(empty.is_empty());
    assert!(empty.ancestor().ptr_eq(&rows));
}

#[test]
fn nth_resolves_negative_indices_and_misses_safely() {
    let rows = Rowset::new(list![10, 20, 30]).unwrap();
    assert_eq!(rows.nth(-1).raw(), Value::Int(30));
    assert_eq!(rows.nth(-3).raw(), Value::Int(10));
    assert!(rows.nth(3).is_missing());
    assert!(rows.nth(-4).is_missing());
}

#[test]
fn get_with_passes_wrapped_defaults_through() {
    let rows = people();
    let fallback = Rowset::new(list![record! { "id" => 99 }]).unwrap();
    let got = rows.get_with("absent", Element::Rows(fallback.clone()));
    assert!(got.as_rows().unwrap().ptr_eq(&fallback));

    // A present key ignores the default.
    let got = rows.get_with(0, Element::Rows(fallback));
    assert_eq!(got.read("id").raw(), Value::Int(1));
}

#[test]
fn leaf_elements_degrade_like_empty_containers() {
    let rows = Rowset::new(list![1, 2]).unwrap();
    let leaf = rows.read(0);
    assert!(leaf.read("x").is_missing());
    assert!(leaf.pluck("x", None).unwrap().is_empty());
}
