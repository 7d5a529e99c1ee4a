//! Raw projection and serialization tests.

use rowset::{Encoding, Options, Rowset, Value, list, record};

use crate::helpers::{people, people_raw};

#[test]
fn round_trip_law() {
    let raw = people_raw();
    let rows = Rowset::new(raw.clone()).unwrap();
    assert_eq!(rows.to_value(), raw);
}

#[test]
fn round_trip_with_mixed_keys() {
    let raw = record! {
        "title" => "report",
        "rows" => list![list![1, 2], list![3, 4]],
        "total" => 2,
    };
    let rows = Rowset::new(raw.clone()).unwrap();
    assert_eq!(rows.to_value(), raw);
}

#[test]
fn dense_integer_keys_serialize_as_arrays() {
    let rows = Rowset::new(list![1, 2, 3]).unwrap();
    assert_eq!(rows.to_json_string(), "[1,2,3]");
    assert_eq!(serde_json::to_string(&rows).unwrap(), "[1,2,3]");
}

#[test]
fn sparse_or_text_keys_serialize_as_objects() {
    let rows = Rowset::new(record! { "a" => 1 }).unwrap();
    assert_eq!(rows.to_json_string(), r#"{"a":1}"#);

    // Dropping the middle element leaves keys 0 and 2: no longer dense.
    let sparse = Rowset::new(list![10, 20, 30])
        .unwrap()
        .filter(|key, _| *key != 1i64);
    assert_eq!(sparse.to_json_string(), r#"{"0":10,"2":30}"#);
}

#[test]
fn serialization_always_uses_raw_values() {
    let rows = Rowset::with_options(
        record! { "html" => "<b>x</b>" },
        Options::new().mode(Encoding::Safe),
    )
    .unwrap();
    // The safe-for-embedding wrapper never leaks into serialization.
    assert_eq!(rows.to_json_string(), r#"{"html":"<b>x</b>"}"#);
}

#[test]
fn display_renders_the_json_form() {
    let rows = Rowset::new(list![1, "x"]).unwrap();
    assert_eq!(rows.to_string(), r#"[1,"x"]"#);
}

#[test]
fn value_tree_builds_from_json() {
    let raw = Value::from_json(r#"[{"id":1},{"id":2}]"#).unwrap();
    let rows = Rowset::new(raw).unwrap();
    assert_eq!(rows.pluck("id", None).unwrap().to_json_string(), "[1,2]");
}

#[test]
fn structural_equality_ignores_metadata() {
    let raw_mode = Rowset::new(people_raw()).unwrap();
    let safe_mode =
        Rowset::with_options(people_raw(), Options::new().mode(Encoding::Safe)).unwrap();
    assert_eq!(raw_mode, safe_mode);
    assert_ne!(raw_mode, people().filter(|_, _| false));
}
