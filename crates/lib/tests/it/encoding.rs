//! Leaf read and encoding-mode tests.

use std::rc::Rc;

use rowset::{Encoding, Escaper, Options, Rowset, Value, list, record};

fn safe(raw: Value) -> Rowset {
    Rowset::with_options(raw, Options::new().mode(Encoding::Safe)).unwrap()
}

#[test]
fn raw_mode_leaves_text_untouched() {
    let rows = Rowset::new(record! { "title" => "<b>bold</b>" }).unwrap();
    assert_eq!(rows.read("title").render(), "<b>bold</b>");
}

#[test]
fn safe_mode_escapes_on_read() {
    let rows = safe(record! { "title" => "<b>bold</b>" });
    assert_eq!(rows.read("title").render(), "&lt;b&gt;bold&lt;/b&gt;");
}

#[test]
fn stored_scalar_is_never_touched() {
    let rows = safe(record! { "title" => "a & b" });
    let element = rows.read("title");
    let leaf = element.as_leaf().unwrap();
    // Round-trip law: raw() of the encoded form equals the original.
    assert_eq!(leaf.raw(), &Value::Text("a & b".to_string()));
    assert_eq!(leaf.render(), "a &amp; b");
}

#[test]
fn read_as_overrides_the_container_mode() {
    let rows = safe(record! { "title" => "a & b" });
    assert_eq!(rows.read_as("title", Encoding::Raw).render(), "a & b");

    let raw_rows = Rowset::new(record! { "title" => "a & b" }).unwrap();
    assert_eq!(
        raw_rows.read_as("title", Encoding::Safe).render(),
        "a &amp; b"
    );
}

#[test]
fn nested_containers_are_returned_unchanged() {
    let rows = safe(list![record! { "id" => 1 }]);
    let child = rows.read(0);
    let child = child.as_rows().unwrap();
    // The child keeps its own (inherited) mode; no re-encoding happens.
    assert_eq!(child.mode(), Encoding::Safe);
    assert_eq!(child.to_value(), record! { "id" => 1 });
}

#[test]
fn null_and_bool_render_forms() {
    let rows = safe(list![Value::Null, true, false]);
    assert_eq!(rows.read(0).render(), "");
    assert_eq!(rows.read(1).render(), "1");
    assert_eq!(rows.read(2).render(), "");
}

#[test]
fn each_visits_encoded_views() {
    let rows = safe(record! { "a" => "<x>", "b" => "y" });
    let mut seen = Vec::new();
    let returned = rows.each(|key, element| seen.push(format!("{key}={element}")));
    assert_eq!(seen, vec!["a=&lt;x&gt;", "b=y"]);
    // each returns the receiver, not a copy.
    assert!(returned.ptr_eq(&rows));
}

struct Upper;

impl Escaper for Upper {
    fn escape(&self, raw: &str) -> String {
        raw.to_uppercase()
    }
}

#[test]
fn custom_escaper_collaborator() {
    let rows = Rowset::with_options(
        record! { "name" => "ada" },
        Options::new().mode(Encoding::Safe).escaper(Rc::new(Upper)),
    )
    .unwrap();
    assert_eq!(rows.read("name").render(), "ADA");
}

#[test]
fn get_coerces_scalar_defaults_through_the_encoder() {
    let rows = safe(record! { "present" => 1 });
    let defaulted = rows.get("absent", "<default>");
    assert_eq!(defaulted.render(), "&lt;default&gt;");
    assert_eq!(defaulted.raw(), Value::Text("<default>".to_string()));
}
