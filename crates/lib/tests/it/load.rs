//! Lazy relation loader contract tests.

use std::rc::Rc;

use rowset::{
    Annotations, Encoding, Error, LoadHandler, LoadReply, Options, Rowset, Value, list, record,
};

fn team_loader() -> LoadHandler {
    Rc::new(|record: &Rowset, column: &str| match column {
        "team" => {
            let team = record.read("team").raw();
            let mut annotations = Annotations::new();
            annotations.insert("relation".to_string(), Value::Text("team".to_string()));
            LoadReply::Loaded {
                data: record! { "name" => team, "size" => 7 },
                annotations,
            }
        }
        _ => LoadReply::Unavailable,
    })
}

fn person(options: Options) -> Rowset {
    Rowset::with_options(
        record! { "id" => 1, "name" => "Ada", "team" => "compilers" },
        options,
    )
    .unwrap()
}

#[test]
fn load_builds_a_related_container() {
    let record = person(Options::new().load_handler(team_loader()));
    let team = record.load("team").unwrap();
    let team = team.as_rows().unwrap();
    assert_eq!(team.read("name").raw(), Value::Text("compilers".to_string()));
    assert_eq!(team.read("size").raw(), Value::Int(7));
    // Annotations are replaced by the handler's map, not merged.
    assert_eq!(
        team.annotations().get("relation"),
        Some(&Value::Text("team".to_string()))
    );
}

#[test]
fn load_inherits_mode_and_handler() {
    let record = person(
        Options::new()
            .mode(Encoding::Safe)
            .load_handler(team_loader()),
    );
    let team = record.load("team").unwrap();
    let team = team.as_rows().unwrap();
    assert_eq!(team.mode(), Encoding::Safe);
    // The loaded container can itself load relations.
    assert!(team.load_handler().is_some());
}

#[test]
fn empty_container_short_circuits_to_the_sentinel() {
    let invoked = Rc::new(std::cell::Cell::new(false));
    let seen = invoked.clone();
    let handler: LoadHandler = Rc::new(move |_, _| {
        seen.set(true);
        LoadReply::Unavailable
    });
    let empty = Rowset::with_options(list![], Options::new().load_handler(handler)).unwrap();
    let loaded = empty.load("team").unwrap();
    assert!(loaded.is_missing());
    assert!(!invoked.get());
}

#[test]
fn missing_handler_is_fatal() {
    let record = person(Options::new());
    assert!(matches!(record.load("team"), Err(Error::NoHandler)));
}

#[test]
fn bad_column_names_are_rejected() {
    let record = person(Options::new().load_handler(team_loader()));
    for column in ["", "bad name", "semi;colon", "uni\u{e9}"] {
        let err = record.load(column).unwrap_err();
        assert!(err.is_invalid_argument(), "column {column:?}");
    }
    // Underscores and dashes are fine (the loader just has no entry).
    let err = record.load("team_lead-2").unwrap_err();
    assert!(matches!(err, Error::HandlerUnavailable { .. }));
}

#[test]
fn row_collections_cannot_load() {
    let rows = Rowset::with_options(
        list![record! { "id" => 1 }],
        Options::new().load_handler(team_loader()),
    )
    .unwrap();
    let err = rows.load("team").unwrap_err();
    assert!(err.is_shape_mismatch());
}

#[test]
fn unavailable_columns_are_fatal() {
    let record = person(Options::new().load_handler(team_loader()));
    let err = record.load("manager").unwrap_err();
    assert!(matches!(err, Error::HandlerUnavailable { column } if column == "manager"));
}

#[test]
fn scalar_reply_data_violates_the_contract() {
    let handler: LoadHandler = Rc::new(|_, _| LoadReply::Loaded {
        data: Value::Int(42),
        annotations: Annotations::new(),
    });
    let record = person(Options::new().load_handler(handler));
    let err = record.load("team").unwrap_err();
    assert!(matches!(err, Error::ContractViolation { .. }));
}
