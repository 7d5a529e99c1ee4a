//! Shared fixtures for the integration suite.

use rowset::{Diagnostics, Options, Rowset, Value, list, record};

/// A three-row result set keyed the way a query driver would hand it over.
pub fn people() -> Rowset {
    Rowset::new(people_raw()).unwrap()
}

pub fn people_raw() -> Value {
    list![
        record! { "id" => 1, "name" => "Ada", "team" => "compilers" },
        record! { "id" => 2, "name" => "Grace", "team" => "systems" },
        record! { "id" => 3, "name" => "Edsger", "team" => "compilers" },
    ]
}

/// Like [`people`], but with an injected diagnostics channel the test can
/// inspect.
pub fn people_with_diagnostics() -> (Rowset, Diagnostics) {
    let diagnostics = Diagnostics::new();
    let rows = Rowset::with_options(
        people_raw(),
        Options::new().diagnostics(diagnostics.clone()),
    )
    .unwrap();
    (rows, diagnostics)
}

/// A flat container of scalars.
pub fn flat() -> Rowset {
    Rowset::new(list![3, 1, 2]).unwrap()
}
