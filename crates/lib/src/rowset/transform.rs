//! Transformation operations over containers.
//!
//! Every operation reads the receiver's raw projection, computes a new raw
//! structure, and rebuilds a fresh container with the metadata bag copied
//! forward; the receiver is never mutated. Child positions are recomputed
//! by the new construction pass, the ancestor reference is forwarded.
//!
//! Structural preconditions are enforced up front: flat-only operations
//! (`sort`, `unique`, `implode`, `sprintf`) reject containers holding
//! nested rows, nested-only operations (`sort_by`, `index_by`, `group_by`,
//! `pluck`, `pluck_nth`) reject containers holding only flat values. An
//! empty container satisfies both, which keeps sentinel delegation to an
//! empty container error-free.

use crate::{
    Error, Key, Result, Sort, Value,
    diagnostics::DiagnosticKind,
};

use super::{Element, Encoding, Rowset};

impl Rowset {
    fn require_flat(&self, operation: &'static str) -> Result<()> {
        if self.has_nested() {
            return Err(Error::ShapeMismatch {
                operation,
                reason: "operates on flat values, but the container holds nested rows"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn require_nested(&self, operation: &'static str) -> Result<()> {
        if !self.is_empty() && !self.has_nested() {
            return Err(Error::ShapeMismatch {
                operation,
                reason: "operates on nested rows, but the container holds only flat values"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Keeps the entries for which the predicate holds, preserving keys.
    pub fn filter<F>(&self, mut predicate: F) -> Rowset
    where
        F: FnMut(&Key, &Value) -> bool,
    {
        let kept: Vec<(Key, Value)> = self
            .raw_entries()
            .into_iter()
            .filter(|(key, value)| predicate(key, value))
            .collect();
        self.rebuild(Value::Record(kept))
    }

    /// Drops elements already seen under loose equality; the first
    /// occurrence wins and surviving keys are preserved, not renumbered.
    pub fn unique(&self) -> Result<Rowset> {
        self.require_flat("unique")?;
        let mut kept: Vec<(Key, Value)> = Vec::with_capacity(self.len());
        for (key, value) in self.raw_entries() {
            if !kept.iter().any(|(_, seen)| seen.loose_eq(&value)) {
                kept.push((key, value));
            }
        }
        Ok(self.rebuild(Value::Record(kept)))
    }

    /// Sorts flat values ascending under the comparison flag. Keys are
    /// renumbered densely; callers must not depend on the order of equal
    /// elements.
    pub fn sort(&self, flag: Sort) -> Result<Rowset> {
        self.require_flat("sort")?;
        let mut values: Vec<Value> = self
            .raw_entries()
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        values.sort_by(|a, b| a.compare(b, flag));
        Ok(self.rebuild(Value::List(values)))
    }

    /// Sorts rows ascending by the extracted column, reordering the full
    /// row set in lockstep. A row missing the column sorts as null and
    /// reports a `MissingColumn` diagnostic.
    pub fn sort_by(&self, column: &str, flag: Sort) -> Result<Rowset> {
        self.require_nested("sort_by")?;
        let mut keyed: Vec<(Value, Value)> = self
            .raw_entries()
            .into_iter()
            .map(|(_, row)| {
                let sort_key = match row.get_column(column) {
                    Some(value) => value.clone(),
                    None => {
                        self.report(DiagnosticKind::MissingColumn, column, "sort_by");
                        Value::Null
                    }
                };
                (sort_key, row)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| a.compare(b, flag));
        Ok(self.rebuild(Value::List(
            keyed.into_iter().map(|(_, row)| row).collect(),
        )))
    }

    /// Keeps the array-shaped rows matching every `{column: value}`
    /// condition under loose equality; non-array elements are skipped.
    ///
    /// `conditions` must be a record. Passing a list is the classic
    /// mistake of writing `[column, value]` instead of `{column: value}`
    /// and fails with [`Error::InvalidArgument`].
    pub fn rows_where(&self, conditions: Value) -> Result<Rowset> {
        let conditions: Vec<(String, Value)> = match conditions {
            Value::Record(entries) => entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            Value::List(_) => {
                return Err(Error::InvalidArgument {
                    reason: "conditions must be a {column: value} record, not a list"
                        .to_string(),
                });
            }
            other => {
                return Err(Error::InvalidArgument {
                    reason: format!(
                        "conditions must be a {{column: value}} record, got {}",
                        other.type_name()
                    ),
                });
            }
        };

        let kept: Vec<(Key, Value)> = self
            .raw_entries()
            .into_iter()
            .filter(|(_, row)| {
                row.is_array_shaped()
                    && conditions.iter().all(|(column, wanted)| {
                        row.get_column(column)
                            .map(|found| found.loose_eq(wanted))
                            .unwrap_or(false)
                    })
            })
            .collect();
        Ok(self.rebuild(Value::Record(kept)))
    }

    /// Two-argument shorthand for a single-condition [`Rowset::rows_where`].
    pub fn rows_where_eq(&self, column: &str, value: impl Into<Value>) -> Result<Rowset> {
        self.rows_where(Value::Record(vec![(Key::from(column), value.into())]))
    }

    /// A new container of this container's keys, as values.
    pub fn keys(&self) -> Rowset {
        let keys: Vec<Value> = self.keys_iter().map(Key::to_value).collect();
        self.rebuild(Value::List(keys))
    }

    /// A new container of this container's values, renumbered densely.
    pub fn values(&self) -> Rowset {
        self.rebuild(Value::List(self.raw_values()))
    }

    /// Maps each row to its value under `column`: column value → entire
    /// row. Duplicate column values overwrite, last row wins. Rows missing
    /// the column (or with an unkeyable value) are skipped with a
    /// diagnostic.
    pub fn index_by(&self, column: &str) -> Result<Rowset> {
        self.require_nested("index_by")?;
        let mut out: Vec<(Key, Value)> = Vec::with_capacity(self.len());
        for (_, row) in self.raw_entries() {
            if !row.is_array_shaped() {
                continue;
            }
            let Some(key) = row.get_column(column).and_then(Key::from_scalar) else {
                self.report(DiagnosticKind::MissingColumn, column, "index_by");
                continue;
            };
            match out.iter().position(|(existing, _)| *existing == key) {
                Some(at) => out[at] = (key, row),
                None => out.push((key, row)),
            }
        }
        Ok(self.rebuild(Value::Record(out)))
    }

    /// Maps each value of `column` to the list of all rows sharing it,
    /// preserving row order within each group.
    pub fn group_by(&self, column: &str) -> Result<Rowset> {
        self.require_nested("group_by")?;
        let mut groups: Vec<(Key, Vec<Value>)> = Vec::new();
        for (_, row) in self.raw_entries() {
            if !row.is_array_shaped() {
                continue;
            }
            let Some(key) = row.get_column(column).and_then(Key::from_scalar) else {
                self.report(DiagnosticKind::MissingColumn, column, "group_by");
                continue;
            };
            match groups.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((key, vec![row])),
            }
        }
        let entries: Vec<(Key, Value)> = groups
            .into_iter()
            .map(|(key, rows)| (key, Value::List(rows)))
            .collect();
        Ok(self.rebuild(Value::Record(entries)))
    }

    /// Extracts one column from each row. Without a key column the result
    /// is renumbered densely; with one, results are keyed by it and
    /// duplicates overwrite (last wins). Rows missing the value column are
    /// skipped with a diagnostic.
    pub fn pluck(&self, value_column: &str, key_column: Option<&str>) -> Result<Rowset> {
        self.require_nested("pluck")?;
        let mut out: Vec<(Key, Value)> = Vec::with_capacity(self.len());
        let mut next = 0i64;
        for (_, row) in self.raw_entries() {
            if !row.is_array_shaped() {
                continue;
            }
            let Some(value) = row.get_column(value_column).cloned() else {
                self.report(DiagnosticKind::MissingColumn, value_column, "pluck");
                continue;
            };
            let key = match key_column {
                Some(key_column) => {
                    match row.get_column(key_column).and_then(Key::from_scalar) {
                        Some(key) => key,
                        None => {
                            self.report(DiagnosticKind::MissingColumn, key_column, "pluck");
                            continue;
                        }
                    }
                }
                None => {
                    let key = Key::Int(next);
                    next += 1;
                    key
                }
            };
            match out.iter().position(|(existing, _)| *existing == key) {
                Some(at) => out[at] = (key, value),
                None => out.push((key, value)),
            }
        }
        Ok(self.rebuild(Value::Record(out)))
    }

    /// Extracts one field from each row by positional index within the
    /// row, ignoring key names. Negative indices count from the end of
    /// each row; rows shorter than the resolved index are skipped.
    pub fn pluck_nth(&self, index: i64) -> Result<Rowset> {
        self.require_nested("pluck_nth")?;
        let mut out: Vec<Value> = Vec::with_capacity(self.len());
        for (_, row) in self.raw_entries() {
            let fields: Vec<Value> = match row {
                Value::List(items) => items,
                Value::Record(entries) => {
                    entries.into_iter().map(|(_, value)| value).collect()
                }
                _ => continue,
            };
            let len = fields.len() as i64;
            let resolved = if index < 0 { len + index } else { index };
            if (0..len).contains(&resolved) {
                out.push(fields[resolved as usize].clone());
            }
        }
        Ok(self.rebuild(Value::List(out)))
    }

    /// Convenience for `pluck(name, None)`.
    pub fn column(&self, name: &str) -> Result<Rowset> {
        self.pluck(name, None)
    }

    /// Maps each raw value through the callback; results are validated
    /// like construction input.
    pub fn map<F>(&self, mut f: F) -> Result<Rowset>
    where
        F: FnMut(&Key, Value) -> Value,
    {
        let mapped: Vec<(Key, Value)> = self
            .raw_entries()
            .into_iter()
            .map(|(key, value)| {
                let mapped = f(&key, value);
                (key, mapped)
            })
            .collect();
        self.derived_from(Value::Record(mapped))
    }

    /// Visits each element as its encoded view, for side effects only, and
    /// returns the receiver unchanged to support chaining.
    pub fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&Key, Element),
    {
        let mode = self.mode();
        for (key, slot) in &self.inner.entries {
            f(key, self.view_slot(slot, mode));
        }
        self
    }

    /// Concatenation with overwrite: integer-keyed elements are renumbered
    /// sequentially across all inputs in order, string-keyed elements from
    /// later inputs overwrite earlier ones in place, and nested structures
    /// are replaced wholesale, never deep-merged.
    pub fn merge(&self, others: &[Rowset]) -> Rowset {
        let mut out: Vec<(Key, Value)> = Vec::new();
        let mut next = 0i64;
        for source in std::iter::once(self).chain(others.iter()) {
            for (key, value) in source.raw_entries() {
                match key {
                    Key::Int(_) => {
                        out.push((Key::Int(next), value));
                        next += 1;
                    }
                    Key::Text(_) => {
                        match out.iter().position(|(existing, _)| *existing == key) {
                            Some(at) => out[at].1 = value,
                            None => out.push((key, value)),
                        }
                    }
                }
            }
        }
        self.rebuild(Value::Record(out))
    }

    /// Splits into consecutive groups of `size` elements; the last group
    /// may be shorter. A zero size is a usage error.
    pub fn chunk(&self, size: usize) -> Result<Rowset> {
        if size == 0 {
            return Err(Error::InvalidInput {
                key: "size".to_string(),
                reason: "chunk size must be positive".to_string(),
            });
        }
        let values = self.raw_values();
        let groups: Vec<Value> = values
            .chunks(size)
            .map(|group| Value::List(group.to_vec()))
            .collect();
        Ok(self.rebuild(Value::List(groups)))
    }

    /// Joins the rendered forms of flat values with the separator.
    pub fn implode(&self, separator: &str) -> Result<String> {
        self.require_flat("implode")?;
        Ok(self
            .raw_values()
            .iter()
            .map(Value::render)
            .collect::<Vec<_>>()
            .join(separator))
    }

    /// Applies a format template to every flat element.
    ///
    /// Two equivalent placeholder systems are supported: positional
    /// (`%1$s` = value, `%2$s` = key) and named aliases (`{value}`,
    /// `{key}`) which are textually rewritten into the positional form
    /// before formatting; `%%` is a literal percent sign.
    ///
    /// In safe mode the value is escaped before substitution; the key only
    /// when the container was built with `encode_keys`. The result is
    /// always constructed in raw mode, since pre-formatted output must not
    /// be re-encoded downstream.
    pub fn sprintf(&self, template: &str) -> Result<Rowset> {
        self.require_flat("sprintf")?;
        let template = template.replace("{value}", "%1$s").replace("{key}", "%2$s");
        let mut out: Vec<Value> = Vec::with_capacity(self.len());
        for (key, value) in self.raw_entries() {
            let mut value_text = value.render();
            let mut key_text = key.to_string();
            if self.mode() == Encoding::Safe {
                value_text = self.inner.meta.escaper.escape(&value_text);
                if self.inner.meta.encode_keys {
                    key_text = self.inner.meta.escaper.escape(&key_text);
                }
            }
            out.push(Value::Text(expand_template(&template, &value_text, &key_text)));
        }
        Ok(self.rebuild_with_mode(Value::List(out), Encoding::Raw))
    }

    /// Returns true if any flat element equals the needle under loose
    /// equality.
    pub fn contains(&self, needle: &Value) -> bool {
        self.inner
            .entries
            .iter()
            .any(|(_, slot)| matches!(slot, super::Slot::Leaf(value) if value.loose_eq(needle)))
    }
}

fn expand_template(template: &str, value: &str, key: &str) -> String {
    let mut out = String::with_capacity(template.len() + value.len());
    let mut rest = template;
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix("%%") {
            out.push('%');
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("%1$s") {
            out.push_str(value);
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("%2$s") {
            out.push_str(key);
            rest = stripped;
        } else if let Some(c) = rest.chars().next() {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}
