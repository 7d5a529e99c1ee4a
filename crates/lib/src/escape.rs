//! Leaf encoder collaborator: safe-for-embedding text escaping.
//!
//! Containers defer encoding to read time. When a container is in
//! [`Encoding::Safe`](crate::Encoding::Safe) mode, leaf reads pass their
//! rendered text through the configured [`Escaper`] before presenting it.
//! The stored scalar is never touched, so `Leaf::raw()` always round-trips
//! to the original value.

/// Converts rendered leaf text into a safe-for-embedding form.
///
/// Implementations must be pure: escaping the same input twice yields the
/// same output, and escaping never consults container state.
pub trait Escaper {
    /// Escapes the raw text for embedding in the output document.
    fn escape(&self, raw: &str) -> String;
}

/// The default escaper: HTML special characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEscaper;

impl Escaper for HtmlEscaper {
    fn escape(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#039;"),
                _ => out.push(c),
            }
        }
        out
    }
}
