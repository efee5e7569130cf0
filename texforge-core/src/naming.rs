//! Output file naming from collected values.

use crate::nested;
use crate::ValueMap;

/// Fallback stem when no usable title is present.
pub const DEFAULT_STEM: &str = "document";

/// `"Homework 3: Graphs"` → `"homework_3_graphs.tex"`.
///
/// Uses the `title` value; anything that is not ASCII alphanumeric, `-` or
/// `.` becomes `_`, runs of `_` collapse, and leading/trailing `_`/`.` are
/// dropped.
pub fn derive_output_name(values: &ValueMap) -> String {
    let stem = nested::lookup(values, "title")
        .and_then(|v| v.as_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STEM.to_string());
    format!("{stem}.tex")
}

/// Lowercase, filesystem-safe form of `text`.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        let keep = c.is_ascii_alphanumeric() || c == '-' || c == '.';
        if keep {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches(|c: char| c == '_' || c == '.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn values(v: Value) -> ValueMap {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn title_is_slugified() {
        let name = derive_output_name(&values(json!({"title": "Homework 3: Graphs"})));
        assert_eq!(name, "homework_3_graphs.tex");
    }

    #[test]
    fn path_hostile_characters_are_replaced() {
        assert_eq!(slugify("../etc/passwd"), "etc_passwd");
        assert_eq!(slugify("CS 1150 / Lab #2"), "cs_1150_lab_2");
    }

    #[test]
    fn missing_or_blank_title_falls_back() {
        assert_eq!(derive_output_name(&ValueMap::new()), "document.tex");
        assert_eq!(derive_output_name(&values(json!({"title": " ?! "}))), "document.tex");
        assert_eq!(derive_output_name(&values(json!({"title": 7}))), "document.tex");
    }
}
