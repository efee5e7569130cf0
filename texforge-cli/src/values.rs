//! Template values from files and `--set key=value` pairs.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use texforge_core::{nested, ValueMap};

/// Read a `.yaml`, `.yml` or `.json` file holding a top-level mapping.
pub fn load_values_file(path: &Path) -> Result<ValueMap> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read values file '{}'", path.display()))?;

    let value: Value = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in '{}'", path.display()))?,
        "json" => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in '{}'", path.display()))?,
        _ => bail!(
            "values file '{}' must be YAML (.yaml, .yml) or JSON (.json)",
            path.display()
        ),
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ValueMap::new()),
        other => bail!(
            "values file '{}' must contain a mapping, found {}",
            path.display(),
            nested::value_kind(&other)
        ),
    }
}

/// Split `key=value`; the value is read as a YAML scalar, so `3` is a
/// number and `true` a boolean. An empty value is the empty string.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("missing key in '{raw}'");
    }
    let value = if value.trim().is_empty() {
        Value::String(value.to_string())
    } else {
        serde_yaml::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
    };
    Ok((key.to_string(), value))
}

/// Apply `--set` pairs on top of `values` at their dotted paths.
pub fn apply_assignments(values: &mut ValueMap, assignments: &[String]) -> Result<()> {
    for raw in assignments {
        let (key, value) = parse_assignment(raw)?;
        nested::assign(values, &key, value)
            .with_context(|| format!("cannot apply --set {raw}"))?;
    }
    Ok(())
}
