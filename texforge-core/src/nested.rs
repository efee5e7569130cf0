//! Dotted-key assignment into nested mappings.
//!
//! `assign(map, "student.name", v)` writes `map["student"]["name"] = v`,
//! creating intermediate mappings on the way. Intermediate segments that
//! already hold a scalar or a list are a [`PathError::Conflict`]; exact key
//! collisions are last-write-wins.

use serde_json::{Map, Value};

use crate::error::PathError;
use crate::ValueMap;

/// Keys with this many segments or more are rejected.
pub const PATH_DEPTH_LIMIT: usize = 1000;

/// Split a dotted key into its segments, validating shape and depth.
pub fn split_path(key: &str) -> Result<Vec<&str>, PathError> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.len() >= PATH_DEPTH_LIMIT {
        return Err(PathError::TooDeep {
            depth: segments.len(),
            limit: PATH_DEPTH_LIMIT - 1,
        });
    }
    if segments.iter().any(|s| s.is_empty()) {
        return Err(PathError::EmptySegment {
            key: key.to_string(),
        });
    }
    Ok(segments)
}

/// Write `value` at the dotted `key` inside `target`.
pub fn assign(target: &mut ValueMap, key: &str, value: Value) -> Result<(), PathError> {
    let segments = split_path(key)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| PathError::EmptySegment {
            key: key.to_string(),
        })?;

    let mut current = target;
    for (i, segment) in parents.iter().enumerate() {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match slot {
            Value::Object(map) => map,
            other => {
                return Err(PathError::Conflict {
                    key: key.to_string(),
                    prefix: segments[..=i].join("."),
                    found: value_kind(other),
                })
            }
        };
    }
    current.insert((*last).to_string(), value);
    Ok(())
}

/// Fold a sequence of `(dotted_key, value)` assignments into a fresh map.
pub fn merge_assignments<I, K>(assignments: I) -> Result<ValueMap, PathError>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut out = Map::new();
    for (key, value) in assignments {
        assign(&mut out, key.as_ref(), value)?;
    }
    Ok(out)
}

/// Read the value at a dotted `key`, if every segment resolves.
pub fn lookup<'a>(map: &'a ValueMap, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let mut value = map.get(segments.next()?)?;
    for segment in segments {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

/// Top-level merge: every key of `overlay` replaces the same key of `base`.
/// Nested mappings are replaced wholesale, not merged.
pub fn shallow_merge(mut base: ValueMap, overlay: ValueMap) -> ValueMap {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}

/// Human-readable JSON type name, used in conflict messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(v: Value) -> ValueMap {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn sibling_keys_share_parent() {
        let merged = merge_assignments([("a.b", json!(1)), ("a.c", json!(2))]).unwrap();
        assert_eq!(Value::Object(merged), json!({"a": {"b": 1, "c": 2}}));
    }

    #[test]
    fn reapplying_same_assignment_is_idempotent() {
        let mut map = Map::new();
        assign(&mut map, "student.name", json!("Ada")).unwrap();
        let once = map.clone();
        assign(&mut map, "student.name", json!("Ada")).unwrap();
        assert_eq!(map, once);
    }

    #[test]
    fn last_write_wins_on_exact_collision() {
        let merged =
            merge_assignments([("course.id", json!("CS 1150")), ("course.id", json!("CS 2060"))])
                .unwrap();
        assert_eq!(Value::Object(merged), json!({"course": {"id": "CS 2060"}}));
    }

    #[test]
    fn order_of_disjoint_keys_does_not_matter() {
        let forward = merge_assignments([("x.y", json!(1)), ("z", json!(2))]).unwrap();
        let backward = merge_assignments([("z", json!(2)), ("x.y", json!(1))]).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn scalar_intermediate_is_a_conflict() {
        let mut map = as_map(json!({"a": 5}));
        let err = assign(&mut map, "a.b", json!(1)).unwrap_err();
        assert_eq!(
            err,
            PathError::Conflict {
                key: "a.b".into(),
                prefix: "a".into(),
                found: "number",
            }
        );
        // Failed assignment leaves the map untouched.
        assert_eq!(Value::Object(map), json!({"a": 5}));
    }

    #[test]
    fn conflict_reports_deepest_prefix() {
        let mut map = as_map(json!({"a": {"b": ["x"]}}));
        let err = assign(&mut map, "a.b.c", json!(true)).unwrap_err();
        assert!(matches!(err, PathError::Conflict { ref prefix, found: "list", .. } if prefix == "a.b"));
    }

    #[test]
    fn writing_a_scalar_over_a_mapping_replaces_it() {
        let mut map = as_map(json!({"a": {"b": 1}}));
        assign(&mut map, "a", json!("flat")).unwrap();
        assert_eq!(Value::Object(map), json!({"a": "flat"}));
    }

    #[test]
    fn empty_segments_are_rejected() {
        for key in ["", "a..b", ".a", "a."] {
            let mut map = Map::new();
            let err = assign(&mut map, key, json!(1)).unwrap_err();
            assert!(matches!(err, PathError::EmptySegment { .. }), "key {key:?}");
        }
    }

    #[test]
    fn pathological_depth_is_rejected() {
        let key = vec!["k"; PATH_DEPTH_LIMIT].join(".");
        let mut map = Map::new();
        let err = assign(&mut map, &key, json!(1)).unwrap_err();
        assert!(matches!(err, PathError::TooDeep { depth, .. } if depth == PATH_DEPTH_LIMIT));
    }

    #[test]
    fn depth_just_below_limit_is_accepted() {
        let key = vec!["k"; PATH_DEPTH_LIMIT - 1].join(".");
        let mut map = Map::new();
        assign(&mut map, &key, json!(1)).unwrap();
        assert_eq!(lookup(&map, &key), Some(&json!(1)));
    }

    #[test]
    fn lookup_follows_dotted_path() {
        let map = as_map(json!({"student": {"name": "Ada", "id": 7}}));
        assert_eq!(lookup(&map, "student.id"), Some(&json!(7)));
        assert_eq!(lookup(&map, "student.email"), None);
        assert_eq!(lookup(&map, "student.name.first"), None);
    }

    #[test]
    fn shallow_merge_replaces_nested_maps_wholesale() {
        let base = as_map(json!({"course": {"id": "CS 1150", "term": "Fall"}, "title": "HW"}));
        let overlay = as_map(json!({"course": {"id": "CS 2060"}}));
        let merged = shallow_merge(base, overlay);
        assert_eq!(
            Value::Object(merged),
            json!({"course": {"id": "CS 2060"}, "title": "HW"})
        );
    }
}
