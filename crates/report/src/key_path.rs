//! Dot-path access into untyped rows.
//!
//! A key path such as `device.id` walks object members by name; a numeric
//! segment also indexes into arrays (`zoneTypes.0`). Anything that cannot be
//! walked yields `None` instead of failing, and a JSON `null` at the end of
//! the path counts as absent too.

use serde_json::Value;

/// Resolve `path` inside `row`.
pub fn resolve_path<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = row;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    (!current.is_null()).then_some(current)
}
