use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

/// Recursion limit shared by `clean` and `merge`.
pub const MAX_DEPTH: usize = 8;

/// Indentation used for rule-set files.
pub const RULESET_INDENT: usize = 2;
/// Indentation used for the root `karabiner.json`.
pub const CONFIG_INDENT: usize = 4;

/// Coerces a value into an array: arrays pass through, anything else is wrapped.
pub fn arr(value: Value) -> Value {
    match value {
        Value::Array(_) => value,
        other => Value::Array(vec![other]),
    }
}

/// `null`, `""`, `[]` and `{}` are empty. Numbers and booleans never are.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Recursively drops empty members and elements.
pub fn clean(value: Value) -> Value {
    clean_at(value, MAX_DEPTH)
}

fn clean_at(value: Value, depth: usize) -> Value {
    if depth == 0 {
        return value;
    }
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| clean_at(item, depth - 1))
                .filter(|item| !is_empty(item))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, clean_at(v, depth - 1)))
                .filter(|(_, v)| !is_empty(v))
                .collect(),
        ),
        other => other,
    }
}

/// Deep-merges `src` into `dst`. Objects merge key by key, arrays are
/// unioned (elements of `src` not already in `dst` are appended), anything
/// else is replaced by `src`.
pub fn merge(dst: &mut Value, src: Value) {
    merge_at(dst, src, MAX_DEPTH);
}

fn merge_at(dst: &mut Value, src: Value, depth: usize) {
    match (dst, src) {
        (Value::Object(into), Value::Object(from)) if depth > 0 => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(slot) => merge_at(slot, value, depth - 1),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(into), Value::Array(from)) => {
            for item in from {
                if !into.contains(&item) {
                    into.push(item);
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Pretty-prints with the given indent width.
pub fn to_string_indented<T: Serialize + ?Sized>(
    value: &T,
    indent: usize,
) -> Result<String, serde_json::Error> {
    let pad = " ".repeat(indent);
    let mut out = Vec::with_capacity(256);
    let formatter = PrettyFormatter::with_indent(pad.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
