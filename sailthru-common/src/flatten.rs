//! Conversions between nested payloads and flat key/value pairs.
//!
//! The api server parses form and query parameters with bracket notation, so a nested payload
//! `{"vars": {"address": {"zip": 11372}}, "lists": ["a", "b"]}` travels as
//! `vars[address][zip]=11372&lists[0]=a&lists[1]=b`.

use crate::Params;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Every scalar leaf of `v`, maps first by traversal order, then sequences by index.
///
/// Keys are dropped. Scalars are returned as they are, stringification happens at signing time.
/// A scalar passed at the top level is its own single leaf.
pub fn extract_params(v: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_leaves(v, &mut out);
    out
}

fn collect_leaves<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
    match v {
        Value::Object(map) => {
            for val in map.values() {
                collect_leaves(val, out);
            }
        }
        Value::Array(arr) => {
            for val in arr {
                collect_leaves(val, out);
            }
        }
        leaf => out.push(leaf),
    }
}

/// Render a scalar the way it is sent over the wire and signed.
///
/// `null` becomes the empty string. Containers render as their json text, which only happens
/// when a caller passes one in directly.
pub fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        container => container.to_string(),
    }
}

/// Flatten `params` into bracket-keyed pairs for a query string or urlencoded form.
///
/// Top-level keys are used as is, nested keys and sequence indices are appended as `[k]`.
/// Empty maps and sequences produce no pairs.
pub fn flatten_params(params: &Params) -> BTreeMap<String, String> {
    let mut res = BTreeMap::new();
    for (k, val) in params {
        flatten_with_prefix(k, val, &mut res);
    }
    res
}

fn flatten_with_prefix(prefix: &str, v: &Value, out: &mut BTreeMap<String, String>) {
    match v {
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                flatten_with_prefix(&format!("{prefix}[{i}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (k, val) in map {
                flatten_with_prefix(&format!("{prefix}[{k}]"), val, out);
            }
        }
        scalar => {
            out.insert(prefix.to_owned(), scalar_to_string(scalar));
        }
    }
}

/// Rebuild a nested payload from bracket-keyed pairs, the inverse of [`flatten_params`].
///
/// A map whose keys are exactly `0..n` becomes a sequence. An empty segment (`tags[]=a`)
/// appends to its parent. Keys that are not well formed bracket paths are kept verbatim.
/// Values stay strings.
pub fn nest_params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut root = Map::new();
    for (k, v) in pairs {
        let segments = split_key(k.as_ref());
        insert_path(&mut root, &segments, v.into(), false);
    }

    root.into_iter()
        .map(|(k, v)| (k, into_sequences(v)))
        .collect()
}

fn split_key(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };
    if open == 0 || !key.ends_with(']') {
        return vec![key];
    }

    let mut segments = vec![&key[..open]];
    segments.extend(key[open + 1..key.len() - 1].split("]["));
    segments
}

/// `nested` is false for the top level, where an empty key is an ordinary key.
fn insert_path(map: &mut Params, segments: &[&str], value: String, nested: bool) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    let key = if nested && first.is_empty() {
        map.len().to_string()
    } else {
        (*first).to_owned()
    };

    if rest.is_empty() {
        map.insert(key, Value::String(value));
        return;
    }

    let entry = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    // a scalar seen earlier under the same path is replaced by the deeper value
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, rest, value, true);
    }
}

fn into_sequences(v: Value) -> Value {
    match v {
        Value::Object(mut map) => {
            let len = map.len();
            let is_sequence = len > 0 && (0..len).all(|i| map.contains_key(&i.to_string()));
            if is_sequence {
                Value::Array(
                    (0..len)
                        .filter_map(|i| map.remove(&i.to_string()))
                        .map(into_sequences)
                        .collect(),
                )
            } else {
                Value::Object(
                    map.into_iter()
                        .map(|(k, v)| (k, into_sequences(v)))
                        .collect(),
                )
            }
        }
        other => other,
    }
}
