//! `$N` / `${N}` placeholder substitution.

use super::Observation;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{?(\d+)\}?(?:\.output)?").expect("placeholder pattern is valid")
});

/// Indices referenced anywhere in `text`.
pub fn placeholder_indices(text: &str) -> BTreeSet<u32> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Substitute observed results into one argument value.
///
/// References to indices without an observation are left as written.
/// Lists resolve element-wise; other non-string values become their
/// string form.
pub fn resolve_arg(value: &Value, observations: &BTreeMap<u32, Observation>) -> Value {
    match value {
        Value::String(text) => Value::String(resolve_text(text, observations)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_arg(item, observations))
                .collect(),
        ),
        other => Value::String(other.to_string()),
    }
}

pub fn resolve_args(
    args: &Map<String, Value>,
    observations: &BTreeMap<u32, Observation>,
) -> Map<String, Value> {
    args.iter()
        .map(|(key, value)| (key.clone(), resolve_arg(value, observations)))
        .collect()
}

fn resolve_text(text: &str, observations: &BTreeMap<u32, Observation>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(|idx| observations.get(&idx))
                .map_or_else(|| caps[0].to_string(), |obs| obs.content().to_string())
        })
        .into_owned()
}
