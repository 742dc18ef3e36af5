use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const REDACTED: &str = "[redacted]";

const SENSITIVE_FIELDS: &[&str] = &["password", "password_hash", "remember_token"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub before: Value,
    pub after: Value,
}

/// Top-level fields that differ between two JSON objects, sorted by name.
/// Sensitive fields are reported with both values redacted. Anything other
/// than an object is treated as empty.
pub fn diff_fields(before: &Value, after: &Value) -> Vec<FieldChange> {
    let empty = serde_json::Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);

    let mut fields: Vec<&String> = before.keys().chain(after.keys()).collect();
    fields.sort();
    fields.dedup();

    fields
        .into_iter()
        .filter_map(|field| {
            let old = before.get(field).unwrap_or(&Value::Null);
            let new = after.get(field).unwrap_or(&Value::Null);
            if old == new {
                return None;
            }
            let change = if is_sensitive(field) {
                FieldChange {
                    field: field.clone(),
                    before: Value::String(REDACTED.to_string()),
                    after: Value::String(REDACTED.to_string()),
                }
            } else {
                FieldChange {
                    field: field.clone(),
                    before: old.clone(),
                    after: new.clone(),
                }
            };
            Some(change)
        })
        .collect()
}

fn is_sensitive(field: &str) -> bool {
    SENSITIVE_FIELDS
        .iter()
        .any(|sensitive| sensitive.eq_ignore_ascii_case(field))
}
