//! Field-level change summaries between normalized before/after maps
//!
//! Used when showing update records; the log itself stores full before and
//! after maps, never diffs.

use serde_json::Value;
use std::fmt;

/// One changed top-level field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub field: String,
    /// `None` if the field only exists afterwards
    pub before: Option<Value>,
    /// `None` if the field only exists before
    pub after: Option<Value>,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: &Option<Value>, missing: &str| match v {
            Some(v) => format_value(v),
            None => missing.to_string(),
        };
        write!(
            f,
            "{}: {} -> {}",
            self.field,
            side(&self.before, "(added)"),
            side(&self.after, "(removed)")
        )
    }
}

/// List the top-level fields that differ between two maps
///
/// Non-object inputs are compared as a whole under the field name `value`.
pub fn field_changes(before: &Value, after: &Value) -> Vec<FieldChange> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        if before == after {
            return Vec::new();
        }
        return vec![FieldChange {
            field: "value".to_string(),
            before: Some(before.clone()),
            after: Some(after.clone()),
        }];
    };

    let mut changes: Vec<FieldChange> = before_obj
        .iter()
        .filter(|(key, value)| after_obj.get(*key) != Some(*value))
        .map(|(key, value)| FieldChange {
            field: key.clone(),
            before: Some(value.clone()),
            after: after_obj.get(key).cloned(),
        })
        .collect();

    changes.extend(
        after_obj
            .iter()
            .filter(|(key, _)| !before_obj.contains_key(*key))
            .map(|(key, value)| FieldChange {
                field: key.clone(),
                before: None,
                after: Some(value.clone()),
            }),
    );

    changes
}

/// Comma-separated change summary, or `None` if nothing changed
pub fn change_summary(before: &Value, after: &Value) -> Option<String> {
    let changes = field_changes(before, after);
    if changes.is_empty() {
        return None;
    }
    Some(
        changes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 50 => {
            let head: String = s.chars().take(47).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
        other => other.to_string(),
    }
}
