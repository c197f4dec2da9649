//! Captured field values and their normalization for the audit log
//!
//! A [`Snapshot`] is the field-name-to-value mapping of one entity at one
//! point in time. Before a snapshot is written to the log it is normalized
//! into plain JSON: fixed-point [`Money`] amounts become floats (decimal
//! exactness is not preserved in the log), dates become ISO-8601 strings,
//! sequences and mappings are normalized element by element.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

use crate::models::Money;

/// A single captured field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Decimal(Money),
    Date(NaiveDate),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<Money> for FieldValue {
    fn from(v: Money) -> Self {
        FieldValue::Decimal(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        FieldValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// Field state of an entity captured at one point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    fields: BTreeMap<String, FieldValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}

impl From<Snapshot> for FieldValue {
    fn from(snapshot: Snapshot) -> Self {
        FieldValue::Map(snapshot.fields)
    }
}

/// Normalize a captured value into a log-safe JSON value
pub fn normalize(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(i) => Value::from(*i),
        FieldValue::Text(s) => Value::String(s.clone()),
        // Always finite for i64 cents; from_f64 only rejects NaN and infinities
        FieldValue::Decimal(m) => Number::from_f64(m.to_f64())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        FieldValue::List(items) => Value::Array(items.iter().map(normalize).collect()),
        FieldValue::Map(entries) => Value::Object(normalize_entries(entries.iter())),
    }
}

/// Normalize every field of a snapshot into a JSON object
pub fn normalize_fields(snapshot: &Snapshot) -> Value {
    Value::Object(normalize_entries(snapshot.iter()))
}

/// Normalize a whole snapshot; a missing snapshot stays missing
pub fn normalize_snapshot(snapshot: Option<&Snapshot>) -> Option<Value> {
    snapshot.map(normalize_fields)
}

fn normalize_entries<'a>(
    entries: impl Iterator<Item = (&'a String, &'a FieldValue)>,
) -> Map<String, Value> {
    entries
        .map(|(key, value)| (key.clone(), normalize(value)))
        .collect()
}
