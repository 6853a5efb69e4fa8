use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// The plain form of a [`Value`]: scalars as themselves, arrays as vectors and
/// dictionaries as ordered maps. Datetimes serialize as RFC 3339 text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Plain {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Array(Vec<Plain>),
    Object(BTreeMap<String, Plain>),
}

pub(crate) fn to_plain(value: &Value) -> Plain {
    match value {
        Value::String(s) => Plain::String(s.clone()),
        Value::Integer(n) => Plain::Integer(*n),
        Value::Float(f) => Plain::Float(*f),
        Value::Boolean(b) => Plain::Boolean(*b),
        Value::DateTime(dt) => Plain::DateTime(*dt),
        Value::Array(items) => Plain::Array(items.iter().map(to_plain).collect()),
        Value::Dictionary(dict) => Plain::Object(
            dict.iter()
                .map(|(key, value)| (key.clone(), to_plain(value)))
                .collect(),
        ),
    }
}
