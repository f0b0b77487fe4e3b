//! Base implementation of records for logging.
use crate::error::EmbenchError;
use chrono::prelude::{DateTime, Local};
use serde_json::{Map, Number, Value};
use std::{
    collections::{
        hash_map::{IntoIter, Iter, Keys},
        HashMap,
    },
    convert::Into,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A 1-dimensional array of floating-point values.
    Array1(Vec<f32>),

    /// A text value.
    String(String),
}

impl RecordValue {
    /// Boolean flags are recorded as `0.0` or `1.0`.
    pub fn flag(v: bool) -> Self {
        RecordValue::Scalar(if v { 1.0 } else { 0.0 })
    }

    /// Converts the value to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            RecordValue::Scalar(v) => scalar_to_json(*v),
            RecordValue::DateTime(v) => Value::String(v.to_rfc3339()),
            RecordValue::Array1(vs) => Value::Array(vs.iter().map(|v| scalar_to_json(*v)).collect()),
            RecordValue::String(s) => Value::String(s.clone()),
        }
    }
}

fn scalar_to_json(v: f32) -> Value {
    match Number::from_f64(v as f64) {
        Some(n) => Value::Number(n),
        None => Value::Null,
    }
}

/// A container for storing key-value pairs of various data types.
///
/// ```rust
/// use embench_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("reward", 0.0);
/// record.insert("task_success", RecordValue::flag(true));
/// assert_eq!(record.get_scalar("task_success").unwrap(), 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Creates a record from the numeric and boolean fields of a JSON object.
    ///
    /// Strings are kept as [`RecordValue::String`], arrays of numbers as
    /// [`RecordValue::Array1`]. Other values are skipped.
    pub fn from_json_object(obj: &Map<String, Value>) -> Self {
        let mut record = Self::empty();
        for (k, v) in obj.iter() {
            let value = match v {
                Value::Bool(b) => Some(RecordValue::flag(*b)),
                Value::Number(n) => n.as_f64().map(|v| RecordValue::Scalar(v as f32)),
                Value::String(s) => Some(RecordValue::String(s.clone())),
                Value::Array(vs) => vs
                    .iter()
                    .map(|v| v.as_f64().map(|v| v as f32))
                    .collect::<Option<Vec<_>>>()
                    .map(RecordValue::Array1),
                _ => None,
            };
            if let Some(value) = value {
                record.insert(k.clone(), value);
            }
        }
        record
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator that consumes the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// If both records contain the same key, the value from the second record
    /// will overwrite the value from the first record.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges another record into this one in place.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record.into_iter_in_record() {
            self.0.insert(k, v);
        }
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, EmbenchError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Scalar(v) => Ok(*v),
                _ => Err(EmbenchError::RecordValueTypeError("Scalar".to_string())),
            }
        } else {
            Err(EmbenchError::RecordKeyError(k.to_string()))
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, EmbenchError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::Array1(v) => Ok(v.clone()),
                _ => Err(EmbenchError::RecordValueTypeError("Array1".to_string())),
            }
        } else {
            Err(EmbenchError::RecordKeyError(k.to_string()))
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, EmbenchError> {
        if let Some(v) = self.0.get(k) {
            match v {
                RecordValue::String(s) => Ok(s.clone()),
                _ => Err(EmbenchError::RecordValueTypeError("String".to_string())),
            }
        } else {
            Err(EmbenchError::RecordKeyError(k.to_string()))
        }
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts the record into a JSON object with keys in sorted order.
    pub fn to_json(&self) -> Value {
        let mut keys: Vec<_> = self.0.keys().collect();
        keys.sort();
        let map: Map<String, Value> = keys
            .into_iter()
            .map(|k| (k.clone(), self.0[k].to_json()))
            .collect();
        Value::Object(map)
    }
}
