//! Record storage and aggregation implementation.
use super::{Record, RecordValue};
use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3Builder;

/// A storage system for records with aggregation capabilities.
///
/// Scalar values are aggregated with statistical measures, while other types
/// of values keep their most recent occurrence.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().cloned().fold(f32::INFINITY, f32::min))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().cloned().fold(f32::NEG_INFINITY, f32::max))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates a new empty record storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record in the storage.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get_keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    /// Scalar values of `key`, in storing order. Values of another type are skipped.
    fn scalars(&self, key: &str) -> Vec<f32> {
        self.data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    /// Aggregates all stored records and clears the storage.
    ///
    /// A scalar key seen once is kept as is. A scalar key seen several times
    /// yields `<key>_min`, `<key>_max`, `<key>_mean` and `<key>_median`.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.get_keys().iter() {
            let vs = self.scalars(key);
            match vs.len() {
                0 => {
                    if let Some(value) = self.latest(key) {
                        record.insert(key.clone(), value.clone());
                    }
                }
                1 => record.insert(key.clone(), RecordValue::Scalar(vs[0])),
                _ => {
                    record.insert(format!("{}_min", key), min(&vs));
                    record.insert(format!("{}_max", key), max(&vs));
                    record.insert(format!("{}_mean", key), mean(&vs));
                    record.insert(format!("{}_median", key), median(vs));
                }
            }
        }

        self.data = vec![];

        record
    }

    /// Mean of every scalar key over the records holding it, keeping key names.
    ///
    /// Non-scalar values are ignored. The storage is left untouched.
    pub fn mean(&self) -> Record {
        let mut record = Record::empty();
        for key in self.get_keys().iter() {
            let vs = self.scalars(key);
            if !vs.is_empty() {
                record.insert(key.clone(), mean(&vs));
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_slice(&[
            ("x", RecordValue::Scalar(1.0)),
            ("name", RecordValue::String("a".to_string())),
        ]));
        storage.store(Record::from_scalar("x", 3.0));
        storage.store(Record::from_slice(&[
            ("x", RecordValue::Scalar(2.0)),
            ("y", RecordValue::Scalar(5.0)),
            ("name", RecordValue::String("b".to_string())),
        ]));

        let record = storage.aggregate();
        assert_eq!(record.get_scalar("x_min").unwrap(), 1.0);
        assert_eq!(record.get_scalar("x_max").unwrap(), 3.0);
        assert_eq!(record.get_scalar("x_mean").unwrap(), 2.0);
        assert_eq!(record.get_scalar("x_median").unwrap(), 2.0);
        assert_eq!(record.get_scalar("y").unwrap(), 5.0);
        assert_eq!(record.get_string("name").unwrap(), "b");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_mean() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_scalar("task_success", 1.0));
        storage.store(Record::from_scalar("task_success", 0.0));
        storage.store(Record::from_slice(&[
            ("task_success", RecordValue::Scalar(0.0)),
            ("instruction", RecordValue::String("x".to_string())),
        ]));
        let record = storage.mean();
        assert!((record.get_scalar("task_success").unwrap() - 1.0 / 3.0).abs() < 1e-6);
        assert!(record.get("instruction").is_none());
        assert_eq!(storage.len(), 3);
    }
}
