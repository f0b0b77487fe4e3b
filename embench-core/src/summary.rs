//! Summary over per-episode result files.
use crate::record::{Record, RecordStorage, RecordValue};
use anyhow::{Context, Result};
use log::{info, warn};
use std::{fs, path::Path};

/// Averages the numeric and boolean fields of the JSON files in `dir`.
///
/// Every `*.json` file of `dir` except `output_file` is read as one episode
/// result. Arrays of numbers, like per-step rewards, contribute their sum.
/// Booleans count as `0` or `1`. The averages are written to
/// `dir/output_file` together with `num_episodes`, and returned.
/// Files which cannot be parsed are skipped with a warning.
pub fn average_json_values(dir: impl AsRef<Path>, output_file: &str) -> Result<Record> {
    let dir = dir.as_ref();
    let mut paths = vec![];
    if dir.is_dir() {
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
            let path = entry?.path();
            let is_json = path.extension().map_or(false, |ext| ext == "json");
            let is_output = path.file_name().map_or(false, |name| name == output_file);
            if is_json && !is_output {
                paths.push(path);
            }
        }
    } else {
        fs::create_dir_all(dir)?;
    }
    paths.sort();

    let mut storage = RecordStorage::new();
    for path in paths.iter() {
        let value: serde_json::Value = match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|s| serde_json::from_str(&s).map_err(anyhow::Error::from))
        {
            Ok(value) => value,
            Err(e) => {
                warn!("Skip {:?}: {}", path, e);
                continue;
            }
        };
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                warn!("Skip {:?}: not a JSON object", path);
                continue;
            }
        };
        let record = Record::from_json_object(obj)
            .into_iter_in_record()
            .filter_map(|(k, v)| match v {
                RecordValue::Scalar(_) => Some((k, v)),
                RecordValue::Array1(vs) => Some((k, RecordValue::Scalar(vs.iter().sum()))),
                _ => None,
            })
            .fold(Record::empty(), |mut r, (k, v)| {
                r.insert(k, v);
                r
            });
        storage.store(record);
    }

    let mut summary = storage.mean();
    summary.insert("num_episodes", RecordValue::Scalar(storage.len() as f32));

    let path = dir.join(output_file);
    fs::write(&path, serde_json::to_string_pretty(&summary.to_json())?)
        .with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote summary of {} episodes to {:?}", storage.len(), path);

    Ok(summary)
}
