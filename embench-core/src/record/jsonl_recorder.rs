use super::{Record, RecordStorage, RecordValue, Recorder};
use anyhow::Result;
use log::warn;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
};

/// Writes every record as a JSON object on its own line.
///
/// Aggregates of stored records are appended on [`Recorder::flush`] with the
/// additional key `flush_step`.
pub struct JsonlRecorder {
    writer: BufWriter<File>,
    storage: RecordStorage,
}

impl JsonlRecorder {
    /// Opens `path` in append mode, creating it when missing.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            writer: BufWriter::new(file),
            storage: RecordStorage::new(),
        })
    }

    fn write_line(&mut self, record: &Record) {
        let line = record.to_json().to_string();
        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            warn!("Failed to write a record: {}", e);
        }
    }
}

impl Recorder for JsonlRecorder {
    fn write(&mut self, record: Record) {
        self.write_line(&record);
    }

    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let mut record = self.storage.aggregate();
        record.insert("flush_step", RecordValue::Scalar(step as f32));
        self.write_line(&record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_jsonl_recorder() -> Result<()> {
        let dir = TempDir::new("jsonl_recorder")?;
        let path = dir.path().join("steps.jsonl");
        {
            let mut recorder = JsonlRecorder::new(&path)?;
            recorder.write(Record::from_scalar("step", 0.0));
            recorder.write(Record::from_scalar("step", 1.0));
            recorder.store(Record::from_scalar("task_success", 1.0));
            recorder.store(Record::from_scalar("task_success", 0.0));
            recorder.flush(2);
        }
        let text = std::fs::read_to_string(&path)?;
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["step"], 1.0);
        assert_eq!(lines[2]["task_success_mean"], 0.5);
        assert_eq!(lines[2]["flush_step"], 2.0);
        Ok(())
    }
}
