use super::Record;

/// Writes a record to an output destination with [`Recorder::write`].
pub trait Recorder {
    /// Write a record to the [`Recorder`].
    fn write(&mut self, record: Record);

    /// Store the record for later aggregation.
    fn store(&mut self, _record: Record) {}

    /// Writes values aggregated from the stored records.
    fn flush(&mut self, _step: i64) {}
}

impl<R: Recorder + ?Sized> Recorder for Box<R> {
    fn write(&mut self, record: Record) {
        (**self).write(record)
    }

    fn store(&mut self, record: Record) {
        (**self).store(record)
    }

    fn flush(&mut self, step: i64) {
        (**self).flush(step)
    }
}
