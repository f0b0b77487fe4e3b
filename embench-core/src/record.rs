//! Types and traits for recording step outcomes and episode metrics.
//!
//! * [`Record`] - A flexible container for storing key-value pairs of various data types
//! * [`RecordValue`] - An enum representing different types of values that can be stored
//! * [`Recorder`] - A trait defining the interface for recording and storing data
//! * [`RecordStorage`] - A storage system with aggregation capabilities
//! * [`JsonlRecorder`] - A recorder writing one JSON object per line
//! * [`NullRecorder`] - A recorder that discards all records
//!
//! ```rust
//! use embench_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("step", RecordValue::Scalar(3.0));
//! record.insert("action", RecordValue::String("Pickup".to_string()));
//! assert_eq!(record.get_scalar("step").unwrap(), 3.0);
//! ```
mod base;
mod jsonl_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use jsonl_recorder::JsonlRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;
