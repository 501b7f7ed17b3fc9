//! Types and traits for recording per-step and per-episode values.
//!
//! * [`Record`] - A container of key-value pairs of various data types
//! * [`RecordValue`] - The types of values that can be stored
//! * [`Recorder`] - A destination of records
//! * [`BufferedRecorder`] - A recorder that keeps records in memory
//! * [`NullRecorder`] - A recorder that discards all records
//!
//! ```rust
//! use steve_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode_step", RecordValue::Scalar(3.0));
//! record.insert("reward_damage", RecordValue::Scalar(-2.0));
//! assert_eq!(record.get_scalar("reward_damage").unwrap(), -2.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
