//! Output module
//!
//! Turns a record set into a file and uploads it.
//!
//! # Overview
//!
//! - NDJSON (default): one JSON object per line, in input order
//! - Parquet: columns from the static endpoint schema, values coerced to the
//!   column type
//! - [`Storage`]: uploads the finished file; [`ObjectStorage`] covers S3, R2,
//!   GCS, Azure and the local filesystem

mod convert;
mod sink;
mod storage;
mod writer;

pub use convert::records_to_batch;
pub use sink::{OutputWriter, WriteReport};
pub use storage::{default_key, ObjectStorage, Storage};
pub use writer::{JsonLinesWriter, ParquetRecordWriter, ParquetWriterConfig};
