//! Local file writers
//!
//! Records are appended one at a time into a temporary file which is later
//! handed to storage. Each writer is consumed by `finish`, so a file is
//! closed exactly once.

use super::convert::records_to_batch;
use crate::error::Result;
use crate::types::Record;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use tempfile::NamedTempFile;

// ============================================================================
// NDJSON
// ============================================================================

/// Writes one JSON object per line into a temporary file
pub struct JsonLinesWriter {
    file: NamedTempFile,
    out: BufWriter<File>,
    rows_written: usize,
}

impl JsonLinesWriter {
    /// Create a writer backed by a fresh temporary file
    pub fn new() -> Result<Self> {
        let file = NamedTempFile::new()?;
        let out = BufWriter::new(file.as_file().try_clone()?);
        Ok(Self {
            file,
            out,
            rows_written: 0,
        })
    }

    /// Append one record
    pub fn append(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the finished file
    pub fn finish(mut self) -> Result<(NamedTempFile, usize)> {
        self.out.flush()?;
        Ok((self.file, self.rows_written))
    }
}

// ============================================================================
// Parquet
// ============================================================================

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    batch_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            batch_size: 8192,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records buffered before a batch is encoded
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Parquet writer with a fixed schema, fed one record at a time
pub struct ParquetRecordWriter {
    file: NamedTempFile,
    writer: ArrowWriter<File>,
    schema: Arc<Schema>,
    pending: Vec<Record>,
    batch_size: usize,
    rows_written: usize,
}

impl ParquetRecordWriter {
    /// Create a writer backed by a fresh temporary file
    pub fn new(schema: Schema, config: &ParquetWriterConfig) -> Result<Self> {
        let file = NamedTempFile::new()?;
        let schema = Arc::new(schema);
        let writer = ArrowWriter::try_new(
            file.as_file().try_clone()?,
            Arc::clone(&schema),
            Some(config.build_properties()),
        )?;

        Ok(Self {
            file,
            writer,
            schema,
            pending: Vec::with_capacity(config.batch_size),
            batch_size: config.batch_size,
            rows_written: 0,
        })
    }

    /// Append one record, encoding a batch when the buffer is full
    pub fn append(&mut self, record: Record) -> Result<()> {
        self.pending.push(record);
        if self.pending.len() >= self.batch_size {
            self.flush_pending()?;
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = records_to_batch(&self.pending, &self.schema)?;
        self.writer.write(&batch)?;
        self.rows_written += batch.num_rows();
        self.pending.clear();
        Ok(())
    }

    /// Number of rows encoded so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush, close the file and return it
    pub fn finish(mut self) -> Result<(NamedTempFile, usize)> {
        self.flush_pending()?;
        self.writer.close()?;
        Ok((self.file, self.rows_written))
    }
}
