//! Output writer: format a record set and hand it to storage

use super::storage::Storage;
use super::writer::{JsonLinesWriter, ParquetRecordWriter, ParquetWriterConfig};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::schema::schema_for;
use crate::types::{OutputFormat, Record};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of one write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// URI of the stored object
    pub uri: String,
    /// Rows written
    pub records: usize,
    /// File format
    pub format: String,
    /// Size of the uploaded file in bytes
    pub bytes: u64,
}

/// Writes record sets for one endpoint in one format
#[derive(Debug, Clone)]
pub struct OutputWriter {
    endpoint: Endpoint,
    format: OutputFormat,
    parquet: ParquetWriterConfig,
}

impl OutputWriter {
    /// Create a writer
    pub fn new(endpoint: Endpoint, format: OutputFormat) -> Self {
        Self {
            endpoint,
            format,
            parquet: ParquetWriterConfig::default(),
        }
    }

    /// Override the Parquet settings
    #[must_use]
    pub fn with_parquet_config(mut self, config: ParquetWriterConfig) -> Self {
        self.parquet = config;
        self
    }

    /// Output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write `records` in input order and upload the file under `key`
    pub async fn write(
        &self,
        records: Vec<Record>,
        storage: &dyn Storage,
        key: &str,
    ) -> Result<WriteReport> {
        let (file, rows) = match self.format {
            OutputFormat::Json => {
                let mut writer = JsonLinesWriter::new()?;
                for record in &records {
                    writer.append(record)?;
                }
                writer.finish()?
            }
            OutputFormat::Parquet => {
                let schema = schema_for(self.endpoint).arrow_schema();
                let mut writer = ParquetRecordWriter::new(schema, &self.parquet)?;
                for record in records {
                    writer.append(record)?;
                }
                writer.finish()?
            }
        };

        let bytes = file.as_file().metadata()?.len();
        debug!(
            path = %file.path().display(),
            rows,
            bytes,
            format = %self.format,
            "Local output file ready"
        );

        let uri = storage.put(file.path(), key).await?;
        info!(
            endpoint = %self.endpoint,
            uri = %uri,
            records = rows,
            "Output written"
        );

        Ok(WriteReport {
            uri,
            records: rows,
            format: self.format.to_string(),
            bytes,
        })
    }
}
