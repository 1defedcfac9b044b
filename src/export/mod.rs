//! Bulk export module
//!
//! Leads are pulled through Marketo's asynchronous bulk API: create a job,
//! enqueue it, poll until the file is ready, then download and parse the CSV.

mod csv;
mod driver;
mod types;

pub use csv::{parse_export, split_rows, CsvTable};
pub use driver::BulkExportDriver;
pub use types::{parse_timestamp, ExportConfig, ExportJob, ExportStatus, FilterWindow};

#[cfg(test)]
mod tests;
