//! Engine types
//!
//! Run outcomes and the downstream skip capability.

use crate::endpoint::Endpoint;
use crate::output::WriteReport;
use serde_json::{json, Value};
use tracing::info;

/// Result of one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Records were written to storage
    Written {
        /// Endpoint extracted
        endpoint: Endpoint,
        /// Upload details
        report: WriteReport,
        /// Wall time in milliseconds
        duration_ms: u64,
    },
    /// The API returned no records; nothing was written
    NoData {
        /// Endpoint extracted
        endpoint: Endpoint,
        /// Wall time in milliseconds
        duration_ms: u64,
    },
}

impl ExtractOutcome {
    /// Check if the run produced no records
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }

    /// Records written (zero for `NoData`)
    pub fn records(&self) -> usize {
        match self {
            Self::Written { report, .. } => report.records,
            Self::NoData { .. } => 0,
        }
    }

    /// JSON run summary
    pub fn summary(&self) -> Value {
        match self {
            Self::Written {
                endpoint,
                report,
                duration_ms,
            } => json!({
                "status": "SUCCEEDED",
                "endpoint": endpoint.name(),
                "records": report.records,
                "format": report.format,
                "uri": report.uri,
                "bytes": report.bytes,
                "duration_ms": duration_ms
            }),
            Self::NoData {
                endpoint,
                duration_ms,
            } => json!({
                "status": "SKIPPED",
                "endpoint": endpoint.name(),
                "records": 0,
                "duration_ms": duration_ms
            }),
        }
    }
}

/// Tells the surrounding workflow to skip work that depends on this run
pub trait SkipSignal: Send + Sync {
    /// Called once when a run produced no records
    fn skip(&self, endpoint: Endpoint);
}

/// Skip signal that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSkipSignal;

impl SkipSignal for LogSkipSignal {
    fn skip(&self, endpoint: Endpoint) {
        info!(endpoint = %endpoint, "Skipping downstream tasks");
    }
}
