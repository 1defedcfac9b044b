//! Bulk export types

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ============================================================================
// Job State
// ============================================================================

/// Status of a bulk export job as reported by Marketo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// Job created, not yet enqueued
    Created,
    /// Waiting for a worker
    Queued,
    /// Export running
    Processing,
    /// File ready for download
    Completed,
    /// Export failed
    Failed,
    /// Export cancelled
    Cancelled,
    /// Status not recognised; polling continues
    Unknown(String),
}

impl ExportStatus {
    /// Parse a status string
    pub fn parse(status: &str) -> Self {
        match status {
            "Created" => Self::Created,
            "Queued" => Self::Queued,
            "Processing" => Self::Processing,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            "Cancelled" => Self::Cancelled,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Check if the job can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Check if the file is ready
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Queued => write!(f, "Queued"),
            Self::Processing => write!(f, "Processing"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}

/// A bulk export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    /// Export id assigned on creation
    pub export_id: String,
    /// Last observed status
    pub status: ExportStatus,
    /// Status requests issued so far
    pub polls: u32,
}

impl ExportJob {
    /// Create a job in the `Created` state
    pub fn new(export_id: impl Into<String>) -> Self {
        Self {
            export_id: export_id.into(),
            status: ExportStatus::Created,
            polls: 0,
        }
    }

    /// Apply a status from an enqueue or poll response
    pub fn update(&mut self, status: ExportStatus) {
        self.status = status;
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Polling configuration for bulk exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Delay between status requests
    pub poll_interval: Duration,
    /// Status requests before giving up
    pub max_poll_attempts: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 720, // one hour at 5 second intervals
        }
    }
}

impl ExportConfig {
    /// Create a config with default polling
    pub fn new() -> Self {
        Self::default()
    }

    /// Set polling interval and bound
    #[must_use]
    pub fn with_poll(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_poll_attempts = max_attempts;
        self
    }
}

// ============================================================================
// Filter Window
// ============================================================================

/// `updatedAt` window for a leads export, as ISO-8601 strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterWindow {
    pub start_at: String,
    pub end_at: String,
}

impl FilterWindow {
    /// Create a window, checking both bounds parse and are ordered
    pub fn new(start_at: impl Into<String>, end_at: impl Into<String>) -> Result<Self> {
        let window = Self {
            start_at: start_at.into(),
            end_at: end_at.into(),
        };
        window.validate()?;
        Ok(window)
    }

    /// Check both bounds parse and `start_at <= end_at`
    pub fn validate(&self) -> Result<()> {
        let start = parse_timestamp("start_at", &self.start_at)?;
        let end = parse_timestamp("end_at", &self.end_at)?;
        if start > end {
            return Err(Error::invalid_value(
                "start_at",
                format!("{} is after end_at {}", self.start_at, self.end_at),
            ));
        }
        Ok(())
    }
}

/// Parse an ISO-8601 timestamp, with or without an offset.
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::invalid_value(field, format!("'{value}' is not an ISO-8601 timestamp")))
}
