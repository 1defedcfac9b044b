//! Job configuration
//!
//! An extraction job is described in a YAML (or JSON) file. `${VAR}`
//! references inside string values are expanded from the environment after
//! the file is parsed, so secrets never need to live in the file itself. [`ExtractConfig::validate`]
//! turns the raw file into a typed [`ExtractJob`] before any request is made.

use crate::auth::Credential;
use crate::endpoint::{Endpoint, Strategy};
use crate::error::{Error, Result};
use crate::export::{ExportConfig, FilterWindow};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::output::default_key;
use crate::types::{BackoffType, OutputFormat, Payload};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

static ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

// ============================================================================
// Raw Config
// ============================================================================

/// Extraction job as written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// Logical endpoint name (`activities`, `campaigns`, `leads`, `programs`, `lead_lists`)
    pub endpoint: String,

    /// Output format (`json` or `parquet`)
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Window start, ISO-8601 (required for leads)
    #[serde(default)]
    pub start_at: Option<String>,

    /// Window end, ISO-8601 (required for leads)
    #[serde(default)]
    pub end_at: Option<String>,

    /// Extra request parameters merged into every list request
    #[serde(default)]
    pub payload: Payload,

    /// Lead fields to export; all describable fields when absent
    #[serde(default)]
    pub fields: Option<Vec<String>>,

    /// Marketo API credential
    pub credential: Credential,

    /// Where the output lands
    pub destination: DestinationConfig,

    /// Bulk export polling
    #[serde(default)]
    pub export: ExportSettings,

    /// HTTP client behaviour
    #[serde(default)]
    pub http: HttpSettings,

    /// Abort the whole run after this many seconds
    #[serde(default)]
    pub run_timeout_seconds: Option<u64>,
}

fn default_format() -> String {
    "json".to_string()
}

/// Output destination
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    /// Storage URL (`s3://bucket/prefix`, `gs://...`, `az://...`, `r2://...` or a local path)
    pub url: String,

    /// Object key; defaults to `{endpoint}/dt={date}/data.{ext}`
    #[serde(default)]
    pub key: Option<String>,
}

/// Bulk export polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSettings {
    /// Seconds between status requests
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Status requests before giving up
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_poll_attempts() -> u32 {
    720
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries for retryable statuses
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffType,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Calls allowed per rate limit window (0 disables limiting)
    #[serde(default = "default_max_calls")]
    pub max_calls: u32,

    /// Rate limit window in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_calls: default_max_calls(),
            window_seconds: default_window_seconds(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_calls() -> u32 {
    100
}

fn default_window_seconds() -> u64 {
    20
}

// ============================================================================
// Loading
// ============================================================================

impl ExtractConfig {
    /// Load a job file, expanding `${VAR}` references from the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        Self::from_str_with_env(&content, |name| std::env::var(name).ok())
    }

    /// Parse a job from YAML or JSON text, resolving variables with `lookup`
    pub fn from_str_with_env<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut document: serde_yaml::Value = serde_yaml::from_str(content)?;
        let mut missing = Vec::new();
        expand_value(&mut document, &lookup, &mut missing);

        if !missing.is_empty() {
            missing.sort();
            missing.dedup();
            return Err(Error::config(format!(
                "Environment variables not set: {}",
                missing.join(", ")
            )));
        }
        Ok(serde_yaml::from_value(document)?)
    }

    /// Check every field and produce a typed job
    pub fn validate(&self) -> Result<ExtractJob> {
        let endpoint = Endpoint::from_str(&self.endpoint)?;
        let format = OutputFormat::from_str(&self.output_format)?;

        let window = match (&self.start_at, &self.end_at) {
            (Some(start), Some(end)) => Some(FilterWindow::new(start.clone(), end.clone())?),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::invalid_value("end_at", "start_at is set without end_at"));
            }
            (None, Some(_)) => {
                return Err(Error::invalid_value("start_at", "end_at is set without start_at"));
            }
        };
        if endpoint.strategy() == Strategy::BulkExport && window.is_none() {
            return Err(Error::invalid_value(
                "start_at",
                "leads exports require start_at and end_at",
            ));
        }

        self.credential.validate()?;

        if self.destination.url.trim().is_empty() {
            return Err(Error::invalid_value("destination.url", "cannot be empty"));
        }
        let key = match &self.destination.key {
            Some(key) if key.trim().is_empty() => {
                return Err(Error::invalid_value("destination.key", "cannot be empty"));
            }
            Some(key) => key.clone(),
            None => default_key(endpoint.name(), format.extension()),
        };

        if self.export.poll_interval_seconds == 0 {
            return Err(Error::invalid_value(
                "export.poll_interval_seconds",
                "must be at least 1",
            ));
        }
        if self.export.max_poll_attempts == 0 {
            return Err(Error::invalid_value(
                "export.max_poll_attempts",
                "must be at least 1",
            ));
        }

        let fields = match &self.fields {
            Some(fields) if fields.iter().any(|f| f.trim().is_empty()) => {
                return Err(Error::invalid_value("fields", "field names cannot be empty"));
            }
            other => other.clone(),
        };

        Ok(ExtractJob {
            endpoint,
            format,
            window,
            payload: self.payload.clone(),
            fields,
            credential: self.credential.clone(),
            destination_url: self.destination.url.clone(),
            key,
            export: ExportConfig::new().with_poll(
                Duration::from_secs(self.export.poll_interval_seconds),
                self.export.max_poll_attempts,
            ),
            http: self.http.clone(),
            run_timeout: self.run_timeout_seconds.map(Duration::from_secs),
        })
    }
}

/// Replace `${VAR}` references, collecting the names of unset variables
fn expand_str<F>(content: &str, lookup: &F, missing: &mut Vec<String>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_REF
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            lookup(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                String::new()
            })
        })
        .into_owned()
}

/// Expand references in every string scalar of a parsed document.
/// Keys and non-string scalars are left alone.
fn expand_value<F>(value: &mut serde_yaml::Value, lookup: &F, missing: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        serde_yaml::Value::String(s) => {
            if ENV_REF.is_match(s) {
                *s = expand_str(s, lookup, missing);
            }
        }
        serde_yaml::Value::Sequence(items) => {
            for item in items {
                expand_value(item, lookup, missing);
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for item in map.values_mut() {
                expand_value(item, lookup, missing);
            }
        }
        serde_yaml::Value::Tagged(tagged) => expand_value(&mut tagged.value, lookup, missing),
        _ => {}
    }
}

// ============================================================================
// Validated Job
// ============================================================================

/// A validated extraction job
#[derive(Debug, Clone)]
pub struct ExtractJob {
    pub endpoint: Endpoint,
    pub format: OutputFormat,
    pub window: Option<FilterWindow>,
    pub payload: Payload,
    pub fields: Option<Vec<String>>,
    pub credential: Credential,
    pub destination_url: String,
    pub key: String,
    pub export: ExportConfig,
    pub http: HttpSettings,
    pub run_timeout: Option<Duration>,
}

impl ExtractJob {
    /// Re-check the invariants a run depends on
    pub fn check(&self) -> Result<()> {
        self.credential.validate()?;
        match &self.window {
            Some(window) => window.validate(),
            None if self.endpoint.strategy() == Strategy::BulkExport => Err(Error::invalid_value(
                "start_at",
                "leads exports require start_at and end_at",
            )),
            None => Ok(()),
        }
    }

    /// HTTP client configuration for this job's instance
    pub fn http_client_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .base_url(self.credential.host.clone())
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_secs(60),
            );

        if self.http.max_calls == 0 {
            builder.no_rate_limit().build()
        } else {
            builder
                .rate_limit(RateLimiterConfig::new(
                    self.http.max_calls,
                    Duration::from_secs(self.http.window_seconds.max(1)),
                ))
                .build()
        }
    }
}
