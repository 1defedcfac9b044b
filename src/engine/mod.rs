//! Execution engine module
//!
//! One extraction run: authenticate, pull records with the endpoint's
//! strategy, normalize, then write or signal a skip.
//!
//! # Overview
//!
//! - `Extractor` - Orchestrates a single run against injected capabilities
//! - `ExtractOutcome` - `Written` or `NoData`
//! - `SkipSignal` - Notified when a run yields no records

mod types;

pub use types::{ExtractOutcome, LogSkipSignal, SkipSignal};

use crate::auth::{Authenticator, Token};
use crate::config::ExtractJob;
use crate::endpoint::Strategy;
use crate::error::{Error, Result};
use crate::export::BulkExportDriver;
use crate::http::{HttpClient, Transport};
use crate::normalize::Normalizer;
use crate::output::{ObjectStorage, OutputWriter, Storage};
use crate::pagination::{FetchPage, Paginator};
use crate::types::{Payload, Record};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Runs one extraction job
pub struct Extractor {
    job: ExtractJob,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn Storage>,
    skip: Arc<dyn SkipSignal>,
    normalizer: Normalizer,
}

impl Extractor {
    /// Create an extractor over explicit capabilities
    pub fn new(job: ExtractJob, transport: Arc<dyn Transport>, storage: Arc<dyn Storage>) -> Self {
        Self {
            job,
            transport,
            storage,
            skip: Arc::new(LogSkipSignal),
            normalizer: Normalizer::default(),
        }
    }

    /// Create an extractor with the reqwest client and the job's object store
    pub fn from_job(job: ExtractJob) -> Result<Self> {
        let transport = HttpClient::new(job.http_client_config())?;
        let storage = ObjectStorage::parse(&job.destination_url)?;
        Ok(Self::new(job, Arc::new(transport), Arc::new(storage)))
    }

    /// Set the skip signal
    #[must_use]
    pub fn with_skip_signal(mut self, skip: Arc<dyn SkipSignal>) -> Self {
        self.skip = skip;
        self
    }

    /// Set the normalizer
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The job this extractor runs
    pub fn job(&self) -> &ExtractJob {
        &self.job
    }

    /// Run the job once
    pub async fn run(&self) -> Result<ExtractOutcome> {
        let start = Instant::now();
        self.job.check()?;

        let endpoint = self.job.endpoint;
        info!(endpoint = %endpoint, format = %self.job.format, "Starting extraction");

        let token = Authenticator::new(self.job.credential.clone())
            .authenticate(self.transport.as_ref())
            .await?;

        let records = self.extract(&token).await?;
        let records = self.normalizer.normalize(records)?;

        if records.is_empty() {
            info!(endpoint = %endpoint, "No records pulled from Marketo");
            self.skip.skip(endpoint);
            return Ok(ExtractOutcome::NoData {
                endpoint,
                duration_ms: elapsed_ms(start),
            });
        }

        info!(endpoint = %endpoint, records = records.len(), "Writing output");
        let report = OutputWriter::new(endpoint, self.job.format)
            .write(records, self.storage.as_ref(), &self.job.key)
            .await?;

        Ok(ExtractOutcome::Written {
            endpoint,
            report,
            duration_ms: elapsed_ms(start),
        })
    }

    /// Run the job, giving up after `timeout`
    pub async fn run_with_timeout(&self, timeout: Duration) -> Result<ExtractOutcome> {
        match tokio::time::timeout(timeout, self.run()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Extraction timed out");
                Err(Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    /// Pull raw records for the job's endpoint
    pub async fn extract(&self, token: &Token) -> Result<Vec<Record>> {
        let endpoint = self.job.endpoint;
        match endpoint.strategy() {
            Strategy::Cursor => {
                self.paginator()
                    .paginate(&endpoint.route(), &self.job.payload, &Payload::new(), token)
                    .await
            }
            Strategy::ActivityStream => {
                self.paginator()
                    .paginate_activities(&self.job.payload, token)
                    .await
            }
            Strategy::BulkExport => {
                let window = self.job.window.as_ref().ok_or_else(|| {
                    Error::invalid_value("start_at", "leads exports require start_at and end_at")
                })?;
                BulkExportDriver::with_normalizer(
                    Arc::clone(&self.transport),
                    self.job.export.clone(),
                    self.normalizer.clone(),
                )
                .with_payload(self.job.payload.clone())
                .export_leads(window, self.job.fields.clone(), token)
                .await
            }
        }
    }

    fn paginator(&self) -> Paginator {
        let fetcher: Arc<dyn FetchPage> = Arc::new(Arc::clone(&self.transport));
        Paginator::with_normalizer(fetcher, self.normalizer.clone())
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("endpoint", &self.job.endpoint)
            .field("format", &self.job.format)
            .field("key", &self.job.key)
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
