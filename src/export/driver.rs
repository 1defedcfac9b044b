//! Bulk export driver
//!
//! create → enqueue → poll → download, then CSV parsing.

use super::csv::parse_export;
use super::types::{ExportConfig, ExportJob, ExportStatus, FilterWindow};
use crate::auth::Token;
use crate::endpoint::{Endpoint, Route};
use crate::error::{Error, Result};
use crate::http::{ApiRequest, ApiResponse, Transport};
use crate::normalize::{Normalizer, SchemaDrift};
use crate::pagination::{FetchPage, Page, Paginator};
use crate::schema::schema_for;
use crate::types::{Payload, Record};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs Marketo bulk lead exports
pub struct BulkExportDriver {
    transport: Arc<dyn Transport>,
    paginator: Paginator,
    normalizer: Normalizer,
    config: ExportConfig,
    payload: Payload,
}

impl BulkExportDriver {
    /// Create a driver over a transport
    pub fn new(transport: Arc<dyn Transport>, config: ExportConfig) -> Self {
        Self::with_normalizer(transport, config, Normalizer::default())
    }

    /// Create a driver that folds headers with `normalizer`
    pub fn with_normalizer(
        transport: Arc<dyn Transport>,
        config: ExportConfig,
        normalizer: Normalizer,
    ) -> Self {
        let fetcher: Arc<dyn FetchPage> = Arc::new(Arc::clone(&transport));
        Self {
            paginator: Paginator::with_normalizer(fetcher, normalizer.clone()),
            transport,
            normalizer,
            config,
            payload: Payload::new(),
        }
    }

    /// Extra request parameters sent with the lead describe call
    #[must_use]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Polling configuration
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export every lead updated inside `window`.
    ///
    /// Without an explicit field list, every lead field that has a REST name
    /// is exported. Failures other than the poll bound surface as
    /// [`Error::Export`].
    pub async fn export_leads(
        &self,
        window: &FilterWindow,
        fields: Option<Vec<String>>,
        token: &Token,
    ) -> Result<Vec<Record>> {
        let fields = match fields {
            Some(fields) if !fields.is_empty() => fields,
            _ => step("describe", self.describe_fields(token).await)?,
        };
        info!(fields = fields.len(), "Creating leads export");

        let mut job = step("create", self.create(window, &fields, token).await)?;
        let status = step("enqueue", self.enqueue(&job, token).await)?;
        job.update(status);
        info!(export_id = %job.export_id, status = %job.status, "Export enqueued");

        self.wait_for_completion(&mut job, token).await?;

        let text = step("download", self.download(&job, token).await)?;
        let table = step("parse", parse_export(&text, &self.normalizer))?;

        let expected = schema_for(Endpoint::Leads);
        SchemaDrift::detect(table.headers.iter().map(String::as_str), expected.field_names())
            .log(Endpoint::Leads.name());

        info!(
            export_id = %job.export_id,
            records = table.records.len(),
            "Leads export downloaded"
        );
        Ok(table.records)
    }

    /// REST names of every describable lead field
    pub async fn describe_fields(&self, token: &Token) -> Result<Vec<String>> {
        let described = self
            .paginator
            .paginate(&Route::LeadDescription, &self.payload, &Payload::new(), token)
            .await?;

        let fields: Vec<String> = described
            .iter()
            .filter_map(|f| f.get("rest")?.get("name")?.as_str().map(String::from))
            .collect();
        debug!(
            described = described.len(),
            exportable = fields.len(),
            "Described lead fields"
        );

        if fields.is_empty() {
            return Err(Error::export("lead describe returned no REST field names"));
        }
        Ok(fields)
    }

    async fn create(
        &self,
        window: &FilterWindow,
        fields: &[String],
        token: &Token,
    ) -> Result<ExportJob> {
        let column_header_names: Map<String, Value> = fields
            .iter()
            .map(|f| (f.clone(), Value::String(f.clone())))
            .collect();

        let body = json!({
            "fields": fields,
            "columnHeaderNames": column_header_names,
            "filter": {
                "updatedAt": {
                    "startAt": window.start_at,
                    "endAt": window.end_at
                }
            },
            "format": "CSV"
        });

        let request = ApiRequest::post(Route::LeadsCreate.path())
            .json(body)
            .bearer(token.as_str());
        let response = self.send(request).await?;
        let export_id = first_result_field(&response, "exportId")?;
        Ok(ExportJob::new(export_id))
    }

    async fn enqueue(&self, job: &ExportJob, token: &Token) -> Result<ExportStatus> {
        let route = Route::LeadsEnqueue {
            export_id: job.export_id.clone(),
        };
        let request = ApiRequest::post(route.path()).bearer(token.as_str());
        let response = self.send(request).await?;
        first_result_field(&response, "status").map(|s| ExportStatus::parse(&s))
    }

    async fn poll(&self, job: &ExportJob, token: &Token) -> Result<ExportStatus> {
        let route = Route::LeadsStatus {
            export_id: job.export_id.clone(),
        };
        let request = ApiRequest::get(route.path()).bearer(token.as_str());
        let response = self.send(request).await?;
        first_result_field(&response, "status").map(|s| ExportStatus::parse(&s))
    }

    async fn wait_for_completion(&self, job: &mut ExportJob, token: &Token) -> Result<()> {
        loop {
            if job.status.is_completed() {
                return Ok(());
            }
            match &job.status {
                ExportStatus::Failed | ExportStatus::Cancelled => {
                    return Err(Error::export(format!(
                        "export {} ended with status {}",
                        job.export_id, job.status
                    )));
                }
                ExportStatus::Unknown(status) => {
                    warn!(export_id = %job.export_id, status = %status, "Unrecognised export status");
                }
                _ => {}
            }

            if job.polls >= self.config.max_poll_attempts {
                return Err(Error::ExportTimeout {
                    export_id: job.export_id.clone(),
                    attempts: job.polls,
                });
            }

            tokio::time::sleep(self.config.poll_interval).await;
            let status = step("status", self.poll(job, token).await)?;
            job.polls += 1;
            job.update(status);
            info!(
                export_id = %job.export_id,
                attempt = job.polls,
                status = %job.status,
                "Export status"
            );
        }
    }

    async fn download(&self, job: &ExportJob, token: &Token) -> Result<String> {
        let route = Route::LeadsFile {
            export_id: job.export_id.clone(),
        };
        let request = ApiRequest::get(route.path()).bearer(token.as_str());
        let response = self.send(request).await?;
        Ok(response.body)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(Error::http_status(response.status, response.body));
        }
        Ok(response)
    }
}

impl std::fmt::Debug for BulkExportDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkExportDriver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Read `result[0].<field>` from a job response
fn first_result_field(response: &ApiResponse, field: &str) -> Result<String> {
    let page = Page::parse(&response.json()?)?;
    let value = page
        .records
        .first()
        .and_then(|r| r.get(field))
        .ok_or_else(|| Error::export(format!("response has no result[0].{field}")))?;

    match value {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::export(format!("unexpected {field} value: {other}"))),
    }
}

/// Wrap a failed step as an export error, keeping the poll bound distinct
fn step<T>(name: &str, result: Result<T>) -> Result<T> {
    result.map_err(|e| match e {
        e @ (Error::Export { .. } | Error::ExportTimeout { .. }) => e,
        Error::Pagination { message, .. } => Error::export(format!("{name}: {message}")),
        other => Error::export(format!("{name}: {other}")),
    })
}
