//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{ExtractConfig, ExtractJob};
use crate::endpoint::Endpoint;
use crate::engine::Extractor;
use crate::error::Result;
use crate::schema::schema_for;
use serde_json::{json, Value};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Job-file values that can be overridden on the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Endpoint name
    pub endpoint: Option<String>,
    /// Output format
    pub output_format: Option<String>,
    /// Window start
    pub start_at: Option<String>,
    /// Window end
    pub end_at: Option<String>,
}

impl Overrides {
    /// Apply the overrides to a raw config
    pub fn apply(&self, config: &mut ExtractConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(format) = &self.output_format {
            config.output_format.clone_from(format);
        }
        if self.start_at.is_some() {
            config.start_at.clone_from(&self.start_at);
        }
        if self.end_at.is_some() {
            config.end_at.clone_from(&self.end_at);
        }
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                config,
                endpoint,
                output_format,
                start_at,
                end_at,
            } => {
                let overrides = Overrides {
                    endpoint: endpoint.clone(),
                    output_format: output_format.clone(),
                    start_at: start_at.clone(),
                    end_at: end_at.clone(),
                };
                self.extract(config, &overrides).await
            }
            Commands::Validate { config } => self.validate(config),
            Commands::Endpoints => {
                self.output_message(&endpoints_listing());
                Ok(())
            }
            Commands::Schema { endpoint } => {
                let endpoint = Endpoint::from_str(endpoint)?;
                self.output_message(&schema_for(endpoint).to_json());
                Ok(())
            }
        }
    }

    /// Run an extraction job and print its summary
    async fn extract(&self, path: &Path, overrides: &Overrides) -> Result<()> {
        let job = load_job(path, overrides)?;
        let run_timeout = job.run_timeout;
        let extractor = Extractor::from_job(job)?;

        let outcome = match run_timeout {
            Some(timeout) => extractor.run_with_timeout(timeout).await?,
            None => extractor.run().await?,
        };

        info!(records = outcome.records(), "Extraction finished");
        self.output_message(&outcome.summary());
        Ok(())
    }

    /// Validate a job file
    fn validate(&self, path: &Path) -> Result<()> {
        let job = load_job(path, &Overrides::default())?;
        self.output_message(&json!({
            "valid": true,
            "endpoint": job.endpoint.name(),
            "path": job.endpoint.route().path(),
            "format": job.format.to_string(),
            "window": job.window,
            "destination": job.destination_url,
            "key": job.key
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        if self.cli.pretty {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        } else {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
    }
}

/// Load, override and validate a job file
pub fn load_job(path: &Path, overrides: &Overrides) -> Result<ExtractJob> {
    let mut config = ExtractConfig::load(path)?;
    overrides.apply(&mut config);
    config.validate()
}

/// Every endpoint with its path and strategy
pub fn endpoints_listing() -> Value {
    let endpoints: Vec<Value> = Endpoint::ALL
        .iter()
        .map(|endpoint| {
            json!({
                "name": endpoint.name(),
                "path": endpoint.route().path(),
                "strategy": endpoint.strategy().name()
            })
        })
        .collect();
    json!({ "endpoints": endpoints })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const JOB: &str = r"
endpoint: campaigns
credential:
  client_id: id
  client_secret: secret
  host: https://123-ABC-456.mktorest.com
destination:
  url: /tmp/marketo
  key: campaigns.json
";

    fn job_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(JOB.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_job_applies_overrides() {
        let file = job_file();
        let overrides = Overrides {
            endpoint: Some("programs".to_string()),
            output_format: Some("parquet".to_string()),
            ..Overrides::default()
        };
        let job = load_job(file.path(), &overrides).unwrap();
        assert_eq!(job.endpoint, Endpoint::Programs);
        assert_eq!(job.format.to_string(), "parquet");
        assert_eq!(job.key, "campaigns.json");
    }

    #[test]
    fn test_override_to_leads_needs_window() {
        let file = job_file();
        let overrides = Overrides {
            endpoint: Some("leads".to_string()),
            ..Overrides::default()
        };
        assert!(load_job(file.path(), &overrides).unwrap_err().is_validation());

        let overrides = Overrides {
            endpoint: Some("leads".to_string()),
            start_at: Some("2024-01-01T00:00:00Z".to_string()),
            end_at: Some("2024-01-31T00:00:00Z".to_string()),
            ..Overrides::default()
        };
        assert!(load_job(file.path(), &overrides).unwrap().window.is_some());
    }

    #[test]
    fn test_endpoints_listing() {
        let listing = endpoints_listing();
        let endpoints = listing["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), 5);

        let leads = endpoints.iter().find(|e| e["name"] == "leads").unwrap();
        assert_eq!(leads["strategy"], "bulk_export");
        let activities = endpoints
            .iter()
            .find(|e| e["name"] == "activities")
            .unwrap();
        assert_eq!(activities["path"], "rest/v1/activities.json");
    }
}
