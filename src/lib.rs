// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Marketo Extract
//!
//! Pulls one Marketo resource per run and lands it in object storage as
//! newline-delimited JSON or Parquet.
//!
//! ## Features
//!
//! - **Client-credentials auth** against the instance identity endpoint
//! - **Cursor pagination** over `moreResult` / `nextPageToken` list APIs
//! - **Activity stream** bootstrap via paging token and activity types
//! - **Bulk lead export** with create, enqueue, poll and CSV download
//! - **Normalization** of field names to snake_case and `"null"` to null
//! - **Output** to S3, R2, GCS, Azure or a local directory
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marketo_extract::{config::ExtractConfig, engine::Extractor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let job = ExtractConfig::load("jobs/campaigns.yaml")?.validate()?;
//!     let outcome = Extractor::from_job(job)?.run().await?;
//!     println!("{}", outcome.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Extractor::run(job)                       │
//! │  authenticate → extract → normalize → write | skip signal    │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬─────────────┬──────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Bulk Export │  Output  │
//! ├──────────┼───────────┼───────────────┼─────────────┼──────────┤
//! │ Client   │ GET/POST  │ nextPageToken │ Create      │ NDJSON   │
//! │ creds    │ Retry     │ Paging token  │ Enqueue     │ Parquet  │
//! │          │ Rate Limit│ Activity types│ Poll + CSV  │ Storage  │
//! └──────────┴───────────┴───────────────┴─────────────┴──────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Logical endpoints and Marketo API paths
pub mod endpoint;

/// Client-credentials authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Cursor and activity-stream pagination
pub mod pagination;

/// Bulk lead export
pub mod export;

/// Field name and value normalization
pub mod normalize;

/// Output schemas per endpoint
pub mod schema;

/// NDJSON/Parquet output and object storage
pub mod output;

/// Main execution engine
pub mod engine;

/// Job configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{ExtractConfig, ExtractJob};
pub use endpoint::{resolve, Endpoint};
pub use engine::{ExtractOutcome, Extractor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
