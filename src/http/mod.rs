//! HTTP module
//!
//! Provides the [`Transport`] seam the extraction core talks through and the
//! reqwest-backed [`HttpClient`] that implements it.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket sized to the Marketo call quota
//! - **Swappable Transport**: Tests inject mock servers or scripted fakes

mod client;
mod rate_limit;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{ApiRequest, ApiResponse, Transport};
