//! Auth types
//!
//! Credentials are supplied explicitly by the caller; nothing in the
//! extraction core reads them from the environment.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Marketo API credentials for one instance
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Client ID issued by Marketo
    pub client_id: String,
    /// Client secret issued by Marketo
    pub client_secret: String,
    /// Instance URL, e.g. `https://123-ABC-456.mktorest.com`
    pub host: String,
}

impl Credential {
    /// Create a new credential
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            host: host.into(),
        }
    }

    /// Check that every field is present and the host is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::invalid_value("client_id", "must not be empty"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(Error::invalid_value("client_secret", "must not be empty"));
        }
        let url = Url::parse(&self.host)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "host",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("host", &self.host)
            .finish()
    }
}

/// Bearer token obtained for one extraction run
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// The access token
    pub access_token: String,
    /// When the token was issued to us
    pub obtained_at: DateTime<Utc>,
    /// Lifetime reported by Marketo, in seconds
    pub expires_in: Option<i64>,
}

impl Token {
    /// Create a token obtained now
    pub fn new(access_token: impl Into<String>, expires_in: Option<i64>) -> Self {
        Self {
            access_token: access_token.into(),
            obtained_at: Utc::now(),
            expires_in,
        }
    }

    /// Expiry time, when Marketo reported a lifetime
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|secs| self.obtained_at + Duration::seconds(secs))
    }

    /// Access token string for the Authorization header
    pub fn as_str(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("obtained_at", &self.obtained_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
