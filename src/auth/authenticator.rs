//! Authenticator implementation
//!
//! Exchanges client credentials for a bearer token against the instance's
//! identity endpoint. One round trip, no retry.

use super::types::{Credential, Token};
use crate::endpoint::Route;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, Transport};
use crate::types::OptionStringExt;
use serde::Deserialize;
use tracing::{debug, info};

/// Obtains bearer tokens for a single credential
#[derive(Debug, Clone)]
pub struct Authenticator {
    credential: Credential,
}

impl Authenticator {
    /// Create an authenticator for the given credential
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    /// The credential this authenticator exchanges
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Run the client-credentials exchange
    pub async fn authenticate<T: Transport + ?Sized>(&self, transport: &T) -> Result<Token> {
        let request = ApiRequest::get(Route::Auth.path())
            .query("grant_type", "client_credentials")
            .query("client_id", &self.credential.client_id)
            .query("client_secret", &self.credential.client_secret)
            .retries(0);

        let response = transport.send(request).await.map_err(|e| match e {
            Error::HttpStatus { status, body } => Error::auth(format!(
                "token request failed with status {status}: {body}"
            )),
            other => other,
        })?;

        if !response.is_success() {
            return Err(Error::auth(format!(
                "token request failed with status {}: {}",
                response.status, response.body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::auth(format!("unreadable token response: {e}")))?;

        if let Some(error) = token.error {
            let description = token.error_description.unwrap_or_default();
            return Err(Error::auth(format!("{error}: {description}")));
        }

        let access_token = token
            .access_token
            .none_if_empty()
            .ok_or_else(|| Error::auth("token response did not contain an access_token"))?;

        debug!(
            token_type = token.token_type.as_deref().unwrap_or("bearer"),
            scope = token.scope.as_deref().unwrap_or(""),
            "Token exchange succeeded"
        );
        info!(
            expires_in = token.expires_in,
            "Authenticated against {}", self.credential.host
        );

        Ok(Token::new(access_token, token.expires_in))
    }
}

/// Identity endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}
