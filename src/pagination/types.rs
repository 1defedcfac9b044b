//! Pagination types and traits
//!
//! Defines the page fetching seam and the parsed shape of a Marketo list
//! response.

use crate::auth::Token;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, Transport};
use crate::types::{Payload, Record};
use async_trait::async_trait;
use serde_json::Value;

/// Response key holding the page records
pub const RESULT_KEY: &str = "result";
/// Response key flagging that more pages exist
pub const MORE_RESULT_KEY: &str = "moreResult";
/// Request and response key carrying the continuation token
pub const NEXT_PAGE_TOKEN_KEY: &str = "nextPageToken";

// ============================================================================
// Page Fetching
// ============================================================================

/// Fetches one page of a list endpoint
#[async_trait]
pub trait FetchPage: Send + Sync {
    /// Issue one authenticated GET and return the decoded body
    async fn fetch_page(&self, path: &str, payload: &Payload, token: &Token) -> Result<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> FetchPage for T {
    async fn fetch_page(&self, path: &str, payload: &Payload, token: &Token) -> Result<Value> {
        let request = ApiRequest::get(path)
            .payload(payload)
            .bearer(token.as_str());

        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(Error::http_status(response.status, response.body));
        }
        response.json()
    }
}

// ============================================================================
// Page
// ============================================================================

/// One parsed list response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Records in the `result` array
    pub records: Vec<Record>,
    /// Whether the API reported more pages
    pub more_result: bool,
    /// Continuation token, if any
    pub next_page_token: Option<String>,
}

impl Page {
    /// Parse a decoded response body.
    ///
    /// A missing or null `result` is an empty page. Errors carry no partial
    /// records; the caller attaches what it has accumulated.
    pub fn parse(body: &Value) -> Result<Self> {
        let Some(object) = body.as_object() else {
            return Err(Error::pagination(
                "response body is not a JSON object",
                Vec::new(),
            ));
        };

        if object.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(Error::pagination(
                format!("request unsuccessful: {}", describe_errors(object.get("errors"))),
                Vec::new(),
            ));
        }

        let records = match object.get(RESULT_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.as_object().cloned().ok_or_else(|| {
                        Error::pagination(
                            format!("result entry {index} is not an object"),
                            Vec::new(),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(Error::pagination("'result' is not an array", Vec::new()));
            }
        };

        let more_result = object.get(MORE_RESULT_KEY).and_then(Value::as_bool) == Some(true);
        let next_page_token = object
            .get(NEXT_PAGE_TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(String::from);

        Ok(Self {
            records,
            more_result,
            next_page_token,
        })
    }
}

/// Render a Marketo `errors` array as `code: message` pairs
fn describe_errors(errors: Option<&Value>) -> String {
    let Some(Value::Array(errors)) = errors else {
        return "no error details".to_string();
    };

    let parts: Vec<String> = errors
        .iter()
        .map(|e| {
            let code = e.get("code").map(|c| match c {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            let message = e.get("message").and_then(Value::as_str).unwrap_or("");
            match code {
                Some(code) => format!("{code}: {message}"),
                None => message.to_string(),
            }
        })
        .collect();

    if parts.is_empty() {
        "no error details".to_string()
    } else {
        parts.join("; ")
    }
}

// ============================================================================
// State
// ============================================================================

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub pages: u32,
    /// Last continuation token sent
    pub cursor: Option<String>,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create state seeded with the token of the first request
    pub fn with_cursor(cursor: Option<String>) -> Self {
        Self {
            cursor,
            ..Default::default()
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Record a fetched page
    pub fn add_page(&mut self, records: usize) {
        self.pages += 1;
        self.total_fetched += records as u64;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }

    /// Whether `token` equals the last token sent
    pub fn is_repeat(&self, token: &str) -> bool {
        self.cursor.as_deref() == Some(token)
    }
}
