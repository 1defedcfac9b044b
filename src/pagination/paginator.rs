//! `moreResult` / `nextPageToken` pagination
//!
//! Also implements the activities protocol: paging token, activity type
//! lookup, then the regular loop.

use super::types::{FetchPage, Page, PaginationState, NEXT_PAGE_TOKEN_KEY};
use crate::auth::Token;
use crate::endpoint::{Route, ACTIVITY_EPOCH};
use crate::error::{Error, Result};
use crate::normalize::Normalizer;
use crate::types::{merge_payload, Payload, Record};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request key for the activities date seed
const SINCE_DATETIME_KEY: &str = "sinceDatetime";
/// Request key for the activity type filter
const ACTIVITY_TYPE_IDS_KEY: &str = "activityTypeIds";

/// Walks Marketo list endpoints page by page
#[derive(Clone)]
pub struct Paginator {
    fetcher: Arc<dyn FetchPage>,
    normalizer: Normalizer,
}

impl Paginator {
    /// Create a paginator with the default key normalizer
    pub fn new(fetcher: Arc<dyn FetchPage>) -> Self {
        Self::with_normalizer(fetcher, Normalizer::default())
    }

    /// Create a paginator that folds keys with `normalizer`
    pub fn with_normalizer(fetcher: Arc<dyn FetchPage>, normalizer: Normalizer) -> Self {
        Self {
            fetcher,
            normalizer,
        }
    }

    /// Fetch every page of `route`.
    ///
    /// `call_payload` overrides `base_payload` on key collision. Records come
    /// back in page order with their keys folded.
    pub async fn paginate(
        &self,
        route: &Route,
        base_payload: &Payload,
        call_payload: &Payload,
        token: &Token,
    ) -> Result<Vec<Record>> {
        let path = route.path();
        let mut payload = merge_payload(base_payload, call_payload);
        let mut state = PaginationState::with_cursor(
            payload
                .get(NEXT_PAGE_TOKEN_KEY)
                .and_then(Value::as_str)
                .map(String::from),
        );
        let mut records: Vec<Record> = Vec::new();

        while !state.done {
            let body = match self.fetcher.fetch_page(&path, &payload, token).await {
                Ok(body) => body,
                Err(e) if state.pages == 0 => return Err(e),
                Err(e) => {
                    return Err(Error::pagination(
                        format!("request for page {} failed: {e}", state.pages + 1),
                        records,
                    ));
                }
            };

            let page = match Page::parse(&body) {
                Ok(page) => page,
                Err(Error::Pagination { message, .. }) => {
                    return Err(Error::pagination(message, records));
                }
                Err(e) => return Err(e),
            };

            state.add_page(page.records.len());
            debug!(
                path = %path,
                page = state.pages,
                records = page.records.len(),
                more_result = page.more_result,
                "Fetched page"
            );

            for record in page.records {
                match self.normalizer.normalize_keys(record) {
                    Ok(record) => records.push(record),
                    Err(e) => return Err(Error::pagination(e.to_string(), records)),
                }
            }

            if !page.more_result {
                if page.next_page_token.is_some() {
                    debug!(path = %path, "Ignoring nextPageToken without moreResult");
                }
                state.mark_done();
                continue;
            }

            let Some(next) = page.next_page_token else {
                return Err(Error::pagination(
                    format!(
                        "page {} reported moreResult without a nextPageToken",
                        state.pages
                    ),
                    records,
                ));
            };

            if state.is_repeat(&next) {
                warn!(path = %path, token = %next, "Continuation token did not advance");
                return Err(Error::pagination(
                    format!("page {} repeated continuation token '{next}'", state.pages),
                    records,
                ));
            }

            payload.insert(NEXT_PAGE_TOKEN_KEY.to_string(), Value::String(next.clone()));
            state.set_cursor(next);
        }

        info!(
            path = %path,
            pages = state.pages,
            records = state.total_fetched,
            "Pagination complete"
        );
        Ok(records)
    }

    /// Obtain an activities paging token seeded at the activity epoch
    pub async fn paging_token(&self, base_payload: &Payload, token: &Token) -> Result<String> {
        let mut payload = base_payload.clone();
        payload.insert(SINCE_DATETIME_KEY.to_string(), json!(ACTIVITY_EPOCH));

        let body = self
            .fetcher
            .fetch_page(&Route::PagingToken.path(), &payload, token)
            .await?;
        Page::parse(&body)?
            .next_page_token
            .ok_or_else(|| Error::pagination("paging token response had no nextPageToken", Vec::new()))
    }

    /// List the ids of every activity type
    pub async fn activity_type_ids(
        &self,
        base_payload: &Payload,
        token: &Token,
    ) -> Result<Vec<i64>> {
        let body = self
            .fetcher
            .fetch_page(&Route::ActivityTypes.path(), base_payload, token)
            .await?;
        let ids: Vec<i64> = Page::parse(&body)?
            .records
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_i64))
            .collect();

        if ids.is_empty() {
            return Err(Error::pagination("no activity types available", Vec::new()));
        }
        Ok(ids)
    }

    /// Fetch activities filtered to the first activity type.
    ///
    /// Only the first id returned by the type listing is used as the filter.
    pub async fn paginate_activities(
        &self,
        base_payload: &Payload,
        token: &Token,
    ) -> Result<Vec<Record>> {
        let paging_token = self.paging_token(base_payload, token).await?;
        let type_ids = self.activity_type_ids(base_payload, token).await?;
        let first = type_ids[0];
        info!(
            activity_type_id = first,
            available = type_ids.len(),
            "Filtering activities to the first activity type"
        );

        let mut call_payload = Payload::new();
        call_payload.insert(ACTIVITY_TYPE_IDS_KEY.to_string(), json!(first));
        call_payload.insert(NEXT_PAGE_TOKEN_KEY.to_string(), json!(paging_token));

        self.paginate(&Route::Activities, base_payload, &call_payload, token)
            .await
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}
