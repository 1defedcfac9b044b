//! Pagination module
//!
//! # Overview
//!
//! Marketo list endpoints return `{success, result, moreResult,
//! nextPageToken}`. The [`Paginator`] keeps requesting pages, merging each
//! `nextPageToken` into the next request, until `moreResult` is absent or
//! false. Page requests go through the [`FetchPage`] seam, implemented for
//! every [`Transport`](crate::http::Transport).

mod paginator;
mod types;

pub use paginator::Paginator;
pub use types::{
    FetchPage, Page, PaginationState, MORE_RESULT_KEY, NEXT_PAGE_TOKEN_KEY, RESULT_KEY,
};
