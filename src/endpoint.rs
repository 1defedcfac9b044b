//! Endpoint resolution
//!
//! Maps logical Marketo resources to concrete API paths. Every request the
//! extractor makes goes through [`Route::path`]; no other module spells out a
//! Marketo path.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seed date for the activities paging token
pub const ACTIVITY_EPOCH: &str = "2014-01-01T00:00:00";

/// A resource the extractor can land in storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Activities,
    Campaigns,
    Leads,
    Programs,
    LeadLists,
}

/// How records for an endpoint are pulled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `moreResult` / `nextPageToken` pagination over a REST list
    Cursor,
    /// Paging token + activity type lookup, then cursor pagination
    ActivityStream,
    /// Asynchronous bulk CSV export
    BulkExport,
}

impl Strategy {
    /// Short name used in listings
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Cursor => "cursor",
            Strategy::ActivityStream => "activity_stream",
            Strategy::BulkExport => "bulk_export",
        }
    }
}

impl Endpoint {
    /// Every supported endpoint
    pub const ALL: [Endpoint; 5] = [
        Endpoint::Activities,
        Endpoint::Campaigns,
        Endpoint::Leads,
        Endpoint::Programs,
        Endpoint::LeadLists,
    ];

    /// Logical name as used in configuration
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Activities => "activities",
            Endpoint::Campaigns => "campaigns",
            Endpoint::Leads => "leads",
            Endpoint::Programs => "programs",
            Endpoint::LeadLists => "lead_lists",
        }
    }

    /// Extraction strategy for this endpoint
    pub fn strategy(&self) -> Strategy {
        match self {
            Endpoint::Activities => Strategy::ActivityStream,
            Endpoint::Leads => Strategy::BulkExport,
            Endpoint::Campaigns | Endpoint::Programs | Endpoint::LeadLists => Strategy::Cursor,
        }
    }

    /// Entry route for this endpoint
    pub fn route(&self) -> Route {
        match self {
            Endpoint::Activities => Route::Activities,
            Endpoint::Campaigns => Route::Campaigns,
            Endpoint::Leads => Route::LeadsCreate,
            Endpoint::Programs => Route::Programs,
            Endpoint::LeadLists => Route::LeadLists,
        }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "activities" => Ok(Endpoint::Activities),
            "campaigns" => Ok(Endpoint::Campaigns),
            "leads" => Ok(Endpoint::Leads),
            "programs" => Ok(Endpoint::Programs),
            "lead_lists" => Ok(Endpoint::LeadLists),
            _ => Err(Error::unknown_endpoint(s)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every Marketo path the extractor talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Auth,
    Activities,
    ActivityTypes,
    Campaigns,
    LeadsCreate,
    LeadDescription,
    LeadLists,
    PagingToken,
    Programs,
    LeadsEnqueue { export_id: String },
    LeadsStatus { export_id: String },
    LeadsFile { export_id: String },
}

impl Route {
    /// Look up a static route by logical name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "auth" => Ok(Route::Auth),
            "activities" => Ok(Route::Activities),
            "activity_types" => Ok(Route::ActivityTypes),
            "campaigns" => Ok(Route::Campaigns),
            "leads" | "leads_create" => Ok(Route::LeadsCreate),
            "lead_description" => Ok(Route::LeadDescription),
            "lead_lists" => Ok(Route::LeadLists),
            "paging_token" => Ok(Route::PagingToken),
            "programs" => Ok(Route::Programs),
            _ => Err(Error::unknown_endpoint(name)),
        }
    }

    /// Concrete API path, relative to the instance host
    pub fn path(&self) -> String {
        match self {
            Route::Auth => "identity/oauth/token".to_string(),
            Route::Activities => "rest/v1/activities.json".to_string(),
            Route::ActivityTypes => "rest/v1/activities/types.json".to_string(),
            Route::Campaigns => "rest/v1/campaigns.json".to_string(),
            Route::LeadsCreate => "bulk/v1/leads/export/create.json".to_string(),
            Route::LeadDescription => "rest/v1/leads/describe.json".to_string(),
            Route::LeadLists => "rest/v1/lists.json".to_string(),
            Route::PagingToken => "rest/v1/activities/pagingtoken.json".to_string(),
            Route::Programs => "rest/asset/v1/programs.json".to_string(),
            Route::LeadsEnqueue { export_id } => {
                format!("bulk/v1/leads/export/{export_id}/enqueue.json")
            }
            Route::LeadsStatus { export_id } => {
                format!("bulk/v1/leads/export/{export_id}/status.json")
            }
            Route::LeadsFile { export_id } => format!("bulk/v1/leads/export/{export_id}/file.json"),
        }
    }
}

/// Resolve a logical resource name to its API path
pub fn resolve(logical_name: &str) -> Result<String> {
    Route::from_name(logical_name).map(|route| route.path())
}
