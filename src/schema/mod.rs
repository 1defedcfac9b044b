//! Static endpoint schemas
//!
//! Each endpoint has a fixed list of expected fields. The tables drive schema
//! drift logging and the column layout of the columnar output.

mod tables;
mod types;

pub use types::{EndpointSchema, FieldSchema, FieldType};

use crate::endpoint::Endpoint;

/// Schema table for an endpoint
pub fn schema_for(endpoint: Endpoint) -> &'static EndpointSchema {
    match endpoint {
        Endpoint::Activities => &tables::ACTIVITIES,
        Endpoint::Campaigns => &tables::CAMPAIGNS,
        Endpoint::Leads => &tables::LEADS,
        Endpoint::Programs => &tables::PROGRAMS,
        Endpoint::LeadLists => &tables::LEAD_LISTS,
    }
}
