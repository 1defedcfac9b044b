//! Static field tables, one per endpoint
//!
//! Names are already in normalized (snake case) form.

use super::types::{EndpointSchema, FieldSchema, FieldType::*};

const ACTIVITY_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("activity_date", String),
    FieldSchema::new("activity_type_id", Int),
    FieldSchema::new("attributes", NameValueList),
    FieldSchema::new("campaign_id", Int),
    FieldSchema::new("id", Long),
    FieldSchema::new("lead_id", Int),
    FieldSchema::new("marketo_guid", String),
    FieldSchema::new("primary_attribute_value", String),
    FieldSchema::new("primary_attribute_value_id", Int),
];

const CAMPAIGN_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("id", Int),
    FieldSchema::new("name", String),
    FieldSchema::new("description", String),
    FieldSchema::new("type", String),
    FieldSchema::new("program_id", Int),
    FieldSchema::new("program_name", String),
    FieldSchema::new("workspace_name", String),
    FieldSchema::new("active", Boolean),
    FieldSchema::new("created_at", String),
    FieldSchema::new("updated_at", String),
];

const LEAD_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("id", Int),
    FieldSchema::new("created_at", String),
    FieldSchema::new("updated_at", String),
    FieldSchema::new("salutation", String),
    FieldSchema::new("first_name", String),
    FieldSchema::new("middle_name", String),
    FieldSchema::new("last_name", String),
    FieldSchema::new("email", String),
    FieldSchema::new("email_invalid", Boolean),
    FieldSchema::new("unsubscribed", Boolean),
    FieldSchema::new("phone", String),
    FieldSchema::new("mobile_phone", String),
    FieldSchema::new("fax", String),
    FieldSchema::new("title", String),
    FieldSchema::new("company", String),
    FieldSchema::new("site", String),
    FieldSchema::new("website", String),
    FieldSchema::new("industry", String),
    FieldSchema::new("annual_revenue", Double),
    FieldSchema::new("number_of_employees", Int),
    FieldSchema::new("address", String),
    FieldSchema::new("city", String),
    FieldSchema::new("state", String),
    FieldSchema::new("postal_code", String),
    FieldSchema::new("country", String),
    FieldSchema::new("lead_source", String),
    FieldSchema::new("lead_status", String),
    FieldSchema::new("lead_score", Int),
    FieldSchema::new("lead_partition_id", Int),
    FieldSchema::new("do_not_call", Boolean),
    FieldSchema::new("person_type", String),
    FieldSchema::new("original_source_type", String),
    FieldSchema::new("acquisition_program_id", Int),
    FieldSchema::new("anonymous_ip", String),
];

const LEAD_LIST_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("id", Int),
    FieldSchema::new("name", String),
    FieldSchema::new("description", String),
    FieldSchema::new("program_name", String),
    FieldSchema::new("workspace_name", String),
    FieldSchema::new("created_at", String),
    FieldSchema::new("updated_at", String),
];

const PROGRAM_FIELDS: &[FieldSchema] = &[
    FieldSchema::new("id", Int),
    FieldSchema::new("name", String),
    FieldSchema::new("description", String),
    FieldSchema::new("type", String),
    FieldSchema::new("channel", String),
    FieldSchema::new("status", String),
    FieldSchema::new("url", String),
    FieldSchema::new("workspace", String),
    FieldSchema::new("folder", Json),
    FieldSchema::new("tags", Json),
    FieldSchema::new("costs", Json),
    FieldSchema::new("created_at", String),
    FieldSchema::new("updated_at", String),
];

pub(super) const ACTIVITIES: EndpointSchema = EndpointSchema {
    name: "activities",
    fields: ACTIVITY_FIELDS,
};

pub(super) const CAMPAIGNS: EndpointSchema = EndpointSchema {
    name: "campaigns",
    fields: CAMPAIGN_FIELDS,
};

pub(super) const LEADS: EndpointSchema = EndpointSchema {
    name: "leads",
    fields: LEAD_FIELDS,
};

pub(super) const LEAD_LISTS: EndpointSchema = EndpointSchema {
    name: "lead_lists",
    fields: LEAD_LIST_FIELDS,
};

pub(super) const PROGRAMS: EndpointSchema = EndpointSchema {
    name: "programs",
    fields: PROGRAM_FIELDS,
};
