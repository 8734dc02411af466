//! The Ushahidi wire format.
//!
//! Every API response is wrapped in an envelope:
//!
//! ```json
//! {
//!     "payload": { "incidents": [ ... ] },
//!     "error": { "code": "0", "message": "No Error" }
//! }
//! ```
//!
//! Some servers emit raw text (PHP notices, BOMs) ahead of the JSON, so the
//! body is always read starting at its first `{`.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::document::Document;
use crate::error::{Result, UshahidiError};
use crate::model::{Category, Comment, Incident, Location};

/// Format of incident and comment dates in the feed.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const INVALID_RESPONSE: &str = "server returned invalid response";
const MISSING_STATUS: &str = "server failed to return status";

/// Parse a response body and check its `error` envelope.
///
/// Returns the whole document when the server reports code 0.
pub fn parse_envelope(body: &str) -> Result<Value> {
    let start = body
        .find('{')
        .ok_or_else(|| UshahidiError::Protocol(INVALID_RESPONSE.to_string()))?;

    // Only the first JSON value counts; anything after it is ignored.
    let mut values = serde_json::Deserializer::from_str(&body[start..]).into_iter::<Value>();
    let document = match values.next() {
        Some(Ok(document)) => document,
        _ => return Err(UshahidiError::Protocol(INVALID_RESPONSE.to_string())),
    };

    let error = document
        .object("error")
        .ok_or_else(|| UshahidiError::Protocol(INVALID_RESPONSE.to_string()))?;
    let code = error
        .int("code")
        .ok_or_else(|| UshahidiError::Protocol(MISSING_STATUS.to_string()))?;

    if code != 0 {
        return Err(UshahidiError::Server {
            code,
            message: error.text("message").unwrap_or("unknown error").to_string(),
        });
    }

    Ok(document)
}

/// The `payload.incidents` list of a successful response.
pub fn payload_incidents(document: &Value) -> Result<&[Value]> {
    document
        .object("payload")
        .and_then(|payload| payload.list("incidents"))
        .ok_or_else(|| {
            UshahidiError::Protocol("server response is missing payload.incidents".to_string())
        })
}

/// Parse one entry of `payload.incidents`.
///
/// The basic incident fields are required and any problem with them
/// rejects the whole entry. Location fields, categories, comments and
/// custom fields are best-effort.
pub fn parse_incident(entry: &Value) -> Result<Incident> {
    let fields = entry
        .object("incident")
        .ok_or_else(|| UshahidiError::Parse("missing `incident` object".to_string()))?;

    let date_text = required_text(fields, "incidentdate")?;
    let date = NaiveDateTime::parse_from_str(date_text.trim(), DATE_FORMAT).map_err(|e| {
        UshahidiError::Parse(format!("invalid `incidentdate` {date_text:?}: {e}"))
    })?;

    Ok(Incident {
        id: required_int(fields, "incidentid")?,
        title: required_text(fields, "incidenttitle")?.to_string(),
        description: required_text(fields, "incidentdescription")?.to_string(),
        date: Some(date),
        mode: required_int(fields, "incidentmode")?,
        active: required_int(fields, "incidentactive")? != 0,
        verified: required_int(fields, "incidentverified")? != 0,
        location: parse_location(fields),
        categories: entry
            .list("categories")
            .unwrap_or(&[])
            .iter()
            .filter_map(parse_category)
            .collect(),
        comments: entry
            .list("comments")
            .unwrap_or(&[])
            .iter()
            .filter_map(parse_comment)
            .collect(),
        media: entry.list("media").map(<[Value]>::to_vec).unwrap_or_default(),
        custom_fields: parse_custom_fields(entry.field("customfields")),
    })
}

fn required_text<'a>(fields: &'a Value, key: &str) -> Result<&'a str> {
    fields
        .text(key)
        .ok_or_else(|| UshahidiError::Parse(format!("missing or invalid `{key}`")))
}

fn required_int(fields: &Value, key: &str) -> Result<i64> {
    fields
        .int(key)
        .ok_or_else(|| UshahidiError::Parse(format!("missing or invalid `{key}`")))
}

const LOCATION_KEYS: [&str; 4] = [
    "locationid",
    "locationname",
    "locationlatitude",
    "locationlongitude",
];

fn parse_location(fields: &Value) -> Option<Location> {
    if LOCATION_KEYS.iter().all(|key| fields.field(key).is_none()) {
        return None;
    }

    Some(Location {
        id: fields.int("locationid").filter(|id| *id > 0),
        name: fields.text("locationname").unwrap_or_default().to_string(),
        latitude: fields.float("locationlatitude"),
        longitude: fields.float("locationlongitude"),
    })
}

/// Parse a `{"category": {"id", "title"}}` entry.
pub fn parse_category(entry: &Value) -> Option<Category> {
    let category = entry.object("category").unwrap_or(entry);
    Some(Category {
        id: category.int("id")?,
        name: category
            .text("title")
            .or_else(|| category.text("name"))?
            .to_string(),
    })
}

/// Parse a `{"comment": {...}}` entry.
pub fn parse_comment(entry: &Value) -> Option<Comment> {
    let comment = entry.object("comment").unwrap_or(entry);
    let date = comment.text("comment_date")?;
    Some(Comment {
        id: comment.int("id")?,
        incident_id: comment.int("incident_id")?,
        author: comment.text("comment_author")?.to_string(),
        text: comment.text("comment_description")?.to_string(),
        date: NaiveDateTime::parse_from_str(date.trim(), DATE_FORMAT).ok()?,
    })
}

/// Custom fields come either as a plain object or as a list of
/// `{"field_name", "field_response"}` pairs.
fn parse_custom_fields(value: Option<&Value>) -> BTreeMap<String, Value> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let name = item.text("field_name")?;
                let response = item.field("field_response").cloned().unwrap_or(Value::Null);
                Some((name.to_string(), response))
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}
