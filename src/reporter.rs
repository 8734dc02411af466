//! Submitting new incident reports.
//!
//! Reports are POSTed to `<server>/api` as a form:
//!
//! ```text
//! task=report&incident_title=...&incident_description=...
//!     &incident_date=MM/DD/YYYY&incident_hour=1-12&incident_ampm=am|pm
//!     &incident_minute=0-59&incident_category=1,4&latitude=..&longitude=..
//!     &location_name=...
//! ```
//!
//! The response uses the same `error` envelope as the incident feed.

use chrono::{NaiveDateTime, Timelike};
use tracing::{info, instrument};

use crate::client::read_envelope;
use crate::config::{ClientConfig, normalize_server};
use crate::error::{Result, UshahidiError};
use crate::model::{Incident, Location};
use crate::transport::{ReqwestTransport, Transport};

/// Date format the report endpoint expects.
const REPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Sends reports to one server.
pub struct Reporter<T = ReqwestTransport> {
    transport: T,
    server: String,
}

impl Reporter<ReqwestTransport> {
    /// Reporter for the configured server over HTTP.
    ///
    /// Fails with [`UshahidiError::Connection`] if the HTTP client cannot
    /// be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport =
            ReqwestTransport::new(config.timeout).map_err(|e| UshahidiError::Connection {
                server: config.server.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self::with_transport(transport, &config.server))
    }
}

impl<T: Transport> Reporter<T> {
    /// Reporter for `server` over an arbitrary transport.
    pub fn with_transport(transport: T, server: &str) -> Self {
        Self {
            transport,
            server: normalize_server(server),
        }
    }

    /// The transport reports go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate `incident` and submit it.
    pub async fn submit(&self, incident: &Incident) -> Result<()> {
        submit(&self.transport, &self.server, incident).await
    }
}

/// Validate `incident` and submit it to `server`.
///
/// Validation happens before any request is made.
#[instrument(skip_all, fields(server = %server, title = %incident.title))]
pub async fn submit<T: Transport>(transport: &T, server: &str, incident: &Incident) -> Result<()> {
    let body = form_body(incident)?;
    let server = normalize_server(server);
    let url = format!("{server}/api");

    let sent = transport.post_form(&url, body).await;
    read_envelope(&server, sent)?;

    info!("Report submitted");
    Ok(())
}

/// The parts of an incident a report needs, once checked.
struct Checked<'a> {
    date: NaiveDateTime,
    location: &'a Location,
    latitude: f64,
    longitude: f64,
}

fn check(incident: &Incident) -> Result<Checked<'_>> {
    let invalid = |field| UshahidiError::Validation { field };

    if incident.title.trim().is_empty() {
        return Err(invalid("title"));
    }
    if incident.description.trim().is_empty() {
        return Err(invalid("description"));
    }
    let date = incident.date.ok_or(invalid("date"))?;
    let location = incident.location.as_ref().ok_or(invalid("location"))?;
    let latitude = location
        .latitude
        .filter(|lat| (-90.0..=90.0).contains(lat))
        .ok_or(invalid("latitude"))?;
    let longitude = location
        .longitude
        .filter(|lon| (-180.0..=180.0).contains(lon))
        .ok_or(invalid("longitude"))?;
    if incident.categories.is_empty() {
        return Err(invalid("category"));
    }

    Ok(Checked {
        date,
        location,
        latitude,
        longitude,
    })
}

/// Check that `incident` has everything a report needs.
pub fn validate(incident: &Incident) -> Result<()> {
    check(incident).map(|_| ())
}

/// Build the URL-encoded form body for `incident`.
pub fn form_body(incident: &Incident) -> Result<String> {
    let checked = check(incident)?;
    let (is_pm, hour) = checked.date.hour12();
    let categories = incident
        .categories
        .iter()
        .map(|c| c.id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let fields = [
        ("task", "report".to_string()),
        ("incident_title", urlencoding::encode(&incident.title).into_owned()),
        (
            "incident_description",
            urlencoding::encode(&incident.description).into_owned(),
        ),
        (
            "incident_date",
            urlencoding::encode(&checked.date.format(REPORT_DATE_FORMAT).to_string()).into_owned(),
        ),
        ("incident_hour", hour.to_string()),
        ("incident_ampm", if is_pm { "pm" } else { "am" }.to_string()),
        ("incident_minute", checked.date.minute().to_string()),
        ("incident_category", categories),
        ("latitude", checked.latitude.to_string()),
        ("longitude", checked.longitude.to_string()),
        (
            "location_name",
            urlencoding::encode(&checked.location.name).into_owned(),
        ),
    ];

    Ok(fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&"))
}
