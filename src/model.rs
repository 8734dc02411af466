//! Data models for Ushahidi incidents.
//!
//! An [`Incident`] is one crowd-submitted report. Incidents fetched from a
//! server are built by [`crate::wire::parse_incident`]; incidents meant for
//! submission are built by hand with [`Incident::new`] and the public
//! fields.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UshahidiError};

/// A single incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Server-assigned id. Zero or negative means "not yet assigned".
    pub id: i64,

    /// Short title.
    pub title: String,

    /// Free-form description.
    pub description: String,

    /// When the incident happened.
    pub date: Option<NaiveDateTime>,

    /// Reporting mode (web, SMS, email, ...). Opaque to this crate.
    pub mode: i64,

    /// Whether the incident is approved for display.
    pub active: bool,

    /// Whether the incident has been verified by an administrator.
    pub verified: bool,

    /// Where the incident happened, if known.
    pub location: Option<Location>,

    /// Categories the incident is filed under.
    #[serde(default)]
    pub categories: Vec<Category>,

    /// Comments attached to the incident.
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Photos, videos and links attached to the incident, as sent by the
    /// server.
    #[serde(default)]
    pub media: Vec<serde_json::Value>,

    /// Deployment-specific custom fields, by name.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, serde_json::Value>,
}

impl Incident {
    /// Create an unsubmitted incident with just an id and a title.
    pub fn new(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: String::new(),
            date: None,
            mode: 0,
            active: false,
            verified: false,
            location: None,
            categories: Vec::new(),
            comments: Vec::new(),
            media: Vec::new(),
            custom_fields: BTreeMap::new(),
        }
    }

    /// Whether the id was assigned by a server.
    pub fn has_assigned_id(&self) -> bool {
        self.id > 0
    }

    /// Look up a custom field by name, ignoring case.
    ///
    /// Names are compared after Unicode lowercasing, so `"Évacuation"`
    /// matches `"évacuation"`.
    ///
    /// # Errors
    ///
    /// Returns [`UshahidiError::NotFound`] when no field has that name.
    pub fn custom_field(&self, name: &str) -> Result<&serde_json::Value> {
        let wanted = name.to_lowercase();
        self.custom_fields
            .iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
            .map(|(_, value)| value)
            .ok_or_else(|| UshahidiError::NotFound(name.to_string()))
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INCIDENT [Title: {}, ID: {}, Description: {}, Date: ",
            self.title, self.id, self.description
        )?;
        match self.date {
            Some(date) => write!(f, "{}", date.format(crate::wire::DATE_FORMAT))?,
            None => write!(f, "unknown")?,
        }
        match &self.location {
            Some(location) => write!(f, ", Location: {location}")?,
            None => write!(f, ", Location: none")?,
        }
        write!(f, "]")
    }
}

/// Where an incident happened.
///
/// The feed omits location data inconsistently, so every coordinate is
/// optional on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Option<i64>,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Location {
    /// Create a location with every field set.
    ///
    /// # Arguments
    ///
    /// * `id` - Server-side location id (zero for a new location)
    /// * `name` - Place name shown with the incident
    /// * `latitude` - Degrees north, -90 to 90
    /// * `longitude` - Degrees east, -180 to 180
    pub fn new(id: i64, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Both coordinates, when the location has them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show<T: fmt::Display>(value: Option<T>) -> String {
            value.map_or_else(|| "unset".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "LOCATION [ID: {}, Name: {}, Latitude: {}, Longitude: {}]",
            show(self.id),
            self.name,
            show(self.latitude),
            show(self.longitude)
        )
    }
}

/// A category reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    /// Reference the category with `id`. The server files reports by id;
    /// `name` is only for display.
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.id)
    }
}

/// A comment left on an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,

    /// Id of the incident this comment belongs to.
    pub incident_id: i64,

    pub author: String,
    pub text: String,
    pub date: NaiveDateTime,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Comment {} on {}: \"{}\" by {} on {}",
            self.id,
            self.incident_id,
            self.text,
            self.author,
            self.date.format(crate::wire::DATE_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_incident() -> Incident {
        Incident {
            description: "Farmers market opens".to_string(),
            date: NaiveDate::from_ymd_opt(2013, 9, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0)),
            active: true,
            verified: true,
            location: Some(Location::new(100, "Grinnell", 41.7436, -92.7247)),
            ..Incident::new(1, "Sample Incident")
        }
    }

    #[test]
    fn test_new_incident_has_no_assigned_id() {
        assert!(!Incident::new(0, "Draft").has_assigned_id());
        assert!(!Incident::new(-3, "Draft").has_assigned_id());
        assert!(Incident::new(12, "Real").has_assigned_id());
    }

    #[test]
    fn test_custom_field_lookup_ignores_case() {
        let mut incident = sample_incident();
        incident
            .custom_fields
            .insert("Water Level".to_string(), serde_json::json!("high"));

        assert_eq!(
            incident.custom_field("water level").unwrap(),
            &serde_json::json!("high")
        );
        assert_eq!(
            incident.custom_field("WATER LEVEL").unwrap(),
            &serde_json::json!("high")
        );
    }

    #[test]
    fn test_custom_field_lookup_folds_non_ascii_case() {
        let mut incident = sample_incident();
        incident
            .custom_fields
            .insert("Évacuation".to_string(), serde_json::json!(1));
        incident
            .custom_fields
            .insert("Niveau d'Eau Élevé".to_string(), serde_json::json!("oui"));

        assert_eq!(
            incident.custom_field("évacuation").unwrap(),
            &serde_json::json!(1)
        );
        assert_eq!(
            incident.custom_field("NIVEAU D'EAU ÉLEVÉ").unwrap(),
            &serde_json::json!("oui")
        );
        assert!(incident.custom_field("evacuation").is_err());
    }

    #[test]
    fn test_custom_field_miss_is_not_found() {
        let incident = sample_incident();
        let err = incident.custom_field("rainfall").unwrap_err();
        assert!(matches!(err, UshahidiError::NotFound(name) if name == "rainfall"));
    }

    #[test]
    fn test_incident_display() {
        let text = sample_incident().to_string();
        assert!(text.starts_with("INCIDENT [Title: Sample Incident, ID: 1,"));
        assert!(text.contains("Date: 2013-09-01 09:30:00"));
        assert!(text.contains("LOCATION [ID: 100, Name: Grinnell"));
    }

    #[test]
    fn test_location_display_marks_unset_coordinates() {
        let location = Location {
            id: None,
            name: "Somewhere".to_string(),
            latitude: None,
            longitude: Some(2.5),
        };
        assert_eq!(
            location.to_string(),
            "LOCATION [ID: unset, Name: Somewhere, Latitude: unset, Longitude: 2.5]"
        );
        assert_eq!(location.coordinates(), None);
    }

    #[test]
    fn test_category_and_comment_display() {
        assert_eq!(Category::new(4, "Flooding").to_string(), "Flooding/4");

        let comment = Comment {
            id: 9,
            incident_id: 1,
            author: "sam".to_string(),
            text: "Still closed".to_string(),
            date: NaiveDate::from_ymd_opt(2014, 9, 24)
                .and_then(|d| d.and_hms_opt(8, 0, 0))
                .unwrap(),
        };
        assert_eq!(
            comment.to_string(),
            "Comment 9 on 1: \"Still closed\" by sam on 2014-09-24 08:00:00"
        );
    }
}
