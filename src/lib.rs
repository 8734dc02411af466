//! A client for the Ushahidi crowd-reporting API.
//!
//! # Overview
//!
//! Ushahidi deployments collect crowd-submitted incident reports (floods,
//! road closures, outbreaks, ...) with a location, categories and comments.
//! This crate pulls those incidents from a server through a simple
//! "has more / next" interface and can submit new reports.
//!
//! ```ignore
//! let config = ClientConfig::new("https://farmersmarket.crowdmap.com");
//! let mut client = WebClient::connect(&config).await?;
//! while client.has_more_incidents().await {
//!     println!("{}", client.next_incident().await?);
//! }
//! ```
//!
//! # Modules
//!
//! - [`model`]: Incidents, locations, categories and comments
//! - [`wire`]: Parsing the Ushahidi response envelope and incident documents
//! - [`list`]: Append-only incident buffer with a read cursor
//! - [`feed`]: The pull-style [`IncidentFeed`] interface
//! - [`client`]: Paginated fetching from a live server
//! - [`reporter`]: Submitting new reports
//! - [`transport`]: HTTP plumbing

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod feed;
pub mod list;
pub mod model;
pub mod reporter;
pub mod transport;
pub mod wire;

pub use client::{Watermark, WebClient};
pub use config::ClientConfig;
pub use error::{Result, UshahidiError};
pub use feed::IncidentFeed;
pub use list::IncidentList;
pub use model::{Category, Comment, Incident, Location};
pub use reporter::Reporter;
