//! Paginated incident client for a live Ushahidi server.
//!
//! The client keeps every incident it has fetched in an [`IncidentList`]
//! and hands them out through the [`IncidentFeed`] pull interface. When the
//! buffered incidents run out it asks the server for the next page.
//!
//! # Pagination
//!
//! Ushahidi returns incidents from the highest id to the lowest, so the
//! client pages *backwards*: the first request asks for everything (up to
//! the page limit), and each later request asks only for incidents below
//! the smallest id seen so far:
//!
//! - `GET <server>/api?task=incidents&by=all&limit=<N>`
//! - `GET <server>/api?task=incidents&by=maxid&id=<minId>&limit=<N>`
//!
//! Ids already fetched are never appended twice, so a server that ignores
//! the `maxid` bound produces empty pages instead of an endless loop.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::{ClientConfig, normalize_server};
use crate::error::{Result, UshahidiError};
use crate::feed::IncidentFeed;
use crate::list::IncidentList;
use crate::model::Incident;
use crate::transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
use crate::wire;

/// Smallest and largest incident id observed from the feed.
///
/// Ids that are not positive are never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    min_id: i64,
    max_id: i64,
}

impl Watermark {
    /// Sentinel for "no floor yet".
    const UNBOUNDED: i64 = i64::MAX;

    /// A watermark that has observed nothing.
    pub fn new() -> Self {
        Self {
            min_id: Self::UNBOUNDED,
            max_id: 0,
        }
    }

    /// Whether no id has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.min_id == Self::UNBOUNDED
    }

    /// Widen the watermark to include `id`.
    pub fn observe(&mut self, id: i64) {
        if id <= 0 {
            return;
        }
        self.min_id = self.min_id.min(id);
        self.max_id = self.max_id.max(id);
    }

    /// Lowest id observed, which later pages are requested below.
    pub fn min_id(&self) -> Option<i64> {
        (!self.is_empty()).then_some(self.min_id)
    }

    /// Highest id observed.
    pub fn max_id(&self) -> Option<i64> {
        (!self.is_empty()).then_some(self.max_id)
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::new()
    }
}

/// Client that pulls incidents from an Ushahidi server page by page.
pub struct WebClient<T = ReqwestTransport> {
    transport: T,
    server: String,
    limit: u32,
    incidents: IncidentList,
    watermark: Watermark,
    seen: HashSet<i64>,
}

impl WebClient<ReqwestTransport> {
    /// Connect to the configured server and fetch the first page.
    ///
    /// An empty first page is fine; connection, protocol and server
    /// errors are not.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let transport =
            ReqwestTransport::new(config.timeout).map_err(|e| UshahidiError::Connection {
                server: config.server.clone(),
                reason: e.to_string(),
            })?;
        Self::with_transport(transport, &config.server, config.limit).await
    }
}

impl<T: Transport> WebClient<T> {
    /// Build a client over an arbitrary transport and fetch the first page.
    ///
    /// # Arguments
    ///
    /// * `transport` - Sends the HTTP requests
    /// * `server` - Protocol plus host, e.g. `https://farmersmarket.crowdmap.com`
    /// * `limit` - Maximum number of incidents per page
    pub async fn with_transport(transport: T, server: &str, limit: u32) -> Result<Self> {
        let mut client = Self {
            transport,
            server: normalize_server(server),
            limit,
            incidents: IncidentList::new(),
            watermark: Watermark::new(),
            seen: HashSet::new(),
        };

        let count = client.fetch_page().await?;
        debug!(server = %client.server, count, "Connected to Ushahidi server");

        Ok(client)
    }

    /// Server base URL, without a trailing slash.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Maximum number of incidents requested per page.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Id range of everything appended so far.
    pub fn watermark(&self) -> Watermark {
        self.watermark
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Everything fetched so far, with the read cursor.
    pub fn buffered(&self) -> &IncidentList {
        &self.incidents
    }

    /// URL of the next page to request.
    pub fn page_url(&self) -> String {
        match self.watermark.min_id() {
            None => format!(
                "{}/api?task=incidents&by=all&limit={}",
                self.server, self.limit
            ),
            Some(floor) => format!(
                "{}/api?task=incidents&by=maxid&id={}&limit={}",
                self.server, floor, self.limit
            ),
        }
    }

    /// Fetch one page and append its new incidents.
    ///
    /// Returns how many incidents were appended. Entries that fail to
    /// parse are skipped without failing the page.
    ///
    /// Entries whose id is zero or negative are not appended either, even
    /// though they parse. Such an entry can never lower the floor, so
    /// keeping it would let a server that repeats it make
    /// [`IncidentFeed::incidents`] loop forever. Ids fetched before are
    /// dropped for the same reason.
    #[instrument(level = "debug", skip_all, fields(server = %self.server))]
    pub async fn fetch_page(&mut self) -> Result<usize> {
        let url = self.page_url();
        let sent = self.transport.get(&url).await;
        let document = read_envelope(&self.server, sent)?;
        let entries = wire::payload_incidents(&document)?;

        let mut appended = 0;
        for (index, entry) in entries.iter().enumerate() {
            let incident = match wire::parse_incident(entry) {
                Ok(incident) => incident,
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed incident");
                    continue;
                }
            };
            if !incident.has_assigned_id() {
                warn!(index, id = incident.id, "Skipping incident without a server-assigned id");
                continue;
            }
            if !self.seen.insert(incident.id) {
                debug!(id = incident.id, "Skipping incident already fetched");
                continue;
            }

            self.watermark.observe(incident.id);
            self.incidents.append(incident);
            appended += 1;
        }

        debug!(
            url = %url,
            received = entries.len(),
            appended,
            min_id = ?self.watermark.min_id(),
            max_id = ?self.watermark.max_id(),
            "Fetched incident page"
        );

        Ok(appended)
    }

    /// Fetch once, turning errors into "nothing fetched".
    async fn fetch_best_effort(&mut self) -> usize {
        match self.fetch_page().await {
            Ok(count) => count,
            Err(e) => {
                warn!(server = %self.server, error = %e, "Incident fetch failed");
                0
            }
        }
    }
}

impl<T: Transport> IncidentFeed for WebClient<T> {
    async fn has_more_incidents(&mut self) -> bool {
        self.incidents.has_next() || self.fetch_best_effort().await > 0
    }

    async fn next_incident(&mut self) -> Result<Incident> {
        if !self.incidents.has_next() && self.fetch_page().await? == 0 {
            return Err(UshahidiError::Exhausted);
        }
        self.incidents.next()
    }

    async fn incidents(&mut self) -> Vec<Incident> {
        while self.fetch_best_effort().await > 0 {}
        self.incidents.all()
    }

    async fn has_more_matching<P>(&mut self, pred: P) -> bool
    where
        P: Fn(&Incident) -> bool + Send + Sync,
    {
        loop {
            self.incidents.skip_unmatched(&pred);
            if self.incidents.has_next() {
                return true;
            }
            if self.fetch_best_effort().await == 0 {
                return false;
            }
        }
    }

    async fn next_matching<P>(&mut self, pred: P) -> Result<Incident>
    where
        P: Fn(&Incident) -> bool + Send + Sync,
    {
        loop {
            self.incidents.skip_unmatched(&pred);
            if self.incidents.has_next() {
                return self.incidents.next();
            }
            if self.fetch_page().await? == 0 {
                return Err(UshahidiError::Exhausted);
            }
        }
    }
}

/// Turn a transport result into a checked response envelope.
pub(crate) fn read_envelope(
    server: &str,
    sent: std::result::Result<HttpResponse, TransportError>,
) -> Result<Value> {
    let response = sent.map_err(|e| UshahidiError::Connection {
        server: server.to_string(),
        reason: e.to_string(),
    })?;

    if !response.is_success() {
        return Err(UshahidiError::Connection {
            server: server.to_string(),
            reason: format!("server responded with HTTP {}", response.status),
        });
    }

    wire::parse_envelope(&response.body)
}
