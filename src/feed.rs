//! Pull-style access to a stream of incidents.

use std::future::Future;

use crate::error::{Result, UshahidiError};
use crate::list::IncidentList;
use crate::model::Incident;

/// A source of incidents consumed one at a time.
///
/// Implementations backed by a server may perform network requests inside
/// any of these methods, including the ones that look like plain queries:
/// [`has_more_incidents`](Self::has_more_incidents) fetches the next page
/// when nothing unread is buffered, and callers rely on that.
pub trait IncidentFeed {
    /// Whether another incident can be read, fetching more if needed.
    ///
    /// Never fails: a fetch error is reported as `false`.
    fn has_more_incidents(&mut self) -> impl Future<Output = bool> + Send;

    /// The next unread incident, fetching more if needed.
    fn next_incident(&mut self) -> impl Future<Output = Result<Incident>> + Send;

    /// Every incident currently obtainable, in the order it was received.
    fn incidents(&mut self) -> impl Future<Output = Vec<Incident>> + Send;

    /// Like [`has_more_incidents`](Self::has_more_incidents), but only
    /// incidents satisfying `pred` count. Non-matching incidents are
    /// consumed.
    fn has_more_matching<P>(&mut self, pred: P) -> impl Future<Output = bool> + Send
    where
        P: Fn(&Incident) -> bool + Send + Sync;

    /// The next unread incident satisfying `pred`. Non-matching incidents
    /// are consumed.
    fn next_matching<P>(&mut self, pred: P) -> impl Future<Output = Result<Incident>> + Send
    where
        P: Fn(&Incident) -> bool + Send + Sync;
}

/// An in-memory feed, handy for exercising feed consumers without a
/// server.
impl IncidentFeed for IncidentList {
    async fn has_more_incidents(&mut self) -> bool {
        self.has_next()
    }

    async fn next_incident(&mut self) -> Result<Incident> {
        self.next()
    }

    async fn incidents(&mut self) -> Vec<Incident> {
        self.all()
    }

    async fn has_more_matching<P>(&mut self, pred: P) -> bool
    where
        P: Fn(&Incident) -> bool + Send + Sync,
    {
        self.skip_unmatched(&pred);
        self.has_next()
    }

    async fn next_matching<P>(&mut self, pred: P) -> Result<Incident>
    where
        P: Fn(&Incident) -> bool + Send + Sync,
    {
        self.skip_unmatched(&pred);
        if !self.has_next() {
            return Err(UshahidiError::Exhausted);
        }
        self.next()
    }
}
