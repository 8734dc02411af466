//! Client configuration.

use std::env;
use std::time::Duration;

use crate::transport::DEFAULT_TIMEOUT;

/// Default number of incidents requested per page.
pub const DEFAULT_LIMIT: u32 = 5000;

/// Where to fetch from and how much to ask for at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Protocol plus host, e.g. `https://farmersmarket.crowdmap.com`.
    pub server: String,

    /// Maximum number of incidents per page.
    pub limit: u32,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration for `server` with a page limit of 5000 and a 30 second
    /// timeout.
    ///
    /// Surrounding whitespace and trailing slashes are removed from `server`.
    pub fn new(server: &str) -> Self {
        Self {
            server: normalize_server(server),
            limit: DEFAULT_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the maximum number of incidents per page.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from the environment.
    ///
    /// - `USHAHIDI_SERVER` (required)
    /// - `USHAHIDI_LIMIT` (default 5000)
    /// - `USHAHIDI_TIMEOUT_SECS` (default 30)
    ///
    /// Unparsable numbers fall back to their defaults. Returns `None` when
    /// no server is configured.
    pub fn from_env() -> Option<Self> {
        let server = env::var("USHAHIDI_SERVER").ok()?;
        Some(Self::from_vars(
            &server,
            env::var("USHAHIDI_LIMIT").ok().as_deref(),
            env::var("USHAHIDI_TIMEOUT_SECS").ok().as_deref(),
        ))
    }

    fn from_vars(server: &str, limit: Option<&str>, timeout_secs: Option<&str>) -> Self {
        let limit = limit
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(DEFAULT_LIMIT);
        let timeout = timeout_secs
            .and_then(|t| t.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self::new(server).with_limit(limit).with_timeout(timeout)
    }
}

/// Strip trailing slashes so that `/api` can be appended directly.
pub fn normalize_server(server: &str) -> String {
    server.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_server() {
        assert_eq!(
            normalize_server("https://farmersmarket.crowdmap.com/"),
            "https://farmersmarket.crowdmap.com"
        );
        assert_eq!(normalize_server(" http://localhost:8080// "), "http://localhost:8080");
        assert_eq!(normalize_server("http://host"), "http://host");
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("http://host/");
        assert_eq!(config.server, "http://host");
        assert_eq!(config.limit, DEFAULT_LIMIT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_from_vars() {
        let config = ClientConfig::from_vars("http://host", Some("25"), Some("5"));
        assert_eq!(config.limit, 25);
        assert_eq!(config.timeout, Duration::from_secs(5));

        let config = ClientConfig::from_vars("http://host", Some("lots"), Some("-1"));
        assert_eq!(config.limit, DEFAULT_LIMIT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
