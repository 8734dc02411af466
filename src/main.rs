//! Lists every incident on an Ushahidi server.
//!
//! # Configuration
//!
//! - `USHAHIDI_SERVER` - Server to read from (the first argument overrides it)
//! - `USHAHIDI_LIMIT` - Incidents per page (default 5000)
//! - `USHAHIDI_TIMEOUT_SECS` - Request timeout (default 30)
//! - `RUST_LOG` - Log filter (default `ushahidi=info`)

use std::env;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ushahidi::config::normalize_server;
use ushahidi::{ClientConfig, IncidentFeed, WebClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only incidents
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("ushahidi=info".parse()?))
        .init();

    let config = match (env::args().nth(1), ClientConfig::from_env()) {
        (Some(server), Some(config)) => ClientConfig {
            server: normalize_server(&server),
            ..config
        },
        (Some(server), None) => ClientConfig::new(&server),
        (None, config) => {
            config.context("no server given: pass one as an argument or set USHAHIDI_SERVER")?
        }
    };

    info!(server = %config.server, limit = config.limit, "Connecting to Ushahidi server");

    let mut client = WebClient::connect(&config).await?;

    let mut count = 0usize;
    while client.has_more_incidents().await {
        let incident = client.next_incident().await?;
        println!("{incident}");
        count += 1;
    }

    info!(count, "Done");

    Ok(())
}
