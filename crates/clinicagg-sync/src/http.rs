//! HTTP fetcher for the configured clinic provider endpoints.

use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Failure of a single provider fetch. Never fatal on its own.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("source returned {status}")]
    Server { status: u16 },
}

/// Fetches every configured provider concurrently, one attempt each.
pub struct SourceFetcher {
    client: reqwest::Client,
    sources: Vec<String>,
}

impl SourceFetcher {
    /// Create a fetcher for the given provider URLs.
    ///
    /// `timeout`, if set, bounds each request; otherwise requests run until
    /// the transport gives up.
    pub fn new(sources: Vec<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, sources))
    }

    /// Create a fetcher around an existing client, keeping its timeout and
    /// connection settings.
    pub fn with_client(client: reqwest::Client, sources: Vec<String>) -> Self {
        Self { client, sources }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Fetch every source and return one slot per source, in configured order.
    ///
    /// A slot is `None` when its source failed. All fetches run to
    /// completion before this returns.
    pub async fn fetch_all(&self) -> Vec<Option<Vec<u8>>> {
        let mut tasks = JoinSet::new();
        for (slot, url) in self.sources.iter().enumerate() {
            let client = self.client.clone();
            let url = url.clone();
            tasks.spawn(async move { (slot, fetch_source(&client, &url).await) });
        }

        let mut slots: Vec<Option<Vec<u8>>> = vec![None; self.sources.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, Ok(body))) => {
                    debug!(url = %self.sources[slot], bytes = body.len(), "source fetched");
                    slots[slot] = Some(body);
                }
                Ok((slot, Err(e))) => {
                    warn!(url = %self.sources[slot], error = %e, "source unavailable");
                }
                Err(e) => warn!(error = %e, "source fetch task failed"),
            }
        }

        let fetched = slots.iter().filter(|s| s.is_some()).count();
        info!(fetched, total = slots.len(), "fetched clinic sources");
        slots
    }
}

async fn fetch_source(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, SourceError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Server {
            status: status.as_u16(),
        });
    }
    Ok(resp.bytes().await?.to_vec())
}
