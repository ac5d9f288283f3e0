//! Fetch → merge → normalise → filter, rebuilt from scratch on every call.

use clinicagg_core::{Clinic, ClinicQuery, merge_fragments, parse_collection};
use thiserror::Error;
use tracing::info;

use crate::http::SourceFetcher;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no response from any clinic source")]
    AllSourcesFailed,
    #[error("failed to serialise clinics: {0}")]
    Marshal(#[from] serde_json::Error),
}

/// Aggregates clinic listings across every configured provider.
pub struct ClinicAggregator {
    fetcher: SourceFetcher,
}

impl ClinicAggregator {
    pub fn new(fetcher: SourceFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &SourceFetcher {
        &self.fetcher
    }

    /// Fetch every provider and return the normalised collection.
    ///
    /// Fails only when no provider returned any bytes. A merged payload
    /// that does not parse yields an empty collection.
    pub async fn collect(&self) -> Result<Vec<Clinic>, FetchError> {
        let bodies: Vec<Vec<u8>> = self
            .fetcher
            .fetch_all()
            .await
            .into_iter()
            .flatten()
            .filter(|body| !body.is_empty())
            .collect();
        if bodies.is_empty() {
            return Err(FetchError::AllSourcesFailed);
        }

        let merged = merge_fragments(&bodies);
        let clinics = parse_collection(&merged);
        info!(
            sources = bodies.len(),
            clinics = clinics.len(),
            "aggregated clinic listings"
        );
        Ok(clinics)
    }

    pub async fn search(&self, query: &ClinicQuery) -> Result<Vec<Clinic>, FetchError> {
        let clinics = self.collect().await?;
        let total = clinics.len();
        let matches = query.filter(clinics);
        info!(total, matched = matches.len(), "evaluated clinic query");
        Ok(matches)
    }

    /// Same as [`search`](Self::search), serialised as a JSON array.
    pub async fn search_json(&self, query: &ClinicQuery) -> Result<String, FetchError> {
        let matches = self.search(query).await?;
        Ok(serde_json::to_string(&matches)?)
    }
}
