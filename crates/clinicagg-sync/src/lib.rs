//! Provider I/O: concurrent source fetching and the aggregation pipeline.

pub mod http;
pub mod pipeline;

pub use http::{SourceError, SourceFetcher};
pub use pipeline::{ClinicAggregator, FetchError};
