pub mod clinic;
pub mod merge;
pub mod normalize;
pub mod query;

pub use clinic::{Availability, Clinic};
pub use merge::merge_fragments;
pub use normalize::{RecordError, normalize, normalize_record, parse_collection};
pub use query::ClinicQuery;
