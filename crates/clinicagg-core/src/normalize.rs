//! Reconciles provider-specific record layouts into [`Clinic`].
//!
//! Providers are known to use one of two spellings for each part of a record:
//!
//! | part         | layout A                 | layout B                    |
//! |--------------|--------------------------|-----------------------------|
//! | availability | `availability.{from,to}` | `opening.{from,to}`         |
//! | identity     | `name` + `stateName`     | `clinicName` + `stateCode`  |
//!
//! The two parts are probed independently, first layout wins. A record
//! matching neither layout for a part is dropped whole.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clinic::{Availability, Clinic};

/// Why a raw provider record could not be normalised.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has neither an `availability` nor an `opening` block")]
    MissingAvailability,
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` is not a string")]
    WrongType { field: &'static str },
    #[error("field `{field}` is empty")]
    EmptyField { field: &'static str },
}

const AVAILABILITY_KEYS: [&str; 2] = ["availability", "opening"];

struct IdentityKeys {
    name: &'static str,
    region: &'static str,
}

const NAMED: IdentityKeys = IdentityKeys {
    name: "name",
    region: "stateName",
};

const CODED: IdentityKeys = IdentityKeys {
    name: "clinicName",
    region: "stateCode",
};

/// Normalise a single raw provider record.
pub fn normalize_record(raw: &Value) -> Result<Clinic, RecordError> {
    let record = raw.as_object().ok_or(RecordError::NotAnObject)?;

    let window = AVAILABILITY_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_object))
        .ok_or(RecordError::MissingAvailability)?;
    let availability = Availability::new(
        string_field(window, "from")?,
        string_field(window, "to")?,
    );

    // A null `name` counts as absent.
    let keys = match record.get(NAMED.name) {
        Some(v) if !v.is_null() => &NAMED,
        _ => &CODED,
    };
    let name = string_field(record, keys.name)?;
    let region = string_field(record, keys.region)?;

    Clinic::new(name, region, availability)
}

/// Normalise a batch of raw records, dropping the ones that fail.
///
/// Output order follows input order.
pub fn normalize(records: &[Value]) -> Vec<Clinic> {
    let mut clinics = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        match normalize_record(raw) {
            Ok(clinic) => clinics.push(clinic),
            Err(e) => debug!(index, reason = %e, "dropping provider record"),
        }
    }
    debug!(
        kept = clinics.len(),
        dropped = records.len() - clinics.len(),
        "normalised provider records"
    );
    clinics
}

/// Parse merged provider bytes and normalise every record.
///
/// Bytes that are not a JSON array produce an empty collection.
pub fn parse_collection(bytes: &[u8]) -> Vec<Clinic> {
    match serde_json::from_slice::<Vec<Value>>(bytes) {
        Ok(records) => normalize(&records),
        Err(e) => {
            warn!(error = %e, len = bytes.len(), "merged provider payload is not a JSON array");
            Vec::new()
        }
    }
}

fn string_field(map: &Map<String, Value>, field: &'static str) -> Result<String, RecordError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField { field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(RecordError::WrongType { field }),
    }
}
