//! Canonical clinic record shared by every provider after normalisation.

use serde::Serialize;

use crate::normalize::RecordError;

/// Opening window of a clinic.
///
/// `from` and `to` are kept as the provider sent them (e.g. `"09:00"`);
/// they are only ever compared for exact equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    from: String,
    to: String,
}

impl Availability {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }
}

/// A clinic listing reconciled from one provider's native record.
///
/// The region is serialised under `state` to keep the public output shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clinic {
    name: String,
    #[serde(rename = "state")]
    region: String,
    availability: Availability,
}

impl Clinic {
    /// Build a clinic, rejecting an empty name or region.
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        availability: Availability,
    ) -> Result<Self, RecordError> {
        let name = name.into();
        let region = region.into();
        if name.is_empty() {
            return Err(RecordError::EmptyField { field: "name" });
        }
        if region.is_empty() {
            return Err(RecordError::EmptyField { field: "region" });
        }
        Ok(Self {
            name,
            region,
            availability,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }
}
