//! Conjunctive field filter over normalised clinics.

use crate::clinic::Clinic;

/// Filter on the four queryable clinic fields.
///
/// An empty value only requires the field to be non-empty; any other value
/// must equal the field exactly. All four conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicQuery {
    pub name: String,
    pub region: String,
    pub from: String,
    pub to: String,
}

impl ClinicQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    pub fn matches(&self, clinic: &Clinic) -> bool {
        field_matches(&self.name, clinic.name())
            && field_matches(&self.region, clinic.region())
            && field_matches(&self.from, clinic.availability().from())
            && field_matches(&self.to, clinic.availability().to())
    }

    /// Keep the clinics that match, preserving order.
    pub fn filter(&self, clinics: Vec<Clinic>) -> Vec<Clinic> {
        clinics.into_iter().filter(|c| self.matches(c)).collect()
    }
}

fn field_matches(wanted: &str, actual: &str) -> bool {
    if wanted.is_empty() {
        !actual.is_empty()
    } else {
        wanted == actual
    }
}
