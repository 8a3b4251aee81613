//! FHIR R4 wire support for the patient search client.
//!
//! This crate provides **wire models** for the small slice of FHIR R4 JSON that a
//! patient search returns:
//! - `Bundle` search-set pages and their entries
//! - a tagged `Resource` union (Patient, OperationOutcome, anything else)
//! - `HumanName` and FHIR partial dates
//!
//! This crate focuses on:
//! - serialisation/deserialisation of server responses
//! - path-aware schema errors for responses that do not match the models
//!
//! It does NOT validate resources against FHIR profiles and ignores JSON properties
//! it does not model, since real servers send far more than a search client reads.

pub mod bundle;
pub mod date;
pub mod patient;
pub mod resource;

pub use bundle::{Bundle, BundleEntry, BundleLink, EntrySearch};
pub use date::FhirDate;
pub use patient::{HumanName, Patient};
pub use resource::{OperationOutcome, OperationOutcomeIssue, Resource};

/// Errors returned by the `fhir` wire crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid FHIR date: {0}")]
    InvalidDate(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
