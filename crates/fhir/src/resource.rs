//! Tagged union over the resource kinds a patient search can return.

use crate::Patient;
use serde::{Deserialize, Serialize};

/// A resource inside a bundle entry, discriminated by its `resourceType`.
///
/// Every resource type this client does not model deserializes to
/// [`Resource::Unknown`] so that heterogeneous bundles still parse.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "resourceType")]
pub enum Resource {
    Patient(Patient),
    OperationOutcome(OperationOutcome),
    #[serde(other)]
    Unknown,
}

impl Resource {
    /// Returns the patient when this resource is one.
    pub fn as_patient(&self) -> Option<&Patient> {
        match self {
            Resource::Patient(patient) => Some(patient),
            Resource::OperationOutcome(_) | Resource::Unknown => None,
        }
    }
}

/// Wire representation of an OperationOutcome resource.
///
/// Servers add these to search results (search mode `outcome`) to report warnings.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OperationOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue: Vec<OperationOutcomeIssue>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct OperationOutcomeIssue {
    #[serde(default)]
    pub severity: String,

    #[serde(default)]
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}
