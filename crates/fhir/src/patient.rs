//! FHIR Patient resource wire model.
//!
//! Only the demographics a search client reads are modelled: names and birth date.

use crate::FhirDate;
use serde::{Deserialize, Serialize};

/// Wire representation of a Patient resource.
///
/// The `resourceType` tag is handled by [`crate::Resource`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    /// A value that is not a valid FHIR date is logged and dropped.
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<FhirDate>,
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<FhirDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match text.parse() {
        Ok(date) => Ok(Some(date)),
        Err(e) => {
            tracing::warn!("ignoring Patient.birthDate: {}", e);
            Ok(None)
        }
    }
}

/// Wire representation of a human name.
///
/// `given` elements are optional because FHIR JSON writes `null` for array items
/// that only carry extensions (the values live in the parallel `_given` array).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct HumanName {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<Option<String>>,
}

impl HumanName {
    /// Convenience constructor for a name with non-null given parts.
    pub fn new<I, S>(given: I, family: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            use_type: None,
            family: family.map(str::to_string),
            given: given.into_iter().map(|g| Some(g.into())).collect(),
        }
    }
}
