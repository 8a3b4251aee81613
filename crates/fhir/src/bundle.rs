//! FHIR Bundle wire model and JSON parsing.
//!
//! A search returns one page of results as a `searchset` bundle. Entries may hold
//! any resource type; filtering is left to callers.

use crate::{FhirError, FhirResult, Resource};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public types
// ============================================================================

/// One page of search results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bundle {
    /// Bundle type (`searchset` for search results).
    pub bundle_type: Option<String>,

    /// Total number of matches on the server, when reported.
    pub total: Option<u32>,

    /// Paging links (`self`, `next`, ...).
    pub link: Vec<BundleLink>,

    /// Entries in server order.
    pub entry: Vec<BundleEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<EntrySearch>,
}

/// Why an entry is in a search result (`match`, `include` or `outcome`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EntrySearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Bundle {
    /// Build a `searchset` bundle holding the given resources.
    pub fn searchset<I>(resources: I) -> Self
    where
        I: IntoIterator<Item = Resource>,
    {
        let entry: Vec<BundleEntry> = resources
            .into_iter()
            .map(|resource| BundleEntry {
                resource: Some(resource),
                ..BundleEntry::default()
            })
            .collect();

        Self {
            bundle_type: Some("searchset".to_string()),
            total: u32::try_from(entry.len()).ok(),
            link: Vec::new(),
            entry,
        }
    }

    /// Parse a bundle from FHIR JSON text.
    ///
    /// Schema mismatches are reported with a best-effort path to the failing field
    /// (for example `entry[0].fullUrl`).
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not JSON matching the bundle wire schema,
    /// - `resourceType` is not "Bundle".
    pub fn parse_json(json_text: &str) -> FhirResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let wire = match serde_path_to_error::deserialize::<_, BundleWire>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(FhirError::Translation(format!(
                    "Bundle schema mismatch at {path}: {source}"
                )));
            }
        };
        deserializer.end()?;

        if wire.resource_type != "Bundle" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Bundle', got '{}'",
                wire.resource_type
            )));
        }

        Ok(wire.into())
    }

    /// Render the bundle as FHIR JSON text.
    pub fn render_json(&self) -> FhirResult<String> {
        Ok(serde_json::to_string(&BundleWire::from(self))?)
    }

    /// URL of the next page, when the server reported one.
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|link| link.relation == "next")
            .map(|link| link.url.as_str())
    }

    /// Iterate over the resources of all entries that carry one.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|entry| entry.resource.as_ref())
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize)]
struct BundleWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    bundle_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    total: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    link: Vec<BundleLink>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    entry: Vec<BundleEntry>,
}

impl From<BundleWire> for Bundle {
    fn from(wire: BundleWire) -> Self {
        Self {
            bundle_type: wire.bundle_type,
            total: wire.total,
            link: wire.link,
            entry: wire.entry,
        }
    }
}

impl From<&Bundle> for BundleWire {
    fn from(bundle: &Bundle) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            bundle_type: bundle.bundle_type.clone(),
            total: bundle.total,
            link: bundle.link.clone(),
            entry: bundle.entry.clone(),
        }
    }
}
