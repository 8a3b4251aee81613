//! Constants used throughout the search core crate.

/// Public HAPI FHIR R4 test server.
pub const DEFAULT_BASE_URL: &str = "http://hapi.fhir.org/baseR4";

/// Number of times the full list of names is searched.
pub const DEFAULT_RUNS: usize = 3;

/// Per-request timeout applied by the HTTP transport.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Media type requested from the server.
pub const FHIR_JSON_MIME: &str = "application/fhir+json";

/// Resource type searched by the runner.
pub const PATIENT_RESOURCE: &str = "Patient";

/// Search parameter matching on a patient's family name.
pub const FAMILY_PARAM: &str = "family";
