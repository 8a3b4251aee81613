//! # Search Core
//!
//! Core logic for the patient search client.
//!
//! This crate contains:
//! - the FHIR search transport (`FhirClient`, `HttpFhirClient`) and its interceptor hooks
//! - round-trip latency instrumentation (`LatencyAggregate`, `ResponseTimeInterceptor`)
//! - mapping of search bundles into flat patient records
//! - the runner that repeats searches and reports per-run averages
//!
//! **No process concerns**: argument parsing and logging setup belong in the binary.

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod interceptor;
pub mod latency;
pub mod mapper;
pub mod runner;

pub use client::{
    CacheDirective, FhirClient, HttpFhirClient, HttpFhirClientBuilder, SearchRequest,
};
pub use config::SearchConfig;
pub use error::{ClientError, ClientResult, SearchError, SearchResult};
pub use interceptor::{ClientInterceptor, LoggingInterceptor, RequestInfo, ResponseInfo};
pub use latency::{LatencyAggregate, ResponseTimeInterceptor};
pub use mapper::{map_bundle, NameRecord, PatientRecord};
pub use runner::{read_query_keys, RunSummary, SearchRunner};
