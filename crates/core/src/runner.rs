//! Repeated patient searches with per-run latency reporting.
//!
//! The runner searches every name once per run, prints the mapped patients, and
//! closes each run with its average response time. The final run asks the server
//! to bypass its cache.

use crate::client::{CacheDirective, FhirClient, SearchRequest};
use crate::latency::LatencyAggregate;
use crate::mapper::{map_bundle, PatientRecord};
use crate::{SearchError, SearchResult};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Read the query keys from a newline-delimited file.
///
/// Every line is one key, empty lines included. A trailing newline does not add a
/// key and `\r\n` line endings are accepted. Bytes that are not UTF-8 are replaced
/// with U+FFFD.
pub fn read_query_keys(path: &Path) -> SearchResult<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| SearchError::NamesFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    if matches!(text, std::borrow::Cow::Owned(_)) {
        tracing::warn!("{} is not valid UTF-8, decoding lossily", path.display());
    }
    Ok(text.lines().map(str::to_owned).collect())
}

/// Outcome of [`SearchRunner::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Average response time of each run, in milliseconds.
    pub averages_ms: Vec<u64>,
    /// Patient records written across all runs.
    pub records: usize,
    /// Searches that failed and were skipped.
    pub failed_queries: usize,
}

pub struct SearchRunner<C> {
    client: C,
    latency: Arc<LatencyAggregate>,
    runs: usize,
    continue_on_error: bool,
}

impl<C: FhirClient> SearchRunner<C> {
    /// `latency` must be the aggregate the client's response-time interceptor
    /// records into.
    pub fn new(client: C, latency: Arc<LatencyAggregate>, runs: usize) -> Self {
        Self {
            client,
            latency,
            runs,
            continue_on_error: false,
        }
    }

    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Search patients by family name and map the result page.
    pub async fn patients_by_last_name(
        &self,
        last_name: &str,
        cache: CacheDirective,
    ) -> SearchResult<Vec<PatientRecord>> {
        let request = SearchRequest::patients_by_family(last_name, cache);
        let bundle = self
            .client
            .search(&request)
            .await
            .map_err(|source| SearchError::Transport {
                query: last_name.to_string(),
                source,
            })?;

        if let Some(next) = bundle.next_link() {
            tracing::debug!("more results for '{}' not fetched: {}", last_name, next);
        }

        Ok(map_bundle(&bundle))
    }

    /// Run every search `runs` times, writing records and per-run averages to `out`.
    ///
    /// # Errors
    ///
    /// Returns the first search failure unless `continue_on_error` is set, and any
    /// failure to write to `out`.
    pub async fn run<W: Write>(&self, names: &[String], out: &mut W) -> SearchResult<RunSummary> {
        let mut summary = RunSummary::default();

        // Samples recorded before the first run do not count.
        self.latency.reset();

        for run in 0..self.runs {
            let cache = if run + 1 == self.runs {
                CacheDirective::NoCache
            } else {
                CacheDirective::Default
            };
            tracing::info!(
                "run {}/{}: {} searches ({:?})",
                run + 1,
                self.runs,
                names.len(),
                cache
            );

            for name in names {
                let records = match self.patients_by_last_name(name, cache).await {
                    Ok(records) => records,
                    Err(e) if self.continue_on_error => {
                        tracing::warn!("skipping failed search: {}", e);
                        summary.failed_queries += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                for record in &records {
                    writeln!(out, "{record}").map_err(SearchError::OutputWrite)?;
                }
                summary.records += records.len();
            }

            let average = self.latency.take_average();
            writeln!(out, "average response time: {average}")
                .map_err(SearchError::OutputWrite)?;
            summary.averages_ms.push(average);
        }

        out.flush().map_err(SearchError::OutputWrite)?;
        Ok(summary)
    }
}
