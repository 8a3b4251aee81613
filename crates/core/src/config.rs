//! Search runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the client
//! and the runner. Nothing in this crate reads process-wide environment variables.

use crate::{SearchError, SearchResult};
use reqwest::Url;
use std::time::Duration;

/// Search configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    base_url: Url,
    runs: usize,
    timeout: Duration,
    continue_on_error: bool,
}

impl SearchConfig {
    /// Create a new `SearchConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] if:
    /// - `base_url` is not an absolute `http`/`https` URL,
    /// - `runs` is zero,
    /// - `timeout` is zero.
    pub fn new(base_url: &str, runs: usize, timeout: Duration) -> SearchResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| SearchError::InvalidConfig(format!("invalid base URL '{base_url}': {e}")))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SearchError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(SearchError::InvalidConfig(format!(
                "base URL '{base_url}' cannot carry a resource path"
            )));
        }
        if runs == 0 {
            return Err(SearchError::InvalidConfig("runs must be at least 1".into()));
        }
        if timeout.is_zero() {
            return Err(SearchError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            base_url,
            runs,
            timeout,
            continue_on_error: false,
        })
    }

    /// Log failed queries and carry on instead of aborting the run loop.
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error
    }
}
