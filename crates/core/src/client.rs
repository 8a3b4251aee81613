//! FHIR search transport.
//!
//! [`FhirClient`] is the seam between the runner and the network. [`HttpFhirClient`]
//! implements it over HTTP with `reqwest`, runs the registered interceptors around
//! every request, and supplies the elapsed time each interceptor sees.

use crate::constants::{FAMILY_PARAM, FHIR_JSON_MIME, PATIENT_RESOURCE};
use crate::interceptor::{ClientInterceptor, RequestInfo, ResponseInfo};
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use fhir::Bundle;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Url;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache behaviour requested from the server for one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheDirective {
    /// Let the server answer from its cache.
    #[default]
    Default,
    /// Send `Cache-Control: no-cache` so the server runs the search again.
    NoCache,
}

/// A search against one resource type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub resource_type: String,
    pub params: Vec<(String, String)>,
    pub cache: CacheDirective,
}

impl SearchRequest {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            params: Vec::new(),
            cache: CacheDirective::Default,
        }
    }

    /// Search patients whose family name matches `family`.
    pub fn patients_by_family(family: &str, cache: CacheDirective) -> Self {
        Self::new(PATIENT_RESOURCE)
            .param(FAMILY_PARAM, family)
            .cache(cache)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn cache(mut self, cache: CacheDirective) -> Self {
        self.cache = cache;
        self
    }
}

/// Executes FHIR searches and returns the first page of results.
#[async_trait]
pub trait FhirClient: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> ClientResult<Bundle>;
}

#[async_trait]
impl<C: FhirClient + ?Sized> FhirClient for Arc<C> {
    async fn search(&self, request: &SearchRequest) -> ClientResult<Bundle> {
        (**self).search(request).await
    }
}

/// FHIR REST client over HTTP.
#[derive(Clone)]
pub struct HttpFhirClient {
    http: reqwest::Client,
    base_url: Url,
    interceptors: Vec<Arc<dyn ClientInterceptor>>,
}

impl std::fmt::Debug for HttpFhirClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFhirClient")
            .field("base_url", &self.base_url.as_str())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl HttpFhirClient {
    pub fn builder(base_url: Url) -> HttpFhirClientBuilder {
        HttpFhirClientBuilder {
            base_url,
            timeout: None,
            interceptors: Vec::new(),
        }
    }

    /// `{base}/{resource_type}`, keeping any path the base URL already has.
    fn resource_url(&self, resource_type: &str) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(resource_type);
        Ok(url)
    }
}

#[async_trait]
impl FhirClient for HttpFhirClient {
    async fn search(&self, request: &SearchRequest) -> ClientResult<Bundle> {
        let mut builder = self
            .http
            .get(self.resource_url(&request.resource_type)?)
            .query(&request.params)
            .header(ACCEPT, FHIR_JSON_MIME);
        if request.cache == CacheDirective::NoCache {
            builder = builder.header(CACHE_CONTROL, "no-cache");
        }
        let http_request = builder.build()?;

        let request_info = RequestInfo {
            method: http_request.method().clone(),
            url: http_request.url().clone(),
        };
        for interceptor in &self.interceptors {
            interceptor.on_request_sent(&request_info);
        }

        let started = Instant::now();
        let response = self.http.execute(http_request).await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed = started.elapsed();

        let response_info = ResponseInfo {
            method: request_info.method,
            url: request_info.url,
            status,
            elapsed,
        };
        for interceptor in &self.interceptors {
            interceptor.on_response_received(&response_info);
        }

        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                url: response_info.url.to_string(),
            });
        }

        Ok(Bundle::parse_json(&body)?)
    }
}

/// Builder for [`HttpFhirClient`].
pub struct HttpFhirClientBuilder {
    base_url: Url,
    timeout: Option<Duration>,
    interceptors: Vec<Arc<dyn ClientInterceptor>>,
}

impl HttpFhirClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register an interceptor. Interceptors run in registration order.
    pub fn interceptor(mut self, interceptor: Arc<dyn ClientInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> ClientResult<HttpFhirClient> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }

        Ok(HttpFhirClient {
            http: http.build()?,
            base_url: self.base_url,
            interceptors: self.interceptors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> HttpFhirClient {
        HttpFhirClient::builder(Url::parse(base).unwrap())
            .build()
            .expect("client builds")
    }

    #[test]
    fn resource_url_appends_to_base_path() {
        let client = client_for("http://hapi.fhir.org/baseR4");
        assert_eq!(
            client.resource_url("Patient").unwrap().as_str(),
            "http://hapi.fhir.org/baseR4/Patient"
        );

        let client = client_for("http://hapi.fhir.org/baseR4/");
        assert_eq!(
            client.resource_url("Patient").unwrap().as_str(),
            "http://hapi.fhir.org/baseR4/Patient"
        );

        let client = client_for("https://fhir.example.org");
        assert_eq!(
            client.resource_url("Patient").unwrap().as_str(),
            "https://fhir.example.org/Patient"
        );
    }

    #[test]
    fn resource_url_rejects_non_base_url() {
        let client = client_for("mailto:someone@example.org");
        assert!(matches!(
            client.resource_url("Patient"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn patient_search_request() {
        let request = SearchRequest::patients_by_family("Smith", CacheDirective::NoCache);
        assert_eq!(request.resource_type, "Patient");
        assert_eq!(
            request.params,
            vec![("family".to_string(), "Smith".to_string())]
        );
        assert_eq!(request.cache, CacheDirective::NoCache);
        assert_eq!(
            SearchRequest::new("Patient").cache,
            CacheDirective::Default
        );
    }
}
