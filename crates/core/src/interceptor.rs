//! Client interceptor hooks.
//!
//! Interceptors observe each request/response cycle of [`crate::HttpFhirClient`] for
//! cross-cutting concerns such as timing and logging. They never alter the request
//! or the response.

use reqwest::{Method, StatusCode, Url};
use std::time::Duration;

/// What an interceptor sees before a request leaves the transport.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    pub method: Method,
    pub url: Url,
}

/// What an interceptor sees once a response has been fully received.
///
/// `elapsed` is measured by the transport from send until the body was read.
#[derive(Clone, Debug)]
pub struct ResponseInfo {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub elapsed: Duration,
}

/// Hooks invoked by the transport around every request.
///
/// Implementations must be cheap and must not block; they run inline on the
/// request path and may be called from several tasks at once.
pub trait ClientInterceptor: Send + Sync {
    fn on_request_sent(&self, _request: &RequestInfo) {}

    fn on_response_received(&self, response: &ResponseInfo);
}

/// Logs a summary line per request and response. Bodies are never logged.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingInterceptor;

impl LoggingInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl ClientInterceptor for LoggingInterceptor {
    fn on_request_sent(&self, request: &RequestInfo) {
        tracing::info!("Client request: {} {}", request.method, request.url);
    }

    fn on_response_received(&self, response: &ResponseInfo) {
        tracing::info!(
            "Client response: {} {} -> {} in {}ms",
            response.method,
            response.url,
            response.status,
            response.elapsed.as_millis()
        );
    }
}
