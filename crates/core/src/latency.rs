//! Round-trip latency instrumentation.
//!
//! [`LatencyAggregate`] holds the samples of one batch of requests and is shared by
//! handle between the transport (which records) and the caller (which reports and
//! resets). [`ResponseTimeInterceptor`] connects the two: registered on a client, it
//! records the transport-measured elapsed time of every response.

use crate::interceptor::{ClientInterceptor, ResponseInfo};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Ordered log of per-request latencies in whole milliseconds.
///
/// Appends are serialised by an internal lock, so one aggregate can be shared by
/// concurrent requests.
#[derive(Debug, Default)]
pub struct LatencyAggregate {
    samples: Mutex<Vec<u64>>,
}

impl LatencyAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample. Sub-millisecond precision is truncated.
    pub fn record(&self, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.samples.lock().push(millis);
    }

    /// Mean of the samples present now, rounded to the nearest millisecond.
    ///
    /// Returns 0 when there are no samples.
    pub fn average(&self) -> u64 {
        mean_millis(&self.samples.lock())
    }

    /// Drop every sample.
    pub fn reset(&self) {
        self.samples.lock().clear();
    }

    /// Swap the samples out and return their average in one locked step.
    ///
    /// Samples recorded concurrently land either in the returned batch or in the
    /// next one, never in neither.
    pub fn take_average(&self) -> u64 {
        let taken = std::mem::take(&mut *self.samples.lock());
        mean_millis(&taken)
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }
}

fn mean_millis(samples: &[u64]) -> u64 {
    if samples.is_empty() {
        return 0;
    }

    let count = samples.len() as u128;
    let sum: u128 = samples.iter().map(|&s| u128::from(s)).sum();
    // Half-up rounding: floor(sum / count + 1/2).
    let rounded = (2 * sum + count) / (2 * count);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Records the elapsed time of every response into a shared [`LatencyAggregate`].
#[derive(Clone, Debug)]
pub struct ResponseTimeInterceptor {
    aggregate: Arc<LatencyAggregate>,
}

impl ResponseTimeInterceptor {
    pub fn new(aggregate: Arc<LatencyAggregate>) -> Self {
        Self { aggregate }
    }

    pub fn aggregate(&self) -> &Arc<LatencyAggregate> {
        &self.aggregate
    }
}

impl ClientInterceptor for ResponseTimeInterceptor {
    fn on_response_received(&self, response: &ResponseInfo) {
        self.aggregate.record(response.elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::RequestInfo;
    use reqwest::{Method, StatusCode, Url};

    fn response_after(millis: u64) -> ResponseInfo {
        ResponseInfo {
            method: Method::GET,
            url: Url::parse("http://hapi.fhir.org/baseR4/Patient?family=Smith").unwrap(),
            status: StatusCode::OK,
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn averages_twenty_responses() {
        let aggregate = Arc::new(LatencyAggregate::new());
        let interceptor = ResponseTimeInterceptor::new(aggregate.clone());

        for i in 1..=20 {
            interceptor.on_response_received(&response_after(800 + i * 10));
        }

        assert_eq!(aggregate.len(), 20);
        assert_eq!(aggregate.average(), 905);
    }

    #[test]
    fn request_hook_records_nothing() {
        let aggregate = Arc::new(LatencyAggregate::new());
        let interceptor = ResponseTimeInterceptor::new(aggregate.clone());

        interceptor.on_request_sent(&RequestInfo {
            method: Method::GET,
            url: Url::parse("http://hapi.fhir.org/baseR4/Patient").unwrap(),
        });

        assert!(aggregate.is_empty());
        assert!(Arc::ptr_eq(interceptor.aggregate(), &aggregate));
    }

    #[test]
    fn empty_average_is_zero() {
        assert_eq!(LatencyAggregate::new().average(), 0);
    }

    #[test]
    fn average_rounds_half_up() {
        let aggregate = LatencyAggregate::new();
        aggregate.record(Duration::from_millis(1));
        aggregate.record(Duration::from_millis(2));
        assert_eq!(aggregate.average(), 2);

        aggregate.record(Duration::from_millis(2));
        // 5 / 3 = 1.67
        assert_eq!(aggregate.average(), 2);

        aggregate.reset();
        for millis in [10, 10, 11] {
            aggregate.record(Duration::from_millis(millis));
        }
        // 31 / 3 = 10.33
        assert_eq!(aggregate.average(), 10);
    }

    #[test]
    fn average_does_not_mutate() {
        let aggregate = LatencyAggregate::new();
        aggregate.record(Duration::from_millis(120));
        assert_eq!(aggregate.average(), 120);
        assert_eq!(aggregate.average(), 120);
        assert_eq!(aggregate.len(), 1);
    }

    #[test]
    fn truncates_sub_millisecond_precision() {
        let aggregate = LatencyAggregate::new();
        aggregate.record(Duration::from_micros(1_999));
        aggregate.record(Duration::from_micros(999));
        // samples are 1 and 0
        assert_eq!(aggregate.average(), 1);
    }

    #[test]
    fn reset_then_average_is_zero() {
        let aggregate = LatencyAggregate::new();
        for millis in [100, 250, 4_000] {
            aggregate.record(Duration::from_millis(millis));
        }
        aggregate.reset();
        assert_eq!(aggregate.average(), 0);
        assert!(aggregate.is_empty());
    }

    #[test]
    fn take_average_clears_samples() {
        let aggregate = LatencyAggregate::new();
        aggregate.record(Duration::from_millis(300));
        aggregate.record(Duration::from_millis(500));

        assert_eq!(aggregate.take_average(), 400);
        assert!(aggregate.is_empty());
        assert_eq!(aggregate.take_average(), 0);
    }

    #[test]
    fn huge_samples_do_not_overflow() {
        let aggregate = LatencyAggregate::new();
        aggregate.record(Duration::from_millis(u64::MAX));
        aggregate.record(Duration::from_millis(u64::MAX));
        assert_eq!(aggregate.average(), u64::MAX);
    }

    #[test]
    fn concurrent_records_are_not_lost() {
        let aggregate = Arc::new(LatencyAggregate::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let aggregate = aggregate.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        aggregate.record(Duration::from_millis(50));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("recording thread panicked");
        }

        assert_eq!(aggregate.len(), 8_000);
        assert_eq!(aggregate.take_average(), 50);
    }
}
