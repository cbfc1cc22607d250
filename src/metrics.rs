#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
};

#[cfg(feature = "metrics")]
pub static METRICS: Lazy<StoreMetrics> = Lazy::new(StoreMetrics::init);

/// Query instruments, registered on the global meter provider
#[cfg(feature = "metrics")]
pub struct StoreMetrics {
    pub queries_total: Counter<u64>,
    pub query_errors_total: Counter<u64>,
    pub query_duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl StoreMetrics {
    pub fn init() -> Self {
        let meter = global::meter("pglookup");

        let queries_total = meter
            .u64_counter("pglookup_queries_total")
            .with_description("Total queries executed")
            .build();

        let query_errors_total = meter
            .u64_counter("pglookup_query_errors_total")
            .with_description("Queries the store reported as failed")
            .build();

        let query_duration = meter
            .f64_histogram("pglookup_query_duration_seconds")
            .with_description("Duration of queries")
            .build();

        Self {
            queries_total,
            query_errors_total,
            query_duration,
        }
    }

    pub fn record_query_duration(&self, elapsed: std::time::Duration) {
        self.queries_total.add(1, &[]);
        self.query_duration.record(elapsed.as_secs_f64(), &[]);
    }

    pub fn record_query_error(&self) {
        self.query_errors_total.add(1, &[]);
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{span, Level, Span};

    pub fn connect_span() -> Span {
        span!(Level::INFO, "pglookup.connect")
    }

    pub fn execute_query_span(sql: &str) -> Span {
        span!(Level::DEBUG, "pglookup.execute_query", db.statement = sql)
    }
}

#[cfg(all(test, feature = "metrics"))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_metrics_record_without_exporter() {
        // No meter provider is installed, so the global no-op provider absorbs these.
        METRICS.record_query_duration(Duration::from_millis(3));
        METRICS.record_query_error();
    }
}
