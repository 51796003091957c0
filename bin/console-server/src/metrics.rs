//! Prometheus exposition for the server's own request counters

use std::sync::Arc;

use anyhow::Result;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

pub struct ApiMetrics {
    /// Total API requests by method and route
    pub http_requests_total: CounterVec,
    /// Total requests that ended in an error response
    pub http_errors_total: Counter,
    pub registry: Arc<Registry>,
}

impl ApiMetrics {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total API requests"),
            &["method", "route"],
        )?;
        let http_errors_total =
            Counter::new("http_errors_total", "Total API error responses")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_errors_total.clone()))?;

        Ok(Self {
            http_requests_total,
            http_errors_total,
            registry,
        })
    }

    /// Gather all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = vec![];
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
