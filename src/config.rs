//! Interceptor configuration

use std::sync::Arc;

use crate::registry::MetricsRegistry;

/// Configuration for a [`crate::ClientMetricsInterceptor`].
///
/// Settings are fixed at construction time. Histograms are opt-in
/// because of their storage cost; counters are always recorded.
#[derive(Clone)]
pub struct ClientMetricsConfig {
    /// Record end-to-end call latency histograms.
    pub enable_handling_time_histogram: bool,
    /// Record response-stream receive latency histograms.
    pub enable_stream_receive_time_histogram: bool,
    /// Record request-stream send latency histograms.
    pub enable_stream_send_time_histogram: bool,
    /// Use the legacy metric naming scheme. Mutually exclusive with
    /// the current scheme: a call is only ever recorded under one.
    pub legacy: bool,
    /// Registry handle the metric set is bound to.
    pub registry: Arc<MetricsRegistry>,
}

impl Default for ClientMetricsConfig {
    fn default() -> Self {
        Self {
            enable_handling_time_histogram: false,
            enable_stream_receive_time_histogram: false,
            enable_stream_send_time_histogram: false,
            legacy: false,
            registry: MetricsRegistry::global(),
        }
    }
}

impl ClientMetricsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handling_time_histogram(mut self, enable: bool) -> Self {
        self.enable_handling_time_histogram = enable;
        self
    }

    pub fn with_stream_receive_time_histogram(mut self, enable: bool) -> Self {
        self.enable_stream_receive_time_histogram = enable;
        self
    }

    pub fn with_stream_send_time_histogram(mut self, enable: bool) -> Self {
        self.enable_stream_send_time_histogram = enable;
        self
    }

    pub fn with_legacy_naming(mut self, legacy: bool) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn with_registry(mut self, registry: Arc<MetricsRegistry>) -> Self {
        self.registry = registry;
        self
    }
}
