//! Registry binding and the client metric set
//!
//! An interceptor records into a fixed set of nine counters and
//! histograms. The set is registered against a Prometheus registry
//! exactly once per [`MetricsRegistry`] handle; constructing several
//! interceptors against the same handle shares the already-registered
//! collectors instead of tripping duplicate-registration errors.

use once_cell::sync::{Lazy, OnceCell};
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::Arc;

use crate::error::Result;

/// Label dimensions shared by every client metric.
const CALL_LABELS: &[&str] = &["grpc_type", "grpc_service", "grpc_method"];

static GLOBAL: Lazy<Arc<MetricsRegistry>> =
    Lazy::new(|| Arc::new(MetricsRegistry::new(prometheus::default_registry().clone())));

/// A Prometheus registry handle carrying the client metric binding.
///
/// The handle is the unit of idempotence: all interceptors built
/// against one handle share one registered metric set. Pass an
/// explicit handle to scope metrics to a registry of your choosing,
/// or use [`MetricsRegistry::global`] for the process default.
pub struct MetricsRegistry {
    registry: Registry,
    metrics: OnceCell<Arc<ClientMetrics>>,
}

impl MetricsRegistry {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            metrics: OnceCell::new(),
        }
    }

    /// The process-wide default handle, bound to the default
    /// Prometheus registry.
    pub fn global() -> Arc<MetricsRegistry> {
        GLOBAL.clone()
    }

    /// The underlying Prometheus registry, e.g. for gathering.
    pub fn prometheus(&self) -> &Registry {
        &self.registry
    }

    /// Returns the metric set bound to this handle, registering it on
    /// first use. Safe to race from concurrent constructions; losers
    /// receive the winner's set.
    pub(crate) fn client_metrics(&self) -> Result<Arc<ClientMetrics>> {
        self.metrics
            .get_or_try_init(|| ClientMetrics::register(&self.registry).map(Arc::new))
            .map(Arc::clone)
    }
}

/// The fixed set of client-side gRPC metrics.
#[derive(Clone)]
pub(crate) struct ClientMetrics {
    /// RPCs started, all shapes but bidirectional streaming.
    pub(crate) started: IntCounterVec,
    /// RPCs completed, by status code (current naming).
    pub(crate) handled: IntCounterVec,
    /// RPCs completed, by status code (legacy naming).
    pub(crate) completed_legacy: IntCounterVec,
    /// End-to-end call latency (current naming).
    pub(crate) handled_seconds: HistogramVec,
    /// End-to-end call latency (legacy naming).
    pub(crate) completed_seconds_legacy: HistogramVec,
    /// Stream messages received by the client.
    pub(crate) msg_received: IntCounterVec,
    /// Stream messages sent by the client.
    pub(crate) msg_sent: IntCounterVec,
    /// Latency until the full response stream was received.
    pub(crate) recv_seconds: HistogramVec,
    /// Latency until the request stream was fully sent.
    pub(crate) send_seconds: HistogramVec,
}

impl ClientMetrics {
    fn register(registry: &Registry) -> Result<Self> {
        let started = IntCounterVec::new(
            Opts::new(
                "grpc_client_started_total",
                "Total number of RPCs started on the client.",
            ),
            CALL_LABELS,
        )?;
        let handled = IntCounterVec::new(
            Opts::new(
                "grpc_client_handled_total",
                "Total number of RPCs completed by the client, regardless of success or failure.",
            ),
            &["grpc_type", "grpc_service", "grpc_method", "grpc_code"],
        )?;
        let completed_legacy = IntCounterVec::new(
            Opts::new(
                "grpc_client_completed",
                "Total number of RPCs completed on the client, regardless of success or failure.",
            ),
            &["grpc_type", "grpc_service", "grpc_method", "code"],
        )?;
        let handled_seconds = HistogramVec::new(
            HistogramOpts::new(
                "grpc_client_handling_seconds",
                "Histogram of response latency (seconds) of the gRPC until it is finished by the application.",
            ),
            CALL_LABELS,
        )?;
        let completed_seconds_legacy = HistogramVec::new(
            HistogramOpts::new(
                "grpc_client_completed_latency_seconds",
                "Histogram of RPC response latency (in seconds) for completed RPCs.",
            ),
            CALL_LABELS,
        )?;
        let msg_received = IntCounterVec::new(
            Opts::new(
                "grpc_client_msg_received_total",
                "Total number of RPC stream messages received by the client.",
            ),
            CALL_LABELS,
        )?;
        let msg_sent = IntCounterVec::new(
            Opts::new(
                "grpc_client_msg_sent_total",
                "Total number of gRPC stream messages sent by the client.",
            ),
            CALL_LABELS,
        )?;
        let recv_seconds = HistogramVec::new(
            HistogramOpts::new(
                "grpc_client_msg_recv_handling_seconds",
                "Histogram of latency (seconds) until the full response stream was received.",
            ),
            CALL_LABELS,
        )?;
        let send_seconds = HistogramVec::new(
            HistogramOpts::new(
                "grpc_client_msg_send_handling_seconds",
                "Histogram of latency (seconds) until the request stream was fully sent.",
            ),
            CALL_LABELS,
        )?;

        let metrics = Self {
            started,
            handled,
            completed_legacy,
            handled_seconds,
            completed_seconds_legacy,
            msg_received,
            msg_sent,
            recv_seconds,
            send_seconds,
        };

        for collector in metrics.collectors() {
            registry.register(collector)?;
        }

        Ok(metrics)
    }

    fn collectors(&self) -> Vec<Box<dyn prometheus::core::Collector>> {
        vec![
            Box::new(self.started.clone()),
            Box::new(self.handled.clone()),
            Box::new(self.completed_legacy.clone()),
            Box::new(self.handled_seconds.clone()),
            Box::new(self.completed_seconds_legacy.clone()),
            Box::new(self.msg_received.clone()),
            Box::new(self.msg_sent.clone()),
            Box::new(self.recv_seconds.clone()),
            Box::new(self.send_seconds.clone()),
        ]
    }
}
