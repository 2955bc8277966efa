//! Client-side call instrumentation for the four RPC shapes
//!
//! Each `intercept_*` method observes a call and delegates to a
//! continuation standing in for the next layer (ultimately the real
//! transport). The call's result, success or failure, is forwarded
//! untouched; instrumentation never alters the outcome of a call.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::{stream, Stream, StreamExt};
use prometheus::IntCounter;
use tonic::{Code, Response, Status};
use tracing::debug;

use crate::config::ClientMetricsConfig;
use crate::error::MetricsError;
use crate::method::{code_label, split_method_path, RpcType};
use crate::registry::ClientMetrics;
use crate::stream::{CountedResponseStream, CountedStream};

/// Instruments gRPC client calls with Prometheus metrics.
///
/// One instance serves any number of concurrent calls; per-call state
/// lives on the stack of the intercepting future.
pub struct ClientMetricsInterceptor {
    config: ClientMetricsConfig,
    metrics: Arc<ClientMetrics>,
}

impl ClientMetricsInterceptor {
    /// Builds an interceptor, registering the metric set against the
    /// configured registry handle on first use.
    ///
    /// Fails only if the registry rejects registration; per-call
    /// recording is infallible once construction succeeds.
    pub fn new(config: ClientMetricsConfig) -> Result<Self, MetricsError> {
        let metrics = config.registry.client_metrics()?;
        debug!(
            legacy = config.legacy,
            handling_time_histogram = config.enable_handling_time_histogram,
            "initialized gRPC client metrics interceptor"
        );
        Ok(Self { config, metrics })
    }

    /// Instruments a unary call.
    ///
    /// Increments the started counter, delegates, then records the
    /// handling latency and exactly one completion counter labeled
    /// with the terminal status code.
    pub async fn intercept_unary<Req, Resp, C, Fut>(
        &self,
        path: &str,
        request: Req,
        continuation: C,
    ) -> Result<Response<Resp>, Status>
    where
        C: FnOnce(Req) -> Fut,
        Fut: Future<Output = Result<Response<Resp>, Status>>,
    {
        let (service, method) = split_method_path(path);
        let rpc_type = RpcType::Unary;

        self.metrics
            .started
            .with_label_values(&[rpc_type.as_str(), service, method])
            .inc();

        let start = Instant::now();
        let result = continuation(request).await;
        let code = status_code(&result);

        self.record_handling_time(rpc_type, service, method, start);
        self.record_completion(rpc_type, service, method, code);

        result
    }

    /// Instruments a server-streaming call.
    ///
    /// The response stream is drained once, counting each received
    /// message, so that the terminal latency can be observed; the
    /// caller gets a replay of the buffered messages in the original
    /// order. An error during the drain propagates as the call result
    /// and no partial replay is produced.
    pub async fn intercept_server_streaming<Req, Resp, C, Fut, S>(
        &self,
        path: &str,
        request: Req,
        continuation: C,
    ) -> Result<impl Stream<Item = Result<Resp, Status>>, Status>
    where
        C: FnOnce(Req) -> Fut,
        Fut: Future<Output = Result<S, Status>>,
        S: Stream<Item = Result<Resp, Status>>,
    {
        let (service, method) = split_method_path(path);
        let rpc_type = RpcType::ServerStreaming;

        self.metrics
            .started
            .with_label_values(&[rpc_type.as_str(), service, method])
            .inc();

        let start = Instant::now();
        let responses = continuation(request).await?;

        let received = self
            .metrics
            .msg_received
            .with_label_values(&[rpc_type.as_str(), service, method]);
        let drained = drain_responses(responses, received).await;

        self.record_handling_time(rpc_type, service, method, start);
        if self.config.enable_stream_receive_time_histogram && !self.config.legacy {
            self.metrics
                .recv_seconds
                .with_label_values(&[rpc_type.as_str(), service, method])
                .observe(start.elapsed().as_secs_f64());
        }

        let messages = drained?;
        Ok(stream::iter(messages.into_iter().map(Ok::<_, Status>)))
    }

    /// Instruments a client-streaming call.
    ///
    /// The outbound request stream is wrapped so each message sent to
    /// the transport is counted as it is pulled; the single response
    /// is handled like a unary completion.
    pub async fn intercept_client_streaming<Resp, S, C, Fut>(
        &self,
        path: &str,
        requests: S,
        continuation: C,
    ) -> Result<Response<Resp>, Status>
    where
        S: Stream,
        C: FnOnce(CountedStream<S>) -> Fut,
        Fut: Future<Output = Result<Response<Resp>, Status>>,
    {
        let (service, method) = split_method_path(path);
        let rpc_type = RpcType::ClientStreaming;

        let sent = self
            .metrics
            .msg_sent
            .with_label_values(&[rpc_type.as_str(), service, method]);
        let requests = CountedStream::new(requests, sent);

        self.metrics
            .started
            .with_label_values(&[rpc_type.as_str(), service, method])
            .inc();

        let start = Instant::now();
        let result = continuation(requests).await;
        let code = status_code(&result);

        self.record_handling_time(rpc_type, service, method, start);
        self.record_completion(rpc_type, service, method, code);
        if self.config.enable_stream_send_time_histogram && !self.config.legacy {
            self.metrics
                .send_seconds
                .with_label_values(&[rpc_type.as_str(), service, method])
                .observe(start.elapsed().as_secs_f64());
        }

        result
    }

    /// Instruments a bidirectional-streaming call.
    ///
    /// Sent and received messages are both counted; the response
    /// stream is drained and replayed as in server streaming. This
    /// shape does not increment the started counter, preserving the
    /// long-standing behavior existing dashboards depend on.
    pub async fn intercept_bidi_streaming<Resp, S, RS, C, Fut>(
        &self,
        path: &str,
        requests: S,
        continuation: C,
    ) -> Result<impl Stream<Item = Result<Resp, Status>>, Status>
    where
        S: Stream,
        RS: Stream<Item = Result<Resp, Status>>,
        C: FnOnce(CountedStream<S>) -> Fut,
        Fut: Future<Output = Result<RS, Status>>,
    {
        let (service, method) = split_method_path(path);
        let rpc_type = RpcType::BidiStreaming;
        let start = Instant::now();

        let sent = self
            .metrics
            .msg_sent
            .with_label_values(&[rpc_type.as_str(), service, method]);
        let requests = CountedStream::new(requests, sent);

        let responses = continuation(requests).await?;

        let received = self
            .metrics
            .msg_received
            .with_label_values(&[rpc_type.as_str(), service, method]);
        let drained = drain_responses(responses, received).await;

        if self.config.enable_stream_send_time_histogram && !self.config.legacy {
            self.metrics
                .send_seconds
                .with_label_values(&[rpc_type.as_str(), service, method])
                .observe(start.elapsed().as_secs_f64());
        }
        if self.config.enable_stream_receive_time_histogram && !self.config.legacy {
            self.metrics
                .recv_seconds
                .with_label_values(&[rpc_type.as_str(), service, method])
                .observe(start.elapsed().as_secs_f64());
        }

        let messages = drained?;
        Ok(stream::iter(messages.into_iter().map(Ok::<_, Status>)))
    }

    /// Records end-to-end latency under exactly one naming scheme:
    /// the legacy histogram unconditionally in legacy mode, otherwise
    /// the current histogram when enabled.
    fn record_handling_time(&self, rpc_type: RpcType, service: &str, method: &str, start: Instant) {
        let elapsed = start.elapsed().as_secs_f64();
        if self.config.legacy {
            self.metrics
                .completed_seconds_legacy
                .with_label_values(&[rpc_type.as_str(), service, method])
                .observe(elapsed);
        } else if self.config.enable_handling_time_histogram {
            self.metrics
                .handled_seconds
                .with_label_values(&[rpc_type.as_str(), service, method])
                .observe(elapsed);
        }
    }

    /// Increments exactly one of the legacy or current completion
    /// counters, labeled with the terminal status code.
    fn record_completion(&self, rpc_type: RpcType, service: &str, method: &str, code: Code) {
        if self.config.legacy {
            self.metrics
                .completed_legacy
                .with_label_values(&[rpc_type.as_str(), service, method, code_label(code)])
                .inc();
        } else {
            self.metrics
                .handled
                .with_label_values(&[rpc_type.as_str(), service, method, code_label(code)])
                .inc();
        }
    }
}

/// Terminal status code of a completed delegation.
fn status_code<T>(result: &Result<T, Status>) -> Code {
    match result {
        Ok(_) => Code::Ok,
        Err(status) => status.code(),
    }
}

/// Pulls every message from a response stream, counting each one, and
/// buffers them in delivery order. A mid-stream error ends the drain
/// and becomes the call result; messages already pulled stay counted.
async fn drain_responses<S, T>(
    responses: S,
    received: IntCounter,
) -> Result<Vec<T>, Status>
where
    S: Stream<Item = Result<T, Status>>,
{
    let counted = CountedResponseStream::new(responses, received);
    futures::pin_mut!(counted);

    let mut buffered = Vec::new();
    while let Some(item) = counted.next().await {
        match item {
            Ok(message) => buffered.push(message),
            Err(status) => return Err(status),
        }
    }
    Ok(buffered)
}
