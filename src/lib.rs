//! # gRPC Client Metrics
//!
//! Prometheus instrumentation for gRPC client calls, covering all four
//! RPC shapes: unary, server streaming, client streaming, and
//! bidirectional streaming.
//!
//! ## Features
//!
//! - Started/completed counters and latency histograms per call
//! - Per-message sent/received counters for streaming calls
//! - Legacy and current metric naming schemes, mutually exclusive
//! - Explicit registry handles with exactly-once metric registration
//! - Errors and messages pass through unchanged; instrumentation never
//!   breaks a call
//!
//! ## Example
//!
//! ```ignore
//! use grpc_client_metrics::{ClientMetricsConfig, ClientMetricsInterceptor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let interceptor = ClientMetricsInterceptor::new(
//!     ClientMetricsConfig::new().with_handling_time_histogram(true),
//! )?;
//!
//! let response = interceptor
//!     .intercept_unary("/helloworld.Greeter/SayHello", request, |request| async {
//!         client.say_hello(request).await
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod interceptor;
mod method;
mod registry;
mod stream;

pub use config::ClientMetricsConfig;
pub use error::{MetricsError, Result};
pub use interceptor::ClientMetricsInterceptor;
pub use method::{code_label, split_method_path, RpcType};
pub use registry::MetricsRegistry;
pub use stream::{CountedResponseStream, CountedStream};
