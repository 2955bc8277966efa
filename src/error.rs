//! Error types for interceptor construction

use thiserror::Error;

/// Result type for metrics setup operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while setting up client metrics.
///
/// These only surface at interceptor construction time. Once an
/// interceptor exists, recording observations cannot fail and never
/// affects the outcome of the intercepted call.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The Prometheus registry rejected one of the metric collectors
    #[error("metric registration failed: {0}")]
    Registration(#[from] prometheus::Error),
}
