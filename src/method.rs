//! RPC shape classification and method path parsing

use tonic::Code;

/// The four request/response cardinalities of a gRPC call.
///
/// The shape is known statically at each interception point; it is
/// never inferred from call data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcType {
    Unary,
    ServerStreaming,
    ClientStreaming,
    BidiStreaming,
}

impl RpcType {
    /// Label value used for the `grpc_type` dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcType::Unary => "UNARY",
            RpcType::ServerStreaming => "SERVER_STREAMING",
            RpcType::ClientStreaming => "CLIENT_STREAMING",
            RpcType::BidiStreaming => "BIDI_STREAMING",
        }
    }
}

/// Split a gRPC method path of the form `/<service>/<method>` into its
/// service and method components, verbatim.
///
/// Malformed paths yield empty components rather than an error; a call
/// is still observed even when its path does not parse.
pub fn split_method_path(path: &str) -> (&str, &str) {
    let path = path.strip_prefix('/').unwrap_or(path);
    match path.split_once('/') {
        Some((service, method)) => (service, method),
        None => ("", ""),
    }
}

/// Label value for a terminal status code, matching the upper
/// snake-case names used by the standard gRPC metric conventions.
pub fn code_label(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_method_path() {
        let (service, method) = split_method_path("/helloworld.Greeter/SayHello");
        assert_eq!(service, "helloworld.Greeter");
        assert_eq!(method, "SayHello");
    }

    #[test]
    fn test_split_preserves_components_verbatim() {
        let (service, method) = split_method_path("/My.Service/Do/Extra");
        assert_eq!(service, "My.Service");
        assert_eq!(method, "Do/Extra");
    }

    #[test]
    fn test_split_malformed_path() {
        assert_eq!(split_method_path("no-separator"), ("", ""));
        assert_eq!(split_method_path(""), ("", ""));
    }

    #[test]
    fn test_code_labels() {
        assert_eq!(code_label(Code::Ok), "OK");
        assert_eq!(code_label(Code::NotFound), "NOT_FOUND");
        assert_eq!(code_label(Code::DeadlineExceeded), "DEADLINE_EXCEEDED");
    }

    #[test]
    fn test_rpc_type_labels() {
        assert_eq!(RpcType::Unary.as_str(), "UNARY");
        assert_eq!(RpcType::ServerStreaming.as_str(), "SERVER_STREAMING");
        assert_eq!(RpcType::ClientStreaming.as_str(), "CLIENT_STREAMING");
        assert_eq!(RpcType::BidiStreaming.as_str(), "BIDI_STREAMING");
    }
}
