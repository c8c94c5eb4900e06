//! Request/response observation capability.

use crate::transport::{TransportRequest, TransportResponse};

/// Observer for outgoing requests and incoming raw responses.
///
/// Both calls are fire-and-forget: implementations must not block the
/// pipeline, and a panicking logger is contained by the client rather than
/// surfaced as a request error. The client serializes all invocations, so
/// implementations need no internal locking.
pub trait NetworkLogger: Send + Sync {
    /// Called with the outgoing request, before it is handed to the transport.
    fn log_request(&self, request: &TransportRequest);

    /// Called with the raw response, before validation and decoding.
    fn log_response(&self, response: &TransportResponse);
}

/// Logger that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl NetworkLogger for NoopLogger {
    fn log_request(&self, _request: &TransportRequest) {}

    fn log_response(&self, _response: &TransportResponse) {}
}

/// Logger that forwards one-line summaries to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugLogger;

impl NetworkLogger for DebugLogger {
    fn log_request(&self, request: &TransportRequest) {
        log::debug!("--> {} {}", request.method, request.url);
    }

    fn log_response(&self, response: &TransportResponse) {
        log::debug!("<-- {} ({} bytes)", response.status, response.body.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Method, ParameterEncoding};
    use crate::error::HttpStatusCode;
    use std::collections::HashMap;
    use url::Url;

    fn request() -> TransportRequest {
        TransportRequest {
            url: Url::parse("https://api.test/users").unwrap(),
            method: Method::Get,
            parameters: None,
            encoding: ParameterEncoding::Query,
            headers: HashMap::new(),
        }
    }

    fn response() -> TransportResponse {
        TransportResponse {
            status: HttpStatusCode::new(200),
            headers: Vec::new(),
            body: b"{}".to_vec(),
        }
    }

    #[test]
    fn noop_logger_accepts_traffic_silently() {
        let logger = NoopLogger;
        logger.log_request(&request());
        logger.log_response(&response());
    }

    #[test]
    fn debug_logger_summarizes_traffic() {
        let logger = DebugLogger;
        logger.log_request(&request());
        logger.log_response(&response());
    }
}
