//! Custom response validation capability.
//!
//! # Design
//! Validation decides whether a raw response is a success or a domain error,
//! strictly before decoding. A handler that opts in replaces the default
//! status-range check entirely: returning `None` accepts the response no
//! matter its status code.

use crate::error::{ApiError, HttpStatusCode};

/// Inspects status and raw body before decoding and may declare a domain
/// error, short-circuiting the pipeline.
pub trait ApiErrorHandler: Send + Sync {
    /// Whether this handler replaces the default status-range validation.
    fn uses_custom_validation(&self) -> bool;

    /// Inspect a response before decode. Returning `Some` makes that error
    /// the terminal outcome; decode is never invoked.
    fn validate(&self, status: HttpStatusCode, body: &[u8]) -> Option<ApiError>;
}

/// Handler that always defers to the default validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorHandler;

impl ApiErrorHandler for NoopErrorHandler {
    fn uses_custom_validation(&self) -> bool {
        false
    }

    fn validate(&self, _status: HttpStatusCode, _body: &[u8]) -> Option<ApiError> {
        None
    }
}
