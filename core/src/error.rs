//! Error types for the endpoint client.
//!
//! # Design
//! `ApiError` is the single terminal error type a request can resolve to.
//! Transport failures, rejected status codes, and decode failures all fold
//! into the unstructured `Response` variant; `Server` and `Validation` carry
//! structure and are only produced by a custom [`ApiErrorHandler`].
//!
//! [`ApiErrorHandler`]: crate::validation::ApiErrorHandler

use std::fmt;

use thiserror::Error;

/// HTTP status code wrapped in a semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpStatusCode(u16);

impl HttpStatusCode {
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// 2xx.
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// 3xx.
    pub const fn is_redirect(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// 4xx.
    pub const fn is_client_error(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// 5xx.
    pub const fn is_server_error(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl From<u16> for HttpStatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for HttpStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors surfaced to the caller as the terminal outcome of a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unstructured failure: the transport gave up, the status code was
    /// rejected by default validation, or the body could not be decoded.
    #[error("response error")]
    Response,

    /// Domain failure declared by a custom validator, with the status code
    /// and a server-provided message.
    #[error("{message} ({status})")]
    Server {
        status: HttpStatusCode,
        message: String,
    },

    /// Structured validation failure, optionally naming the offending field.
    #[error("{message} ({})", .property.as_deref().unwrap_or_default())]
    Validation {
        message: String,
        property: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_categories() {
        assert!(!HttpStatusCode::new(199).is_success());
        assert!(HttpStatusCode::new(200).is_success());
        assert!(HttpStatusCode::new(299).is_success());
        assert!(!HttpStatusCode::new(300).is_success());
        assert!(HttpStatusCode::new(300).is_redirect());
        assert!(HttpStatusCode::new(399).is_redirect());
        assert!(HttpStatusCode::new(404).is_client_error());
        assert!(HttpStatusCode::new(500).is_server_error());
        assert!(!HttpStatusCode::new(500).is_client_error());
    }

    #[test]
    fn status_code_displays_as_number() {
        assert_eq!(HttpStatusCode::new(404).to_string(), "404");
    }

    #[test]
    fn response_error_display() {
        assert_eq!(ApiError::Response.to_string(), "response error");
    }

    #[test]
    fn server_error_display() {
        let err = ApiError::Server {
            status: HttpStatusCode::new(500),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "boom (500)");
    }

    #[test]
    fn validation_error_display_with_property() {
        let err = ApiError::Validation {
            message: "must not be empty".to_string(),
            property: Some("name".to_string()),
        };
        assert_eq!(err.to_string(), "must not be empty (name)");
    }

    #[test]
    fn validation_error_display_without_property() {
        let err = ApiError::Validation {
            message: "bad payload".to_string(),
            property: None,
        };
        assert_eq!(err.to_string(), "bad payload ()");
    }
}
