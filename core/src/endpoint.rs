//! Declarative request descriptors.
//!
//! # Design
//! An [`Endpoint`] is an immutable value describing one HTTP request and how
//! to decode its response body. The decode function is the only typed part;
//! everything else is plain data handed to the transport. Parameters are an
//! ordered list of pairs so they serialize in declaration order.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Error produced by a decode function. The pipeline folds it into
/// [`ApiError::Response`](crate::error::ApiError::Response).
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an endpoint's parameters serialize onto the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterEncoding {
    /// Append parameters to the URL query string.
    #[default]
    Query,
    /// Serialize parameters as a JSON object body.
    JsonBody,
    /// Serialize parameters as an `application/x-www-form-urlencoded` body.
    FormBody,
}

/// Ordered request parameters.
pub type Parameters = Vec<(String, Value)>;

/// Immutable description of one HTTP request and how to decode its response.
pub struct Endpoint<R> {
    path: String,
    method: Method,
    parameters: Option<Parameters>,
    encoding: ParameterEncoding,
    decode: Arc<dyn Fn(&[u8]) -> Result<R, DecodeError> + Send + Sync>,
}

impl<R> Endpoint<R> {
    /// Describe an endpoint with an explicit decode function.
    pub fn new<F>(method: Method, path: impl Into<String>, decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<R, DecodeError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            method,
            parameters: None,
            encoding: ParameterEncoding::default(),
            decode: Arc::new(decode),
        }
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: ParameterEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    pub fn encoding(&self) -> ParameterEncoding {
        self.encoding
    }

    /// Run the endpoint's decode function over a raw response body.
    pub fn decode(&self, body: &[u8]) -> Result<R, DecodeError> {
        (self.decode)(body)
    }
}

impl<R: DeserializeOwned> Endpoint<R> {
    /// Endpoint whose response body is JSON-decoded into `R`.
    pub fn json(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, path, |body| {
            serde_json::from_slice(body).map_err(Into::into)
        })
    }
}

impl Endpoint<()> {
    /// Endpoint that succeeds on any validated response, ignoring the body.
    pub fn ignoring_body(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, path, |_| Ok(()))
    }
}

impl<R> Clone for Endpoint<R> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            method: self.method,
            parameters: self.parameters.clone(),
            encoding: self.encoding,
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<R> fmt::Debug for Endpoint<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("parameters", &self.parameters)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_endpoint_defaults_to_query_encoding_without_parameters() {
        let endpoint = Endpoint::<()>::ignoring_body(Method::Get, "health");
        assert_eq!(endpoint.path(), "health");
        assert_eq!(endpoint.method(), Method::Get);
        assert_eq!(endpoint.encoding(), ParameterEncoding::Query);
        assert!(endpoint.parameters().is_none());
    }

    #[test]
    fn builder_sets_parameters_and_encoding() {
        let endpoint = Endpoint::<()>::ignoring_body(Method::Post, "users")
            .with_parameters(vec![("name".to_string(), json!("Ada"))])
            .with_encoding(ParameterEncoding::JsonBody);
        assert_eq!(endpoint.encoding(), ParameterEncoding::JsonBody);
        assert_eq!(endpoint.parameters().map(Vec::len), Some(1));
    }

    #[test]
    fn json_endpoint_decodes_body() {
        let endpoint = Endpoint::<Vec<u32>>::json(Method::Get, "numbers");
        let decoded = endpoint.decode(b"[1,2,3]").unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);
    }

    #[test]
    fn json_endpoint_rejects_malformed_body() {
        let endpoint = Endpoint::<Vec<u32>>::json(Method::Get, "numbers");
        assert!(endpoint.decode(b"not json").is_err());
    }

    #[test]
    fn ignoring_body_accepts_anything() {
        let endpoint = Endpoint::ignoring_body(Method::Delete, "users/1");
        assert!(endpoint.decode(b"whatever").is_ok());
    }

    #[test]
    fn clone_shares_the_decode_function() {
        let endpoint = Endpoint::<Vec<u32>>::json(Method::Get, "numbers");
        let cloned = endpoint.clone();
        assert_eq!(cloned.decode(b"[4]").unwrap(), vec![4]);
        assert_eq!(cloned.path(), endpoint.path());
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Patch.as_str(), "PATCH");
    }
}
