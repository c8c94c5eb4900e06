//! Asynchronous typed-endpoint HTTP client.
//!
//! # Overview
//! Requests are described by immutable [`Endpoint`] values (path, method,
//! parameters, encoding, decode function) and issued through an
//! [`ApiClient`], which resolves the absolute URL, snapshots the current
//! headers, dispatches to a pluggable [`Transport`], validates the raw
//! response, and decodes the body into a typed value. Each call yields a
//! [`RequestTask`]: a single-outcome producer that resolves to the decoded
//! value or an [`ApiError`], and emits nothing at all if cancelled first.
//!
//! # Design
//! - Validation runs strictly before decoding; a custom [`ApiErrorHandler`]
//!   can replace the default 200-399 status check and declare structured
//!   domain errors from the raw body.
//! - A [`NetworkLogger`] observes outgoing requests and raw responses;
//!   its failures never affect the pipeline.
//! - Response-side processing is serialized per client, so collaborators
//!   need no internal locking.
//! - No retries, timeouts, or caching in the core; timeouts belong to the
//!   transport (see [`TransportConfig`]).
//!
//! # Example
//!
//! ```no_run
//! use endpoints_core::{ApiClient, Endpoint, Method, TransportConfig};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(
//!     Url::parse("https://api.example.com/")?,
//!     TransportConfig::default(),
//! )?;
//! client.set_header("authorization", "Bearer secret");
//!
//! let endpoint = Endpoint::<serde_json::Value>::json(Method::Get, "users/1");
//! let task = client.request(&endpoint);
//! match task.outcome().await {
//!     Some(Ok(user)) => println!("got {user}"),
//!     Some(Err(err)) => eprintln!("failed: {err}"),
//!     None => eprintln!("cancelled"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoint;
pub mod error;
pub mod logger;
pub mod transport;
pub mod validation;

pub use client::{ApiClient, RequestTask};
pub use endpoint::{DecodeError, Endpoint, Method, ParameterEncoding, Parameters};
pub use error::{ApiError, HttpStatusCode};
pub use logger::{DebugLogger, NetworkLogger, NoopLogger};
pub use transport::{
    HttpTransport, Transport, TransportConfig, TransportFailure, TransportRequest,
    TransportResponse,
};
pub use validation::{ApiErrorHandler, NoopErrorHandler};
