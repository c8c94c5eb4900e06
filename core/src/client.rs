//! The request pipeline: URL resolution, dispatch, validation, decoding, and
//! error translation.
//!
//! # Design
//! - [`ApiClient`] owns the base URL, a guarded header map, and the two
//!   pluggable collaborators (logger and error handler).
//! - `request` snapshots the headers synchronously, then spawns the pipeline
//!   onto the ambient tokio runtime; the returned [`RequestTask`] is a
//!   single-outcome producer with cooperative cancellation.
//! - Response-side processing (logger, validation, decode) is funneled
//!   through a per-client mutex so the collaborators are never invoked
//!   concurrently with themselves.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::logger::NetworkLogger;
use crate::transport::{
    HttpTransport, Transport, TransportConfig, TransportFailure, TransportRequest,
};
use crate::validation::ApiErrorHandler;

type SharedLogger = Arc<RwLock<Option<Arc<dyn NetworkLogger>>>>;

/// Client for issuing requests described by [`Endpoint`] descriptors.
///
/// Cloning is cheap and clones share headers, logger, and transport.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    headers: Arc<RwLock<HashMap<String, String>>>,
    logger: SharedLogger,
    error_handler: Option<Arc<dyn ApiErrorHandler>>,
    response_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a client with the default reqwest-backed transport.
    pub fn new(base_url: Url, config: TransportConfig) -> Result<Self, TransportFailure> {
        Ok(Self::with_transport(
            base_url,
            Arc::new(HttpTransport::new(config)?),
        ))
    }

    /// Create a client over an injected transport.
    pub fn with_transport(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url,
            transport,
            headers: Arc::new(RwLock::new(HashMap::new())),
            logger: Arc::new(RwLock::new(None)),
            error_handler: None,
            response_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Replace the initial header set. Construction-time convenience.
    #[must_use]
    pub fn headers(self, headers: HashMap<String, String>) -> Self {
        *write_lock(&self.headers) = headers;
        self
    }

    /// Attach a logger at construction time.
    #[must_use]
    pub fn logger(self, logger: Arc<dyn NetworkLogger>) -> Self {
        self.set_logger(logger);
        self
    }

    /// Attach the error handler. Fixed for the client's lifetime.
    #[must_use]
    pub fn error_handler(mut self, handler: Arc<dyn ApiErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set a header for requests dispatched after this call.
    pub fn set_header(&self, key: impl Into<String>, value: impl Into<String>) {
        write_lock(&self.headers).insert(key.into(), value.into());
    }

    /// Remove a header for requests dispatched after this call.
    pub fn remove_header(&self, key: &str) {
        write_lock(&self.headers).remove(key);
    }

    /// Drop every header for requests dispatched after this call.
    pub fn clear_headers(&self) {
        write_lock(&self.headers).clear();
    }

    /// Atomically replace the active logger.
    pub fn set_logger(&self, logger: Arc<dyn NetworkLogger>) {
        *write_lock(&self.logger) = Some(logger);
    }

    /// Dispatch a request described by `endpoint`.
    ///
    /// The header snapshot is taken synchronously before this returns, so
    /// later header mutations cannot leak into the dispatched request. Must
    /// be called within a tokio runtime.
    pub fn request<R: Send + 'static>(&self, endpoint: &Endpoint<R>) -> RequestTask<R> {
        let url = resolve_url(&self.base_url, endpoint.path());
        let headers = read_lock(&self.headers).clone();
        let endpoint = endpoint.clone();
        let transport = Arc::clone(&self.transport);
        let logger = Arc::clone(&self.logger);
        let error_handler = self.error_handler.clone();
        let gate = Arc::clone(&self.response_gate);

        let token = CancellationToken::new();
        let (sender, receiver) = oneshot::channel();

        let cancel = token.clone();
        tokio::spawn(async move {
            let completion = cancel.clone();
            let pipeline =
                run_pipeline(url, endpoint, headers, transport, logger, error_handler, gate);
            tokio::select! {
                _ = cancel.cancelled() => {}
                outcome = pipeline => {
                    if !completion.is_cancelled() {
                        let _ = sender.send(outcome);
                    }
                }
            }
        });

        RequestTask {
            outcome: receiver,
            cancel: token,
        }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Handle to one in-flight request: a single-outcome producer with
/// cooperative cancellation.
///
/// Dropping the task without awaiting [`outcome`](Self::outcome) cancels the
/// request.
pub struct RequestTask<R> {
    outcome: oneshot::Receiver<Result<R, ApiError>>,
    cancel: CancellationToken,
}

impl<R> RequestTask<R> {
    /// Request cancellation: aborts the transport call and guarantees that no
    /// terminal event is delivered afterward. Not an error outcome, an
    /// abandonment.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Clonable token for cancelling this request from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the terminal outcome.
    ///
    /// Returns `None` when cancellation was requested before a terminal
    /// event was observed.
    pub async fn outcome(mut self) -> Option<Result<R, ApiError>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            outcome = &mut self.outcome => outcome.ok(),
        }
    }
}

impl<R> Drop for RequestTask<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_pipeline<R>(
    url: Result<Url, ApiError>,
    endpoint: Endpoint<R>,
    headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
    logger: SharedLogger,
    error_handler: Option<Arc<dyn ApiErrorHandler>>,
    gate: Arc<Mutex<()>>,
) -> Result<R, ApiError> {
    let url = url?;
    let request = TransportRequest {
        url,
        method: endpoint.method(),
        parameters: endpoint.parameters().cloned(),
        encoding: endpoint.encoding(),
        headers,
    };

    if let Some(active) = current_logger(&logger) {
        let _observing = gate.lock().await;
        contain_panic("network logger (request)", || active.log_request(&request));
    }
    log::debug!("dispatching {} {}", request.method, request.url);

    let response = transport.perform(request).await.map_err(|failure| {
        log::debug!("transport failure: {failure}");
        ApiError::Response
    })?;

    let _processing = gate.lock().await;

    if let Some(active) = current_logger(&logger) {
        contain_panic("network logger (response)", || active.log_response(&response));
    }

    match error_handler.as_deref() {
        Some(handler) if handler.uses_custom_validation() => {
            if let Some(error) = handler.validate(response.status, &response.body) {
                return Err(error);
            }
        }
        _ => {
            if !(response.status.is_success() || response.status.is_redirect()) {
                return Err(ApiError::Response);
            }
        }
    }

    endpoint.decode(&response.body).map_err(|cause| {
        log::debug!("decoding response for {} failed: {cause}", endpoint.path());
        ApiError::Response
    })
}

/// Append `path`'s segments to the base URL. The base path is only ever
/// extended, never replaced, and empty segments are dropped.
fn resolve_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|()| ApiError::Response)?;
        segments.pop_if_empty();
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            segments.push(segment);
        }
    }
    Ok(url)
}

fn current_logger(slot: &SharedLogger) -> Option<Arc<dyn NetworkLogger>> {
    slot.read().unwrap_or_else(|e| e.into_inner()).clone()
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Run a collaborator callback, keeping any panic out of the pipeline.
fn contain_panic(label: &str, callback: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
        log::warn!("{label} panicked; continuing");
    }
}
