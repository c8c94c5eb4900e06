//! Transport boundary: plain-data request/response values, the [`Transport`]
//! trait, and the reqwest-backed default implementation.
//!
//! # Design
//! The client describes a request as plain data and hands it to whatever
//! implements [`Transport`]. Connection management, TLS, and timeouts live
//! entirely behind that trait. Cancellation is cooperative: dropping the
//! future returned by `perform` must abort the underlying network call,
//! which holds for [`HttpTransport`] and any reqwest-style engine.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::endpoint::{Method, ParameterEncoding, Parameters};
use crate::error::HttpStatusCode;

/// A request handed to the transport, carrying the header snapshot taken at
/// dispatch time.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: Url,
    pub method: Method,
    pub parameters: Option<Parameters>,
    pub encoding: ParameterEncoding,
    pub headers: HashMap<String, String>,
}

/// A raw response delivered by the transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: HttpStatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Failure to deliver any response at all: connectivity, TLS, timeout, or a
/// request the engine refused to execute.
#[derive(Debug, Error)]
#[error("transport failure: {message}")]
pub struct TransportFailure {
    message: String,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Network execution engine.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure>;
}

/// Configuration for the default [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportFailure> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportFailure> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(parameters) = &request.parameters {
            builder = match request.encoding {
                ParameterEncoding::Query => builder.query(&flat_pairs(parameters)),
                ParameterEncoding::JsonBody => builder.json(&json_object(parameters)),
                ParameterEncoding::FormBody => builder.form(&flat_pairs(parameters)),
            };
        }

        let response = builder.send().await?;
        let status = HttpStatusCode::new(response.status().as_u16());
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Render parameter values as flat strings for query/form encoding. String
/// values are used verbatim; everything else uses its JSON rendering.
fn flat_pairs(parameters: &Parameters) -> Vec<(String, String)> {
    parameters
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

fn json_object(parameters: &Parameters) -> serde_json::Map<String, Value> {
    parameters
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
