// src/transport/mod.rs
// =============================================================================
// This module is the boundary between the scanner and the network.
//
// A Transport issues one GET for one URL and reports what came back.
// Redirects are never followed: a 3xx response comes back as a normal
// response with its target in `FetchResponse::redirect`, so the worker can
// queue the target as a new scan item instead of silently landing on it.
//
// Submodules:
// - http: The real transport, built on reqwest
//
// Rust concepts:
// - Traits: Describe "something that can fetch a URL" without naming a type
// - async-trait: Lets trait methods be async and still work across tasks
// - thiserror: Derives std::error::Error for our error enum
// =============================================================================

mod http;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use url::Url;

pub use http::{HttpConfig, HttpTransportFactory};

// Why a single request failed at the transport level
//
// A response with a 4xx/5xx status is NOT an error here; those are normal
// responses. These variants only cover "we never got a usable response".
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportError {
    /// The request did not finish in time
    #[error("request timed out")]
    Timeout,
    /// The hostname could not be resolved
    #[error("could not resolve hostname")]
    Dns,
    /// TLS handshake or certificate problem
    #[error("TLS error: {message}")]
    Tls { message: String },
    /// TCP connection could not be established
    #[error("connection failed: {message}")]
    Connect { message: String },
    /// Any other request failure, with the status if one was received
    #[error("request failed: {message}")]
    Request { message: String, status: Option<u16> },
    /// The response body could not be read
    #[error("failed to read body: {message}")]
    Body { message: String },
    /// The HTTP client itself could not be constructed
    #[error("failed to build HTTP client: {message}")]
    Build { message: String },
}

impl TransportError {
    /// Status code received before the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Request { status, .. } => *status,
            _ => None,
        }
    }
}

// The body of a response, not yet read
//
// Dropping a ResponseBody releases the underlying connection, so a body that
// nobody wants is cleaned up as soon as it goes out of scope.
#[derive(Debug)]
pub enum ResponseBody {
    /// Live body still on the wire
    Stream(reqwest::Response),
    /// Body already in memory
    #[cfg(test)]
    Buffered(String),
}

impl ResponseBody {
    /// Reads the whole body as text, consuming it
    pub async fn text(self) -> Result<String, TransportError> {
        match self {
            ResponseBody::Stream(response) => {
                response.text().await.map_err(|e| TransportError::Body {
                    message: e.to_string(),
                })
            }
            #[cfg(test)]
            ResponseBody::Buffered(text) => Ok(text),
        }
    }
}

// Everything the worker needs from one completed request
#[derive(Debug)]
pub struct FetchResponse {
    /// HTTP status code (including 3xx, since redirects are not followed)
    pub status: u16,
    /// Value of Content-Length, if the server sent one
    pub content_length: Option<u64>,
    /// Value of Content-Type, if the server sent one
    pub content_type: Option<String>,
    /// Absolute target of a redirect response
    pub redirect: Option<Url>,
    /// The unread body
    pub body: ResponseBody,
}

// In-memory responses for driving workers without a network
#[cfg(test)]
impl FetchResponse {
    /// Builds a response from an in-memory body
    pub fn buffered(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            status,
            content_length: Some(body.len() as u64),
            content_type: None,
            redirect: None,
            body: ResponseBody::Buffered(body),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_redirect(mut self, target: Url) -> Self {
        self.redirect = Some(target);
        self
    }
}

// Something that can GET a URL
//
// Each worker owns its own Transport, so implementations never need to
// coordinate with other workers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one GET without following redirects
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, TransportError>;
}

// Hands out one fresh Transport per worker
pub trait TransportFactory {
    type Transport: Transport + 'static;

    fn build(&self) -> Result<Self::Transport, TransportError>;
}
