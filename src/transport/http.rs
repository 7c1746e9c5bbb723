// src/transport/http.rs
// =============================================================================
// The real Transport: one reqwest Client per worker, redirects switched off.
//
// Key functionality:
// - Makes HTTP GET requests with a timeout and a custom User-Agent
// - Never follows redirects; resolves the Location header instead
// - Sorts reqwest failures into timeout / DNS / TLS / connect / other
//
// Rust concepts:
// - Builder pattern: Client::builder() configures the HTTP client
// - Error source chains: walking `source()` to find the root cause
// =============================================================================

use super::{FetchResponse, ResponseBody, Transport, TransportError, TransportFactory};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect, Client};
use std::error::Error as _;
use std::time::Duration;
use tracing::trace;
use url::Url;

// HTTP client configuration shared by every worker's transport
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Accept self-signed / expired certificates
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("dirhound/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
        }
    }
}

// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            // Hand 3xx responses back to the worker untouched
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Build {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, TransportError> {
        trace!(%url, "Sending GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        let headers = response.headers();

        // Location may be relative, so resolve it against the request URL
        let redirect = if status.is_redirection() {
            headers
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|location| url.join(location).ok())
        } else {
            None
        };

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(FetchResponse {
            status: status.as_u16(),
            content_length: response.content_length(),
            content_type,
            redirect,
            body: ResponseBody::Stream(response),
        })
    }
}

// Builds one HttpTransport per worker from a shared config
#[derive(Debug, Clone, Default)]
pub struct HttpTransportFactory {
    config: HttpConfig,
}

impl HttpTransportFactory {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }
}

impl TransportFactory for HttpTransportFactory {
    type Transport = HttpTransport;

    fn build(&self) -> Result<HttpTransport, TransportError> {
        HttpTransport::new(&self.config)
    }
}

// Categorizes reqwest errors into our TransportError variants
//
// reqwest only exposes a few is_*() checks, so DNS and TLS problems are
// recognised by looking at the messages of the whole source chain.
fn categorize_error(error: reqwest::Error) -> TransportError {
    let message = error_chain(&error);
    let lower = message.to_lowercase();

    if error.is_timeout() {
        TransportError::Timeout
    } else if lower.contains("dns") || lower.contains("failed to lookup address") {
        TransportError::Dns
    } else if lower.contains("certificate") || lower.contains("tls") || lower.contains("ssl") {
        TransportError::Tls { message }
    } else if error.is_connect() {
        TransportError::Connect { message }
    } else {
        TransportError::Request {
            message,
            status: error.status().map(|s| s.as_u16()),
        }
    }
}

// Joins an error and all of its sources into one line
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
