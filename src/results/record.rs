// src/results/record.rs
// =============================================================================
// The result of one fetch attempt.
//
// Every request the workers make produces exactly one ScanResult, whether it
// succeeded, failed at the network level, or was a redirect.
// =============================================================================

use crate::transport::{FetchResponse, TransportError};
use serde::Serialize;
use url::Url;

// #[derive(Serialize)] lets us print results as JSON
// #[derive(PartialEq)] lets tests compare whole records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// The URL that was requested
    pub url: Url,
    /// HTTP status code, absent when no response arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Transport failure, if the request failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TransportError>,
    /// Where a redirect response pointed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<Url>,
    /// Content-Length of the response, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl ScanResult {
    /// Result for a request that got a response
    pub fn fetched(url: Url, response: &FetchResponse) -> Self {
        Self {
            url,
            code: Some(response.status),
            error: None,
            redirect: response.redirect.clone(),
            length: response.content_length,
        }
    }

    /// Result for a request that failed before a usable response arrived
    pub fn failed(url: Url, error: TransportError) -> Self {
        Self {
            url,
            code: error.status(),
            error: Some(error),
            redirect: None,
            length: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Some(404)
    }
}
