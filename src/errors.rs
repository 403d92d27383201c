// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Spider Error Types
 * Error taxonomy shared by the crawl engine and all spider variants
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use std::time::Duration;
use thiserror::Error;

/// Main spider error type
#[derive(Error, Debug)]
pub enum SpiderError {
    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Response parsing errors
    #[error("Parse error for {url}: {reason}")]
    Parse { url: String, reason: String },

    /// Browser session errors (frame probes)
    #[error("Browser error: {0}")]
    Browser(String),

    /// Control protocol errors (malformed inbound messages)
    #[error("Control protocol error: {0}")]
    ControlProtocol(String),

    /// Findings store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Timeout errors
    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// General errors
    #[error("Spider error: {0}")]
    General(String),
}

/// Network-specific errors with detailed classification
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout { url: String, timeout: Duration },

    #[error("DNS resolution failed for {host}: {reason}")]
    DnsResolutionFailed { host: String, reason: String },

    #[error("Connection reset by peer for {url}")]
    ConnectionReset { url: String },

    #[error("Connection refused for {url}")]
    ConnectionRefused { url: String },

    #[error("Too many redirects (>{max_redirects}) for {url}")]
    TooManyRedirects { url: String, max_redirects: usize },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Request failed for {url} after {attempts} attempts: {reason}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Network error: {0}")]
    Other(String),
}

impl NetworkError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionTimeout { .. } => true,
            NetworkError::ConnectionReset { .. } => true,
            NetworkError::ConnectionRefused { .. } => true,
            NetworkError::DnsResolutionFailed { .. } => false,
            NetworkError::TooManyRedirects { .. } => false,
            NetworkError::InvalidUrl { .. } => false,
            NetworkError::RetriesExhausted { .. } => false,
            NetworkError::Other(_) => false,
        }
    }
}

impl SpiderError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            SpiderError::Network(e) => e.is_retryable(),
            SpiderError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Get suggested retry delay for this error
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            SpiderError::Timeout { .. } => Some(Duration::from_secs(5)),
            _ => None,
        }
    }
}

/// Convert reqwest errors to our error types
impl From<reqwest::Error> for SpiderError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        if err.is_timeout() {
            SpiderError::Network(NetworkError::ConnectionTimeout {
                url,
                timeout: Duration::from_secs(20),
            })
        } else if err.is_connect() {
            SpiderError::Network(NetworkError::ConnectionRefused { url })
        } else if err.is_builder() || err.is_request() {
            SpiderError::Network(NetworkError::InvalidUrl { url })
        } else {
            SpiderError::Network(NetworkError::Other(err.to_string()))
        }
    }
}

/// Result type for spider operations
pub type SpiderResult<T> = Result<T, SpiderError>;
