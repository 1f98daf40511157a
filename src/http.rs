// 🌐 HTTP Seam - GET requests and request pacing
// Adapters only see these traits, so tests can script responses without a network

use serde_json::Value;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Status and body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Only a 200 counts as data
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

pub trait HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}

/// Blocking reqwest client used by the binary
pub struct ReqwestClient {
    http: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, HttpError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { http })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| HttpError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| HttpError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// ============================================================================
// PACING
// ============================================================================

/// Called after every request, whatever its outcome
pub trait Pacer {
    fn pause(&self);
}

/// Sleep a fixed interval. Not adaptive.
pub struct FixedPause {
    pub interval: Duration,
}

impl FixedPause {
    pub fn new(interval: Duration) -> Self {
        FixedPause { interval }
    }
}

impl Pacer for FixedPause {
    fn pause(&self) {
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
    }
}

// ============================================================================
// TEST DOUBLES
// ============================================================================


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[test]
    fn test_only_200_is_ok() {
        let ok = HttpResponse { status: 200, body: "{}".to_string() };
        let created = HttpResponse { status: 201, body: "{}".to_string() };

        assert!(ok.is_ok());
        assert!(!created.is_ok());
    }

    #[test]
    fn test_mock_routes_and_records() {
        let http = MockHttp::new()
            .respond("/a", 200, "alpha")
            .fail("/b", "connection reset");

        assert_eq!(http.get("https://x/a?q=1").unwrap().body, "alpha");
        assert!(http.get("https://x/b").is_err());
        assert_eq!(http.get("https://x/c").unwrap().status, 404);
        assert_eq!(http.requests().len(), 3);
    }

    #[test]
    fn test_zero_pause_returns_immediately() {
        let pacer = FixedPause::new(Duration::ZERO);
        pacer.pause();
    }
}
