//! Blocking HTTP transport shared by the provider clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Transport-level error taxonomy for provider requests.
#[derive(Debug)]
pub enum HttpError {
    /// Connection, DNS, or TLS failure.
    Transport(String),
    /// Non-success HTTP status with the response body.
    Status { status: u16, body: String },
    /// Response body could not be decoded.
    Decode(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Transport(msg) => write!(f, "transport error: {}", msg),
            HttpError::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            HttpError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

pub type Result<T> = std::result::Result<T, HttpError>;

/// Thin wrapper around a shared ureq agent with JSON helpers.
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(60))
            .build();
        HttpClient { agent }
    }

    /// Issue a request with optional JSON body, mapping status errors to
    /// `HttpError::Status` with the response body attached.
    pub fn send(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&impl Serialize>,
    ) -> Result<ureq::Response> {
        debug!(method, url, "provider request");

        let mut request = self.agent.request(method, url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(HttpError::Status { status, body })
            }
            Err(e) => Err(HttpError::Transport(e.to_string())),
        }
    }

    /// `send` plus JSON decoding of the response body.
    pub fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&impl Serialize>,
    ) -> Result<T> {
        let response = self.send(method, url, headers, body)?;
        response
            .into_json()
            .map_err(|e| HttpError::Decode(e.to_string()))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a transport error into the crate error, preserving the HTTP
/// status for API failures.
impl From<HttpError> for crate::errors::Error {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, body } => crate::errors::Error::Api {
                status,
                message: body,
            },
            other => crate::errors::Error::Http(other.to_string()),
        }
    }
}
