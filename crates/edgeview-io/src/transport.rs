//! HTTP transport to the remote detection service.
//!
//! [`Transport`] is the seam between the protocol logic and the wire.
//! [`HttpTransport`] implements it with `reqwest`; tests substitute a
//! recording fake.

use std::future::Future;

use tracing::trace;

use crate::config::ClientConfig;

/// Request body of a POST to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Decimal parameter value, sent as `text/plain`.
    Text(String),
    /// Raw image bytes, sent as `application/octet-stream`.
    Binary(Vec<u8>),
}

impl Body {
    const fn content_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text/plain",
            Self::Binary(_) => "application/octet-stream",
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl Reply {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Errors raised below the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server URL could not be parsed.
    #[error("invalid server URL {url:?}: {reason}")]
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Parse failure description.
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// The call exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// No connection could be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport failure.
    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Something that can POST to the remote service.
///
/// Implementations must not retry; every call is made exactly once.
pub trait Transport: Send + Sync + 'static {
    /// POST `body` to `path` (e.g. `/setSigma`) and return the reply.
    ///
    /// A non-success status is a successful exchange and is returned
    /// as a [`Reply`]; only failures to complete the exchange are errors.
    fn post(
        &self,
        path: &'static str,
        body: Body,
    ) -> impl Future<Output = Result<Reply, TransportError>> + Send;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: String,
}

impl HttpTransport {
    /// Build a transport for `config.server_url` with `config.timeout`
    /// applied to every call.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if the server URL does not
    /// parse, or [`TransportError::Build`] if the client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let url = reqwest::Url::parse(&config.server_url).map_err(|e| TransportError::InvalidUrl {
            url: config.server_url.clone(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self {
            client,
            base: url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    /// Base URL every path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }
}

impl Transport for HttpTransport {
    async fn post(&self, path: &'static str, body: Body) -> Result<Reply, TransportError> {
        let url = format!("{}{path}", self.base);
        trace!(%url, bytes = body.len(), "POST");

        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, body.content_type());
        let request = match body {
            Body::Text(text) => request.body(text),
            Body::Binary(bytes) => request.body(bytes),
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        trace!(%url, status, bytes = body.len(), "reply");
        Ok(Reply { status, body })
    }
}
