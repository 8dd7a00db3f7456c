//! Invocation calls that run an algorithm on the remote service.

use std::sync::Arc;

use edgeview_protocol::{AlgorithmKind, NetworkError, Outcome, parse_outcome};
use tracing::{debug, warn};

use crate::transport::{Body, Transport};

/// Posts image bytes to an algorithm endpoint and parses the reply.
///
/// Never retries.
#[derive(Debug)]
pub struct AlgorithmInvoker<T> {
    transport: Arc<T>,
}

impl<T: Transport> AlgorithmInvoker<T> {
    /// Create an invoker over a shared transport.
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Run `algorithm` on `image`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Unreachable`] if the call did not
    /// complete, [`NetworkError::Rejected`] for a non-success status and
    /// [`NetworkError::MalformedResponse`] if the body lacks the
    /// expected fields.
    pub async fn invoke(&self, algorithm: AlgorithmKind, image: Vec<u8>) -> Result<Outcome, NetworkError> {
        let endpoint = algorithm.endpoint();
        debug!(endpoint, bytes = image.len(), "invoking algorithm");

        let reply = self
            .transport
            .post(endpoint, Body::Binary(image))
            .await
            .map_err(|e| NetworkError::Unreachable {
                endpoint,
                reason: e.to_string(),
            })?;

        if !reply.is_success() {
            warn!(endpoint, status = reply.status, "invocation rejected");
            return Err(NetworkError::Rejected {
                endpoint,
                status: reply.status,
            });
        }

        parse_outcome(algorithm, &reply.body)
    }
}
