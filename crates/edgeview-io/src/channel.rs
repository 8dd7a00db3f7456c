//! Configuration calls that set the remote service's shared parameters.
//!
//! The remote keeps one `sigma` and one `threshold` for all clients.
//! This channel only pushes values; it never caches what it sent,
//! since the remote copy may be overwritten by anyone at any time.

use std::sync::Arc;

use edgeview_protocol::request::format_decimal;
use edgeview_protocol::{ConfigError, ConfigStep, Parameter};
use tracing::{debug, warn};

use crate::transport::{Body, Transport};

/// Sends parameter updates to the remote service.
#[derive(Debug)]
pub struct ConfigurationChannel<T> {
    transport: Arc<T>,
}

impl<T: Transport> ConfigurationChannel<T> {
    /// Create a channel over a shared transport.
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Set `parameter` to `value` on the remote service.
    ///
    /// The value is sent as its decimal string representation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Rejected`] for a non-success status and
    /// [`ConfigError::Unreachable`] if the call did not complete.
    pub async fn set_parameter(&self, parameter: Parameter, value: f64) -> Result<(), ConfigError> {
        let body = format_decimal(value);
        debug!(%parameter, value = %body, "setting remote parameter");

        let reply = self
            .transport
            .post(parameter.endpoint(), Body::Text(body))
            .await
            .map_err(|e| {
                warn!(%parameter, error = %e, "configuration call failed");
                ConfigError::Unreachable {
                    parameter,
                    reason: e.to_string(),
                }
            })?;

        if reply.is_success() {
            Ok(())
        } else {
            warn!(%parameter, status = reply.status, "configuration call rejected");
            Err(ConfigError::Rejected {
                parameter,
                status: reply.status,
            })
        }
    }

    /// Apply one planned configuration step.
    ///
    /// # Errors
    ///
    /// See [`set_parameter`](Self::set_parameter).
    pub async fn apply(&self, step: &ConfigStep) -> Result<(), ConfigError> {
        self.set_parameter(step.parameter, step.value).await
    }
}
