//! Error taxonomy for configuring and invoking remote algorithms.
//!
//! Transport details are carried as their `Display` strings so this
//! crate stays free of any HTTP client dependency.

use crate::algorithm::{AlgorithmKind, Parameter};

/// A configuration call was rejected or could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The remote service answered with a non-success status.
    #[error("setting {parameter} was rejected with status {status}")]
    Rejected {
        /// Parameter being set.
        parameter: Parameter,
        /// HTTP status code returned.
        status: u16,
    },

    /// The request never completed (connection refused, timeout, ...).
    #[error("setting {parameter} failed: {reason}")]
    Unreachable {
        /// Parameter being set.
        parameter: Parameter,
        /// Transport failure description.
        reason: String,
    },
}

/// An invocation call failed or returned something unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The remote service answered with a non-success status.
    #[error("{endpoint} was rejected with status {status}")]
    Rejected {
        /// Endpoint that was called.
        endpoint: &'static str,
        /// HTTP status code returned.
        status: u16,
    },

    /// The request never completed.
    #[error("{endpoint} failed: {reason}")]
    Unreachable {
        /// Endpoint that was called.
        endpoint: &'static str,
        /// Transport failure description.
        reason: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("{endpoint} returned a malformed response: {reason}")]
    MalformedResponse {
        /// Endpoint that was called.
        endpoint: &'static str,
        /// Parse failure description.
        reason: String,
    },
}

/// Failure of a whole dispatch.
///
/// The first three variants are local and are raised before any
/// network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The selector does not name a known algorithm.
    #[error("unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// The algorithm reads a parameter the request did not supply.
    #[error("{algorithm} requires {parameter} but none was given")]
    MissingParameter {
        /// Algorithm being dispatched.
        algorithm: AlgorithmKind,
        /// Parameter that was absent.
        parameter: Parameter,
    },

    /// A supplied parameter cannot be sent as a decimal number.
    #[error("{parameter} must be a finite number, got {value}")]
    InvalidParameter {
        /// Offending parameter.
        parameter: Parameter,
        /// Offending value, as given.
        value: String,
    },

    /// A configuration call failed, so the algorithm was never invoked.
    #[error("configuration failed: {0}")]
    ConfigurationFailed(#[from] ConfigError),

    /// The invocation call failed.
    #[error("invocation failed: {0}")]
    InvocationFailed(#[from] NetworkError),

    /// The dispatch queue has shut down.
    #[error("dispatch queue is closed")]
    QueueClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_wraps_into_configuration_failed() {
        let err: DispatchError = ConfigError::Rejected {
            parameter: Parameter::Sigma,
            status: 500,
        }
        .into();
        assert!(matches!(
            err,
            DispatchError::ConfigurationFailed(ConfigError::Rejected { status: 500, .. })
        ));
        assert_eq!(
            err.to_string(),
            "configuration failed: setting sigma was rejected with status 500"
        );
    }

    #[test]
    fn network_error_wraps_into_invocation_failed() {
        let err: DispatchError = NetworkError::MalformedResponse {
            endpoint: "/canny",
            reason: "missing field `base64`".into(),
        }
        .into();
        assert!(matches!(err, DispatchError::InvocationFailed(_)));
        assert!(err.to_string().contains("/canny"));
    }

    #[test]
    fn missing_parameter_names_algorithm_and_parameter() {
        let err = DispatchError::MissingParameter {
            algorithm: AlgorithmKind::Shi,
            parameter: Parameter::Threshold,
        };
        assert_eq!(err.to_string(), "shi requires threshold but none was given");
    }
}
