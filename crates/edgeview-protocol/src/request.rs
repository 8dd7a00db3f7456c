//! Analysis requests and the dispatch plans derived from them.
//!
//! Planning is pure: [`AnalysisRequest::plan`] resolves the selector,
//! checks parameters, and lists the configuration calls to make before
//! the invocation. Anything that can be rejected locally is rejected
//! here, before a single byte goes over the wire.

use crate::algorithm::{AlgorithmKind, Parameter};
use crate::error::DispatchError;

/// One user-initiated analysis of an uploaded image.
///
/// Immutable once built. The algorithm selector is kept exactly as the
/// UI supplied it and only resolved when planned.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    image: Vec<u8>,
    selector: String,
    sigma: Option<f64>,
    threshold: Option<f64>,
}

impl AnalysisRequest {
    /// Create a request for `image` using the algorithm named by `selector`.
    #[must_use]
    pub fn new(image: Vec<u8>, selector: impl Into<String>) -> Self {
        Self {
            image,
            selector: selector.into(),
            sigma: None,
            threshold: None,
        }
    }

    /// Set the sigma value sent to algorithms that read it.
    #[must_use]
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    /// Set the threshold value sent to algorithms that read it.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Raw image bytes, sent unchanged as the invocation body.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Consume the request, keeping only the image bytes.
    #[must_use]
    pub fn into_image(self) -> Vec<u8> {
        self.image
    }

    /// The algorithm selector as supplied.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The supplied value for `parameter`, if any.
    #[must_use]
    pub const fn value_of(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Sigma => self.sigma,
            Parameter::Threshold => self.threshold,
        }
    }

    /// Resolve the selector and build the ordered call plan.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnsupportedAlgorithm`] for an unknown
    /// selector, [`DispatchError::MissingParameter`] when a required
    /// parameter was not supplied, and
    /// [`DispatchError::InvalidParameter`] for a NaN or infinite value.
    pub fn plan(&self) -> Result<DispatchPlan, DispatchError> {
        let algorithm: AlgorithmKind = self.selector.parse()?;

        let configuration = algorithm
            .required_parameters()
            .iter()
            .map(|&parameter| {
                let value = self
                    .value_of(parameter)
                    .ok_or(DispatchError::MissingParameter {
                        algorithm,
                        parameter,
                    })?;
                if !value.is_finite() {
                    return Err(DispatchError::InvalidParameter {
                        parameter,
                        value: value.to_string(),
                    });
                }
                Ok(ConfigStep { parameter, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DispatchPlan {
            algorithm,
            configuration,
        })
    }
}

/// A single configuration call: set `parameter` to `value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigStep {
    /// Parameter to set.
    pub parameter: Parameter,
    /// Finite value to send.
    pub value: f64,
}

impl ConfigStep {
    /// Request body: the shortest decimal string that round-trips.
    ///
    /// `3.5` becomes `"3.5"` and `2.0` becomes `"2"`.
    #[must_use]
    pub fn body(&self) -> String {
        format_decimal(self.value)
    }
}

/// Format a finite value as its decimal string representation.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    value.to_string()
}

/// The ordered calls making up one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPlan {
    /// Resolved algorithm.
    pub algorithm: AlgorithmKind,
    /// Configuration calls, in the order they must complete.
    pub configuration: Vec<ConfigStep>,
}

impl DispatchPlan {
    /// Endpoint invoked once every configuration call has succeeded.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        self.algorithm.endpoint()
    }
}
