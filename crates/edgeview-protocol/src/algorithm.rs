//! Algorithm identifiers and the algorithm-to-protocol table.
//!
//! Every remote algorithm is driven by the same state machine:
//! configure the shared remote parameters it reads, then invoke its
//! endpoint once. [`AlgorithmKind::required_parameters`] and
//! [`AlgorithmKind::endpoint`] together are that table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// A scalar parameter held in the remote service's shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    /// Gaussian blur sigma.
    Sigma,
    /// Detector threshold.
    Threshold,
}

impl Parameter {
    /// Lowercase parameter name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sigma => "sigma",
            Self::Threshold => "threshold",
        }
    }

    /// Remote endpoint that sets this parameter.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Sigma => "/setSigma",
            Self::Threshold => "/setThreshold",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Algorithm selectable by the user.
///
/// [`All`](Self::All) is the aggregate: one invocation that returns the
/// output of every single algorithm at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    /// Canny edge detector.
    Canny,
    /// Sobel gradient magnitude.
    Sobel,
    /// Harris corner detector.
    Harris,
    /// Shi-Tomasi corner detector.
    Shi,
    /// Every single algorithm in one call.
    All,
}

impl AlgorithmKind {
    /// All selectable variants, in selector order.
    pub const ALL: [Self; 5] = [Self::Canny, Self::Sobel, Self::Harris, Self::Shi, Self::All];

    /// The single algorithms unpacked from an aggregate response, in
    /// the order they are reported.
    pub const AGGREGATE_ORDER: [Self; 4] = [Self::Canny, Self::Sobel, Self::Harris, Self::Shi];

    /// Remote parameters this algorithm reads, in the order they must
    /// be configured.
    #[must_use]
    pub const fn required_parameters(self) -> &'static [Parameter] {
        match self {
            Self::Canny | Self::All => &[Parameter::Sigma, Parameter::Threshold],
            Self::Sobel => &[Parameter::Sigma],
            Self::Harris => &[],
            Self::Shi => &[Parameter::Threshold],
        }
    }

    /// Remote endpoint that runs this algorithm.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Canny => "/canny",
            Self::Sobel => "/sobel",
            Self::Harris => "/harris",
            Self::Shi => "/shi",
            Self::All => "/all",
        }
    }

    /// Lowercase selector name, as used by the UI and in labels for
    /// single-algorithm results.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Canny => "canny",
            Self::Sobel => "sobel",
            Self::Harris => "harris",
            Self::Shi => "shi",
            Self::All => "all",
        }
    }

    /// Capitalized name used for entries unpacked from an aggregate.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Canny => "Canny",
            Self::Sobel => "Sobel",
            Self::Harris => "Harris",
            Self::Shi => "Shi",
            Self::All => "All",
        }
    }

    /// Whether this is the aggregate variant.
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DispatchError::UnsupportedAlgorithm(s.to_owned()))
    }
}
