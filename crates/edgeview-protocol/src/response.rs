//! Algorithm results and parsing of the remote service's JSON replies.
//!
//! Single endpoints answer `{ "data": { "base64": "..." } }`; the
//! aggregate endpoint answers `{ "data": { "canny": "...", "sobel":
//! "...", "harris": "...", "shi": "..." } }`.

use serde::{Deserialize, Serialize};

use crate::algorithm::AlgorithmKind;
use crate::error::NetworkError;

/// MIME type of every image the remote service returns.
pub const RESULT_MIME: &str = "image/png";

/// Output of one algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Algorithm that produced the image. Never [`AlgorithmKind::All`].
    pub algorithm: AlgorithmKind,
    /// Base64-encoded PNG.
    pub image_base64: String,
}

impl AnalysisResult {
    /// The image as a `data:` URL suitable for an `<img src>`.
    #[must_use]
    pub fn data_url(&self) -> String {
        data_url(RESULT_MIME, &self.image_base64)
    }
}

/// Build a `data:` URL from a MIME type and a base64 payload.
#[must_use]
pub fn data_url(mime: &str, base64: &str) -> String {
    format!("data:{mime};base64,{base64}")
}

/// Everything one successful dispatch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// One single-algorithm result.
    Single(AnalysisResult),
    /// The aggregate, unpacked in [`AlgorithmKind::AGGREGATE_ORDER`].
    Aggregate([AnalysisResult; 4]),
}

impl Outcome {
    /// The algorithm that was dispatched.
    #[must_use]
    pub const fn algorithm(&self) -> AlgorithmKind {
        match self {
            Self::Single(result) => result.algorithm,
            Self::Aggregate(_) => AlgorithmKind::All,
        }
    }

    /// The results, in rendering order.
    #[must_use]
    pub fn results(&self) -> &[AnalysisResult] {
        match self {
            Self::Single(result) => std::slice::from_ref(result),
            Self::Aggregate(results) => results,
        }
    }

    /// History label for each result.
    ///
    /// A single dispatch is labelled with its selector name
    /// (`"sobel"`); aggregate entries use display names (`"Sobel"`).
    #[must_use]
    pub fn labelled(&self) -> Vec<(&'static str, &AnalysisResult)> {
        match self {
            Self::Single(result) => vec![(result.algorithm.name(), result)],
            Self::Aggregate(results) => results
                .iter()
                .map(|result| (result.algorithm.display_name(), result))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct SingleData {
    base64: String,
}

#[derive(Deserialize)]
struct AggregateData {
    canny: String,
    sobel: String,
    harris: String,
    shi: String,
}

/// Parse the body returned by `algorithm`'s endpoint.
///
/// # Errors
///
/// Returns [`NetworkError::MalformedResponse`] if the body is not JSON
/// or lacks an expected field.
pub fn parse_outcome(algorithm: AlgorithmKind, body: &[u8]) -> Result<Outcome, NetworkError> {
    let endpoint = algorithm.endpoint();
    let malformed = |e: serde_json::Error| NetworkError::MalformedResponse {
        endpoint,
        reason: e.to_string(),
    };

    if algorithm.is_aggregate() {
        let Envelope { data } =
            serde_json::from_slice::<Envelope<AggregateData>>(body).map_err(malformed)?;
        let AggregateData {
            canny,
            sobel,
            harris,
            shi,
        } = data;
        let [k0, k1, k2, k3] = AlgorithmKind::AGGREGATE_ORDER;
        Ok(Outcome::Aggregate([
            AnalysisResult {
                algorithm: k0,
                image_base64: canny,
            },
            AnalysisResult {
                algorithm: k1,
                image_base64: sobel,
            },
            AnalysisResult {
                algorithm: k2,
                image_base64: harris,
            },
            AnalysisResult {
                algorithm: k3,
                image_base64: shi,
            },
        ]))
    } else {
        let Envelope { data } =
            serde_json::from_slice::<Envelope<SingleData>>(body).map_err(malformed)?;
        Ok(Outcome::Single(AnalysisResult {
            algorithm,
            image_base64: data.base64,
        }))
    }
}
