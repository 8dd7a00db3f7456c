//! edgeview-protocol: The remote detection protocol and result history (sans-IO).
//!
//! Describes how an analysis is carried out against the remote
//! detection service:
//! resolve algorithm -> configure shared parameters -> invoke endpoint
//! -> unpack results -> record history.
//!
//! This crate has **no I/O dependencies** -- it plans calls, parses
//! response bodies and keeps the history in memory. All network and
//! filesystem interaction lives in `edgeview-io`.

pub mod algorithm;
pub mod error;
pub mod history;
pub mod request;
pub mod response;

pub use algorithm::{AlgorithmKind, Parameter};
pub use error::{ConfigError, DispatchError, NetworkError};
pub use history::{Clock, HistoryEntry, LocalClock, ResultHistory};
pub use request::{AnalysisRequest, ConfigStep, DispatchPlan};
pub use response::{AnalysisResult, Outcome, parse_outcome};

/// Default sigma held by the remote service before any configuration call.
pub const DEFAULT_SIGMA: f64 = 1.0;

/// Default threshold held by the remote service before any configuration call.
pub const DEFAULT_THRESHOLD: f64 = 0.3;
