//! Client configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Settings for talking to the remote detection service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote service.
    pub server_url: String,
    /// Upper bound on every individual HTTP call.
    pub timeout: Duration,
    /// How many dispatches may wait in the queue before submitters
    /// are suspended.
    pub queue_depth: usize,
}

impl ClientConfig {
    /// Default base URL of the remote service.
    pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

    /// Default per-call timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default dispatch queue depth.
    pub const DEFAULT_QUEUE_DEPTH: usize = 64;

    /// Read `EDGEVIEW_SERVER`, `EDGEVIEW_TIMEOUT_SECS` and
    /// `EDGEVIEW_QUEUE_DEPTH`, falling back to defaults for anything
    /// unset, unparsable or zero.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            server_url: lookup("EDGEVIEW_SERVER")
                .unwrap_or_else(|| Self::DEFAULT_SERVER_URL.to_owned()),
            timeout: Duration::from_secs(nonzero_or(
                lookup("EDGEVIEW_TIMEOUT_SECS").as_deref(),
                Self::DEFAULT_TIMEOUT_SECS,
            )),
            queue_depth: nonzero_or(
                lookup("EDGEVIEW_QUEUE_DEPTH").as_deref(),
                Self::DEFAULT_QUEUE_DEPTH,
            ),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: Self::DEFAULT_SERVER_URL.to_owned(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            queue_depth: Self::DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// Parse `raw`, keeping `default` when it is absent, malformed or zero.
fn nonzero_or<T: FromStr + PartialEq + Default>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok())
        .filter(|v| *v != T::default())
        .unwrap_or(default)
}
