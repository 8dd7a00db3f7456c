//! In-memory stand-ins for the remote service, for unit tests.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::transport::{Body, Reply, Transport, TransportError};

/// One call seen by a [`FakeRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub path: &'static str,
    pub body: Body,
}

impl Call {
    /// The body as text, for configuration calls.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text),
            Body::Binary(_) => None,
        }
    }
}

type Responder = dyn Fn(&RemoteState, &Call) -> Result<Reply, TransportError> + Send + Sync;

/// Shared mutable parameters, modelled the way the real service holds them.
#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    pub sigma: Option<String>,
    pub threshold: Option<String>,
}

/// Fake service that records every call, keeps shared sigma/threshold
/// state, and answers invocations through a pluggable responder.
#[derive(Clone)]
pub struct FakeRemote {
    calls: Arc<Mutex<Vec<Call>>>,
    state: Arc<Mutex<RemoteState>>,
    responder: Arc<Responder>,
    latency: Duration,
}

impl FakeRemote {
    /// Answers every call with success; single endpoints echo the sigma
    /// and threshold in effect at invocation time as their "image".
    pub fn new() -> Self {
        Self::with_responder(|state, call| Ok(default_reply(state, call)))
    }

    pub fn with_responder(
        responder: impl Fn(&RemoteState, &Call) -> Result<Reply, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            state: Arc::new(Mutex::new(RemoteState::default())),
            responder: Arc::new(responder),
            latency: Duration::ZERO,
        }
    }

    /// Delay each reply by `latency`, after the state change it causes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn paths(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|c| c.path).collect()
    }
}

/// The reply a well-behaved service would give.
pub fn default_reply(state: &RemoteState, call: &Call) -> Reply {
    let ok = |body: String| Reply {
        status: 202,
        body: body.into_bytes(),
    };
    let seen = format!(
        "sigma={};threshold={}",
        state.sigma.as_deref().unwrap_or("-"),
        state.threshold.as_deref().unwrap_or("-"),
    );
    match call.path {
        "/setSigma" | "/setThreshold" => Reply {
            status: 200,
            body: b"Ok".to_vec(),
        },
        "/all" => ok(format!(
            r#"{{"data":{{"shi":"shi:{seen}","harris":"harris:{seen}","sobel":"sobel:{seen}","canny":"canny:{seen}"}}}}"#
        )),
        _ => ok(format!(r#"{{"data":{{"base64":"{seen}"}}}}"#)),
    }
}

impl Transport for FakeRemote {
    async fn post(&self, path: &'static str, body: Body) -> Result<Reply, TransportError> {
        let call = Call { path, body };
        self.calls.lock().push(call.clone());

        let reply = {
            let mut state = self.state.lock();
            if let Some(text) = call.text() {
                match path {
                    "/setSigma" => state.sigma = Some(text.to_owned()),
                    "/setThreshold" => state.threshold = Some(text.to_owned()),
                    _ => {}
                }
            }
            (self.responder)(&state, &call)
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        reply
    }
}
