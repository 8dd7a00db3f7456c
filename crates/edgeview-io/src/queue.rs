//! Serialized access to the remote service.
//!
//! The remote's `sigma` and `threshold` are global: a configuration
//! call from one dispatch can land between another dispatch's
//! configuration and its invocation. [`DispatchQueue`] owns the only
//! [`Dispatcher`] in a dedicated task and feeds it one request at a
//! time, so each configure-and-invoke sequence runs to completion
//! before the next begins.
//!
//! Requests are served in submission order. A caller that stops
//! waiting does not cancel its request; the result is dropped when it
//! arrives.

use edgeview_protocol::{AnalysisRequest, DispatchError, Outcome};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::transport::Transport;

type Reply = oneshot::Sender<Result<Outcome, DispatchError>>;

struct Job {
    request: AnalysisRequest,
    reply: Reply,
}

/// Handle to the dispatch task. Cheap to clone; every clone feeds the
/// same queue.
#[derive(Debug, Clone)]
pub struct DispatchQueue {
    sender: mpsc::Sender<Job>,
}

impl DispatchQueue {
    /// Spawn the dispatch task on the current tokio runtime.
    ///
    /// `depth` bounds how many requests may wait; submitters beyond
    /// that are suspended until a slot frees up. The task exits once
    /// every handle has been dropped and the queue has drained.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn<T: Transport>(dispatcher: Dispatcher<T>, depth: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Job>(depth.max(1));

        tokio::spawn(async move {
            while let Some(Job { request, reply }) = receiver.recv().await {
                let result = dispatcher.dispatch(request).await;
                if reply.send(result).is_err() {
                    debug!("caller stopped waiting; dispatch result dropped");
                }
            }
            debug!("dispatch queue closed");
        });

        Self { sender }
    }

    /// Queue `request` and wait for its outcome.
    ///
    /// Requests that cannot succeed (unknown algorithm, missing or
    /// invalid parameters) fail immediately without waiting in line.
    ///
    /// # Errors
    ///
    /// Returns whatever [`Dispatcher::dispatch`] returns, or
    /// [`DispatchError::QueueClosed`] if the dispatch task is gone.
    pub async fn dispatch(&self, request: AnalysisRequest) -> Result<Outcome, DispatchError> {
        request.plan()?;

        let (reply, response) = oneshot::channel();
        self.sender
            .send(Job { request, reply })
            .await
            .map_err(|_| DispatchError::QueueClosed)?;
        response.await.map_err(|_| DispatchError::QueueClosed)?
    }
}
