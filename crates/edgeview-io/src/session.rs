//! One active view: uploads go in, history entries come out.
//!
//! Each call to [`Session::analyze`] is an independent pipeline:
//! preview the upload, dispatch it through the shared queue, then
//! record the preview and every result as one group at the front of
//! the history. Pipelines may run concurrently; only the remote calls
//! are serialized.

use std::sync::Arc;

use edgeview_protocol::{AnalysisRequest, Clock, DispatchError, HistoryEntry, LocalClock, Outcome, ResultHistory};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::queue::DispatchQueue;
use crate::transport::{HttpTransport, Transport, TransportError};

/// Shared state of one view. Clones share the queue and the history.
#[derive(Debug)]
pub struct Session<C = LocalClock> {
    queue: DispatchQueue,
    history: Arc<Mutex<ResultHistory>>,
    clock: Arc<C>,
}

impl<C> Clone for Session<C> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            history: Arc::clone(&self.history),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl Session<LocalClock> {
    /// Connect to the service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the HTTP client cannot be set up.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn connect(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config)?;
        info!(server = transport.base_url(), queue_depth = config.queue_depth, "session connected");
        Ok(Self::new(transport, config.queue_depth, LocalClock))
    }
}

impl<C: Clock + Send + Sync + 'static> Session<C> {
    /// Build a session over `transport`, stamping entries with `clock`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn new<T: Transport>(transport: T, queue_depth: usize, clock: C) -> Self {
        Self {
            queue: DispatchQueue::spawn(Dispatcher::new(transport), queue_depth),
            history: Arc::new(Mutex::new(ResultHistory::new())),
            clock: Arc::new(clock),
        }
    }

    /// Run one upload through the pipeline.
    ///
    /// On success the history gains `[Original, result...]` at the
    /// front. On failure nothing is recorded and the error is returned
    /// for the caller to present.
    ///
    /// # Errors
    ///
    /// Returns any [`DispatchError`] from the dispatch.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<Outcome, DispatchError> {
        let original = HistoryEntry::original(request.image(), self.clock.as_ref());
        let selector = request.selector().to_owned();

        let outcome = self.queue.dispatch(request).await.inspect_err(|e| {
            warn!(%selector, error = %e, "analysis failed; nothing recorded");
        })?;

        let mut batch = Vec::with_capacity(1 + outcome.results().len());
        batch.push(original);
        batch.extend(HistoryEntry::for_outcome(&outcome, self.clock.as_ref()));
        let recorded = batch.len();
        let total = {
            let mut history = self.history.lock();
            history.record_batch(batch);
            history.len()
        };
        info!(%selector, recorded, total, "analysis recorded");

        Ok(outcome)
    }

    /// Snapshot of the history, newest first.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().entries()
    }

    /// Run `f` against the live history.
    pub fn with_history<R>(&self, f: impl FnOnce(&ResultHistory) -> R) -> R {
        f(&*self.history.lock())
    }
}
