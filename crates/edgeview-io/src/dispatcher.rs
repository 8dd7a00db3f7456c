//! Runs one analysis against the remote service: configure, then invoke.
//!
//! [`Dispatcher`] makes no attempt to isolate itself from other
//! dispatchers sharing the same remote. Two dispatches interleaved on
//! the same service can overwrite each other's parameters between the
//! configuration and the invocation. Route every dispatch through a
//! [`DispatchQueue`](crate::queue::DispatchQueue) to rule that out.

use std::sync::Arc;
use std::time::Instant;

use edgeview_protocol::{AnalysisRequest, DispatchError, DispatchPlan, Outcome};
use tracing::{info, warn};

use crate::channel::ConfigurationChannel;
use crate::invoker::AlgorithmInvoker;
use crate::transport::Transport;

/// Drives the configure-then-invoke protocol for single requests.
#[derive(Debug)]
pub struct Dispatcher<T> {
    channel: ConfigurationChannel<T>,
    invoker: AlgorithmInvoker<T>,
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher whose channel and invoker share `transport`.
    #[must_use]
    pub fn new(transport: T) -> Self {
        let transport = Arc::new(transport);
        Self {
            channel: ConfigurationChannel::new(Arc::clone(&transport)),
            invoker: AlgorithmInvoker::new(transport),
        }
    }

    /// Carry out `request`.
    ///
    /// 1. Resolve the selector and check parameters locally.
    /// 2. Set each required parameter, in order, awaiting each call.
    /// 3. Invoke the algorithm endpoint exactly once.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnsupportedAlgorithm`],
    ///   [`DispatchError::MissingParameter`] or
    ///   [`DispatchError::InvalidParameter`] before any network call.
    /// - [`DispatchError::ConfigurationFailed`] if a configuration call
    ///   fails; the algorithm endpoint is then never called.
    /// - [`DispatchError::InvocationFailed`] if the invocation fails.
    pub async fn dispatch(&self, request: AnalysisRequest) -> Result<Outcome, DispatchError> {
        let plan = request.plan().inspect_err(|e| {
            warn!(selector = request.selector(), error = %e, "dispatch rejected locally");
        })?;

        let started = Instant::now();
        info!(
            algorithm = %plan.algorithm,
            configuration_calls = plan.configuration.len(),
            "dispatch started"
        );

        let result = self.run(&plan, request.into_image()).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(outcome) => info!(
                algorithm = %plan.algorithm,
                results = outcome.results().len(),
                elapsed_ms,
                "dispatch finished"
            ),
            Err(e) => warn!(algorithm = %plan.algorithm, error = %e, elapsed_ms, "dispatch failed"),
        }
        result
    }

    async fn run(&self, plan: &DispatchPlan, image: Vec<u8>) -> Result<Outcome, DispatchError> {
        for step in &plan.configuration {
            self.channel.apply(step).await?;
        }
        Ok(self.invoker.invoke(plan.algorithm, image).await?)
    }
}
