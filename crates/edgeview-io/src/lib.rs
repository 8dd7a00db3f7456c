//! edgeview-io: Network and filesystem I/O for edgeview.
//!
//! Talks to the remote detection service over HTTP, serializes every
//! configure-and-invoke sequence through a single dispatch queue, reads
//! uploads from disk, and keeps each session's result history.

pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod invoker;
pub mod queue;
pub mod session;
pub mod transport;
pub mod upload;

#[cfg(test)]
mod testing;

pub use channel::ConfigurationChannel;
pub use config::ClientConfig;
pub use dispatcher::Dispatcher;
pub use invoker::AlgorithmInvoker;
pub use queue::DispatchQueue;
pub use session::Session;
pub use transport::{Body, HttpTransport, Reply, Transport, TransportError};
pub use upload::{Upload, UploadError};
