//! Event source port: the inbound side of a digitalSTROM server.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use dsbridge_domain::error::DsBridgeError;

/// Channel the listener pushes raw JSON events into.
pub type EventSink = mpsc::Sender<serde_json::Value>;

/// A listener subscribed to the server's event feed.
///
/// Both operations are expected to be idempotent.
pub trait EventSource: Send + Sync {
    /// Start forwarding every received event into `sink`.
    fn start(&self, sink: EventSink) -> impl Future<Output = Result<(), DsBridgeError>> + Send;

    /// Stop forwarding events.
    fn stop(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send;
}

impl<T: EventSource> EventSource for Arc<T> {
    fn start(&self, sink: EventSink) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).start(sink)
    }

    fn stop(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).stop()
    }
}
