//! Event bus port: publish/subscribe for bridge events.

use std::future::Future;

use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::event::Event;

/// Publishes bridge events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), DsBridgeError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).publish(event)
    }
}
