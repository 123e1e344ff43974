//! Scene client port: the outbound side of a digitalSTROM server.
//!
//! The session/token protocol lives behind this trait. Calls made through
//! [`turn_on`](SceneClient::turn_on) go through the client's outbound stack,
//! which delays and batches them while it runs.

use std::future::Future;
use std::sync::Arc;

use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::scene::{SceneKey, SceneRegistry};

pub trait SceneClient: Send + Sync {
    /// Open a session with the given app token.
    ///
    /// Unreachable servers yield [`DsBridgeError::Communication`]; a rejected
    /// token yields [`DsBridgeError::Configuration`].
    fn authenticate(&self, token: &str) -> impl Future<Output = Result<(), DsBridgeError>> + Send;

    /// Fetch every scene known to the server.
    fn fetch_scenes(&self) -> impl Future<Output = Result<SceneRegistry, DsBridgeError>> + Send;

    /// Call the scene identified by `key`.
    fn turn_on(&self, key: SceneKey) -> impl Future<Output = Result<(), DsBridgeError>> + Send;

    /// Start the outbound delay/batching stack.
    fn start(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send;

    /// Stop the outbound stack.
    fn stop(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send;
}

impl<T: SceneClient> SceneClient for Arc<T> {
    fn authenticate(&self, token: &str) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).authenticate(token)
    }

    fn fetch_scenes(&self) -> impl Future<Output = Result<SceneRegistry, DsBridgeError>> + Send {
        (**self).fetch_scenes()
    }

    fn turn_on(&self, key: SceneKey) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).turn_on(key)
    }

    fn start(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).start()
    }

    fn stop(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        (**self).stop()
    }
}
