//! # dsbridge-adapter-virtual
//!
//! Simulated digitalSTROM server for demos and end-to-end tests.
//!
//! [`VirtualServer`] implements both [`SceneClient`] and [`EventSource`]:
//! calling a scene echoes it back as a `callScene` event on the listener
//! stream, the way a real server does. While the outbound stack runs, calls
//! are queued and applied in batches after the configured stack delay.
//!
//! | Knob | Effect |
//! |------|--------|
//! | [`VirtualConfig::token`] | `authenticate` rejects any other token |
//! | [`VirtualServer::fail_next`] | next calls fail with a transient error |
//! | [`VirtualServer::inject`] | push an arbitrary raw event |
//!
//! ## Dependency rule
//!
//! Depends on `dsbridge-app` (port traits) and `dsbridge-domain` only.

mod config;
mod error;
mod stack;

pub use config::{VirtualConfig, VirtualScene, demo_scenes};
pub use error::VirtualError;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use dsbridge_app::ports::{EventSink, EventSource, SceneClient};
use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::event::SceneCall;
use dsbridge_domain::scene::{SceneKey, SceneRegistry};

use stack::Stack;

/// State shared with the outbound stack task.
struct Shared {
    scenes: SceneRegistry,
    sink: Mutex<Option<EventSink>>,
    applied: Mutex<Vec<SceneKey>>,
}

impl Shared {
    /// Apply a scene call and echo it on the event stream.
    async fn apply(&self, key: SceneKey) {
        let Some(scene) = self.scenes.get(&key) else {
            return;
        };
        lock(&self.applied).push(key);
        let call = SceneCall {
            zone_id: scene.zone_id,
            group_id: scene.color().map(|color| color.0),
            scene_id: scene.scene_id,
        };
        tracing::debug!(zone_id = call.zone_id, scene_id = call.scene_id, "scene applied");
        self.emit(call.to_json()).await;
    }

    async fn emit(&self, event: Value) {
        let sink = lock(&self.sink).clone();
        match sink {
            Some(sink) => {
                if sink.send(event).await.is_err() {
                    tracing::debug!("event receiver gone, dropping event");
                }
            }
            None => tracing::debug!("listener stopped, dropping event"),
        }
    }
}

/// An in-process stand-in for a digitalSTROM server.
pub struct VirtualServer {
    config: VirtualConfig,
    shared: Arc<Shared>,
    failures: AtomicUsize,
    session: AtomicBool,
    stack: Mutex<Option<Stack>>,
}

impl VirtualServer {
    #[must_use]
    pub fn new(config: VirtualConfig) -> Self {
        let shared = Arc::new(Shared {
            scenes: config.registry(),
            sink: Mutex::new(None),
            applied: Mutex::new(Vec::new()),
        });
        Self {
            config,
            shared,
            failures: AtomicUsize::new(0),
            session: AtomicBool::new(false),
            stack: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &VirtualConfig {
        &self.config
    }

    /// Make the next `count` client calls fail as if the server were offline.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Push a raw event into the listener stream.
    pub async fn inject(&self, event: Value) {
        self.shared.emit(event).await;
    }

    /// Scene calls applied so far, oldest first.
    #[must_use]
    pub fn applied(&self) -> Vec<SceneKey> {
        lock(&self.shared.applied).clone()
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        lock(&self.shared.sink).is_some()
    }

    #[must_use]
    pub fn is_stack_running(&self) -> bool {
        lock(&self.stack).is_some()
    }

    fn check_reachable(&self) -> Result<(), VirtualError> {
        let outcome = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if outcome.is_ok() {
            return Err(VirtualError::Unreachable);
        }
        Ok(())
    }

    fn check_session(&self) -> Result<(), VirtualError> {
        if self.session.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(VirtualError::NoSession)
        }
    }
}

impl SceneClient for VirtualServer {
    async fn authenticate(&self, token: &str) -> Result<(), DsBridgeError> {
        self.check_reachable()?;
        if token != self.config.token {
            return Err(VirtualError::InvalidToken.into());
        }
        self.session.store(true, Ordering::SeqCst);
        tracing::debug!(apartment = %self.config.apartment, "session opened");
        Ok(())
    }

    async fn fetch_scenes(&self) -> Result<SceneRegistry, DsBridgeError> {
        self.check_reachable()?;
        self.check_session()?;
        Ok(self.shared.scenes.clone())
    }

    async fn turn_on(&self, key: SceneKey) -> Result<(), DsBridgeError> {
        self.check_reachable()?;
        self.check_session()?;
        if !self.shared.scenes.contains(&key) {
            return Err(VirtualError::UnknownScene(key).into());
        }

        let queue = lock(&self.stack).as_ref().map(Stack::sender);
        match queue {
            Some(queue) => queue
                .send(key)
                .await
                .map_err(|_| VirtualError::StackClosed)?,
            None => self.shared.apply(key).await,
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), DsBridgeError> {
        let mut stack = lock(&self.stack);
        if stack.is_none() {
            *stack = Some(Stack::spawn(
                Arc::clone(&self.shared),
                self.config.stack_delay,
            ));
            tracing::debug!("outbound stack started");
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), DsBridgeError> {
        if let Some(stack) = lock(&self.stack).take() {
            stack.stop();
            tracing::debug!("outbound stack stopped");
        }
        Ok(())
    }
}

impl EventSource for VirtualServer {
    async fn start(&self, sink: EventSink) -> Result<(), DsBridgeError> {
        let mut current = lock(&self.shared.sink);
        if current.is_none() {
            *current = Some(sink);
            tracing::debug!("listener started");
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), DsBridgeError> {
        if lock(&self.shared.sink).take().is_some() {
            tracing::debug!("listener stopped");
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
