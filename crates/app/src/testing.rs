//! In-memory port doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dsbridge_domain::entity::EntityState;
use dsbridge_domain::error::{ConfigurationError, DsBridgeError, NotFoundError};
use dsbridge_domain::event::Event;
use dsbridge_domain::id::EntityId;
use dsbridge_domain::scene::{Color, Scene, SceneKey, SceneRegistry};
use dsbridge_domain::time::Timestamp;

use crate::ports::{EventPublisher, EventSink, EventSource, SceneClient, StateRepository};

pub const TOKEN: &str = "secret";

/// Registry with one light (zone 1), one cover (zone 2), the sleeping
/// switch and one plain scene.
pub fn demo_registry() -> SceneRegistry {
    [
        Scene::colored(1, Color::LIGHT, 0, "Living off", "home_1_1_0"),
        Scene::colored(1, Color::LIGHT, 5, "Living on", "home_1_1_5"),
        Scene::colored(2, Color::COVER, 0, "Blinds close", "home_2_2_0"),
        Scene::colored(2, Color::COVER, 5, "Blinds open", "home_2_2_5"),
        Scene::plain(0, 69, "Sleeping", "home_0_69"),
        Scene::plain(0, 70, "Wake up", "home_0_70"),
        Scene::plain(0, 72, "Absent", "home_0_72"),
    ]
    .into_iter()
    .collect()
}

#[derive(Default)]
pub struct FakeClient {
    pub scenes: SceneRegistry,
    /// Number of upcoming `authenticate` calls that fail with a transient error.
    pub failures: AtomicUsize,
    /// Same for `fetch_scenes`.
    pub fetch_failures: AtomicUsize,
    pub fail_turn_on: bool,
    pub auth_calls: AtomicUsize,
    pub calls: Mutex<Vec<SceneKey>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl FakeClient {
    pub fn new(scenes: SceneRegistry) -> Self {
        Self {
            scenes,
            ..Self::default()
        }
    }

    pub fn failing(scenes: SceneRegistry, failures: usize) -> Self {
        Self {
            scenes,
            failures: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SceneKey> {
        self.calls.lock().unwrap().clone()
    }

    fn check(counter: &AtomicUsize) -> Result<(), DsBridgeError> {
        let remaining = counter.load(Ordering::SeqCst);
        if remaining > 0 {
            counter.store(remaining - 1, Ordering::SeqCst);
            return Err(DsBridgeError::communication("connection refused"));
        }
        Ok(())
    }
}

impl SceneClient for FakeClient {
    async fn authenticate(&self, token: &str) -> Result<(), DsBridgeError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.failures)?;
        if token != TOKEN {
            return Err(ConfigurationError::InvalidToken.into());
        }
        Ok(())
    }

    async fn fetch_scenes(&self) -> Result<SceneRegistry, DsBridgeError> {
        Self::check(&self.fetch_failures)?;
        Ok(self.scenes.clone())
    }

    async fn turn_on(&self, key: SceneKey) -> Result<(), DsBridgeError> {
        if self.fail_turn_on {
            return Err(DsBridgeError::communication("stack closed"));
        }
        if !self.scenes.contains(&key) {
            return Err(NotFoundError {
                entity: "Scene",
                id: key.to_string(),
            }
            .into());
        }
        self.calls.lock().unwrap().push(key);
        Ok(())
    }

    async fn start(&self) -> Result<(), DsBridgeError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), DsBridgeError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSource {
    pub sink: Mutex<Option<EventSink>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl FakeSource {
    pub fn sink(&self) -> Option<EventSink> {
        self.sink.lock().unwrap().clone()
    }
}

impl EventSource for FakeSource {
    async fn start(&self, sink: EventSink) -> Result<(), DsBridgeError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    async fn stop(&self) -> Result<(), DsBridgeError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.sink.lock().unwrap().take();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub states: Mutex<HashMap<EntityId, EntityState>>,
    pub broken: bool,
    /// Saves of this state take the given time to complete.
    pub slow: Option<(EntityState, Duration)>,
}

impl MemoryStore {
    pub fn with(id: &str, state: EntityState) -> Self {
        let store = Self::default();
        store
            .states
            .lock()
            .unwrap()
            .insert(EntityId::new(id), state);
        store
    }

    pub fn slow(state: EntityState, delay: Duration) -> Self {
        Self {
            slow: Some((state, delay)),
            ..Self::default()
        }
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn get(&self, id: &str) -> Option<EntityState> {
        self.states.lock().unwrap().get(&EntityId::new(id)).copied()
    }
}

impl StateRepository for MemoryStore {
    fn load(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<EntityState>, DsBridgeError>> + Send {
        let result = if self.broken {
            Err(DsBridgeError::Storage("disk full".into()))
        } else {
            Ok(self.states.lock().unwrap().get(id).copied())
        };
        async { result }
    }

    fn save(
        &self,
        id: &EntityId,
        state: EntityState,
        _changed_at: Timestamp,
    ) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        let delay = self
            .slow
            .filter(|(slow, _)| *slow == state)
            .map(|(_, delay)| delay);
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.broken {
                return Err(DsBridgeError::Storage("disk full".into()));
            }
            self.states.lock().unwrap().insert(id.clone(), state);
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<Event>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), DsBridgeError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
