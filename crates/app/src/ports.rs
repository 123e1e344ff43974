//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod event_source;
pub mod integration;
pub mod scene_client;
pub mod state_store;

pub use event_bus::EventPublisher;
pub use event_source::{EventSink, EventSource};
pub use integration::Integration;
pub use scene_client::SceneClient;
pub use state_store::StateRepository;
