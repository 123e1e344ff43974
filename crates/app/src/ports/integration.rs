//! Integration port: what the outer surfaces drive.
//!
//! An integration bridges one digitalSTROM server into the entity model. The
//! binary crate calls the lifecycle methods in order:
//!
//! 1. construction (setup: authenticate, fetch scenes, build entities)
//! 2. [`start`](Integration::start): start the listener and outbound stack
//! 3. (the server runs, forwarding service calls via [`handle_service_call`](Integration::handle_service_call))
//! 4. [`stop`](Integration::stop): stop background work

use std::future::Future;

use dsbridge_domain::connection::ConnectionSlug;
use dsbridge_domain::entity::Entity;
use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::id::EntityId;
use dsbridge_domain::service::Service;

pub trait Integration: Send + Sync {
    /// Stable identity of the connected server.
    fn slug(&self) -> &ConnectionSlug;

    /// Human readable title, e.g. `Apartment (dss.local:8080)`.
    fn title(&self) -> &str;

    /// Snapshots of every entity, ordered by id.
    fn entities(&self) -> Vec<Entity>;

    /// Snapshot of a single entity.
    ///
    /// # Errors
    ///
    /// Returns [`DsBridgeError::NotFound`] for an unknown id.
    fn entity(&self, id: &EntityId) -> Result<Entity, DsBridgeError>;

    /// Run `service` on the entity `entity_id` and return its new snapshot.
    fn handle_service_call(
        &self,
        entity_id: &EntityId,
        service: Service,
    ) -> impl Future<Output = Result<Entity, DsBridgeError>> + Send;

    /// Start background work. Calling it twice is a no-op.
    fn start(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send;

    /// Stop background work. Calling it twice is a no-op.
    fn stop(&self) -> impl Future<Output = Result<(), DsBridgeError>> + Send;
}
