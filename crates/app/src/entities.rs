//! Entity adapters: live entities backed by one scene or a pair of scenes.
//!
//! [`ToggleEntity`] covers lights, covers and switches; [`SceneEntity`]
//! covers plain activatable scenes. Both share an [`EntityContext`] holding
//! the client, the state store and the event publisher, injected at setup.

mod scene;
mod toggle;

pub use scene::SceneEntity;
pub use toggle::ToggleEntity;

use std::sync::Arc;

use dsbridge_domain::entity::{DeviceClass, Entity};
use dsbridge_domain::error::{DsBridgeError, ValidationError};
use dsbridge_domain::id::EntityId;
use dsbridge_domain::service::Service;

use crate::ports::{EventPublisher, SceneClient, StateRepository};

/// Collaborators shared by every entity of one integration.
pub struct EntityContext<C, S, P> {
    pub client: C,
    pub store: S,
    pub publisher: P,
}

impl<C, S, P> EntityContext<C, S, P> {
    pub fn new(client: C, store: S, publisher: P) -> Self {
        Self {
            client,
            store,
            publisher,
        }
    }
}

/// Either kind of entity adapter.
pub enum EntityAdapter<C, S, P> {
    Toggle(Arc<ToggleEntity<C, S, P>>),
    Scene(Arc<SceneEntity<C, S, P>>),
}

impl<C, S, P> Clone for EntityAdapter<C, S, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Toggle(entity) => Self::Toggle(Arc::clone(entity)),
            Self::Scene(entity) => Self::Scene(Arc::clone(entity)),
        }
    }
}

impl<C, S, P> EntityAdapter<C, S, P>
where
    C: SceneClient,
    S: StateRepository,
    P: EventPublisher + Send + Sync,
{
    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Toggle(entity) => entity.id(),
            Self::Scene(entity) => entity.id(),
        }
    }

    #[must_use]
    pub fn class(&self) -> DeviceClass {
        match self {
            Self::Toggle(entity) => entity.class(),
            Self::Scene(_) => DeviceClass::Scene,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Entity {
        match self {
            Self::Toggle(entity) => entity.snapshot(),
            Self::Scene(entity) => entity.snapshot(),
        }
    }

    /// Run `service` against this entity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedService`] when the service does
    /// not apply to the entity's class, or the client's error when the scene
    /// call fails.
    pub async fn handle(&self, service: Service) -> Result<Entity, DsBridgeError> {
        match (self, service) {
            (Self::Toggle(entity), Service::TurnOn) => entity.activate_on().await,
            (Self::Toggle(entity), Service::TurnOff) => entity.activate_off().await,
            (Self::Scene(entity), Service::Activate) => entity.activate().await,
            (_, service) => Err(ValidationError::UnsupportedService {
                service: service.as_str(),
                class: self.class().as_str(),
            }
            .into()),
        }
    }
}
