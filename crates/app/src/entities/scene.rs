//! Scene entity: a single activatable scene without state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dsbridge_domain::entity::{DeviceClass, DeviceInfo, Entity};
use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::event::{Event, EventType};
use dsbridge_domain::id::EntityId;
use dsbridge_domain::scene::Scene;
use dsbridge_domain::time::now;

use super::EntityContext;
use crate::ports::{EventPublisher, SceneClient};

pub struct SceneEntity<C, S, P> {
    id: EntityId,
    scene: Scene,
    entity: Mutex<Entity>,
    ctx: Arc<EntityContext<C, S, P>>,
}

impl<C, S, P> SceneEntity<C, S, P>
where
    C: SceneClient,
    P: EventPublisher + Send + Sync,
{
    /// # Errors
    ///
    /// Returns [`DsBridgeError::Validation`] if the scene yields an empty id.
    pub fn new(scene: Scene, ctx: Arc<EntityContext<C, S, P>>) -> Result<Self, DsBridgeError> {
        let id = DeviceClass::Scene.entity_id(&scene.unique_id);
        let entity = Entity::builder()
            .id(id.clone())
            .class(DeviceClass::Scene)
            .name(scene.name.clone())
            .device(DeviceInfo::new(DeviceClass::Scene, &scene))
            .build()?;
        Ok(Self {
            id,
            scene,
            entity: Mutex::new(entity),
            ctx,
        })
    }

    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn snapshot(&self) -> Entity {
        self.lock().clone()
    }

    /// Call the scene and publish a [`EventType::SceneActivated`] event.
    ///
    /// # Errors
    ///
    /// Propagates the client error.
    pub async fn activate(&self) -> Result<Entity, DsBridgeError> {
        let key = self.scene.key();
        self.ctx.client.turn_on(key).await?;
        tracing::debug!(entity_id = %self.id, scene = %key, "scene activated");

        let snapshot = {
            let mut entity = self.lock();
            entity.last_updated = now();
            entity.clone()
        };

        let event = Event::new(
            EventType::SceneActivated,
            Some(self.id.clone()),
            serde_json::json!({ "scene": key.to_string() }),
        );
        if let Err(err) = self.ctx.publisher.publish(event).await {
            tracing::warn!(entity_id = %self.id, error = %err, "failed to publish scene activation");
        }
        Ok(snapshot)
    }

    fn lock(&self) -> MutexGuard<'_, Entity> {
        self.entity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
