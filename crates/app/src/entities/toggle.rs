//! Toggle entity: lights, covers and switches.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dsbridge_domain::entity::{DeviceClass, Entity, EntityState};
use dsbridge_domain::error::DsBridgeError;
use dsbridge_domain::event::{Event, EventType, SceneCall};
use dsbridge_domain::id::EntityId;
use dsbridge_domain::pairing::Pairing;
use dsbridge_domain::time::now;
use dsbridge_domain::transition::transition;

use super::EntityContext;
use crate::ports::{EventPublisher, SceneClient, StateRepository};

/// A pairing of scenes exposed as one on/off entity.
///
/// State changes either through [`activate_on`](Self::activate_on) /
/// [`activate_off`](Self::activate_off) (optimistically, once the scene call
/// was accepted) or through [`on_event`](Self::on_event) when the server
/// reports a matching scene call.
///
/// Updates are applied one at a time: the stored state always ends up equal
/// to the live one.
pub struct ToggleEntity<C, S, P> {
    id: EntityId,
    pairing: Pairing,
    entity: Mutex<Entity>,
    updates: tokio::sync::Mutex<()>,
    ctx: Arc<EntityContext<C, S, P>>,
}

impl<C, S, P> ToggleEntity<C, S, P>
where
    C: SceneClient,
    S: StateRepository,
    P: EventPublisher + Send + Sync,
{
    /// Build the entity, restoring its last persisted state.
    ///
    /// Falls back to [`Pairing::default_state`] when nothing was stored or
    /// the store cannot be read.
    ///
    /// # Errors
    ///
    /// Returns [`DsBridgeError::Validation`] if the pairing yields an empty id.
    pub async fn restore(
        pairing: Pairing,
        ctx: Arc<EntityContext<C, S, P>>,
    ) -> Result<Self, DsBridgeError> {
        let id = pairing.entity_id();
        let state = match ctx.store.load(&id).await {
            Ok(Some(state)) => state,
            Ok(None) => pairing.default_state(),
            Err(err) => {
                tracing::warn!(entity_id = %id, error = %err, "failed to load stored state, using default");
                pairing.default_state()
            }
        };
        let entity = Entity::builder()
            .id(id.clone())
            .class(pairing.class)
            .name(pairing.name())
            .state(state)
            .device(pairing.device_info())
            .build()?;
        Ok(Self {
            id,
            pairing,
            entity: Mutex::new(entity),
            updates: tokio::sync::Mutex::new(()),
            ctx,
        })
    }

    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    #[must_use]
    pub fn class(&self) -> DeviceClass {
        self.pairing.class
    }

    #[must_use]
    pub fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    #[must_use]
    pub fn current_state(&self) -> EntityState {
        self.lock().state
    }

    #[must_use]
    pub fn snapshot(&self) -> Entity {
        self.lock().clone()
    }

    /// Call the on scene.
    ///
    /// # Errors
    ///
    /// Propagates the client error; the state is left unchanged in that case.
    pub async fn activate_on(&self) -> Result<Entity, DsBridgeError> {
        self.activate(EntityState::On).await
    }

    /// Call the off scene.
    ///
    /// # Errors
    ///
    /// Propagates the client error; the state is left unchanged in that case.
    pub async fn activate_off(&self) -> Result<Entity, DsBridgeError> {
        self.activate(EntityState::Off).await
    }

    /// Apply a scene call reported by the server.
    ///
    /// Returns the state the entity moved to, or `None` when the call does
    /// not concern this entity.
    pub async fn on_event(&self, call: &SceneCall) -> Option<EntityState> {
        let next = transition(&self.pairing, call)?;
        tracing::debug!(
            entity_id = %self.id,
            zone_id = call.zone_id,
            scene_id = call.scene_id,
            state = %next,
            "scene call matched"
        );
        self.apply(next).await;
        Some(next)
    }

    async fn activate(&self, target: EntityState) -> Result<Entity, DsBridgeError> {
        let scene = if target == EntityState::On {
            &self.pairing.on
        } else {
            &self.pairing.off
        };
        self.ctx.client.turn_on(scene.key()).await?;
        self.apply(target).await;
        Ok(self.snapshot())
    }

    async fn apply(&self, next: EntityState) {
        let _update = self.updates.lock().await;
        let ts = now();
        let previous = {
            let mut entity = self.lock();
            let previous = entity.state;
            entity.update_state(next, ts);
            previous
        };
        if previous == next {
            return;
        }

        if let Err(err) = self.ctx.store.save(&self.id, next, ts).await {
            tracing::warn!(entity_id = %self.id, error = %err, "failed to persist entity state");
        }

        let event = Event::new(
            EventType::StateChanged,
            Some(self.id.clone()),
            serde_json::json!({ "from": previous, "to": next }),
        );
        if let Err(err) = self.ctx.publisher.publish(event).await {
            tracing::warn!(entity_id = %self.id, error = %err, "failed to publish state change");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entity> {
        self.entity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
