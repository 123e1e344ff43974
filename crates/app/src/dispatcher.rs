//! Event dispatcher: fans scene calls out to toggle entities.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use dsbridge_domain::event::SceneCall;

use crate::entities::ToggleEntity;
use crate::ports::{EventPublisher, SceneClient, StateRepository};

/// Observer list of every toggle entity of one integration.
///
/// Each raw event is parsed once and offered to every observer in turn.
/// Malformed events are dropped.
pub struct EventDispatcher<C, S, P> {
    observers: Vec<Arc<ToggleEntity<C, S, P>>>,
}

impl<C, S, P> EventDispatcher<C, S, P>
where
    C: SceneClient,
    S: StateRepository,
    P: EventPublisher + Send + Sync,
{
    #[must_use]
    pub fn new(observers: Vec<Arc<ToggleEntity<C, S, P>>>) -> Self {
        Self { observers }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver one raw event. Returns how many entities changed state.
    pub async fn dispatch(&self, raw: &Value) -> usize {
        let Some(call) = SceneCall::from_json(raw) else {
            tracing::debug!(event = %raw, "dropping unrecognised event");
            return 0;
        };
        let mut matched = 0;
        for observer in &self.observers {
            if observer.on_event(&call).await.is_some() {
                matched += 1;
            }
        }
        matched
    }

    /// Consume `receiver` until every sender is gone.
    pub async fn run(self, mut receiver: mpsc::Receiver<Value>) {
        while let Some(raw) = receiver.recv().await {
            self.dispatch(&raw).await;
        }
        tracing::debug!("event channel closed, dispatcher exiting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityContext;
    use crate::testing::{FakeClient, MemoryStore, RecordingPublisher, demo_registry};
    use dsbridge_domain::entity::EntityState;
    use dsbridge_domain::pairing::discover;
    use serde_json::json;

    type Dispatcher = EventDispatcher<FakeClient, MemoryStore, RecordingPublisher>;
    type Toggle = ToggleEntity<FakeClient, MemoryStore, RecordingPublisher>;

    async fn setup() -> (Dispatcher, Vec<Arc<Toggle>>) {
        let ctx = Arc::new(EntityContext::new(
            FakeClient::new(demo_registry()),
            MemoryStore::default(),
            RecordingPublisher::default(),
        ));
        let mut toggles = Vec::new();
        for pairing in discover(&demo_registry()).pairings() {
            let entity = ToggleEntity::restore(pairing.clone(), Arc::clone(&ctx))
                .await
                .unwrap();
            toggles.push(Arc::new(entity));
        }
        (EventDispatcher::new(toggles.clone()), toggles)
    }

    fn scene_call(zone: u32, group: Option<u8>, scene: u8) -> Value {
        let mut properties = json!({"zoneID": zone, "sceneID": scene});
        if let Some(group) = group {
            properties["groupID"] = json!(group);
        }
        json!({"name": "callScene", "properties": properties})
    }

    #[tokio::test]
    async fn should_deliver_to_matching_entity_only() {
        let (dispatcher, toggles) = setup().await;
        assert_eq!(dispatcher.len(), 3);

        let matched = dispatcher.dispatch(&scene_call(1, Some(1), 5)).await;

        assert_eq!(matched, 1);
        assert_eq!(toggles[0].current_state(), EntityState::On);
        assert_eq!(toggles[1].current_state(), EntityState::Unknown);
    }

    #[tokio::test]
    async fn should_drop_malformed_events() {
        let (dispatcher, toggles) = setup().await;

        assert_eq!(dispatcher.dispatch(&json!({"name": "callScene"})).await, 0);
        assert_eq!(dispatcher.dispatch(&json!("garbage")).await, 0);
        assert_eq!(
            dispatcher
                .dispatch(&json!({"name": "callScene", "properties": {"zoneID": 1}}))
                .await,
            0
        );
        assert!(toggles
            .iter()
            .all(|toggle| toggle.current_state() != EntityState::On));
    }

    #[tokio::test]
    async fn should_ignore_light_event_without_group() {
        let (dispatcher, toggles) = setup().await;

        assert_eq!(dispatcher.dispatch(&scene_call(1, None, 5)).await, 0);
        assert_eq!(toggles[0].current_state(), EntityState::Unknown);
    }

    #[tokio::test]
    async fn should_drive_switch_from_plain_scene_calls() {
        let (dispatcher, toggles) = setup().await;
        let switch = &toggles[2];
        assert_eq!(switch.current_state(), EntityState::Off);

        dispatcher.dispatch(&scene_call(0, None, 69)).await;
        assert_eq!(switch.current_state(), EntityState::On);

        dispatcher.dispatch(&scene_call(0, None, 70)).await;
        assert_eq!(switch.current_state(), EntityState::Off);
    }

    #[tokio::test]
    async fn should_run_until_channel_closes() {
        let (dispatcher, toggles) = setup().await;
        let (tx, rx) = mpsc::channel(8);

        tx.send(scene_call(2, Some(2), 5)).await.unwrap();
        tx.send(scene_call(2, Some(2), 0)).await.unwrap();
        tx.send(scene_call(2, Some(2), 5)).await.unwrap();
        drop(tx);

        dispatcher.run(rx).await;

        assert_eq!(toggles[1].current_state(), EntityState::On);
    }
}
