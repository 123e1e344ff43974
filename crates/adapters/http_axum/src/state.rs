//! Shared application state for axum handlers.

use std::sync::Arc;

use dsbridge_app::event_bus::InProcessEventBus;
use dsbridge_app::ports::Integration;
use dsbridge_app::registry::IntegrationRegistry;

/// Application state shared across all axum handlers.
///
/// Generic over the integration type to avoid dynamic dispatch. `Clone` is
/// implemented manually so `I` itself does not need to be `Clone`.
pub struct AppState<I> {
    /// Every configured server, keyed by slug.
    pub registry: Arc<IntegrationRegistry<I>>,
    /// Event bus for SSE subscriptions.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<I> Clone for AppState<I> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<I> AppState<I>
where
    I: Integration + 'static,
{
    #[must_use]
    pub fn new(registry: Arc<IntegrationRegistry<I>>, event_bus: Arc<InProcessEventBus>) -> Self {
        Self {
            registry,
            event_bus,
        }
    }
}
