//! Registry of configured servers, keyed by connection slug.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use dsbridge_domain::connection::ConnectionSlug;
use dsbridge_domain::error::{ConfigurationError, DsBridgeError};

use crate::ports::Integration;

/// Explicitly owned set of integrations.
///
/// Each server appears at most once; its slug is derived from host and port.
/// Servers may join after the registry is shared, once their setup succeeds.
pub struct IntegrationRegistry<I> {
    integrations: RwLock<BTreeMap<ConnectionSlug, Arc<I>>>,
}

impl<I> Default for IntegrationRegistry<I> {
    fn default() -> Self {
        Self {
            integrations: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<I: Integration> IntegrationRegistry<I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an integration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::AlreadyConfigured`] when an integration
    /// with the same slug is already registered.
    pub fn insert(&self, integration: I) -> Result<Arc<I>, DsBridgeError> {
        let slug = integration.slug().clone();
        let mut integrations = self
            .integrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if integrations.contains_key(&slug) {
            return Err(ConfigurationError::AlreadyConfigured(slug.to_string()).into());
        }
        let integration = Arc::new(integration);
        integrations.insert(slug, Arc::clone(&integration));
        Ok(integration)
    }

    #[must_use]
    pub fn get(&self, slug: &str) -> Option<Arc<I>> {
        self.integrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
            .cloned()
    }

    /// Every registered integration, ordered by slug.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<I>> {
        self.integrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.integrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start every integration.
    ///
    /// # Errors
    ///
    /// Returns the first error; integrations started before it keep running.
    pub async fn start_all(&self) -> Result<(), DsBridgeError> {
        for integration in self.all() {
            integration.start().await?;
        }
        Ok(())
    }

    /// Stop every integration, even when one of them fails to stop.
    ///
    /// # Errors
    ///
    /// Returns the last error encountered.
    pub async fn stop_all(&self) -> Result<(), DsBridgeError> {
        let mut result = Ok(());
        for integration in self.all() {
            if let Err(err) = integration.stop().await {
                tracing::warn!(slug = %integration.slug(), error = %err, "failed to stop integration");
                result = Err(err);
            }
        }
        result
    }
}
