//! The lock factory: namespace settings plus a deferred store connection.

use std::sync::Arc;

use keyfence_lock::{LockError, LockResult};
use keyfence_store::{KvStore, StoreResult};
use keyfence_types::LockSettings;

use crate::facade::Lock;

/// Hook producing a store connection on demand.
type Connector = Box<dyn Fn() -> StoreResult<Arc<dyn KvStore>> + Send + Sync>;

/// Builds [`Lock`] facades for one namespace, deferring store-connection
/// acquisition to a pluggable hook.
///
/// Applications typically configure one factory per lock namespace at
/// startup and build facades wherever a connection is available: passed
/// explicitly to [`LockFactory::build_with`], or produced by the
/// connector hook in [`LockFactory::build`]. Building without either is a
/// configuration error, [`LockError::NoConnection`].
pub struct LockFactory {
    settings: LockSettings,
    connector: Option<Connector>,
}

impl LockFactory {
    /// Create a factory for `settings` with no connector configured.
    pub fn new(settings: LockSettings) -> Self {
        Self {
            settings,
            connector: None,
        }
    }

    /// Install a connection hook, consulted by [`LockFactory::build`].
    pub fn with_connector(
        mut self,
        connector: impl Fn() -> StoreResult<Arc<dyn KvStore>> + Send + Sync + 'static,
    ) -> Self {
        self.connector = Some(Box::new(connector));
        self
    }

    /// The namespace settings this factory builds for.
    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }

    /// Build a facade using the configured connector.
    ///
    /// Fails with [`LockError::NoConnection`] when no connector was
    /// installed, and propagates the connector's own failure otherwise.
    pub fn build(&self) -> LockResult<Lock> {
        let Some(connector) = &self.connector else {
            return Err(LockError::NoConnection);
        };
        let store = connector()?;
        Ok(Lock::new(self.settings.clone(), store))
    }

    /// Build a facade over an explicitly supplied connection, ignoring
    /// any configured connector.
    pub fn build_with(&self, store: Arc<dyn KvStore>) -> Lock {
        Lock::new(self.settings.clone(), store)
    }
}

impl std::fmt::Debug for LockFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockFactory")
            .field("settings", &self.settings)
            .field("has_connector", &self.connector.is_some())
            .finish()
    }
}
