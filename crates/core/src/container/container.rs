use std::any::TypeId;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::container::chain::ResolutionChain;
use crate::container::injectable::Injectable;
use crate::container::key::ServiceKey;
use crate::container::lifecycle::Lifecycle;
use crate::container::producer::Producer;
use crate::container::registry::RegistrationTable;
use crate::container::resolver::{Resolver, SingletonStore};
use crate::errors::{RegistrationError, ResolveError};

/// Process-wide container slot, filled on first access and emptied by
/// [`Container::reset`].
static GLOBAL: RwLock<Option<Arc<Container>>> = RwLock::new(None);

/// The engine facade: registration surface, typed resolution, and the
/// process-wide instance lifecycle.
///
/// All state mutation funnels through this type; there is no hidden
/// global state beyond the single process-wide slot behind [`Container::global`].
#[derive(Debug, Default)]
pub struct Container {
    table: RegistrationTable,
    singletons: SingletonStore,
}

impl Container {
    /// A free-standing container, mostly useful for isolated setups.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide container, lazily created on first access.
    ///
    /// Double-checked under the slot lock: concurrent first-time callers
    /// observe exactly one instance.
    pub fn global() -> Arc<Container> {
        {
            let slot = match GLOBAL.read() {
                Ok(slot) => slot,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(container) = slot.as_ref() {
                return Arc::clone(container);
            }
        }

        let mut slot = match GLOBAL.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(container) = slot.as_ref() {
            return Arc::clone(container);
        }
        let container = Arc::new(Container::new());
        *slot = Some(Arc::clone(&container));
        container
    }

    /// Clear the process-wide container and invalidate it; the next
    /// [`Container::global`] call builds a fresh, empty one. The only
    /// supported way to isolate test runs that share the global instance.
    pub fn reset() {
        let mut slot = match GLOBAL.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(container) = slot.take() {
            container.clear();
        }
        tracing::debug!("global container reset");
    }

    /// Register a producer for a contract type under an optional
    /// qualifier.
    pub fn register<T: Send + Sync + 'static>(
        &self,
        qualifier: Option<&str>,
        producer: Producer,
        lifecycle: Lifecycle,
    ) -> Result<(), RegistrationError> {
        let key = match qualifier {
            Some(qualifier) => ServiceKey::named::<T>(qualifier),
            None => ServiceKey::of::<T>(),
        };
        self.table.register(key, producer, lifecycle)
    }

    /// Register a contract type as its own producer (singleton).
    pub fn bind<T: Injectable>(&self) -> Result<(), RegistrationError> {
        self.register::<T>(None, Producer::of::<T>(), Lifecycle::Singleton)
    }

    /// Register a contract type as its own producer under a qualifier
    /// (singleton).
    pub fn bind_named<T: Injectable>(&self, qualifier: &str) -> Result<(), RegistrationError> {
        self.register::<T>(Some(qualifier), Producer::of::<T>(), Lifecycle::Singleton)
    }

    /// Register a contract type as its own producer (transient).
    pub fn bind_transient<T: Injectable>(&self) -> Result<(), RegistrationError> {
        self.register::<T>(None, Producer::of::<T>(), Lifecycle::Transient)
    }

    /// Register a contract type as its own producer under a qualifier
    /// (transient).
    pub fn bind_transient_named<T: Injectable>(
        &self,
        qualifier: &str,
    ) -> Result<(), RegistrationError> {
        self.register::<T>(Some(qualifier), Producer::of::<T>(), Lifecycle::Transient)
    }

    /// Register a zero-argument factory (singleton).
    pub fn bind_factory<T, F>(&self, factory: F) -> Result<(), RegistrationError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register::<T>(None, Producer::from_fn(factory), Lifecycle::Singleton)
    }

    /// Register a zero-argument factory under a qualifier (singleton).
    pub fn bind_factory_named<T, F>(
        &self,
        qualifier: &str,
        factory: F,
    ) -> Result<(), RegistrationError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register::<T>(Some(qualifier), Producer::from_fn(factory), Lifecycle::Singleton)
    }

    /// Register a zero-argument factory (transient).
    pub fn bind_transient_factory<T, F>(&self, factory: F) -> Result<(), RegistrationError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register::<T>(None, Producer::from_fn(factory), Lifecycle::Transient)
    }

    /// Register a zero-argument factory under a qualifier (transient).
    pub fn bind_transient_factory_named<T, F>(
        &self,
        qualifier: &str,
        factory: F,
    ) -> Result<(), RegistrationError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register::<T>(Some(qualifier), Producer::from_fn(factory), Lifecycle::Transient)
    }

    /// Resolve an unqualified contract.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        self.resolve_key_typed(ServiceKey::of::<T>())
    }

    /// Resolve a contract under a qualifier.
    pub fn resolve_named<T: Send + Sync + 'static>(
        &self,
        qualifier: &str,
    ) -> Result<Arc<T>, ResolveError> {
        self.resolve_key_typed(ServiceKey::named::<T>(qualifier))
    }

    /// Resolve every entry registered under a contract, across all
    /// qualifiers, in registration order. An empty result is valid.
    pub fn resolve_all<T: Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>, ResolveError> {
        let resolver = Resolver::new(&self.table, &self.singletons);
        resolver
            .resolve_all(TypeId::of::<T>())?
            .into_iter()
            .map(|instance| {
                instance.downcast::<T>().map_err(|_| ResolveError::InstanceType {
                    label: ServiceKey::of::<T>().label(),
                })
            })
            .collect()
    }

    /// Resolve an unqualified contract, or `None` on any failure.
    pub fn try_resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    /// Resolve a qualified contract, or `None` on any failure.
    pub fn try_resolve_named<T: Send + Sync + 'static>(&self, qualifier: &str) -> Option<Arc<T>> {
        self.resolve_named::<T>(qualifier).ok()
    }

    /// Check if an unqualified entry exists for a contract.
    pub fn contains<T: 'static>(&self) -> bool {
        self.table.contains(&ServiceKey::of::<T>())
    }

    /// Check if a qualified entry exists for a contract.
    pub fn contains_named<T: 'static>(&self, qualifier: &str) -> bool {
        self.table.contains(&ServiceKey::named::<T>(qualifier))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Snapshot of every registration, in registration order.
    pub fn registrations(&self) -> Vec<RegistrationInfo> {
        self.table
            .entries()
            .into_iter()
            .map(|registration| RegistrationInfo {
                label: registration.key().label(),
                type_name: registration.key().type_name,
                qualifier: registration.key().qualifier.clone(),
                lifecycle: registration.lifecycle(),
                cached: self.singletons.is_cached(registration.key()),
                sequence: registration.sequence(),
            })
            .collect()
    }

    /// The registration listing as a JSON document, for debug tooling.
    pub fn registrations_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.registrations())
    }

    /// Drop every registration and cached singleton from this container.
    pub fn clear(&self) {
        self.table.clear();
        self.singletons.clear();
        tracing::debug!("container cleared");
    }

    fn resolve_key_typed<T: Send + Sync + 'static>(
        &self,
        key: ServiceKey,
    ) -> Result<Arc<T>, ResolveError> {
        let resolver = Resolver::new(&self.table, &self.singletons);
        let instance = resolver.resolve_key(&key, &ResolutionChain::new())?;
        instance
            .downcast::<T>()
            .map_err(|_| ResolveError::InstanceType { label: key.label() })
    }
}

/// One row of the container's registration listing.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationInfo {
    pub label: String,
    pub type_name: &'static str,
    pub qualifier: Option<String>,
    pub lifecycle: Lifecycle,
    pub cached: bool,
    pub sequence: u64,
}
