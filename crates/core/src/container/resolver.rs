use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use crate::container::chain::ResolutionChain;
use crate::container::injectable::{ResolvedArgs, SharedInstance};
use crate::container::key::ServiceKey;
use crate::container::registry::{Registration, RegistrationTable};
use crate::errors::ResolveError;

/// Cache of singleton instances, keyed by registration key.
///
/// A key's slot is filled at most once for the container's lifetime and
/// cleared only by a full reset.
#[derive(Default)]
pub struct SingletonStore {
    instances: RwLock<HashMap<ServiceKey, SharedInstance>>,
    creation_locks: Mutex<HashMap<ServiceKey, Arc<Mutex<()>>>>,
}

impl fmt::Debug for SingletonStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.instances.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("SingletonStore")
            .field("cached", &cached)
            .finish()
    }
}

impl SingletonStore {
    pub(crate) fn get(&self, key: &ServiceKey) -> Option<SharedInstance> {
        self.instances.read().ok()?.get(key).cloned()
    }

    pub(crate) fn store(
        &self,
        key: ServiceKey,
        instance: SharedInstance,
    ) -> Result<(), ResolveError> {
        let mut instances = self
            .instances
            .write()
            .map_err(|_| ResolveError::lock("singleton_instances"))?;
        instances.insert(key, instance);
        Ok(())
    }

    pub(crate) fn is_cached(&self, key: &ServiceKey) -> bool {
        self.instances
            .read()
            .map(|instances| instances.contains_key(key))
            .unwrap_or(false)
    }

    /// Per-key creation lock guaranteeing at most one producer invocation
    /// per singleton key under concurrent first resolution.
    pub(crate) fn creation_lock(&self, key: &ServiceKey) -> Result<Arc<Mutex<()>>, ResolveError> {
        let mut locks = self
            .creation_locks
            .lock()
            .map_err(|_| ResolveError::lock("singleton_creation_locks"))?;
        Ok(locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Drop every cached instance. Recovers poisoned locks so a reset
    /// always succeeds.
    pub(crate) fn clear(&self) {
        match self.instances.write() {
            Ok(mut instances) => instances.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
        match self.creation_locks.lock() {
            Ok(mut locks) => locks.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

/// The recursive resolution algorithm: registry lookup, qualifier
/// inference, cycle detection against the chain, auto-wiring, and
/// lifecycle caching.
pub(crate) struct Resolver<'a> {
    table: &'a RegistrationTable,
    singletons: &'a SingletonStore,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(table: &'a RegistrationTable, singletons: &'a SingletonStore) -> Self {
        Self { table, singletons }
    }

    pub(crate) fn resolve_key(
        &self,
        key: &ServiceKey,
        chain: &ResolutionChain,
    ) -> Result<SharedInstance, ResolveError> {
        let label = key.label();
        if chain.contains(&label) {
            return Err(ResolveError::Circular {
                chain: chain.extended(&label),
            });
        }

        let registration = match self.table.lookup(key)? {
            Some(registration) => registration,
            None => return self.resolve_by_inference(key, &label, chain),
        };

        if registration.lifecycle().is_singleton() {
            if let Some(instance) = self.singletons.get(key) {
                tracing::trace!("cache hit for {}", label);
                return Ok(instance);
            }

            let creation_lock = self.singletons.creation_lock(key)?;
            let _guard = creation_lock
                .lock()
                .map_err(|_| ResolveError::lock("singleton_creation"))?;

            // Another thread may have won the race while we waited.
            if let Some(instance) = self.singletons.get(key) {
                return Ok(instance);
            }

            let instance = self.instantiate(&registration, chain.extended(&label))?;
            self.singletons.store(key.clone(), instance.clone())?;
            Ok(instance)
        } else {
            self.instantiate(&registration, chain.extended(&label))
        }
    }

    /// Steps for an unqualified request with no exact entry: forward to a
    /// sole qualified registration, report ambiguity on several, or fail
    /// as missing.
    fn resolve_by_inference(
        &self,
        key: &ServiceKey,
        label: &str,
        chain: &ResolutionChain,
    ) -> Result<SharedInstance, ResolveError> {
        if key.qualifier.is_none() {
            let candidates = self.table.all_for(key.type_id)?;
            if candidates.len() == 1 {
                return self.resolve_key(candidates[0].key(), chain);
            }
            if candidates.len() > 1 {
                let mut qualifiers: Vec<String> = candidates
                    .iter()
                    .filter_map(|registration| registration.key().qualifier.clone())
                    .collect();
                qualifiers.sort();
                return Err(ResolveError::Ambiguous {
                    type_name: key.short_type_name().to_string(),
                    candidates: qualifiers,
                    chain: chain.extended(label),
                });
            }
        }
        Err(ResolveError::Missing {
            label: label.to_string(),
            chain: chain.extended(label),
        })
    }

    /// Auto-wiring construction: resolve every wirable parameter in the
    /// producer's manifest against the extended chain, then invoke the
    /// producer with the resolved values.
    fn instantiate(
        &self,
        registration: &Registration,
        chain: ResolutionChain,
    ) -> Result<SharedInstance, ResolveError> {
        let producer = registration.producer();
        let mut args = ResolvedArgs::new(producer.name());

        for param in producer.parameters() {
            if !param.is_wirable() {
                continue;
            }
            let spec = match &param.dependency {
                Some(spec) => spec,
                None => continue,
            };
            let dep_label = spec.label();
            let value = self
                .resolve_key(spec.key(), &chain)
                .map_err(|source| ResolveError::AutoWire {
                    parameter: param.name.to_string(),
                    label: dep_label.clone(),
                    chain: chain.extended(&dep_label),
                    source: Box::new(source),
                })?;
            args.insert(param.name, value);
        }

        tracing::debug!("instantiating {}", registration.key().label());
        producer.construct(&mut args)
    }

    /// Resolve every entry registered under a contract, in registration
    /// order. An empty result is valid, not an error.
    pub(crate) fn resolve_all(&self, type_id: TypeId) -> Result<Vec<SharedInstance>, ResolveError> {
        let mut instances = Vec::new();
        for registration in self.table.all_for(type_id)? {
            instances.push(self.resolve_key(registration.key(), &ResolutionChain::new())?);
        }
        Ok(instances)
    }
}
