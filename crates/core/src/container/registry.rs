use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::container::key::ServiceKey;
use crate::container::lifecycle::Lifecycle;
use crate::container::producer::Producer;
use crate::errors::{RegistrationError, ResolveError};

/// A registered producer for one (contract, qualifier) key.
#[derive(Debug)]
pub struct Registration {
    key: ServiceKey,
    producer: Producer,
    lifecycle: Lifecycle,
    sequence: u64,
}

impl Registration {
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Position in registration order; stable enumeration relies on it.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Store of (contract, qualifier) → producer bindings.
///
/// Append-only: entries are only ever added, apart from `clear`, which
/// empties the table wholesale.
#[derive(Debug, Default)]
pub struct RegistrationTable {
    entries: RwLock<HashMap<ServiceKey, Arc<Registration>>>,
    next_sequence: AtomicU64,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry. Fails on a duplicate key or a malformed
    /// producer manifest.
    pub fn register(
        &self,
        key: ServiceKey,
        producer: Producer,
        lifecycle: Lifecycle,
    ) -> Result<(), RegistrationError> {
        if let Err(reason) = producer.validate() {
            return Err(RegistrationError::InvalidProducer {
                label: key.label(),
                reason,
            });
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|_| RegistrationError::lock("registration_table"))?;

        if entries.contains_key(&key) {
            return Err(RegistrationError::Duplicate { label: key.label() });
        }

        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("registered {} as {}", key.label(), lifecycle.as_str());
        entries.insert(
            key.clone(),
            Arc::new(Registration {
                key,
                producer,
                lifecycle,
                sequence,
            }),
        );
        Ok(())
    }

    /// Exact lookup by (contract, qualifier).
    pub fn lookup(&self, key: &ServiceKey) -> Result<Option<Arc<Registration>>, ResolveError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ResolveError::lock("registration_table"))?;
        Ok(entries.get(key).cloned())
    }

    /// Every entry registered under a contract, across all qualifiers
    /// including the unqualified one, in registration order.
    pub fn all_for(&self, type_id: TypeId) -> Result<Vec<Arc<Registration>>, ResolveError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ResolveError::lock("registration_table"))?;
        let mut matches: Vec<Arc<Registration>> = entries
            .values()
            .filter(|registration| registration.key.type_id == type_id)
            .cloned()
            .collect();
        matches.sort_by_key(|registration| registration.sequence);
        Ok(matches)
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry, in registration order.
    pub fn entries(&self) -> Vec<Arc<Registration>> {
        let mut all: Vec<Arc<Registration>> = self
            .entries
            .read()
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default();
        all.sort_by_key(|registration| registration.sequence);
        all
    }

    /// Empty the table. Recovers a poisoned lock so a reset always
    /// succeeds, even after a panic elsewhere.
    pub fn clear(&self) {
        match self.entries.write() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cache;

    #[test]
    fn duplicate_key_is_rejected() {
        let table = RegistrationTable::new();
        table
            .register(
                ServiceKey::of::<Cache>(),
                Producer::from_fn(|| Cache),
                Lifecycle::Singleton,
            )
            .expect("first registration failed");

        let result = table.register(
            ServiceKey::of::<Cache>(),
            Producer::from_fn(|| Cache),
            Lifecycle::Transient,
        );
        assert!(matches!(
            result,
            Err(RegistrationError::Duplicate { label }) if label == "Cache"
        ));
    }

    #[test]
    fn qualified_keys_do_not_collide_with_unqualified() {
        let table = RegistrationTable::new();
        table
            .register(
                ServiceKey::of::<Cache>(),
                Producer::from_fn(|| Cache),
                Lifecycle::Singleton,
            )
            .expect("unqualified registration failed");
        table
            .register(
                ServiceKey::named::<Cache>("redis"),
                Producer::from_fn(|| Cache),
                Lifecycle::Singleton,
            )
            .expect("qualified registration failed");

        assert_eq!(table.len(), 2);
        assert!(table.contains(&ServiceKey::named::<Cache>("redis")));
    }

    #[test]
    fn all_for_preserves_registration_order() {
        let table = RegistrationTable::new();
        for qualifier in ["zeta", "alpha", "mid"] {
            table
                .register(
                    ServiceKey::named::<Cache>(qualifier),
                    Producer::from_fn(|| Cache),
                    Lifecycle::Transient,
                )
                .expect("registration failed");
        }

        let order: Vec<Option<String>> = table
            .all_for(std::any::TypeId::of::<Cache>())
            .expect("all_for failed")
            .iter()
            .map(|registration| registration.key().qualifier.clone())
            .collect();
        assert_eq!(
            order,
            vec![
                Some("zeta".to_string()),
                Some("alpha".to_string()),
                Some("mid".to_string())
            ]
        );
    }

    #[test]
    fn invalid_manifest_is_rejected_at_registration() {
        use crate::container::injectable::ParameterSpec;

        let table = RegistrationTable::new();
        let producer = Producer::with_parameters(
            vec![ParameterSpec::bare("dup"), ParameterSpec::bare("dup")],
            |_args| Ok(Cache),
        );
        let result = table.register(ServiceKey::of::<Cache>(), producer, Lifecycle::Singleton);
        assert!(matches!(
            result,
            Err(RegistrationError::InvalidProducer { .. })
        ));
    }

    #[test]
    fn clear_empties_the_table() {
        let table = RegistrationTable::new();
        table
            .register(
                ServiceKey::of::<Cache>(),
                Producer::from_fn(|| Cache),
                Lifecycle::Singleton,
            )
            .expect("registration failed");

        table.clear();
        assert!(table.is_empty());
        assert!(table
            .lookup(&ServiceKey::of::<Cache>())
            .expect("lookup failed")
            .is_none());
    }
}
