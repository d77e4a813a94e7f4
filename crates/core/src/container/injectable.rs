use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::container::key::ServiceKey;
use crate::errors::ResolveError;

/// Shared instance as stored and passed around by the engine.
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Dependency descriptor decoded from a declared parameter: the contract
/// type to resolve plus an optional qualifier tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySpec {
    key: ServiceKey,
}

impl DependencySpec {
    /// Unqualified dependency on a contract type.
    pub fn of<T: Send + Sync + 'static>() -> Self {
        Self {
            key: ServiceKey::of::<T>(),
        }
    }

    /// Qualified dependency on a contract type.
    pub fn named<T: Send + Sync + 'static>(qualifier: impl Into<String>) -> Self {
        Self {
            key: ServiceKey::named::<T>(qualifier),
        }
    }

    /// Same dependency with a qualifier tag attached.
    pub fn with_qualifier(self, qualifier: impl Into<String>) -> Self {
        Self {
            key: self.key.with_qualifier(qualifier),
        }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn label(&self) -> String {
        self.key.label()
    }
}

/// Maps a declared parameter type to the dependency it requests.
///
/// Implemented for `Arc<T>`, the shape in which the engine hands out
/// instances, so a manifest can be written straight from a constructor's
/// field types.
pub trait DependencyParameter {
    fn dependency() -> DependencySpec;
}

impl<T: Send + Sync + 'static> DependencyParameter for Arc<T> {
    fn dependency() -> DependencySpec {
        DependencySpec::of::<T>()
    }
}

/// One declared parameter of a producer.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub dependency: Option<DependencySpec>,
    pub has_default: bool,
}

impl ParameterSpec {
    /// An auto-wirable parameter whose dependency is read off its type.
    pub fn wired<P: DependencyParameter>(name: &'static str) -> Self {
        Self {
            name,
            dependency: Some(P::dependency()),
            has_default: false,
        }
    }

    /// An auto-wirable parameter with a qualifier tag on its type.
    pub fn qualified<P: DependencyParameter>(
        name: &'static str,
        qualifier: impl Into<String>,
    ) -> Self {
        Self {
            name,
            dependency: Some(P::dependency().with_qualifier(qualifier)),
            has_default: false,
        }
    }

    /// A parameter with a default value; never auto-wired.
    pub fn defaulted(name: &'static str) -> Self {
        Self {
            name,
            dependency: None,
            has_default: true,
        }
    }

    /// A parameter with no dependency annotation; never auto-wired, and a
    /// construction error if the producer cannot fall back to a default.
    pub fn bare(name: &'static str) -> Self {
        Self {
            name,
            dependency: None,
            has_default: false,
        }
    }

    /// Whether the engine should resolve this parameter.
    pub fn is_wirable(&self) -> bool {
        self.dependency.is_some() && !self.has_default
    }
}

/// Resolved constructor arguments, keyed by parameter name.
pub struct ResolvedArgs {
    producer: &'static str,
    values: HashMap<&'static str, SharedInstance>,
}

impl ResolvedArgs {
    pub(crate) fn new(producer: &'static str) -> Self {
        Self {
            producer,
            values: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: SharedInstance) {
        self.values.insert(name, value);
    }

    /// Check whether a parameter was auto-wired.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove and downcast the value wired for a parameter.
    ///
    /// Fails with a construction error when the parameter was never wired
    /// (no annotation and no default) or carries an unexpected type.
    pub fn take<T: Send + Sync + 'static>(&mut self, name: &str) -> Result<Arc<T>, ResolveError> {
        let value = self
            .values
            .remove(name)
            .ok_or_else(|| ResolveError::Construction {
                parameter: name.to_string(),
                producer: crate::container::key::short_type_name(self.producer).to_string(),
            })?;
        value
            .downcast::<T>()
            .map_err(|_| ResolveError::Construction {
                parameter: name.to_string(),
                producer: crate::container::key::short_type_name(self.producer).to_string(),
            })
    }
}

/// Implemented by types the engine can construct, supplying their own
/// dependencies by recursive resolution.
///
/// A derive macro would generate these impls from a constructor signature;
/// inside this crate they are written by hand (see the container tests).
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Declared parameter manifest, in declaration order.
    fn parameters() -> Vec<ParameterSpec>;

    /// Construct an instance from resolved arguments.
    fn construct(args: &mut ResolvedArgs) -> Result<Self, ResolveError>;
}

impl Injectable for () {
    fn parameters() -> Vec<ParameterSpec> {
        Vec::new()
    }

    fn construct(_args: &mut ResolvedArgs) -> Result<Self, ResolveError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Repo;

    #[test]
    fn arc_parameter_requests_inner_type() {
        let spec = <Arc<Repo> as DependencyParameter>::dependency();
        assert_eq!(spec.key(), &ServiceKey::of::<Repo>());
        assert_eq!(spec.label(), "Repo");
    }

    #[test]
    fn qualified_parameter_carries_tag() {
        let spec = ParameterSpec::qualified::<Arc<Repo>>("repo", "replica");
        let dependency = spec.dependency.as_ref().map(|d| d.label());
        assert_eq!(dependency.as_deref(), Some("Repo[replica]"));
        assert!(spec.is_wirable());
    }

    #[test]
    fn defaulted_and_bare_parameters_are_not_wirable() {
        assert!(!ParameterSpec::defaulted("retries").is_wirable());
        assert!(!ParameterSpec::bare("mystery").is_wirable());
        assert!(ParameterSpec::wired::<Arc<Repo>>("repo").is_wirable());
    }

    #[test]
    fn take_returns_wired_value() {
        let mut args = ResolvedArgs::new("tests::Consumer");
        args.insert("repo", Arc::new(Repo));

        assert!(args.contains("repo"));
        let value = args.take::<Repo>("repo");
        assert!(value.is_ok());
        assert!(!args.contains("repo"));
    }

    #[test]
    fn take_missing_parameter_names_producer() {
        let mut args = ResolvedArgs::new("tests::Consumer");
        match args.take::<Repo>("repo") {
            Err(ResolveError::Construction {
                parameter,
                producer,
            }) => {
                assert_eq!(parameter, "repo");
                assert_eq!(producer, "Consumer");
            }
            Err(other) => panic!("expected construction error, got {other:?}"),
            Ok(_) => panic!("expected construction error"),
        }
    }

    #[test]
    fn take_with_wrong_type_is_a_construction_error() {
        let mut args = ResolvedArgs::new("tests::Consumer");
        args.insert("repo", Arc::new(Repo));
        assert!(matches!(
            args.take::<String>("repo"),
            Err(ResolveError::Construction { .. })
        ));
    }
}
