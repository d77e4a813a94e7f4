use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::container::injectable::{Injectable, ParameterSpec, ResolvedArgs, SharedInstance};
use crate::container::key::short_type_name;
use crate::errors::ResolveError;

/// Construction closure invoked once the manifest's parameters are resolved.
type ConstructFn =
    Box<dyn Fn(&mut ResolvedArgs) -> Result<SharedInstance, ResolveError> + Send + Sync>;

/// A producer: a declared parameter manifest plus the closure that builds
/// the instance once those parameters are resolved.
pub struct Producer {
    name: &'static str,
    params: Vec<ParameterSpec>,
    construct: ConstructFn,
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("name", &self.name)
            .field("parameters", &self.params)
            .finish()
    }
}

impl Producer {
    /// Use the contract type itself as the producer: the type's own
    /// manifest and constructor drive auto-wiring.
    pub fn of<T: Injectable>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            params: T::parameters(),
            construct: Box::new(|args| T::construct(args).map(|v| Arc::new(v) as SharedInstance)),
        }
    }

    /// A factory with no auto-wired parameters.
    pub fn from_fn<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<T>(),
            params: Vec::new(),
            construct: Box::new(move |_args| Ok(Arc::new(factory()) as SharedInstance)),
        }
    }

    /// A factory with an explicit parameter manifest; the closure receives
    /// the resolved arguments.
    pub fn with_parameters<T, F>(params: Vec<ParameterSpec>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut ResolvedArgs) -> Result<T, ResolveError> + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<T>(),
            params,
            construct: Box::new(move |args| factory(args).map(|v| Arc::new(v) as SharedInstance)),
        }
    }

    /// Declared parameters, in declaration order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// Fully qualified name of the produced type, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }

    pub(crate) fn construct(&self, args: &mut ResolvedArgs) -> Result<SharedInstance, ResolveError> {
        (self.construct)(args)
    }

    /// Manifest sanity check, run at registration time.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.name) {
                return Err(format!("duplicate parameter '{}'", param.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::injectable::ResolvedArgs;

    struct Widget {
        size: u32,
    }

    #[test]
    fn from_fn_builds_without_arguments() {
        let producer = Producer::from_fn(|| Widget { size: 7 });
        assert!(producer.parameters().is_empty());

        let mut args = ResolvedArgs::new(producer.name());
        let instance = producer.construct(&mut args).expect("construction failed");
        let widget = instance
            .downcast::<Widget>()
            .unwrap_or_else(|_| panic!("wrong type produced"));
        assert_eq!(widget.size, 7);
    }

    #[test]
    fn of_reads_the_manifest_from_the_type() {
        struct Standalone;
        impl Injectable for Standalone {
            fn parameters() -> Vec<ParameterSpec> {
                vec![ParameterSpec::defaulted("mode")]
            }
            fn construct(_args: &mut ResolvedArgs) -> Result<Self, ResolveError> {
                Ok(Standalone)
            }
        }

        let producer = Producer::of::<Standalone>();
        assert_eq!(producer.parameters().len(), 1);
        assert_eq!(producer.short_name(), "Standalone");
    }

    #[test]
    fn validate_rejects_duplicate_parameter_names() {
        let producer = Producer::with_parameters(
            vec![ParameterSpec::bare("x"), ParameterSpec::bare("x")],
            |_args| Ok(Widget { size: 0 }),
        );
        let reason = producer.validate().expect_err("expected invalid manifest");
        assert!(reason.contains("duplicate parameter 'x'"));
    }
}
