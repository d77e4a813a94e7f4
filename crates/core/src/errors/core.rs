use thiserror::Error;

use crate::container::chain::ResolutionChain;

/// Error raised when a registration cannot be accepted.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("duplicate registration for {label}")]
    Duplicate { label: String },

    #[error("invalid producer for {label}: {reason}")]
    InvalidProducer { label: String, reason: String },

    #[error("invalid lifecycle: {value}")]
    InvalidLifecycle { value: String },

    #[error("lock error on resource: {resource}")]
    Lock { resource: String },
}

impl RegistrationError {
    pub(crate) fn lock(resource: impl Into<String>) -> Self {
        Self::Lock {
            resource: resource.into(),
        }
    }
}

/// Error raised when a dependency cannot be resolved.
///
/// Every resolution-time variant carries the chain of in-progress
/// resolutions accumulated up to the failure, so the failing branch of a
/// dependency graph can be read straight out of the message.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no registration found for {label} (resolution chain: {chain})")]
    Missing { label: String, chain: ResolutionChain },

    #[error(
        "ambiguous resolution for {type_name}: multiple qualified registrations exist ({}); specify a qualifier (resolution chain: {chain})",
        .candidates.join(", ")
    )]
    Ambiguous {
        type_name: String,
        candidates: Vec<String>,
        chain: ResolutionChain,
    },

    #[error("circular dependency detected (resolution chain: {chain})")]
    Circular { chain: ResolutionChain },

    #[error("cannot auto-wire parameter '{parameter}' of type {label} (resolution chain: {chain})")]
    AutoWire {
        parameter: String,
        label: String,
        chain: ResolutionChain,
        #[source]
        source: Box<ResolveError>,
    },

    #[error("cannot supply parameter '{parameter}' when constructing {producer}")]
    Construction { parameter: String, producer: String },

    #[error("resolved instance for {label} does not have the requested type")]
    InstanceType { label: String },

    #[error("lock error on resource: {resource}")]
    Lock { resource: String },
}

impl ResolveError {
    /// The innermost failure beneath any auto-wiring wrappers.
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::AutoWire { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The resolution chain carried by this error, if any.
    pub fn chain(&self) -> Option<&ResolutionChain> {
        match self {
            ResolveError::Missing { chain, .. }
            | ResolveError::Ambiguous { chain, .. }
            | ResolveError::Circular { chain }
            | ResolveError::AutoWire { chain, .. } => Some(chain),
            _ => None,
        }
    }

    pub(crate) fn lock(resource: impl Into<String>) -> Self {
        Self::Lock {
            resource: resource.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_message_includes_chain() {
        let err = ResolveError::Missing {
            label: "Db".to_string(),
            chain: ResolutionChain::new().extended("App").extended("Db"),
        };
        let message = err.to_string();
        assert!(message.contains("no registration found for Db"));
        assert!(message.contains("App -> Db"));
    }

    #[test]
    fn ambiguous_message_lists_candidates() {
        let err = ResolveError::Ambiguous {
            type_name: "Cache".to_string(),
            candidates: vec!["memory".to_string(), "redis".to_string()],
            chain: ResolutionChain::new().extended("Cache"),
        };
        assert!(err.to_string().contains("memory, redis"));
    }

    #[test]
    fn root_cause_unwraps_nested_autowire() {
        let inner = ResolveError::Circular {
            chain: ResolutionChain::new().extended("A").extended("B").extended("A"),
        };
        let outer = ResolveError::AutoWire {
            parameter: "b".to_string(),
            label: "B".to_string(),
            chain: ResolutionChain::new().extended("A").extended("B"),
            source: Box::new(ResolveError::AutoWire {
                parameter: "a".to_string(),
                label: "A".to_string(),
                chain: ResolutionChain::new().extended("A").extended("B").extended("A"),
                source: Box::new(inner),
            }),
        };
        assert!(matches!(outer.root_cause(), ResolveError::Circular { .. }));
    }
}
