pub mod container;
pub mod errors;

// Re-export key types for convenience
pub use container::{
    Container, DependencyParameter, DependencySpec, Injectable, Lifecycle, ParameterSpec, Producer,
    Registration, RegistrationInfo, RegistrationTable, ResolutionChain, ResolvedArgs, ServiceKey,
};
pub use errors::{RegistrationError, ResolveError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get crate version
pub fn version() -> &'static str {
    VERSION
}
