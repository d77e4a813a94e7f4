pub mod chain;
#[allow(clippy::module_inception)]
pub mod container;
pub mod injectable;
pub mod key;
pub mod lifecycle;
pub mod producer;
pub mod registry;
pub mod resolver;


pub use chain::ResolutionChain;
pub use container::{Container, RegistrationInfo};
pub use injectable::{
    DependencyParameter, DependencySpec, Injectable, ParameterSpec, ResolvedArgs, SharedInstance,
};
pub use key::ServiceKey;
pub use lifecycle::Lifecycle;
pub use producer::Producer;
pub use registry::{Registration, RegistrationTable};
