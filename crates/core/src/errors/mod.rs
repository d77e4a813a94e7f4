pub mod core;

pub use self::core::{RegistrationError, ResolveError};
