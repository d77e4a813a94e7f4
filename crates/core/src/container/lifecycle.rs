use serde::{Deserialize, Serialize};

/// Caching policy for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Single instance shared for the container's lifetime.
    Singleton,
    /// New instance created for each resolution.
    Transient,
}

impl Lifecycle {
    /// Check if the lifecycle is singleton.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifecycle::Singleton)
    }

    /// Check if the lifecycle is transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, Lifecycle::Transient)
    }

    /// Get the lifecycle name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Singleton => "singleton",
            Lifecycle::Transient => "transient",
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::Singleton
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Lifecycle {
    type Err = crate::errors::RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "singleton" => Ok(Lifecycle::Singleton),
            "transient" => Ok(Lifecycle::Transient),
            _ => Err(crate::errors::RegistrationError::InvalidLifecycle {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_predicates() {
        assert!(Lifecycle::Singleton.is_singleton());
        assert!(!Lifecycle::Singleton.is_transient());
        assert!(Lifecycle::Transient.is_transient());
        assert_eq!(Lifecycle::default(), Lifecycle::Singleton);
    }

    #[test]
    fn lifecycle_display() {
        assert_eq!(Lifecycle::Singleton.to_string(), "singleton");
        assert_eq!(Lifecycle::Transient.to_string(), "transient");
    }

    #[test]
    fn lifecycle_from_str() {
        assert_eq!("singleton".parse::<Lifecycle>().unwrap(), Lifecycle::Singleton);
        assert_eq!("Transient".parse::<Lifecycle>().unwrap(), Lifecycle::Transient);
        assert!("scoped".parse::<Lifecycle>().is_err());
    }
}
