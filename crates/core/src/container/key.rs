use std::any::TypeId;

/// Registration key combining a contract type and an optional qualifier.
///
/// Two keys are equal iff they refer to the same contract type and carry
/// equal qualifiers. The captured type name exists for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub qualifier: Option<String>,
}

impl ServiceKey {
    /// Create an unqualified key for a contract type.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: None,
        }
    }

    /// Create a qualified key for a contract type.
    pub fn named<T: 'static>(qualifier: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: Some(qualifier.into()),
        }
    }

    /// Same contract type, different qualifier.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// The contract's type name without its module path.
    pub fn short_type_name(&self) -> &'static str {
        short_type_name(self.type_name)
    }

    /// Human-readable label: `Type` or `Type[qualifier]`.
    pub fn label(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}[{}]", self.short_type_name(), qualifier),
            None => self.short_type_name().to_string(),
        }
    }
}

/// Strip leading module path segments from a fully qualified type name.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = match full.split('<').next() {
        Some(head) => head,
        None => full,
    };
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
