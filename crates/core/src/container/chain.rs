use std::fmt;

/// Ordered path of in-progress resolution labels, from the root request
/// down to the current one.
///
/// The chain models a path, not a visited-set: a label may legitimately be
/// resolved twice along independent branches (diamond dependencies), but a
/// label recurring within one path is a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionChain {
    labels: Vec<String>,
}

impl ResolutionChain {
    /// Create an empty chain for a root request.
    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Check if a label is already on the path.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Copy of this chain with one more label appended.
    pub fn extended(&self, label: &str) -> Self {
        let mut labels = self.labels.clone();
        labels.push(label.to_string());
        Self { labels }
    }

    /// The labels on the path, root first.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for ResolutionChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_leaves_original_untouched() {
        let root = ResolutionChain::new();
        let deeper = root.extended("App").extended("Db");

        assert!(root.is_empty());
        assert_eq!(deeper.len(), 2);
        assert!(deeper.contains("App"));
        assert!(deeper.contains("Db"));
        assert!(!deeper.contains("Cache"));
    }

    #[test]
    fn renders_as_arrow_path() {
        let chain = ResolutionChain::new()
            .extended("App")
            .extended("Db[replica]")
            .extended("Config");
        assert_eq!(chain.to_string(), "App -> Db[replica] -> Config");
    }
}
