use crate::package::Spec;

/// `"1 gem installed"` / `"N gems installed"`.
pub fn summary(count: usize) -> String {
    if count == 1 {
        "1 gem installed".to_string()
    } else {
        format!("{} gems installed", count)
    }
}

/// Specs installed during the current run, in install order and unique by
/// full name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstalledSet {
    specs: Vec<Spec>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `spec` unless a spec with the same full name is already
    /// recorded. Returns whether it was appended.
    pub fn insert(&mut self, spec: Spec) -> bool {
        if self.contains(&spec.full_name()) {
            return false;
        }
        self.specs.push(spec);
        true
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.specs.iter().any(|s| s.full_name() == full_name)
    }

    pub fn specs(&self) -> &[Spec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn full_names(&self) -> Vec<String> {
        self.specs.iter().map(Spec::full_name).collect()
    }

    pub fn summary(&self) -> String {
        summary(self.len())
    }

    pub fn into_specs(self) -> Vec<Spec> {
        self.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn spec(name: &str, version: &str) -> Spec {
        Spec {
            name: name.to_string(),
            version: Version::parse(version).unwrap(),
            platform: Default::default(),
            dependencies: vec![],
            source: None,
            sha256: None,
        }
    }

    #[test]
    fn test_summary_pluralization() {
        assert_eq!(summary(0), "0 gems installed");
        assert_eq!(summary(1), "1 gem installed");
        assert_eq!(summary(2), "2 gems installed");
    }

    #[test]
    fn test_insert_keeps_install_order() {
        let mut set = InstalledSet::new();
        assert!(set.insert(spec("b", "2")));
        assert!(set.insert(spec("a", "2")));

        assert_eq!(set.full_names(), vec!["b-2", "a-2"]);
        assert_eq!(set.summary(), "2 gems installed");
    }

    #[test]
    fn test_insert_is_unique_by_full_name() {
        let mut set = InstalledSet::new();
        assert!(set.insert(spec("a", "2")));
        assert!(!set.insert(spec("a", "2")));
        assert!(set.insert(spec("a", "3")));

        assert_eq!(set.len(), 2);
        assert!(set.contains("a-2"));
        assert_eq!(set.summary(), "2 gems installed");
    }

    #[test]
    fn test_empty_set() {
        let set = InstalledSet::new();
        assert!(set.is_empty());
        assert_eq!(set.summary(), "0 gems installed");
        assert!(set.into_specs().is_empty());
    }
}
