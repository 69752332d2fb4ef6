//! Declarative activation rules for wizard steps.

use crate::document::{DocPath, Document};
use serde_json::Value;

/// When a step is asked, expressed over the configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Always,
    /// The leaf at the path equals the value.
    Equals(DocPath, Value),
    /// The leaf at the path is absent or differs from the value.
    NotEquals(DocPath, Value),
    /// Every rule holds.
    All(Vec<Activation>),
}

impl Activation {
    pub fn equals(path: &str, value: impl Into<Value>) -> Self {
        Activation::Equals(DocPath::parse(path), value.into())
    }

    pub fn not_equals(path: &str, value: impl Into<Value>) -> Self {
        Activation::NotEquals(DocPath::parse(path), value.into())
    }

    /// Conjunction, flattening nested `All`s and dropping `Always`.
    pub fn and(self, other: Activation) -> Self {
        let mut rules = Vec::new();
        for rule in [self, other] {
            match rule {
                Activation::Always => {}
                Activation::All(inner) => rules.extend(inner),
                rule => rules.push(rule),
            }
        }
        match rules.len() {
            0 => Activation::Always,
            1 => rules.remove(0),
            _ => Activation::All(rules),
        }
    }

    pub fn is_active(&self, config: &Document) -> bool {
        match self {
            Activation::Always => true,
            Activation::Equals(path, value) => config.get_value(path) == Some(value),
            Activation::NotEquals(path, value) => config.get_value(path) != Some(value),
            Activation::All(rules) => rules.iter().all(|rule| rule.is_active(config)),
        }
    }

    /// Every document path this rule reads.
    pub fn paths(&self) -> Vec<&DocPath> {
        match self {
            Activation::Always => Vec::new(),
            Activation::Equals(path, _) | Activation::NotEquals(path, _) => vec![path],
            Activation::All(rules) => rules.iter().flat_map(Activation::paths).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Document {
        Document::from_json(value).unwrap()
    }

    #[test]
    fn test_equals() {
        let rule = Activation::equals("language", "python");
        assert!(rule.is_active(&config(json!({"language": "python"}))));
        assert!(!rule.is_active(&config(json!({"language": "java"}))));
        assert!(!rule.is_active(&Document::new()));
    }

    #[test]
    fn test_not_equals_treats_absent_as_different() {
        let rule = Activation::not_equals("java.tools.pitest.enabled", false);
        assert!(rule.is_active(&Document::new()));
        assert!(rule.is_active(&config(json!({"java": {"tools": {"pitest": {"enabled": true}}}}))));
        assert!(!rule.is_active(&config(json!({"java": {"tools": {"pitest": {"enabled": false}}}}))));
    }

    #[test]
    fn test_and_flattens() {
        let rule = Activation::equals("language", "java")
            .and(Activation::Always)
            .and(Activation::not_equals("java.tools.owasp.enabled", false));
        match &rule {
            Activation::All(rules) => assert_eq!(rules.len(), 2),
            other => panic!("Expected All, got {:?}", other),
        }
        assert_eq!(rule.paths().len(), 2);
        assert_eq!(Activation::Always.and(Activation::Always), Activation::Always);
    }
}
