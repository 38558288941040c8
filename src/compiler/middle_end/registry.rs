//! Component template registry

use crate::compiler::frontend::ast::ComponentNode;
use std::collections::HashMap;

/// Qualified name to template map. Built once per compile and passed explicitly.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    templates: HashMap<String, ComponentNode>,
    order: Vec<String>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under `name`. Re-registering replaces the template
    /// but keeps its original listing position.
    pub fn register(&mut self, name: impl Into<String>, template: ComponentNode) {
        let name = name.into();
        log::trace!("Registering template '{}'", name);
        if self.templates.insert(name.clone(), template).is_none() {
            self.order.push(name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ComponentNode> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register("Button", ComponentNode::new("Item", 1));
        registry.register("ui.Card", ComponentNode::new("Item", 5));

        assert!(registry.contains("Button"));
        assert!(registry.contains("ui.Card"));
        assert!(!registry.contains("Card"));
        assert_eq!(registry.lookup("ui.Card").map(|t| t.line), Some(5));
    }

    #[test]
    fn test_reregister_keeps_order() {
        let mut registry = ComponentRegistry::new();
        registry.register("A", ComponentNode::new("Item", 1));
        registry.register("B", ComponentNode::new("Item", 2));
        registry.register("A", ComponentNode::new("Item", 3));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(registry.lookup("A").map(|t| t.line), Some(3));
    }
}
