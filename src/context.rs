use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A constructed collaborator as handed back by the module loader.
pub type Instance = Box<dyn Any + Send>;

/// Per-request state of the handler that collaborators are bound onto.
///
/// Created fresh for each request and dropped with it. A name is resolved at most once:
/// once `mark_resolved` has been called for it, the binder treats later references as
/// no-ops.
#[derive(Default)]
pub struct ExecutionContext {
    bindings: HashMap<String, Instance>,
    bound_order: Vec<String>,
    helpers: Vec<String>,
    resolved: HashSet<String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `instance` under `name`. Returns false, leaving the existing binding in
    /// place, if the name is already bound.
    pub fn attach(&mut self, name: &str, instance: Instance) -> bool {
        if self.bindings.contains_key(name) {
            return false;
        }
        self.bindings.insert(name.to_string(), instance);
        self.bound_order.push(name.to_string());
        true
    }

    pub fn register_helper(&mut self, name: &str) {
        if !self.helpers.iter().any(|h| h == name) {
            self.helpers.push(name.to_string());
        }
    }

    pub fn mark_resolved(&mut self, name: &str) {
        self.resolved.insert(name.to_string());
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.contains(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.bindings.get(name)
    }

    pub fn get_as<T: 'static>(&self, name: &str) -> Option<&T> {
        self.bindings.get(name).and_then(|i| i.downcast_ref::<T>())
    }

    /// Bound names in the order they were attached.
    pub fn bound_names(&self) -> &[String] {
        &self.bound_order
    }

    pub fn helpers(&self) -> &[String] {
        &self.helpers
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("bound", &self.bound_order)
            .field("helpers", &self.helpers)
            .field("resolved", &self.resolved.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_once() {
        let mut context = ExecutionContext::new();
        assert!(context.attach("mailer", Box::new(1u32)));
        assert!(!context.attach("mailer", Box::new(2u32)));

        assert_eq!(context.get_as::<u32>("mailer"), Some(&1));
        assert_eq!(context.bound_names(), ["mailer".to_string()]);
    }

    #[test]
    fn test_get_as_wrong_type() {
        let mut context = ExecutionContext::new();
        context.attach("cache", Box::new("redis"));
        assert!(context.get_as::<u32>("cache").is_none());
        assert!(context.get("cache").is_some());
    }

    #[test]
    fn test_helpers_are_not_bound() {
        let mut context = ExecutionContext::new();
        context.register_helper("Format");
        context.register_helper("Format");

        assert_eq!(context.helpers(), ["Format".to_string()]);
        assert!(!context.is_bound("Format"));
    }
}
