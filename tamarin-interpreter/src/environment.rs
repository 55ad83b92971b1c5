use crate::object::Object;
use gc::{custom_trace, Finalize, Gc, GcCell, Trace};
use indexmap::IndexMap;
use std::rc::Rc;

#[derive(Finalize)]
pub struct EnvironmentCore {
    /// Bindings in the order they were first made.
    store: IndexMap<Rc<str>, Gc<Object>>,
    outer: Option<Environment>,
}

// Keys are plain strings; only the bound values and the enclosing scope hold
// collectable pointers.
unsafe impl Trace for EnvironmentCore {
    custom_trace!(this, {
        for value in this.store.values() {
            mark(value);
        }
        mark(&this.outer);
    });
}

/// A shared, mutable scope. Cloning an `Environment` yields another handle
/// to the same scope, which is how closures capture their defining scope.
#[derive(Clone, Trace, Finalize)]
pub struct Environment {
    environment: Gc<GcCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_outer(None)
    }

    pub fn new_enclosed(outer: &Environment) -> Environment {
        Self::with_outer(Some(outer.clone()))
    }

    fn with_outer(outer: Option<Environment>) -> Environment {
        Environment {
            environment: Gc::new(GcCell::new(EnvironmentCore {
                store: IndexMap::new(),
                outer,
            })),
        }
    }

    /// Looks `key` up in this scope, then in each enclosing scope.
    pub fn get(&self, key: &str) -> Option<Gc<Object>> {
        let env = self.environment.borrow();
        match env.store.get(key) {
            Some(value) => Some(value.clone()),
            None => env.outer.as_ref().and_then(|outer| outer.get(key)),
        }
    }

    /// Binds `key` in this scope only, shadowing any outer binding.
    /// Rebinding keeps the name's original position.
    pub fn set(&mut self, key: &str, value: Gc<Object>) {
        self.environment.borrow_mut().store.insert(key.into(), value);
    }

    /// Names bound directly in this scope, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.environment
            .borrow()
            .store
            .keys()
            .map(|key| key.to_string())
            .collect()
    }

    pub fn outer(&self) -> Option<Environment> {
        self.environment.borrow().outer.clone()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Environments are compared by identity.
impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(&self.environment, &other.environment)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("keys", &self.keys())
            .field("enclosed", &self.outer().is_some())
            .finish()
    }
}
