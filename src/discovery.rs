//! Action class discovery.
//!
//! Discovery is an injected capability: the interrogator asks for the
//! candidates in a namespace and filters them itself. [`ActionRegistry`] is the
//! explicit, statically populated implementation used by the binary; tests
//! register their own fixture classes.

use crate::spell::ActionClass;
use anyhow::{Result, bail};
use std::collections::BTreeMap;

/// Enumerates candidate action classes for a namespace.
///
/// Implementations may over-report (nested namespaces, deprecated classes);
/// callers must not assume any ordering.
pub trait ActionDiscovery {
    fn discover(&self, namespace: &str) -> Result<Vec<ActionClass>>;
}

#[derive(Default, Debug)]
/// In-memory registry of action classes keyed by identity.
pub struct ActionRegistry {
    classes: BTreeMap<String, ActionClass>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class; a second registration of the same identity replaces
    /// the first.
    pub fn register(&mut self, class: ActionClass) {
        self.classes.insert(class.identity(), class);
    }

    pub fn with(mut self, classes: impl IntoIterator<Item = ActionClass>) -> Self {
        for class in classes {
            self.register(class);
        }
        self
    }

    pub fn get(&self, identity: &str) -> Option<&ActionClass> {
        self.classes.get(identity)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ActionDiscovery for ActionRegistry {
    /// Every class in `namespace` or nested below it, in identity order.
    fn discover(&self, namespace: &str) -> Result<Vec<ActionClass>> {
        let namespace = namespace.trim();
        if namespace.is_empty() {
            bail!("Empty action namespace requested");
        }
        Ok(self
            .classes
            .values()
            .filter(|class| class.within(namespace))
            .copied()
            .collect())
    }
}
