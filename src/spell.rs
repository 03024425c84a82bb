//! Capability contract of the classes being interrogated.
//!
//! Base spell layers implement [`SpellTemplate`]; actions implement
//! [`SpellAction`]. Both only ever receive `&dyn ConfigurationSection`, which
//! is what lets the interrogator swap in a recorder. Registration data for
//! actions lives in [`ActionClass`] because Rust has no runtime reflection:
//! the namespace, deprecation flag, and constructor are declared next to the
//! type instead of discovered from it.

use crate::configuration::ConfigurationSection;
use crate::runtime::{CastContext, Controller, Mage};
use anyhow::Result;
use heck::ToSnakeCase;
use std::fmt;

/// A spell layer: the shared surface every action-bearing spell exposes.
pub trait SpellTemplate {
    fn initialize(&mut self, controller: &Controller);

    fn set_mage(&mut self, mage: &Mage);

    /// Load declared defaults (`properties`) from a spell template section.
    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()>;

    /// Read user-settable `parameters`.
    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()>;
}

/// A single spell action implementation.
pub trait SpellAction {
    /// Initialize against the owning action container.
    fn initialize(
        &mut self,
        spell: &dyn SpellTemplate,
        parameters: &dyn ConfigurationSection,
    ) -> Result<()>;

    /// Prepare against a cast context.
    fn prepare(&mut self, context: &CastContext<'_>, parameters: &dyn ConfigurationSection)
    -> Result<()>;
}

pub type ActionConstructor = fn() -> Result<Box<dyn SpellAction>>;

pub type TemplateConstructor = fn() -> Box<dyn SpellTemplate>;

/// Default-construct an action; usable as an [`ActionConstructor`].
pub fn construct_action<A: SpellAction + Default + 'static>() -> Result<Box<dyn SpellAction>> {
    Ok(Box::new(A::default()))
}

/// Default-construct a spell layer; usable as a [`TemplateConstructor`].
pub fn construct_template<T: SpellTemplate + Default + 'static>() -> Box<dyn SpellTemplate> {
    Box::new(T::default())
}

#[derive(Clone, Copy)]
/// Registration handle for one action implementation.
pub struct ActionClass {
    pub namespace: &'static str,
    pub name: &'static str,
    pub deprecated: bool,
    pub construct: ActionConstructor,
}

impl ActionClass {
    pub const fn new(namespace: &'static str, name: &'static str, construct: ActionConstructor) -> Self {
        Self {
            namespace,
            name,
            deprecated: false,
            construct,
        }
    }

    pub const fn deprecated(self) -> Self {
        Self {
            deprecated: true,
            ..self
        }
    }

    /// Fully qualified class identity, e.g. `builtin::DamageAction`.
    pub fn identity(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// Catalog key: snake-cased name without the `Action` suffix.
    pub fn key(&self) -> String {
        let stem = self.name.strip_suffix("Action").unwrap_or(self.name);
        let stem = if stem.is_empty() { self.name } else { stem };
        stem.to_snake_case()
    }

    /// True when the class lives in `namespace` itself or anywhere below it.
    pub fn within(&self, namespace: &str) -> bool {
        self.namespace == namespace
            || self
                .namespace
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl fmt::Debug for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionClass")
            .field("identity", &self.identity())
            .field("deprecated", &self.deprecated)
            .finish()
    }
}

#[derive(Clone, Copy)]
/// A base spell layer paired with the category its keys are filed under.
pub struct BaseLayer {
    pub category: &'static str,
    pub construct: TemplateConstructor,
}

impl BaseLayer {
    pub const fn new(category: &'static str, construct: TemplateConstructor) -> Self {
        Self {
            category,
            construct,
        }
    }
}

impl fmt::Debug for BaseLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseLayer")
            .field("category", &self.category)
            .finish()
    }
}
