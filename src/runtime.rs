//! Minimal runtime context handed to interrogated spells and actions.
//!
//! Interrogation never casts anything, so these carry just enough identity
//! for lifecycle code that wants to know who owns it.

use crate::spell::SpellTemplate;

const INTERROGATOR_NAME: &str = "Interrogator";

#[derive(Debug, Clone)]
/// Owner of every spell instance in a run.
pub struct Controller {
    pub name: String,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            name: "magic-meta".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
/// Caster identity attached to spells during interrogation.
pub struct Mage {
    pub name: String,
    pub controller: String,
}

impl Mage {
    pub fn new(name: impl Into<String>, controller: &Controller) -> Self {
        Self {
            name: name.into(),
            controller: controller.name.clone(),
        }
    }

    pub fn interrogator(controller: &Controller) -> Self {
        Self::new(INTERROGATOR_NAME, controller)
    }
}

/// Execution context an action is prepared against.
pub struct CastContext<'a> {
    pub mage: &'a Mage,
    pub spell: &'a dyn SpellTemplate,
}

impl<'a> CastContext<'a> {
    pub fn new(mage: &'a Mage, spell: &'a dyn SpellTemplate) -> Self {
        Self { mage, spell }
    }
}
