//! Fixture spell layers and actions shared by the integration suite.
//!
//! The fixture namespace mixes well-behaved actions with ones that fail in
//! each lifecycle phase, a deprecated class, and a class in a nested
//! namespace, so filtering and failure isolation can be observed end to end.

#![allow(dead_code)]

use anyhow::{Result, bail};
use magic_meta::configuration::{ConfigurationSection, EnumType};
use magic_meta::runtime::{CastContext, Controller, Mage};
use magic_meta::spell::{BaseLayer, construct_action, construct_template};
use magic_meta::{
    ActionClass, ActionRegistry, CatalogBuilder, InterrogationPlan, InterrogationReport,
    Interrogator, MetaCatalog, SpellAction, SpellTemplate, generate_catalog,
};
use std::collections::BTreeSet;

pub const NAMESPACE: &str = "fixture";
pub const NESTED_NAMESPACE: &str = "fixture::nested";

pub const MODE: EnumType = EnumType::new("mode", &["fast", "slow"]);

/// Read only by classes that fail or are filtered out, so it must never
/// appear in a catalog.
pub const POISON_KIND: EnumType = EnumType::new("poison_kind", &["venom", "toxin"]);

#[derive(Default)]
pub struct FixtureBase {
    pub name: Option<String>,
}

impl SpellTemplate for FixtureBase {
    fn initialize(&mut self, _controller: &Controller) {}

    fn set_mage(&mut self, _mage: &Mage) {}

    fn load_template(&mut self, _key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.name = template.get_string("name", None);
        template.get_section("costs");
        template.get_section("parameters");
        Ok(())
    }

    fn process_parameters(&mut self, _parameters: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct FixtureTargeting {
    pub base: FixtureBase,
    pub range: i64,
    pub label: Option<String>,
}

impl SpellTemplate for FixtureTargeting {
    fn initialize(&mut self, controller: &Controller) {
        self.base.initialize(controller);
    }

    fn set_mage(&mut self, mage: &Mage) {
        self.base.set_mage(mage);
    }

    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.base.load_template(key, template)?;
        template.get_section("actions");
        self.label = template.get_string("label", Some("target"));
        Ok(())
    }

    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.base.process_parameters(parameters)?;
        self.range = parameters.get_int("range", 10);
        Ok(())
    }
}

#[derive(Default)]
pub struct AmountAction;

impl SpellAction for AmountAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_int("amount", 1);
        parameters.get_enum("mode", &MODE, Some("fast"));
        Ok(())
    }
}

#[derive(Default)]
/// Reads `range` as a double, widening the shared key.
pub struct RangeAction;

impl SpellAction for RangeAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_double("range", 12.5);
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        let effects = parameters.get_section("effects");
        effects.get_int("duration", 20);
        Ok(())
    }
}

#[derive(Default)]
/// Reads `mixed` as both a boolean and an integer, plus a blank key.
pub struct MixedAction;

impl SpellAction for MixedAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_boolean("mixed", false);
        parameters.get_int("mixed", 3);
        parameters.get_int("", 0);
        Ok(())
    }
}

#[derive(Default)]
pub struct FailingAction;

impl SpellAction for FailingAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_string("poison", Some("before failure"));
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_double("poison_level", 2.0);
        parameters.get_enum("poison_kind", &POISON_KIND, Some("venom"));
        bail!("prepare refused")
    }
}

#[derive(Default)]
pub struct PanickingAction;

impl SpellAction for PanickingAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_int("explosive", 1);
        parameters.get_enum("explosive_kind", &POISON_KIND, None);
        panic!("initialize exploded")
    }

    fn prepare(&mut self, _context: &CastContext<'_>, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }
}

fn unconstructible() -> Result<Box<dyn SpellAction>> {
    bail!("no default constructor")
}

#[derive(Default)]
pub struct LegacyAction;

impl SpellAction for LegacyAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_string("legacy_only", None);
        parameters.get_enum("legacy_kind", &POISON_KIND, Some("toxin"));
        Ok(())
    }
}

#[derive(Default)]
pub struct NestedAction;

impl SpellAction for NestedAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        parameters.get_string("nested_only", None);
        parameters.get_enum("nested_kind", &POISON_KIND, Some("toxin"));
        Ok(())
    }
}

pub fn base_layers() -> Vec<BaseLayer> {
    vec![
        BaseLayer::new("base", construct_template::<FixtureBase>),
        BaseLayer::new("targeting", construct_template::<FixtureTargeting>),
    ]
}

pub fn well_behaved_classes() -> Vec<ActionClass> {
    vec![
        ActionClass::new(NAMESPACE, "AmountAction", construct_action::<AmountAction>),
        ActionClass::new(NAMESPACE, "RangeAction", construct_action::<RangeAction>),
    ]
}

pub fn all_classes() -> Vec<ActionClass> {
    let mut classes = well_behaved_classes();
    classes.extend([
        ActionClass::new(NAMESPACE, "MixedAction", construct_action::<MixedAction>),
        ActionClass::new(NAMESPACE, "FailingAction", construct_action::<FailingAction>),
        ActionClass::new(NAMESPACE, "PanickingAction", construct_action::<PanickingAction>),
        ActionClass::new(NAMESPACE, "BrokenAction", unconstructible),
        ActionClass::new(NAMESPACE, "LegacyAction", construct_action::<LegacyAction>).deprecated(),
        ActionClass::new(NESTED_NAMESPACE, "NestedAction", construct_action::<NestedAction>),
    ]);
    classes
}

pub fn registry(classes: Vec<ActionClass>) -> ActionRegistry {
    ActionRegistry::new().with(classes)
}

/// Plan over the fixture namespace; an empty `only` selects every action.
pub fn plan(only: &[&str]) -> InterrogationPlan {
    let only: BTreeSet<String> = only.iter().map(|key| key.to_string()).collect();
    InterrogationPlan {
        namespace: NAMESPACE.to_string(),
        container: construct_template::<FixtureTargeting>,
        base_layers: base_layers(),
        only: (!only.is_empty()).then_some(only),
    }
}

pub fn catalog(
    classes: Vec<ActionClass>,
    only: &[&str],
) -> Result<(MetaCatalog, InterrogationReport)> {
    generate_catalog(&registry(classes), plan(only))
}

/// Run the pass without assembling, for inspecting the raw registries.
pub fn interrogate(
    classes: Vec<ActionClass>,
    only: &[&str],
) -> Result<(CatalogBuilder, InterrogationReport)> {
    Interrogator::new(&registry(classes), plan(only)).run()
}
