//! Built-in spell layers.
//!
//! Each layer wraps its parent and reads the parent's keys first, so a key
//! shared by several layers is always first seen on the most basic one.

use crate::configuration::{ConfigurationSection, EnumType};
use crate::runtime::{Controller, Mage};
use crate::spell::SpellTemplate;
use anyhow::Result;
use std::collections::BTreeMap;

pub const TARGET_TYPE: EnumType = EnumType::new(
    "target_type",
    &["none", "block", "other_entity", "any_entity", "self", "select", "any"],
);

pub const BRUSH_MODE: EnumType = EnumType::new("brush_mode", &["copy", "erase", "replace", "schematic"]);

const DEFAULT_RANGE: i64 = 32;
const DEFAULT_MAX_DIMENSION: i64 = 128;

#[derive(Debug, Default)]
pub struct BaseSpell {
    pub key: String,
    pub controller: Option<String>,
    pub mage: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub cooldown: i64,
    pub costs: BTreeMap<String, i64>,
    pub active_costs: BTreeMap<String, i64>,
    pub hidden: bool,
    pub tags: Vec<String>,
    pub bypass_confusion: bool,
    pub bypass_permissions: bool,
    pub cancellable: bool,
    pub cast_location: Option<String>,
}

fn read_costs(section: &dyn ConfigurationSection) -> BTreeMap<String, i64> {
    section
        .keys()
        .into_iter()
        .map(|key| {
            let amount = section.get_int(&key, 0);
            (key, amount)
        })
        .collect()
}

impl SpellTemplate for BaseSpell {
    fn initialize(&mut self, controller: &Controller) {
        self.controller = Some(controller.name.clone());
    }

    fn set_mage(&mut self, mage: &Mage) {
        self.mage = Some(mage.name.clone());
    }

    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.key = key.to_string();
        self.name = template.get_string("name", Some(key));
        self.description = template.get_string("description", None);
        self.cooldown = template.get_int("cooldown", 0);
        self.hidden = template.get_boolean("hidden", false);
        self.tags = template.get_string_list("tags");
        self.costs = read_costs(template.get_section("costs").as_ref());
        self.active_costs = read_costs(template.get_section("active_costs").as_ref());
        // Declared parameters are processed separately; only note the section.
        template.get_section("parameters");
        Ok(())
    }

    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.bypass_confusion = parameters.get_boolean("bypass_confusion", false);
        self.bypass_permissions = parameters.get_boolean("bypass_permissions", false);
        self.cancellable = parameters.get_boolean("cancellable", true);
        self.cast_location = parameters.get_string("cast_location", None);
        self.cooldown = parameters.get_int("cooldown", self.cooldown);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TargetingSpell {
    pub base: BaseSpell,
    pub range: i64,
    pub target: Option<String>,
    pub allow_max_range: bool,
    pub fov: f64,
    pub target_npcs: bool,
}

impl SpellTemplate for TargetingSpell {
    fn initialize(&mut self, controller: &Controller) {
        self.base.initialize(controller);
    }

    fn set_mage(&mut self, mage: &Mage) {
        self.base.set_mage(mage);
    }

    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.base.load_template(key, template)?;
        self.target = template.get_enum("target", &TARGET_TYPE, Some("other_entity"));
        Ok(())
    }

    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.base.process_parameters(parameters)?;
        self.range = parameters.get_int("range", DEFAULT_RANGE);
        self.target = parameters.get_enum("target", &TARGET_TYPE, self.target.as_deref());
        self.allow_max_range = parameters.get_boolean("allow_max_range", false);
        self.fov = parameters.get_double("fov", 0.3);
        self.target_npcs = parameters.get_boolean("target_npcs", false);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct UndoableSpell {
    pub targeting: TargetingSpell,
    pub undoable: bool,
    pub undo: i64,
    pub undo_speed: f64,
    pub bypass_undo: bool,
}

impl SpellTemplate for UndoableSpell {
    fn initialize(&mut self, controller: &Controller) {
        self.targeting.initialize(controller);
    }

    fn set_mage(&mut self, mage: &Mage) {
        self.targeting.set_mage(mage);
    }

    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.targeting.load_template(key, template)?;
        self.undoable = template.get_boolean("undoable", true);
        Ok(())
    }

    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.targeting.process_parameters(parameters)?;
        self.undo = parameters.get_int("undo", 0);
        self.undo_speed = parameters.get_double("undo_speed", 0.0);
        self.bypass_undo = parameters.get_boolean("bypass_undo", false);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BlockSpell {
    pub undoable: UndoableSpell,
    pub check_destructible: bool,
    pub destructible: Option<String>,
    pub indestructible: Option<String>,
    pub max_dimension: i64,
    pub commit: bool,
}

impl SpellTemplate for BlockSpell {
    fn initialize(&mut self, controller: &Controller) {
        self.undoable.initialize(controller);
    }

    fn set_mage(&mut self, mage: &Mage) {
        self.undoable.set_mage(mage);
    }

    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.undoable.load_template(key, template)
    }

    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.undoable.process_parameters(parameters)?;
        self.check_destructible = parameters.get_boolean("check_destructible", true);
        self.destructible = parameters.get_string("destructible", None);
        self.indestructible = parameters.get_string("indestructible", None);
        self.max_dimension = parameters.get_int("max_dimension", DEFAULT_MAX_DIMENSION);
        self.commit = parameters.get_boolean("commit", false);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BrushSpell {
    pub block: BlockSpell,
    pub brush: Option<String>,
    pub brush_mode: Option<String>,
    pub brush_target: bool,
    pub has_brush_override: bool,
}

impl SpellTemplate for BrushSpell {
    fn initialize(&mut self, controller: &Controller) {
        self.block.initialize(controller);
    }

    fn set_mage(&mut self, mage: &Mage) {
        self.block.set_mage(mage);
    }

    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.block.load_template(key, template)?;
        self.has_brush_override = template.get_boolean("brush_override", false);
        Ok(())
    }

    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.block.process_parameters(parameters)?;
        self.brush = parameters.get_string("brush", Some("stone"));
        self.brush_mode = parameters.get_enum("brush_mode", &BRUSH_MODE, Some("copy"));
        self.brush_target = parameters.get_boolean("brushtarget", false);
        Ok(())
    }
}

#[derive(Debug, Default)]
/// The action container: a brush spell that also owns action handlers.
pub struct ActionSpell {
    pub brush: BrushSpell,
    pub handlers: Vec<String>,
    pub requires_entity_target: bool,
    pub undo_all: bool,
    pub template_loaded: bool,
}

impl ActionSpell {
    pub fn template_loaded(&self) -> bool {
        self.template_loaded
    }
}

impl SpellTemplate for ActionSpell {
    fn initialize(&mut self, controller: &Controller) {
        self.brush.initialize(controller);
    }

    fn set_mage(&mut self, mage: &Mage) {
        self.brush.set_mage(mage);
    }

    fn load_template(&mut self, key: &str, template: &dyn ConfigurationSection) -> Result<()> {
        self.brush.load_template(key, template)?;
        self.handlers = template.get_section("actions").keys();
        self.requires_entity_target = template.get_boolean("requires_entity_target", false);
        self.template_loaded = true;
        Ok(())
    }

    fn process_parameters(&mut self, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.brush.process_parameters(parameters)?;
        self.undo_all = parameters.get_boolean("undo_all", false);
        Ok(())
    }
}
