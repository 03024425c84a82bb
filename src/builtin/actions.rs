//! Built-in spell actions.
//!
//! Every action reads its configuration through the same
//! [`ConfigurationSection`] calls at runtime and under interrogation, so the
//! keys each one reads here are exactly the keys it contributes to the catalog.

use crate::configuration::{ConfigurationSection, EnumType};
use crate::runtime::CastContext;
use crate::spell::{SpellAction, SpellTemplate};
use anyhow::{Result, bail};
use serde_json::Value;

pub const MESSAGE_TYPE: EnumType = EnumType::new("message_type", &["chat", "title", "action_bar"]);

pub const CONSTRUCTION_TYPE: EnumType =
    EnumType::new("construction_type", &["sphere", "cuboid", "pyramid", "cylinder"]);

pub const ORIENT_TYPE: EnumType = EnumType::new("orient_type", &["none", "x", "y", "z", "view"]);

#[derive(Debug, Default)]
pub struct DamageAction {
    pub damage: f64,
    pub player_damage: f64,
    pub entity_damage: f64,
    pub magic_damage: bool,
    pub knockback_resistance: f64,
}

impl SpellAction for DamageAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.damage = parameters.get_double("damage", 1.0);
        self.player_damage = parameters.get_double("player_damage", self.damage);
        self.entity_damage = parameters.get_double("entity_damage", self.damage);
        self.magic_damage = parameters.get_boolean("magic_damage", true);
        self.knockback_resistance = parameters.get_double("knockback_resistance", 0.0);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HealAction {
    pub amount: f64,
    pub percentage: f64,
}

impl SpellAction for HealAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.amount = parameters.get_double("amount", 20.0);
        self.percentage = parameters.get_double("percentage", 0.0);
        if self.percentage < 0.0 {
            bail!("heal percentage must not be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PotionEffectAction {
    pub duration: i64,
    pub amplifier: i64,
    pub ambient: bool,
    pub effects: Vec<(String, i64)>,
    pub remove_effects: Vec<String>,
}

impl SpellAction for PotionEffectAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.duration = parameters.get_int("duration", 100);
        self.amplifier = parameters.get_int("amplifier", 0);
        self.ambient = parameters.get_boolean("ambient", true);

        let effects = parameters.get_section("add_effects");
        self.effects = effects
            .keys()
            .into_iter()
            .map(|name| {
                let level = effects.get_int(&name, self.amplifier);
                (name, level)
            })
            .collect();
        self.remove_effects = parameters.get_string_list("remove_effects");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TeleportAction {
    pub ledge_range: i64,
    pub vertical_range: i64,
    pub safe: bool,
    pub require_build: bool,
    pub caster: Option<String>,
}

impl SpellAction for TeleportAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.require_build = parameters.get_boolean("require_build", false);
        Ok(())
    }

    fn prepare(&mut self, context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.caster = Some(context.mage.name.clone());
        self.ledge_range = parameters.get_int("ledge_range", 2);
        self.vertical_range = parameters.get_int("vertical_range", 255);
        self.safe = parameters.get_boolean("safe", true);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MessageAction {
    pub message: Option<String>,
    pub message_type: Option<String>,
    pub fade_in: i64,
    pub stay: i64,
    pub fade_out: i64,
}

impl SpellAction for MessageAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.message = parameters.get_string("message", Some(""));
        self.message_type = parameters.get_enum("message_type", &MESSAGE_TYPE, Some("chat"));
        if self.message_type.as_deref() == Some("title") {
            self.fade_in = parameters.get_int("fade_in", 10);
            self.stay = parameters.get_int("stay", 70);
            self.fade_out = parameters.get_int("fade_out", 20);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DelayAction {
    pub delay: i64,
    pub warmup: i64,
}

impl SpellAction for DelayAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.warmup = parameters.get_int("warmup", 0);
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.delay = parameters.get_int("delay", 1);
        if self.delay < 0 {
            bail!("delay must not be negative, got {}", self.delay);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConstructBlockAction {
    pub radius: i64,
    pub thickness: i64,
    pub construction_type: Option<String>,
    pub orient: Option<String>,
    pub brush: Option<String>,
    pub falling: bool,
    pub replace: Vec<String>,
}

impl SpellAction for ConstructBlockAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.replace = parameters.get_string_list("replace");
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.radius = parameters.get_int("radius", 2);
        self.thickness = parameters.get_int("thickness", 0);
        self.construction_type = parameters.get_enum("type", &CONSTRUCTION_TYPE, Some("sphere"));
        self.orient = parameters.get_enum("orient", &ORIENT_TYPE, Some("none"));
        // Same key as the brush layer's parameter.
        self.brush = parameters.get_string("brush", None);
        self.falling = parameters.get_boolean("falling", false);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct VelocityAction {
    pub speed: f64,
    pub living_entity_speed: f64,
    pub direction: Vec<Value>,
    pub push: i64,
}

impl SpellAction for VelocityAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.speed = parameters.get_double("speed", 1.0);
        self.living_entity_speed = parameters.get_double("living_entity_speed", self.speed);
        self.direction = parameters.get_list("direction");
        self.push = parameters.get_int("push", 0);
        Ok(())
    }
}

#[derive(Debug, Default)]
/// Superseded by [`DamageAction`]; registered as deprecated.
pub struct LegacyDamageAction {
    pub damage: i64,
}

impl SpellAction for LegacyDamageAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.damage = parameters.get_int("damage", 1);
        Ok(())
    }
}

#[derive(Debug, Default)]
/// Lives under `builtin::experimental`.
pub struct ShrinkAction {
    pub max_size: i64,
}

impl SpellAction for ShrinkAction {
    fn initialize(&mut self, _spell: &dyn SpellTemplate, _: &dyn ConfigurationSection) -> Result<()> {
        Ok(())
    }

    fn prepare(&mut self, _context: &CastContext<'_>, parameters: &dyn ConfigurationSection) -> Result<()> {
        self.max_size = parameters.get_int("max_size", 1);
        Ok(())
    }
}
