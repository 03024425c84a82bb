//! Built-in spell layers and actions.
//!
//! This is the content the `magic-meta` binary catalogs by default: six base
//! layers, the [`ActionSpell`] container, and the actions registered in the
//! `builtin` namespace.

pub mod actions;
pub mod spells;

pub use actions::{
    ConstructBlockAction, DamageAction, DelayAction, HealAction, LegacyDamageAction,
    MessageAction, PotionEffectAction, ShrinkAction, TeleportAction, VelocityAction,
};
pub use spells::{ActionSpell, BaseSpell, BlockSpell, BrushSpell, TargetingSpell, UndoableSpell};

use crate::discovery::ActionRegistry;
use crate::interrogate::InterrogationPlan;
use crate::spell::{ActionClass, BaseLayer, construct_action, construct_template};
use std::collections::BTreeSet;

/// Namespace the built-in actions are registered under.
pub const NAMESPACE: &str = "builtin";

const EXPERIMENTAL_NAMESPACE: &str = "builtin::experimental";

/// Base layers in scan order, most basic first.
pub fn base_layers() -> Vec<BaseLayer> {
    vec![
        BaseLayer::new("base", construct_template::<BaseSpell>),
        BaseLayer::new("targeting", construct_template::<TargetingSpell>),
        BaseLayer::new("undo", construct_template::<UndoableSpell>),
        BaseLayer::new("construction", construct_template::<BlockSpell>),
        BaseLayer::new("brushes", construct_template::<BrushSpell>),
        BaseLayer::new("actions", construct_template::<ActionSpell>),
    ]
}

pub fn action_classes() -> Vec<ActionClass> {
    vec![
        ActionClass::new(NAMESPACE, "ConstructBlockAction", construct_action::<ConstructBlockAction>),
        ActionClass::new(NAMESPACE, "DamageAction", construct_action::<DamageAction>),
        ActionClass::new(NAMESPACE, "DelayAction", construct_action::<DelayAction>),
        ActionClass::new(NAMESPACE, "HealAction", construct_action::<HealAction>),
        ActionClass::new(NAMESPACE, "MessageAction", construct_action::<MessageAction>),
        ActionClass::new(NAMESPACE, "PotionEffectAction", construct_action::<PotionEffectAction>),
        ActionClass::new(NAMESPACE, "TeleportAction", construct_action::<TeleportAction>),
        ActionClass::new(NAMESPACE, "VelocityAction", construct_action::<VelocityAction>),
        ActionClass::new(NAMESPACE, "LegacyDamageAction", construct_action::<LegacyDamageAction>)
            .deprecated(),
        ActionClass::new(EXPERIMENTAL_NAMESPACE, "ShrinkAction", construct_action::<ShrinkAction>),
    ]
}

pub fn registry() -> ActionRegistry {
    ActionRegistry::new().with(action_classes())
}

/// Plan covering the built-in layers with `ActionSpell` as the container.
pub fn plan(namespace: impl Into<String>, only: Option<BTreeSet<String>>) -> InterrogationPlan {
    InterrogationPlan {
        namespace: namespace.into(),
        container: construct_template::<ActionSpell>,
        base_layers: base_layers(),
        only,
    }
}
