//! Shared library for the magic-meta catalog generator.
//!
//! The crate interrogates spell base layers and spell actions by running their
//! real configuration-reading code against a recording configuration
//! ([`InterrogatingConfiguration`]), then folds what was read into a
//! [`MetaCatalog`]: every parameter key, its inferred type, its default, and
//! the category it belongs to. The `magic-meta` binary writes that catalog as
//! JSON for editor tooling.

use anyhow::Result;
use std::collections::BTreeSet;

pub mod builtin;
pub mod catalog;
pub mod configuration;
pub mod discovery;
pub mod interrogate;
pub mod model;
pub mod runtime;
pub mod spell;
pub mod types;

pub use catalog::{CATALOG_SCHEMA, MetaCatalog};
pub use configuration::{ConfigurationSection, EnumType, ValueConfiguration, ValueKind};
pub use discovery::{ActionDiscovery, ActionRegistry};
pub use interrogate::{
    CatalogBuilder, InterrogatingConfiguration, InterrogationError, InterrogationPlan,
    InterrogationReport, Interrogator, STRUCTURAL_PROPERTY_KEYS,
};
pub use model::{Category, Parameter, SpellActionDescription};
pub use spell::{ActionClass, BaseLayer, SpellAction, SpellTemplate};
pub use types::{ParameterType, ParameterTypeStore, TypeDescription, TypeKey};

/// Interrogate everything `plan` names and assemble the finalized catalog.
pub fn generate_catalog(
    discovery: &dyn ActionDiscovery,
    plan: InterrogationPlan,
) -> Result<(MetaCatalog, InterrogationReport)> {
    let (builder, report) = Interrogator::new(discovery, plan).run()?;
    Ok((MetaCatalog::assemble(builder), report))
}

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse an action selection list; a blank list selects nothing in particular.
pub fn parse_action_selection(value: &str) -> Option<BTreeSet<String>> {
    let keys: BTreeSet<String> = split_list(value).into_iter().collect();
    if keys.is_empty() { None } else { Some(keys) }
}
