//! Accumulated registries for one catalog run.
//!
//! The interrogator threads a single [`CatalogBuilder`] through every scan.
//! Nothing else mutates it, and per-action results are committed only after
//! the action's lifecycle completed, so a failing class never leaves partial
//! state behind.

use crate::interrogate::recording::Recording;
use crate::model::{Category, Parameter, SpellActionDescription};
use crate::spell::ActionClass;
use crate::types::{ParameterTypeStore, TypeObservation};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    pub(crate) spell_parameters: BTreeSet<String>,
    pub(crate) spell_properties: BTreeSet<String>,
    pub(crate) parameters: BTreeMap<String, Parameter>,
    pub(crate) categories: BTreeMap<String, Category>,
    pub(crate) actions: BTreeMap<String, SpellActionDescription>,
    pub(crate) type_store: ParameterTypeStore,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category for `key`, created on first use.
    pub fn category(&mut self, key: &str) -> Category {
        self.categories
            .entry(key.to_string())
            .or_insert_with(|| Category::new(key))
            .clone()
    }

    pub fn spell_parameters(&self) -> &BTreeSet<String> {
        &self.spell_parameters
    }

    pub fn spell_properties(&self) -> &BTreeSet<String> {
        &self.spell_properties
    }

    pub fn parameters(&self) -> &BTreeMap<String, Parameter> {
        &self.parameters
    }

    pub fn categories(&self) -> &BTreeMap<String, Category> {
        &self.categories
    }

    pub fn actions(&self) -> &BTreeMap<String, SpellActionDescription> {
        &self.actions
    }

    pub fn type_store(&self) -> &ParameterTypeStore {
        &self.type_store
    }

    /// Feed accessor observations to the type store.
    pub fn observe_all(&mut self, observations: impl IntoIterator<Item = TypeObservation>) {
        for observation in observations {
            if let Err(err) = self.type_store.observe(observation) {
                warn!("{err}");
            }
        }
    }

    pub fn add_spell_property(&mut self, property: Parameter) {
        self.spell_properties.insert(property.key.clone());
        self.put_parameter(property);
    }

    pub fn add_spell_parameter(&mut self, parameter: Parameter) {
        self.spell_parameters.insert(parameter.key.clone());
        self.put_parameter(parameter);
    }

    /// Insert into the merged parameter view; the later observation wins.
    pub fn put_parameter(&mut self, parameter: Parameter) {
        if let Some(previous) = self.parameters.get(&parameter.key) {
            if previous.parameter_type != parameter.parameter_type {
                warn!(
                    key = %parameter.key,
                    previous = %previous.parameter_type,
                    replacement = %parameter.parameter_type,
                    "parameter re-observed with a different type; keeping the later observation"
                );
            } else if previous.default_value != parameter.default_value {
                debug!(
                    key = %parameter.key,
                    previous = ?previous.default_value,
                    replacement = ?parameter.default_value,
                    "parameter re-observed with a different default; keeping the later observation"
                );
            }
        }
        self.parameters.insert(parameter.key.clone(), parameter);
    }

    /// Fold one successful action interrogation into the registries.
    pub fn commit_action(&mut self, class: &ActionClass, recording: Recording) {
        self.observe_all(recording.observations);
        for parameter in recording.parameters.values() {
            self.put_parameter(parameter.clone());
        }

        let description = SpellActionDescription::new(
            class.key(),
            class.identity(),
            recording.parameters.into_values(),
        );
        if let Some(previous) = self.actions.insert(description.key.clone(), description) {
            warn!(
                key = %previous.key,
                replaced = %previous.class_name,
                "two action classes share a catalog key; keeping the later one"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ValueKind;
    use crate::types::ParameterType;
    use serde_json::json;

    #[test]
    fn categories_are_memoized() {
        let mut builder = CatalogBuilder::new();
        let first = builder.category("base");
        let second = builder.category("base");
        builder.category("undo");
        assert_eq!(first, second);
        assert_eq!(builder.categories().len(), 2);
    }

    #[test]
    fn later_parameter_replaces_earlier() {
        let mut builder = CatalogBuilder::new();
        let base = builder.category("base");
        builder.add_spell_property(
            Parameter::new("range", ParameterType::of_kind(ValueKind::Integer), Some(json!(10)))
                .with_category(&base),
        );
        builder.put_parameter(Parameter::new(
            "range",
            ParameterType::of_kind(ValueKind::Double),
            Some(json!(12.5)),
        ));

        let range = &builder.parameters()["range"];
        assert_eq!(range.default_value, Some(json!(12.5)));
        assert_eq!(range.category, None);
        assert!(builder.spell_properties().contains("range"));
    }
}
