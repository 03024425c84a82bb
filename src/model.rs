//! Value records emitted in the catalog.

use crate::types::ParameterType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One configuration key discovered during interrogation.
///
/// Identity for deduplication is the key alone; registries keyed by `key`
/// decide which observation survives.
pub struct Parameter {
    pub key: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(rename = "default")]
    pub default_value: Option<Value>,
    /// Name of the owning [`Category`]; a relation, not ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Parameter {
    pub fn new(key: impl Into<String>, parameter_type: ParameterType, default_value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            parameter_type,
            default_value,
            category: None,
        }
    }

    pub fn with_category(mut self, category: &Category) -> Self {
        self.category = Some(category.key.clone());
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
/// Grouping label for one layer of the base spell hierarchy.
pub struct Category {
    pub key: String,
}

impl Category {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One interrogated action implementation and the keys it reads.
pub struct SpellActionDescription {
    pub key: String,
    pub class_name: String,
    pub parameters: BTreeMap<String, Parameter>,
}

impl SpellActionDescription {
    pub fn new(
        key: impl Into<String>,
        class_name: impl Into<String>,
        parameters: impl IntoIterator<Item = Parameter>,
    ) -> Self {
        Self {
            key: key.into(),
            class_name: class_name.into(),
            parameters: parameters
                .into_iter()
                .map(|parameter| (parameter.key.clone(), parameter))
                .collect(),
        }
    }
}
