//! Parameter type registry.
//!
//! Every accessor call observed during interrogation lands here as a
//! key → type observation. Observations accumulate freely until
//! [`ParameterTypeStore::update`] resolves conflicts and freezes the listing
//! emitted under `types`. Conflicting observations are widened when the types
//! share an obvious supertype (numbers, strings, lists) and kept as a union
//! otherwise, so no observation is ever silently dropped.

use crate::configuration::{EnumType, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Identifier of an emitted type: an accessor kind or an enumeration name.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(pub String);

impl TypeKey {
    pub fn of_kind(kind: ValueKind) -> Self {
        TypeKey(kind.as_str().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved type of a parameter.
///
/// Serializes as a single type key, or as an array of keys for a union.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterType {
    Single(TypeKey),
    Union(BTreeSet<TypeKey>),
}

impl ParameterType {
    pub fn of_kind(kind: ValueKind) -> Self {
        ParameterType::Single(TypeKey::of_kind(kind))
    }

    pub fn keys(&self) -> Vec<&TypeKey> {
        match self {
            ParameterType::Single(key) => vec![key],
            ParameterType::Union(keys) => keys.iter().collect(),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterType::Single(key) => write!(f, "{key}"),
            ParameterType::Union(keys) => {
                let joined = keys.iter().map(TypeKey::as_str).collect::<Vec<_>>();
                write!(f, "{}", joined.join("|"))
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
/// Entry in the emitted `types` listing.
pub struct TypeDescription {
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub options: BTreeSet<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// One accessor call: which key was read and through which type.
pub struct TypeObservation {
    pub key: String,
    pub type_key: TypeKey,
    pub kind: ValueKind,
    pub options: BTreeSet<String>,
}

impl TypeObservation {
    pub fn new(key: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            key: key.into(),
            type_key: TypeKey::of_kind(kind),
            kind,
            options: BTreeSet::new(),
        }
    }

    pub fn enumeration(key: impl Into<String>, kind: &EnumType) -> Self {
        Self {
            key: key.into(),
            type_key: TypeKey(kind.name.to_string()),
            kind: ValueKind::Enumeration,
            options: kind.options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn parameter_type(&self) -> ParameterType {
        ParameterType::Single(self.type_key.clone())
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TypeStoreError {
    #[error("type store is finalized; dropped observation of '{key}' as {type_key}")]
    Finalized { key: String, type_key: TypeKey },
}

#[derive(Debug, Default)]
/// Process-wide key → type registry for one catalog run.
pub struct ParameterTypeStore {
    observations: BTreeMap<String, BTreeSet<TypeKey>>,
    known: BTreeMap<TypeKey, TypeDescription>,
    finalized: Option<Finalized>,
}

#[derive(Debug, Clone, Default)]
struct Finalized {
    resolved: BTreeMap<String, ParameterType>,
    types: BTreeMap<TypeKey, TypeDescription>,
}

impl ParameterTypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one observation. Rejected once the store is finalized.
    pub fn observe(&mut self, observation: TypeObservation) -> Result<(), TypeStoreError> {
        if self.finalized.is_some() {
            return Err(TypeStoreError::Finalized {
                key: observation.key,
                type_key: observation.type_key,
            });
        }

        let description = self
            .known
            .entry(observation.type_key.clone())
            .or_insert_with(|| TypeDescription {
                kind: observation.kind,
                options: BTreeSet::new(),
            });
        description.options.extend(observation.options);

        self.observations
            .entry(observation.key)
            .or_default()
            .insert(observation.type_key);
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    /// Resolve every key and freeze the type listing.
    ///
    /// Only the first call does work; later calls return the frozen listing.
    pub fn update(&mut self) -> &BTreeMap<TypeKey, TypeDescription> {
        let finalized = self.finalized.get_or_insert_with(|| {
            let mut resolved = BTreeMap::new();
            let mut types = BTreeMap::new();
            for (key, observed) in &self.observations {
                let parameter_type = resolve(observed, &self.known);
                for type_key in parameter_type.keys() {
                    if let Some(description) = self.known.get(type_key) {
                        types.insert(type_key.clone(), description.clone());
                    } else if let Some(kind) = kind_for_key(type_key) {
                        types.insert(
                            type_key.clone(),
                            TypeDescription {
                                kind,
                                options: BTreeSet::new(),
                            },
                        );
                    }
                }
                resolved.insert(key.clone(), parameter_type);
            }
            Finalized { resolved, types }
        });
        &finalized.types
    }

    /// The resolved type for `key`; `None` before `update()` or for unseen keys.
    pub fn resolved(&self, key: &str) -> Option<&ParameterType> {
        self.finalized.as_ref()?.resolved.get(key)
    }

    /// The frozen type listing; empty before `update()`.
    pub fn types(&self) -> BTreeMap<TypeKey, TypeDescription> {
        self.finalized
            .as_ref()
            .map(|finalized| finalized.types.clone())
            .unwrap_or_default()
    }

    /// Raw observed type keys for `key`, before resolution.
    pub fn observed(&self, key: &str) -> Option<&BTreeSet<TypeKey>> {
        self.observations.get(key)
    }
}

fn resolve(
    observed: &BTreeSet<TypeKey>,
    known: &BTreeMap<TypeKey, TypeDescription>,
) -> ParameterType {
    if observed.len() == 1 {
        if let Some(only) = observed.iter().next() {
            return ParameterType::Single(only.clone());
        }
    }

    let kinds: Vec<ValueKind> = observed
        .iter()
        .filter_map(|key| known.get(key).map(|d| d.kind).or_else(|| kind_for_key(key)))
        .collect();
    if kinds.len() == observed.len() && !kinds.is_empty() {
        if kinds.iter().all(ValueKind::is_numeric) {
            return ParameterType::of_kind(ValueKind::Double);
        }
        if kinds.iter().all(ValueKind::is_textual) {
            return ParameterType::of_kind(ValueKind::String);
        }
        if kinds.iter().all(ValueKind::is_list) {
            return ParameterType::of_kind(ValueKind::List);
        }
    }

    ParameterType::Union(observed.clone())
}

fn kind_for_key(key: &TypeKey) -> Option<ValueKind> {
    let kind = match key.as_str() {
        "boolean" => ValueKind::Boolean,
        "integer" => ValueKind::Integer,
        "double" => ValueKind::Double,
        "string" => ValueKind::String,
        "string_list" => ValueKind::StringList,
        "list" => ValueKind::List,
        "section" => ValueKind::Section,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TARGET: EnumType = EnumType::new("target_type", &["self", "other"]);

    fn store_with(observations: Vec<TypeObservation>) -> ParameterTypeStore {
        let mut store = ParameterTypeStore::new();
        for observation in observations {
            store.observe(observation).unwrap();
        }
        store
    }

    #[test]
    fn single_observation_resolves_to_itself() {
        let mut store = store_with(vec![TypeObservation::new("range", ValueKind::Integer)]);
        store.update();
        assert_eq!(
            store.resolved("range"),
            Some(&ParameterType::of_kind(ValueKind::Integer))
        );
    }

    #[test]
    fn numeric_conflict_widens_to_double() {
        let mut store = store_with(vec![
            TypeObservation::new("range", ValueKind::Integer),
            TypeObservation::new("range", ValueKind::Double),
        ]);
        let types = store.update().clone();
        assert_eq!(
            store.resolved("range"),
            Some(&ParameterType::of_kind(ValueKind::Double))
        );
        assert!(types.contains_key(&TypeKey::of_kind(ValueKind::Double)));
        assert!(!types.contains_key(&TypeKey::of_kind(ValueKind::Integer)));
    }

    #[test]
    fn enumeration_and_string_widen_to_string() {
        let mut store = store_with(vec![
            TypeObservation::enumeration("target", &TARGET),
            TypeObservation::new("target", ValueKind::String),
        ]);
        store.update();
        assert_eq!(
            store.resolved("target"),
            Some(&ParameterType::of_kind(ValueKind::String))
        );
    }

    #[test]
    fn unrelated_conflict_is_kept_as_union() {
        let mut store = store_with(vec![
            TypeObservation::new("undo", ValueKind::Boolean),
            TypeObservation::new("undo", ValueKind::Integer),
        ]);
        store.update();
        let resolved = store.resolved("undo").unwrap().clone();
        assert_eq!(resolved.to_string(), "boolean|integer");
        assert_eq!(
            serde_json::to_value(&resolved).unwrap(),
            json!(["boolean", "integer"])
        );
    }

    #[test]
    fn enumeration_options_are_listed() {
        let mut store = store_with(vec![TypeObservation::enumeration("target", &TARGET)]);
        let types = store.update();
        let description = types.get(&TypeKey("target_type".into())).unwrap();
        assert_eq!(description.kind, ValueKind::Enumeration);
        assert_eq!(
            description.options.iter().cloned().collect::<Vec<_>>(),
            vec!["other", "self"]
        );
    }

    #[test]
    fn update_is_idempotent_and_freezes() {
        let mut store = store_with(vec![
            TypeObservation::new("a", ValueKind::Boolean),
            TypeObservation::new("b", ValueKind::List),
        ]);
        let first = store.update().clone();
        let second = store.update().clone();
        assert_eq!(first, second);

        let err = store
            .observe(TypeObservation::new("c", ValueKind::String))
            .expect_err("finalized store must reject observations");
        assert!(err.to_string().contains("'c'"));
        assert_eq!(store.update(), &first);
        assert!(store.resolved("c").is_none());
    }
}
