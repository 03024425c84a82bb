//! Recording stand-in for a real configuration.
//!
//! [`InterrogatingConfiguration`] answers every read with the caller's default
//! and remembers what was asked: the key, the accessor's type, and the default.
//! Nested sections are recorders too; they share the parent's log and prefix
//! their keys with `<section>.` so nested reads are captured as well.

use crate::configuration::{ConfigurationSection, EnumType, ValueKind};
use crate::model::Parameter;
use crate::types::TypeObservation;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Default, Clone)]
/// Everything one recorder (and its nested sections) observed.
pub struct Recording {
    /// One parameter per key; a key read twice keeps the last read.
    pub parameters: BTreeMap<String, Parameter>,
    /// Every accessor call in order, including repeated keys.
    pub observations: Vec<TypeObservation>,
}

#[derive(Debug, Default, Clone)]
pub struct InterrogatingConfiguration {
    prefix: String,
    log: Rc<RefCell<Recording>>,
}

impl InterrogatingConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of what has been recorded so far.
    pub fn recording(&self) -> Recording {
        self.log.borrow().clone()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.log.borrow().parameters.values().cloned().collect()
    }

    /// Prefixed key, or `None` for a blank key, which cannot be cataloged.
    fn full_key(&self, key: &str) -> Option<String> {
        if key.trim().is_empty() {
            warn!(prefix = %self.prefix, "ignoring configuration read with a blank key");
            return None;
        }
        Some(format!("{}{key}", self.prefix))
    }

    fn record(&self, observation: TypeObservation, default_value: Option<Value>) {
        debug!(
            key = %observation.key,
            type_key = %observation.type_key,
            "recorded configuration read"
        );
        let parameter = Parameter::new(
            observation.key.clone(),
            observation.parameter_type(),
            default_value,
        );
        let mut log = self.log.borrow_mut();
        log.parameters.insert(parameter.key.clone(), parameter);
        log.observations.push(observation);
    }

    fn record_kind(&self, key: &str, kind: ValueKind, default_value: Option<Value>) {
        if let Some(full_key) = self.full_key(key) {
            self.record(TypeObservation::new(full_key, kind), default_value);
        }
    }
}

impl ConfigurationSection for InterrogatingConfiguration {
    fn get_string(&self, key: &str, default: Option<&str>) -> Option<String> {
        self.record_kind(key, ValueKind::String, default.map(Value::from));
        default.map(str::to_string)
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.record_kind(key, ValueKind::Integer, Some(Value::from(default)));
        default
    }

    fn get_double(&self, key: &str, default: f64) -> f64 {
        self.record_kind(key, ValueKind::Double, Some(Value::from(default)));
        default
    }

    fn get_boolean(&self, key: &str, default: bool) -> bool {
        self.record_kind(key, ValueKind::Boolean, Some(Value::from(default)));
        default
    }

    fn get_enum(&self, key: &str, kind: &EnumType, default: Option<&str>) -> Option<String> {
        if let Some(full_key) = self.full_key(key) {
            self.record(
                TypeObservation::enumeration(full_key, kind),
                default.map(Value::from),
            );
        }
        default.map(str::to_string)
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        self.record_kind(key, ValueKind::StringList, None);
        Vec::new()
    }

    fn get_list(&self, key: &str) -> Vec<Value> {
        self.record_kind(key, ValueKind::List, None);
        Vec::new()
    }

    fn get_section(&self, key: &str) -> Box<dyn ConfigurationSection> {
        let Some(full_key) = self.full_key(key) else {
            return Box::new(self.clone());
        };
        self.record(TypeObservation::new(full_key.clone(), ValueKind::Section), None);
        Box::new(InterrogatingConfiguration {
            prefix: format!("{full_key}."),
            log: Rc::clone(&self.log),
        })
    }

    fn contains(&self, _key: &str) -> bool {
        false
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}
