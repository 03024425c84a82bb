//! Interrogation pass: run real spell and action lifecycle code against
//! recording configurations and fold what it reads into a [`CatalogBuilder`].
//!
//! The pass is strictly sequential:
//! 1. warm up the action container by loading its template once;
//! 2. scan every base layer (template defaults become `spell_properties`,
//!    declared parameters become `spell_parameters`);
//! 3. scan each discovered action that survives filtering.
//!
//! Base layers are required, so their failures abort the run. Action failures
//! (including panics) are logged, reported, and skipped.

pub mod builder;
pub mod recording;

pub use builder::CatalogBuilder;
pub use recording::{InterrogatingConfiguration, Recording};

use crate::discovery::ActionDiscovery;
use crate::model::Parameter;
use crate::runtime::{CastContext, Controller, Mage};
use crate::spell::{ActionClass, BaseLayer, SpellTemplate, TemplateConstructor};
use anyhow::{Context, Result, bail};
use std::any::Any;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Template keys that describe spell structure rather than settable values.
pub const STRUCTURAL_PROPERTY_KEYS: &[&str] = &["parameters", "costs", "actions", "active_costs"];

const TEMPLATE_KEY: &str = "interrogator";

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
}

static PANIC_HOOK: Once = Once::new();

/// What to interrogate.
pub struct InterrogationPlan {
    /// Only classes declared directly in this namespace are scanned.
    pub namespace: String,
    /// Action container: warmed up first, then handed to every action.
    pub container: TemplateConstructor,
    /// Ordered base layers; earlier layers claim shared keys first.
    pub base_layers: Vec<BaseLayer>,
    /// Restrict the scan to these action keys.
    pub only: Option<BTreeSet<String>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Construct,
    Initialize,
    Prepare,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Construct => "construct",
            Phase::Initialize => "initialize",
            Phase::Prepare => "prepare",
        })
    }
}

/// Why one action class contributed nothing to the catalog.
#[derive(Debug, Error)]
pub enum InterrogationError {
    #[error("{class}: {phase} failed: {error:#}")]
    Failed {
        class: String,
        phase: Phase,
        error: anyhow::Error,
    },
    #[error("{class}: {phase} panicked: {message}")]
    Panicked {
        class: String,
        phase: Phase,
        message: String,
    },
}

impl InterrogationError {
    pub fn class(&self) -> &str {
        match self {
            InterrogationError::Failed { class, .. } | InterrogationError::Panicked { class, .. } => {
                class
            }
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            InterrogationError::Failed { phase, .. } | InterrogationError::Panicked { phase, .. } => {
                *phase
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    OutsideNamespace,
    Deprecated,
    NotSelected,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::OutsideNamespace => "outside the action namespace",
            SkipReason::Deprecated => "deprecated",
            SkipReason::NotSelected => "not selected",
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedClass {
    pub class: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
/// Per-class outcome of an interrogation pass.
pub struct InterrogationReport {
    pub scanned: Vec<String>,
    pub skipped: Vec<SkippedClass>,
    pub failed: Vec<InterrogationError>,
}

impl InterrogationReport {
    pub fn summary(&self) -> String {
        format!(
            "{} action(s) scanned, {} skipped, {} failed",
            self.scanned.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

pub struct Interrogator<'a> {
    discovery: &'a dyn ActionDiscovery,
    plan: InterrogationPlan,
    controller: Controller,
    mage: Mage,
}

impl<'a> Interrogator<'a> {
    pub fn new(discovery: &'a dyn ActionDiscovery, mut plan: InterrogationPlan) -> Self {
        plan.namespace = plan.namespace.trim().to_string();
        let controller = Controller::default();
        let mage = Mage::interrogator(&controller);
        Self {
            discovery,
            plan,
            controller,
            mage,
        }
    }

    /// Run the full pass and hand back the populated registries.
    pub fn run(&self) -> Result<(CatalogBuilder, InterrogationReport)> {
        let mut builder = CatalogBuilder::new();
        let mut report = InterrogationReport::default();

        let container = self.warm_up(&mut builder)?;
        self.collect_base_properties(&mut builder)?;

        let mut classes = self
            .discovery
            .discover(&self.plan.namespace)
            .with_context(|| format!("discovering actions in '{}'", self.plan.namespace))?;
        classes.sort_by_key(ActionClass::identity);
        self.check_selection(&classes)?;

        let context = CastContext::new(&self.mage, container.as_ref());
        for class in &classes {
            let identity = class.identity();
            if let Some(reason) = self.skip_reason(class) {
                info!("Skipping {identity} ({reason})");
                report.skipped.push(SkippedClass {
                    class: identity,
                    reason,
                });
                continue;
            }

            info!("Scanning {identity}");
            match interrogate_action(class, container.as_ref(), &context) {
                Ok(recording) => {
                    builder.commit_action(class, recording);
                    report.scanned.push(identity);
                }
                Err(err) => {
                    warn!("{err}");
                    report.failed.push(err);
                }
            }
        }

        Ok((builder, report))
    }

    /// Load the container's template once so shared state is initialized
    /// before any action sees it.
    fn warm_up(&self, builder: &mut CatalogBuilder) -> Result<Box<dyn SpellTemplate>> {
        let template = InterrogatingConfiguration::new();
        let mut container = (self.plan.container)();
        container.initialize(&self.controller);
        container.set_mage(&self.mage);
        container
            .load_template(TEMPLATE_KEY, &template)
            .context("loading action container template")?;
        builder.observe_all(template.recording().observations);
        Ok(container)
    }

    fn collect_base_properties(&self, builder: &mut CatalogBuilder) -> Result<()> {
        let mut properties: BTreeMap<String, Parameter> = BTreeMap::new();
        let mut parameters: BTreeMap<String, Parameter> = BTreeMap::new();

        for layer in &self.plan.base_layers {
            self.add_spell_parameters(builder, layer, &mut parameters, &mut properties)
                .with_context(|| format!("interrogating base layer '{}'", layer.category))?;
        }

        for (key, property) in properties {
            if STRUCTURAL_PROPERTY_KEYS.contains(&key.as_str()) {
                continue;
            }
            builder.add_spell_property(property);
        }
        for parameter in parameters.into_values() {
            builder.add_spell_parameter(parameter);
        }
        Ok(())
    }

    /// Scan one base layer. A key already claimed by an earlier layer keeps
    /// that layer's category.
    fn add_spell_parameters(
        &self,
        builder: &mut CatalogBuilder,
        layer: &BaseLayer,
        parameters: &mut BTreeMap<String, Parameter>,
        properties: &mut BTreeMap<String, Parameter>,
    ) -> Result<()> {
        let category = builder.category(layer.category);
        let mut spell = (layer.construct)();
        spell.initialize(&self.controller);
        spell.set_mage(&self.mage);

        let template = InterrogatingConfiguration::new();
        spell.load_template(TEMPLATE_KEY, &template)?;
        let recording = template.recording();
        builder.observe_all(recording.observations);
        for (key, property) in recording.parameters {
            properties
                .entry(key)
                .or_insert_with(|| property.with_category(&category));
        }

        let declared = InterrogatingConfiguration::new();
        spell.process_parameters(&declared)?;
        let recording = declared.recording();
        builder.observe_all(recording.observations);
        for (key, parameter) in recording.parameters {
            parameters
                .entry(key)
                .or_insert_with(|| parameter.with_category(&category));
        }
        Ok(())
    }

    fn skip_reason(&self, class: &ActionClass) -> Option<SkipReason> {
        if class.namespace != self.plan.namespace {
            return Some(SkipReason::OutsideNamespace);
        }
        if class.deprecated {
            return Some(SkipReason::Deprecated);
        }
        match &self.plan.only {
            Some(only) if !only.contains(&class.key()) => Some(SkipReason::NotSelected),
            _ => None,
        }
    }

    fn check_selection(&self, classes: &[ActionClass]) -> Result<()> {
        let Some(only) = &self.plan.only else {
            return Ok(());
        };
        let known: BTreeSet<String> = classes
            .iter()
            .filter(|class| class.namespace == self.plan.namespace)
            .map(ActionClass::key)
            .collect();
        let unknown: Vec<&str> = only
            .iter()
            .filter(|key| !known.contains(*key))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            bail!(
                "Unknown action(s) requested in '{}': {}",
                self.plan.namespace,
                unknown.join(", ")
            );
        }
        Ok(())
    }
}

/// Construct, initialize, and prepare one action against a private recorder.
fn interrogate_action(
    class: &ActionClass,
    spell: &dyn SpellTemplate,
    context: &CastContext<'_>,
) -> Result<Recording, InterrogationError> {
    let identity = class.identity();
    let mut action = guarded(&identity, Phase::Construct, || (class.construct)())?;
    let configuration = InterrogatingConfiguration::new();
    guarded(&identity, Phase::Initialize, || {
        action.initialize(spell, &configuration)
    })?;
    guarded(&identity, Phase::Prepare, || {
        action.prepare(context, &configuration)
    })?;
    Ok(configuration.recording())
}

fn guarded<T>(
    class: &str,
    phase: Phase,
    step: impl FnOnce() -> Result<T>,
) -> Result<T, InterrogationError> {
    install_panic_hook();
    GUARDED.with(|guarded| guarded.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(step));
    GUARDED.with(|guarded| guarded.set(false));
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(InterrogationError::Failed {
            class: class.to_string(),
            phase,
            error,
        }),
        Err(payload) => Err(InterrogationError::Panicked {
            class: class.to_string(),
            phase,
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Panics raised inside [`guarded`] go to tracing at debug level; the caller
/// reports them as [`InterrogationError::Panicked`]. Every other panic still
/// reaches the previously installed hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARDED.with(Cell::get) {
                debug!("lifecycle code panicked: {info}");
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}
