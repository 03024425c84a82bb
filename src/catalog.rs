//! Catalog assembly and output.
//!
//! [`MetaCatalog::assemble`] finalizes the type store, re-types every emitted
//! parameter with its resolved type, and packages the registries into the
//! six-field document. Output is checked against the bundled
//! `schema/meta_catalog.schema.json` before anything is written.

use crate::interrogate::CatalogBuilder;
use crate::model::{Category, Parameter, SpellActionDescription};
use crate::types::{ParameterTypeStore, TypeDescription, TypeKey};
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// JSON Schema every emitted catalog must satisfy.
pub const CATALOG_SCHEMA: &str = include_str!("../schema/meta_catalog.schema.json");

#[derive(Debug, Clone, Serialize)]
/// The emitted document. Every collection is ordered so output is stable.
pub struct MetaCatalog {
    pub actions: BTreeMap<String, SpellActionDescription>,
    pub categories: BTreeMap<String, Category>,
    pub spell_parameters: BTreeSet<String>,
    pub spell_properties: BTreeSet<String>,
    pub parameters: BTreeMap<String, Parameter>,
    pub types: BTreeMap<TypeKey, TypeDescription>,
}

impl MetaCatalog {
    pub fn assemble(mut builder: CatalogBuilder) -> Self {
        let types = builder.type_store.update().clone();
        let store = &builder.type_store;
        retype(builder.parameters.values_mut(), store);
        for action in builder.actions.values_mut() {
            retype(action.parameters.values_mut(), store);
        }

        Self {
            actions: builder.actions,
            categories: builder.categories,
            spell_parameters: builder.spell_parameters,
            spell_properties: builder.spell_properties,
            parameters: builder.parameters,
            types,
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).context("serializing catalog")
    }

    /// Validate against [`CATALOG_SCHEMA`], reporting every violation.
    pub fn validate(&self) -> Result<()> {
        let value = self.to_value()?;
        let schema = compiled_schema()?;
        if let Err(errors) = schema.validate(&value) {
            let details = errors
                .map(|err| format!("{}: {err}", err.instance_path))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("catalog failed schema validation:\n{details}");
        }
        Ok(())
    }

    /// Validated, pretty-printed JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String> {
        self.validate()?;
        let mut rendered = serde_json::to_string_pretty(self).context("rendering catalog")?;
        rendered.push('\n');
        Ok(rendered)
    }

    /// Write the catalog, replacing `path` atomically.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let rendered = self.to_pretty_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temporary file in {}", dir.display()))?;
        file.write_all(rendered.as_bytes())
            .with_context(|| format!("writing catalog for {}", path.display()))?;
        file.persist(path)
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

fn retype<'p>(parameters: impl Iterator<Item = &'p mut Parameter>, store: &ParameterTypeStore) {
    for parameter in parameters {
        if let Some(resolved) = store.resolved(&parameter.key) {
            parameter.parameter_type = resolved.clone();
        }
    }
}

fn compiled_schema() -> Result<JSONSchema> {
    let schema: Value =
        serde_json::from_str(CATALOG_SCHEMA).context("parsing bundled catalog schema")?;
    JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling bundled catalog schema: {err}"))
}
