//! Blueprint hooks and their override chain.
//!
//! A blueprint is a stack of [`BlueprintHooks`] layers, most specific
//! first. Every hook receives a [`Chain`] positioned after its own layer;
//! calling the same method on it runs the next layer, and once the layers
//! run out the built-in behavior answers.

use log::debug;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::blueprint::Blueprint;
use crate::constants::FILES_DIR;
use crate::error::{Error, Result};
use crate::file_map::{try_token, FileMapTokens};
use crate::locals::Locals;
use crate::manifest::Manifest;
use crate::options::InstallOptions;
use crate::processor::Session;
use crate::renderer::TemplateRenderer;

/// Overridable blueprint behavior.
///
/// Every method defaults to delegating to `next`, so an implementation
/// only overrides what it changes.
pub trait BlueprintHooks {
    /// Validates and rewrites the entity name before anything else runs.
    fn normalize_entity_name(&self, name: Option<&str>, next: Chain<'_>) -> Result<String> {
        next.normalize_entity_name(name)
    }

    /// Extra template variables.
    fn locals(&self, options: &InstallOptions, next: Chain<'_>) -> Result<Locals> {
        next.locals(options)
    }

    /// Custom path tokens, layered over the standard ones.
    fn file_map_tokens(&self, next: Chain<'_>) -> Result<FileMapTokens> {
        next.file_map_tokens()
    }

    /// Directory holding the blueprint's template tree.
    fn files_path(&self, options: &InstallOptions, next: Chain<'_>) -> Result<PathBuf> {
        next.files_path(options)
    }

    fn before_install(&self, session: &mut Session<'_>, next: Chain<'_>) -> Result<()> {
        next.before_install(session)
    }

    fn after_install(&self, session: &mut Session<'_>, next: Chain<'_>) -> Result<()> {
        next.after_install(session)
    }

    fn before_uninstall(&self, session: &mut Session<'_>, next: Chain<'_>) -> Result<()> {
        next.before_uninstall(session)
    }

    fn after_uninstall(&self, session: &mut Session<'_>, next: Chain<'_>) -> Result<()> {
        next.after_uninstall(session)
    }
}

/// Built-in answers used once every layer has delegated.
pub mod defaults {
    use super::*;

    /// Rejects a missing entity name or one ending in a path separator.
    pub fn normalize_entity_name(name: Option<&str>) -> Result<String> {
        let name = name.filter(|name| !name.is_empty()).ok_or_else(|| {
            Error::ValidationError(
                "The `generate <entity-name>` command requires an entity name to be specified. \
                 For more details, use `help`."
                    .to_string(),
            )
        })?;

        if let Some(trimmed) = name.strip_suffix('/').or_else(|| name.strip_suffix('\\')) {
            return Err(Error::ValidationError(format!(
                "You specified \"{name}\", but you can't use a trailing slash as an entity name \
                 with generators. Please re-run the command with \"{trimmed}\"."
            )));
        }

        Ok(name.to_string())
    }

    pub fn files_path(blueprint: &Blueprint) -> PathBuf {
        blueprint.path().join(FILES_DIR)
    }
}

/// The remaining hook layers of one blueprint.
///
/// Consumed by every call, so a layer can hand over to the next one at
/// most once per invocation.
pub struct Chain<'a> {
    blueprint: &'a Blueprint,
    layers: &'a [Arc<dyn BlueprintHooks>],
}

impl<'a> Chain<'a> {
    pub fn new(blueprint: &'a Blueprint, layers: &'a [Arc<dyn BlueprintHooks>]) -> Self {
        Self { blueprint, layers }
    }

    /// The blueprint the hooks are running for.
    pub fn blueprint(&self) -> &'a Blueprint {
        self.blueprint
    }

    fn split(self) -> Option<(&'a Arc<dyn BlueprintHooks>, Chain<'a>)> {
        self.layers
            .split_first()
            .map(|(layer, rest)| (layer, Chain::new(self.blueprint, rest)))
    }

    pub fn normalize_entity_name(self, name: Option<&str>) -> Result<String> {
        match self.split() {
            Some((layer, next)) => layer.normalize_entity_name(name, next),
            None => defaults::normalize_entity_name(name),
        }
    }

    pub fn locals(self, options: &InstallOptions) -> Result<Locals> {
        match self.split() {
            Some((layer, next)) => layer.locals(options, next),
            None => Ok(Locals::new()),
        }
    }

    pub fn file_map_tokens(self) -> Result<FileMapTokens> {
        match self.split() {
            Some((layer, next)) => layer.file_map_tokens(next),
            None => Ok(FileMapTokens::new()),
        }
    }

    pub fn files_path(self, options: &InstallOptions) -> Result<PathBuf> {
        let blueprint = self.blueprint;
        match self.split() {
            Some((layer, next)) => layer.files_path(options, next),
            None => Ok(defaults::files_path(blueprint)),
        }
    }

    pub fn before_install(self, session: &mut Session<'_>) -> Result<()> {
        match self.split() {
            Some((layer, next)) => layer.before_install(session, next),
            None => Ok(()),
        }
    }

    pub fn after_install(self, session: &mut Session<'_>) -> Result<()> {
        match self.split() {
            Some((layer, next)) => layer.after_install(session, next),
            None => Ok(()),
        }
    }

    pub fn before_uninstall(self, session: &mut Session<'_>) -> Result<()> {
        match self.split() {
            Some((layer, next)) => layer.before_uninstall(session, next),
            None => Ok(()),
        }
    }

    pub fn after_uninstall(self, session: &mut Session<'_>) -> Result<()> {
        match self.split() {
            Some((layer, next)) => layer.after_uninstall(session, next),
            None => Ok(()),
        }
    }
}

/// Hooks declared as data in a blueprint's index file.
///
/// `locals` values are templates over the invocation options;
/// `fileMapTokens` values are templates over the file map variables.
pub struct ManifestHooks {
    locals: indexmap::IndexMap<String, Value>,
    file_map_tokens: indexmap::IndexMap<String, String>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl ManifestHooks {
    pub fn new(manifest: &Manifest, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            locals: manifest.locals.clone(),
            file_map_tokens: manifest.file_map_tokens.clone(),
            renderer,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty() && self.file_map_tokens.is_empty()
    }
}

/// Recursively renders every string inside `value`.
fn render_value(renderer: &dyn TemplateRenderer, value: &Value, context: &Value) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(renderer.render(s, context)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(renderer, item, context))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut rendered = Locals::new();
            for (key, item) in map {
                rendered.insert(key.clone(), render_value(renderer, item, context)?);
            }
            Ok(Value::Object(rendered))
        }
        other => Ok(other.clone()),
    }
}

impl BlueprintHooks for ManifestHooks {
    fn locals(&self, options: &InstallOptions, next: Chain<'_>) -> Result<Locals> {
        let mut locals = next.locals(options)?;
        let context = options.template_context();
        for (key, value) in &self.locals {
            let rendered = render_value(self.renderer.as_ref(), value, &context)?;
            debug!("Local '{key}' = {rendered}");
            locals.insert(key.clone(), rendered);
        }
        Ok(locals)
    }

    fn file_map_tokens(&self, next: Chain<'_>) -> Result<FileMapTokens> {
        let mut tokens = next.file_map_tokens()?;
        for (name, template) in &self.file_map_tokens {
            let renderer = Arc::clone(&self.renderer);
            let template = template.clone();
            let token_name = name.clone();
            tokens.insert(
                name.clone(),
                try_token(move |vars| {
                    let context = serde_json::to_value(vars)
                        .map_err(|e| Error::TemplateError(format!("path token '{token_name}': {e}")))?;
                    renderer
                        .render(&template, &context)
                        .map_err(|e| Error::TemplateError(format!("path token '{token_name}': {e}")))
                }),
            );
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_normalize_accepts_plain_names() {
        assert_eq!(defaults::normalize_entity_name(Some("foo/bar")).unwrap(), "foo/bar");
    }

    #[test]
    fn test_default_normalize_rejects_missing_name() {
        let err = defaults::normalize_entity_name(None).unwrap_err();
        assert!(err
            .to_string()
            .contains("The `generate <entity-name>` command requires an entity name to be specified."));
        assert!(defaults::normalize_entity_name(Some("")).is_err());
    }

    #[test]
    fn test_default_normalize_rejects_trailing_slash() {
        let err = defaults::normalize_entity_name(Some("foo/")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "You specified \"foo/\", but you can't use a trailing slash as an entity name with \
             generators. Please re-run the command with \"foo\"."
        );
        assert!(defaults::normalize_entity_name(Some("foo\\")).is_err());
    }
}
