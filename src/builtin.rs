//! Hook sets blueprint definitions can refer to by name, and the
//! `addon-import` hooks shipped with the crate.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::file_map::{join_segments, token, FileMapTokens};
use crate::hooks::{BlueprintHooks, Chain};
use crate::locals::Locals;
use crate::options::InstallOptions;
use crate::processor::Session;
use crate::strings::{dasherize, pluralize};

/// Name of the blueprint that re-exports addon modules into the app.
pub const ADDON_IMPORT: &str = "addon-import";

/// Named hook sets, referenced by a definition's `hooks` and `mixins`.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: IndexMap<String, Arc<dyn BlueprintHooks>>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hooks.keys()).finish()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ADDON_IMPORT, AddonImport);
        registry
    }
}

impl HookRegistry {
    pub fn empty() -> Self {
        Self { hooks: IndexMap::new() }
    }

    pub fn register<S, H>(&mut self, name: S, hooks: H)
    where
        S: Into<String>,
        H: BlueprintHooks + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(hooks));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn BlueprintHooks>> {
        self.hooks.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }
}

/// Hooks of the `addon-import` blueprint.
///
/// Only meaningful on behalf of another blueprint: it writes an app-side
/// module re-exporting the addon module that blueprint generated.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddonImport;

impl AddonImport {
    fn require_origin(options: &InstallOptions) -> Result<&str> {
        options.origin_blueprint_name.as_deref().ok_or_else(|| {
            Error::ValidationError("You cannot call the addon-import blueprint directly.".to_string())
        })
    }

    /// The origin blueprint's name without an `-addon` suffix.
    fn origin_name(options: &InstallOptions, fallback: &str) -> String {
        let origin = options.origin_blueprint_name.as_deref().unwrap_or(fallback);
        match origin.find("-addon") {
            Some(index) => origin[..index].to_string(),
            None => origin.to_string(),
        }
    }
}

impl BlueprintHooks for AddonImport {
    fn file_map_tokens(&self, next: Chain<'_>) -> Result<FileMapTokens> {
        let mut tokens = next.file_map_tokens()?;

        tokens.insert(
            "__name__".to_string(),
            token(|vars| {
                if vars.uses_pod_path() {
                    vars.origin_blueprint_name.clone()
                } else {
                    vars.dasherized_module_name.clone()
                }
            }),
        );
        tokens.insert(
            "__path__".to_string(),
            token(|vars| {
                if vars.uses_pod_path() {
                    join_segments(&vars.pod_path, &vars.dasherized_module_name)
                } else {
                    pluralize(&vars.origin_blueprint_name)
                }
            }),
        );
        tokens.insert(
            "__root__".to_string(),
            token(|vars| match &vars.in_repo_addon_root {
                Some(addon_root) => join_segments(addon_root, "app"),
                None => "app".to_string(),
            }),
        );

        Ok(tokens)
    }

    fn locals(&self, options: &InstallOptions, next: Chain<'_>) -> Result<Locals> {
        let origin = Self::origin_name(options, next.blueprint().name());
        let mut locals = next.locals(options)?;

        let addon_name = dasherize(
            &options.in_repo_addon.clone().unwrap_or_else(|| options.project.name()),
        );
        let file_name = dasherize(options.entity_name().unwrap_or_default());

        let module_path = if options.pod {
            [addon_name.as_str(), file_name.as_str(), origin.as_str()].join("/")
        } else {
            [addon_name.as_str(), pluralize(&origin).as_str(), file_name.as_str()].join("/")
        };
        locals.insert("modulePath".to_string(), Value::String(module_path));

        Ok(locals)
    }

    fn before_install(&self, session: &mut Session<'_>, next: Chain<'_>) -> Result<()> {
        Self::require_origin(session.options())?;
        next.before_install(session)
    }

    fn before_uninstall(&self, session: &mut Session<'_>, next: Chain<'_>) -> Result<()> {
        Self::require_origin(session.options())?;
        next.before_uninstall(session)
    }
}
