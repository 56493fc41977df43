//! The blueprint record and its file-level operations.

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::error::Result;
use crate::file_map::{merge_tokens, resolve_tokens, standard_tokens, FileMap, FileMapTokens, FileMapVariables};
use crate::hooks::{BlueprintHooks, Chain};
use crate::loader::SearchContext;
use crate::manifest::AvailableOption;
use crate::options::{apply_available_options, InstallOptions};
use crate::processor::{ActionLog, Processor};

/// Derives a blueprint name from its directory.
///
/// A directory inside an `@scope` directory is named `@scope/name`.
pub fn name_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let scope = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|parent| parent.starts_with('@'));

    match scope {
        Some(scope) => format!("{scope}/{name}"),
        None => name,
    }
}

/// Lists every file under `dir` as a sorted, `/`-separated relative path.
///
/// A missing directory has no files.
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        debug!("Blueprint files directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let relative: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(relative.join("/"));
    }
    Ok(files)
}

/// A named, self-contained generator.
#[derive(Clone)]
pub struct Blueprint {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) description: String,
    pub(crate) available_options: Vec<AvailableOption>,
    pub(crate) has_path_token: Option<bool>,
    pub(crate) properties: IndexMap<String, Value>,
    /// Hook layers, most specific first
    pub(crate) layers: Vec<Arc<dyn BlueprintHooks>>,
    /// Where `lookup_blueprint` searches
    pub(crate) context: SearchContext,
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("description", &self.description)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl Blueprint {
    /// A blueprint at `path` with built-in behavior only.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        Self {
            name: name_from_path(&path),
            path,
            description: String::new(),
            available_options: Vec::new(),
            has_path_token: None,
            properties: IndexMap::new(),
            layers: Vec::new(),
            context: SearchContext::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn available_options(&self) -> &[AvailableOption] {
        &self.available_options
    }

    /// Any other property the blueprint definition declares.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn layers(&self) -> &[Arc<dyn BlueprintHooks>] {
        &self.layers
    }

    /// Adds a hook layer that takes precedence over the existing ones.
    pub fn extend<H: BlueprintHooks + 'static>(mut self, hooks: H) -> Self {
        self.layers.insert(0, Arc::new(hooks));
        self
    }

    /// The full hook chain of this blueprint.
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self, &self.layers)
    }

    pub fn files_path(&self, options: &InstallOptions) -> Result<PathBuf> {
        self.chain().files_path(options)
    }

    /// Relative paths of every template file, sorted.
    pub fn files(&self, options: &InstallOptions) -> Result<Vec<String>> {
        list_files(&self.files_path(options)?)
    }

    /// Whether the file tree uses `__path__`, unless the definition says.
    pub fn has_path_token(&self, options: &InstallOptions) -> Result<bool> {
        if let Some(declared) = self.has_path_token {
            return Ok(declared);
        }
        Ok(self.files(options)?.iter().any(|file| file.contains("__path__")))
    }

    /// Whether the file tree uses `__root__` and so can be re-exported
    /// from an addon.
    pub fn supports_addon(&self, options: &InstallOptions) -> Result<bool> {
        Ok(self.files(options)?.iter().any(|file| file.contains("__root__")))
    }

    /// Standard tokens with the blueprint's custom tokens layered on top.
    pub fn file_map_tokens(&self) -> Result<FileMapTokens> {
        Ok(merge_tokens(standard_tokens(), self.chain().file_map_tokens()?))
    }

    /// Resolves every token for one call.
    pub fn generate_file_map(&self, variables: &FileMapVariables) -> Result<FileMap> {
        resolve_tokens(&self.file_map_tokens()?, variables)
    }

    /// Normalizes the entity name and applies declared option defaults.
    ///
    /// # Errors
    /// * `Error::ValidationError` for a rejected entity name or option value
    pub fn normalize_options(&self, options: &InstallOptions) -> Result<InstallOptions> {
        let mut options = options.clone();
        if let Some(entity) = options.entity.as_mut() {
            let normalized = self.chain().normalize_entity_name(entity.name.as_deref())?;
            entity.name = Some(normalized);
        }
        apply_available_options(&self.available_options, &mut options.custom)?;
        Ok(options)
    }

    /// Finds another blueprint with the lookup paths this one was found on.
    ///
    /// # Errors
    /// * `Error::UnknownBlueprint` if no such blueprint exists
    pub fn lookup_blueprint(&self, name: &str) -> Result<Blueprint> {
        self.context.require(name)
    }

    /// Like [`Blueprint::lookup_blueprint`], `None` when missing.
    pub fn try_lookup_blueprint(&self, name: &str) -> Result<Option<Blueprint>> {
        self.context.lookup(name)
    }

    pub fn install(&self, processor: &Processor<'_>, options: &InstallOptions) -> Result<ActionLog> {
        processor.install(self, options)
    }

    pub fn uninstall(&self, processor: &Processor<'_>, options: &InstallOptions) -> Result<ActionLog> {
        processor.uninstall(self, options)
    }
}
