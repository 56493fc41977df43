//! Blueprint discovery and loading.
//! Resolves a blueprint name against an ordered list of search roots and
//! assembles the blueprint's hook layers from its definition.
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::blueprint::{name_from_path, Blueprint};
use crate::builtin::HookRegistry;
use crate::constants::BUILTIN_BLUEPRINTS;
use crate::error::{Error, Result};
use crate::hooks::{BlueprintHooks, ManifestHooks};
use crate::manifest::{find_index, load_manifest, Manifest};
use crate::project::Project;
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};

/// The two shapes a blueprint definition can take.
pub enum BlueprintModule {
    /// Definition backed by a registered hook set
    Constructor { hooks: Arc<dyn BlueprintHooks>, manifest: Manifest },
    /// Plain data, wrapped with the default hooks
    Data(Manifest),
}

impl fmt::Debug for BlueprintModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlueprintModule::Constructor { manifest, .. } => {
                f.debug_tuple("Constructor").field(&manifest.hooks).finish()
            }
            BlueprintModule::Data(manifest) => f.debug_tuple("Data").field(&manifest.description).finish(),
        }
    }
}

impl BlueprintModule {
    /// Reads the definition of a blueprint directory.
    ///
    /// # Arguments
    /// * `dir` - Blueprint directory
    /// * `registry` - Hook sets a definition may name
    ///
    /// # Returns
    /// * `Result<Option<Self>>` - `None` if the directory has no index file
    ///
    /// # Errors
    /// * `Error::ConfigError` if the definition is invalid or names an
    ///   unregistered hook set
    pub fn read(dir: &Path, registry: &HookRegistry) -> Result<Option<Self>> {
        let Some(manifest) = load_manifest(dir)? else {
            return Ok(None);
        };

        match manifest.hooks.as_deref() {
            Some(name) => {
                let hooks = registry.get(name).ok_or_else(|| {
                    Error::ConfigError(format!(
                        "Blueprint {} refers to unknown hooks '{}'",
                        dir.display(),
                        name
                    ))
                })?;
                Ok(Some(BlueprintModule::Constructor { hooks, manifest }))
            }
            None => Ok(Some(BlueprintModule::Data(manifest))),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        match self {
            BlueprintModule::Constructor { manifest, .. } => manifest,
            BlueprintModule::Data(manifest) => manifest,
        }
    }
}

/// Whether a blueprint name designates a directory rather than a name to
/// search for. Scoped names (`@scope/name`) are searched for.
pub fn is_path_like(name: &str) -> bool {
    Path::new(name).is_absolute()
        || (!name.starts_with('@') && (name.contains('/') || name.contains('\\')))
}

/// Where and how blueprints are looked up.
#[derive(Clone)]
pub struct SearchContext {
    paths: Vec<PathBuf>,
    base_dir: PathBuf,
    ignore_missing: bool,
    registry: Arc<HookRegistry>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl fmt::Debug for SearchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchContext")
            .field("paths", &self.paths)
            .field("base_dir", &self.base_dir)
            .field("ignore_missing", &self.ignore_missing)
            .field("registry", &self.registry)
            .finish()
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SearchContext {
    /// Searches `paths` in order, then the built-in blueprints.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            base_dir: PathBuf::from("."),
            ignore_missing: false,
            registry: Arc::new(HookRegistry::default()),
            renderer: Arc::new(MiniJinjaRenderer::new()),
        }
    }

    /// Searches the project's and its addons' blueprint directories.
    /// Path-like names resolve against the project root.
    pub fn for_project(project: &dyn Project) -> Self {
        Self::new(project.blueprint_lookup_paths()).with_base_dir(project.root())
    }

    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Report an unknown name as `None` instead of an error.
    pub fn ignore_missing(mut self, ignore_missing: bool) -> Self {
        self.ignore_missing = ignore_missing;
        self
    }

    pub fn with_registry(mut self, registry: HookRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Search roots in order, duplicates removed, built-in blueprints last.
    pub fn search_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for root in self.paths.iter().cloned().chain([PathBuf::from(BUILTIN_BLUEPRINTS)]) {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }

    /// Finds the directory a blueprint name refers to.
    pub fn find_dir(&self, name: &str) -> Option<PathBuf> {
        if is_path_like(name) {
            let dir = self.base_dir.join(name);
            return find_index(&dir).map(|_| dir);
        }

        self.search_roots()
            .into_iter()
            .map(|root| root.join(name))
            .find(|dir| find_index(dir).is_some())
    }

    /// Resolves and loads a blueprint by name.
    ///
    /// # Arguments
    /// * `name` - Blueprint name, `@scope/name`, or a path to a blueprint directory
    ///
    /// # Returns
    /// * `Result<Option<Blueprint>>` - `None` only when missing names are ignored
    ///
    /// # Errors
    /// * `Error::UnknownBlueprint` if nothing matches
    pub fn lookup(&self, name: &str) -> Result<Option<Blueprint>> {
        match self.find_dir(name) {
            Some(dir) => {
                debug!("Blueprint '{}' resolved to {}", name, dir.display());
                self.load(&dir)
            }
            None if self.ignore_missing => Ok(None),
            None => Err(Error::UnknownBlueprint { name: name.to_string() }),
        }
    }

    /// Like [`SearchContext::lookup`], but a missing blueprint is always an error.
    pub fn require(&self, name: &str) -> Result<Blueprint> {
        self.lookup(name)?
            .ok_or_else(|| Error::UnknownBlueprint { name: name.to_string() })
    }

    /// Loads the blueprint in `dir`; `None` if it has no index file.
    pub fn load(&self, dir: &Path) -> Result<Option<Blueprint>> {
        self.load_with(dir, &mut Vec::new())
    }

    fn load_with(&self, dir: &Path, loading: &mut Vec<PathBuf>) -> Result<Option<Blueprint>> {
        let Some(module) = BlueprintModule::read(dir, &self.registry)? else {
            return Ok(None);
        };

        if loading.iter().any(|seen| seen == dir) {
            return Err(Error::ConfigError(format!(
                "Blueprint {} extends itself",
                dir.display()
            )));
        }
        loading.push(dir.to_path_buf());
        let blueprint = self.assemble(dir, module, loading)?;
        loading.pop();

        Ok(Some(blueprint))
    }

    /// Builds the blueprint record: own hooks first, then manifest hooks,
    /// mixins, and finally everything inherited from `extends`.
    fn assemble(&self, dir: &Path, module: BlueprintModule, loading: &mut Vec<PathBuf>) -> Result<Blueprint> {
        let (code, manifest) = match module {
            BlueprintModule::Constructor { hooks, manifest } => (Some(hooks), manifest),
            BlueprintModule::Data(manifest) => (None, manifest),
        };

        let mut blueprint = Blueprint::new(dir);
        blueprint.context = self.clone();
        if let Some(name) = &manifest.name {
            blueprint.name = name.clone();
        }
        if blueprint.name.is_empty() {
            blueprint.name = name_from_path(dir);
        }
        blueprint.description = manifest.description.clone();
        blueprint.available_options = manifest.available_options.clone();
        blueprint.has_path_token = manifest.has_path_token;
        blueprint.properties = manifest.extra.clone();

        blueprint.layers.extend(code);
        let manifest_hooks = ManifestHooks::new(&manifest, Arc::clone(&self.renderer));
        if !manifest_hooks.is_empty() {
            blueprint.layers.push(Arc::new(manifest_hooks));
        }
        for mixin in &manifest.mixins {
            let hooks = self.registry.get(mixin).ok_or_else(|| {
                Error::ConfigError(format!(
                    "Blueprint {} mixes in unknown hooks '{}'",
                    dir.display(),
                    mixin
                ))
            })?;
            blueprint.layers.push(hooks);
        }

        if let Some(parent_name) = &manifest.extends {
            let parent = self
                .find_dir(parent_name)
                .map(|parent_dir| self.load_with(&parent_dir, loading))
                .transpose()?
                .flatten()
                .ok_or_else(|| Error::UnknownBlueprint { name: parent_name.clone() })?;
            debug!("Blueprint '{}' extends '{}'", blueprint.name, parent.name);

            blueprint.layers.extend(parent.layers.iter().cloned());
            if blueprint.description.is_empty() {
                blueprint.description = parent.description.clone();
            }
            if blueprint.available_options.is_empty() {
                blueprint.available_options = parent.available_options.clone();
            }
            for (key, value) in parent.properties {
                blueprint.properties.entry(key).or_insert(value);
            }
        }

        Ok(blueprint)
    }
}
