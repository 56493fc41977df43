//! Project context: the tree blueprints are installed into and the addons
//! that contribute blueprints to it.

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::constants::{
    ADDON_KEYWORD, BLUEPRINTS_DIR, CLI_PACKAGE, PROJECT_CONFIG, PROJECT_MANIFEST,
};
use crate::error::{Error, Result};

/// Settings read from the project's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub pod_module_prefix: Option<String>,
}

/// An addon known to the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addon {
    pub name: String,
    pub root: PathBuf,
    /// Lives inside the project's own repository
    pub in_repo: bool,
}

impl Addon {
    pub fn blueprints_path(&self) -> PathBuf {
        self.root.join(BLUEPRINTS_DIR)
    }
}

/// What the engine needs to know about the project it installs into.
pub trait Project: Debug {
    fn root(&self) -> &Path;

    fn name(&self) -> String;

    fn config(&self) -> ProjectConfig;

    /// The target is an already initialised project (updates, not fresh installs)
    fn is_existing_project(&self) -> bool;

    fn is_addon(&self) -> bool;

    /// Addons in dependency order.
    fn addons(&self) -> Vec<Addon>;

    fn find_addon(&self, name: &str) -> Option<Addon> {
        self.addons().into_iter().find(|addon| addon.name == name)
    }

    /// Ordered blueprint search roots contributed by the project and its addons.
    fn blueprint_lookup_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if self.is_existing_project() {
            paths.push(self.root().join(BLUEPRINTS_DIR));
        }
        paths.extend(
            self.addons()
                .iter()
                .map(Addon::blueprints_path)
                .filter(|path| path.is_dir()),
        );
        paths
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AddonSection {
    #[serde(default)]
    paths: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default)]
    dev_dependencies: IndexMap<String, String>,
    #[serde(rename = "ember-addon", default)]
    addon: Option<AddonSection>,
}

impl PackageManifest {
    fn read(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(PROJECT_MANIFEST);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    fn is_addon(&self) -> bool {
        self.keywords.iter().any(|keyword| keyword == ADDON_KEYWORD)
    }

    fn depends_on(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }
}

/// A project on disk, described by its `package.json`.
#[derive(Debug, Clone)]
pub struct LocalProject {
    root: PathBuf,
    manifest: PackageManifest,
    config: ProjectConfig,
    addons: Vec<Addon>,
}

impl LocalProject {
    /// Loads the project rooted at `root`.
    ///
    /// A missing `package.json` yields an uninitialised project named after
    /// the directory.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let manifest = PackageManifest::read(&root)?.unwrap_or_default();

        let config_path = root.join(PROJECT_CONFIG);
        let config = if config_path.is_file() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)
                .map_err(|e| Error::ConfigError(format!("{}: {}", config_path.display(), e)))?
        } else {
            ProjectConfig::default()
        };

        let addons = Self::discover_addons(&root, &manifest)?;
        debug!("Loaded project at {} with {} addon(s)", root.display(), addons.len());

        Ok(Self { root, manifest, config, addons })
    }

    fn discover_addons(root: &Path, manifest: &PackageManifest) -> Result<Vec<Addon>> {
        let mut addons = Vec::new();

        let in_repo_paths = manifest.addon.as_ref().map(|a| a.paths.as_slice()).unwrap_or_default();
        for relative in in_repo_paths {
            let addon_root = root.join(relative);
            let name = PackageManifest::read(&addon_root)?
                .and_then(|m| m.name)
                .or_else(|| {
                    addon_root.file_name().map(|n| n.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| relative.clone());
            addons.push(Addon { name, root: addon_root, in_repo: true });
        }

        for dependency in manifest.dependencies.keys().chain(manifest.dev_dependencies.keys()) {
            let addon_root = root.join("node_modules").join(dependency);
            if let Some(package) = PackageManifest::read(&addon_root)? {
                if package.is_addon() {
                    addons.push(Addon { name: dependency.clone(), root: addon_root, in_repo: false });
                }
            }
        }

        Ok(addons)
    }
}

impl Project for LocalProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn name(&self) -> String {
        self.manifest.name.clone().unwrap_or_else(|| {
            self.root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    fn config(&self) -> ProjectConfig {
        self.config.clone()
    }

    fn is_existing_project(&self) -> bool {
        self.manifest.depends_on(CLI_PACKAGE)
    }

    fn is_addon(&self) -> bool {
        self.manifest.is_addon()
    }

    fn addons(&self) -> Vec<Addon> {
        self.addons.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_manifest() {
        let dir = TempDir::new().unwrap();
        let project = LocalProject::load(dir.path()).unwrap();

        assert!(!project.is_existing_project());
        assert!(!project.is_addon());
        assert!(project.blueprint_lookup_paths().is_empty());
    }

    #[test]
    fn test_load_addon_with_in_repo_addons() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{
                "name": "my-addon",
                "keywords": ["ember-addon"],
                "devDependencies": {"ember-cli": "*"},
                "ember-addon": {"paths": ["lib/other-thing"]}
            }"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("lib/other-thing/blueprints")).unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config/environment.json"), r#"{"podModulePrefix": "app/pods"}"#)
            .unwrap();

        let project = LocalProject::load(dir.path()).unwrap();

        assert_eq!(project.name(), "my-addon");
        assert!(project.is_addon());
        assert!(project.is_existing_project());
        assert_eq!(project.config().pod_module_prefix.as_deref(), Some("app/pods"));

        let addon = project.find_addon("other-thing").unwrap();
        assert!(addon.in_repo);
        assert_eq!(
            project.blueprint_lookup_paths(),
            vec![dir.path().join("blueprints"), dir.path().join("lib/other-thing/blueprints")]
        );
    }
}
