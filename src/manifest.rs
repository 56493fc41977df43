//! Blueprint definition files.
//! A blueprint directory is recognised by one of `index.json`, `index.yml`
//! or `index.yaml`; the first one found is loaded.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::INDEX_FILES;
use crate::error::{Error, Result};

/// Value type of a declared blueprint option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    String,
    Boolean,
    Number,
    Path,
}

/// Alternative spelling of an option.
///
/// `Flag` renames the option itself (`-p` for `--pod`); `Value` binds a
/// short flag to a fixed value (`-two` meaning `--foo=two`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionAlias {
    Flag(String),
    Value(IndexMap<String, serde_json::Value>),
}

/// One entry of a blueprint's `availableOptions`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableOption {
    pub name: String,
    #[serde(rename = "type", default)]
    pub option_type: OptionType,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub aliases: Vec<OptionAlias>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Contents of a blueprint's index file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Overrides the name derived from the directory
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub available_options: Vec<AvailableOption>,
    /// Overrides detection of `__path__` in the file tree
    #[serde(default)]
    pub has_path_token: Option<bool>,
    /// Blueprint this one inherits hooks from
    #[serde(default)]
    pub extends: Option<String>,
    /// Registered hook set implementing this blueprint
    #[serde(default)]
    pub hooks: Option<String>,
    /// Registered hook sets layered between this blueprint and its parent
    #[serde(default)]
    pub mixins: Vec<String>,
    /// Custom template variables; values are templates themselves
    #[serde(default)]
    pub locals: IndexMap<String, serde_json::Value>,
    /// Custom path tokens; values are templates over the file map variables
    #[serde(default)]
    pub file_map_tokens: IndexMap<String, String>,
    /// Any other exported property, kept verbatim
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// Returns the index file of a blueprint directory, if it has one.
pub fn find_index<P: AsRef<Path>>(blueprint_dir: P) -> Option<PathBuf> {
    INDEX_FILES
        .iter()
        .map(|file| blueprint_dir.as_ref().join(file))
        .find(|path| path.is_file())
}

/// Parses manifest content, trying JSON first and YAML second.
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    deserialize(content).map_err(|e| Error::ConfigError(format!("Invalid blueprint definition: {e}")))
}

fn deserialize(content: &str) -> std::result::Result<Manifest, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Manifest::default());
    }
    match serde_json::from_str(content) {
        Ok(manifest) => Ok(manifest),
        Err(_) => serde_yaml::from_str(content),
    }
}

/// Loads the manifest of a blueprint directory.
///
/// # Returns
/// * `Ok(None)` if the directory has no index file
pub fn load_manifest<P: AsRef<Path>>(blueprint_dir: P) -> Result<Option<Manifest>> {
    let Some(index) = find_index(&blueprint_dir) else {
        return Ok(None);
    };
    debug!("Loading blueprint definition from {}", index.display());
    let content = std::fs::read_to_string(&index)?;
    let manifest = deserialize(&content).map_err(|e| {
        Error::ConfigError(format!("{}: Invalid blueprint definition: {}", index.display(), e))
    })?;
    Ok(Some(manifest))
}
