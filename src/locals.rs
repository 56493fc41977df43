//! Template variables for one install/uninstall call.
//!
//! Builds the [`FileMapVariables`] every path token resolver sees and the
//! [`LocalsBag`] every template is rendered against.

use log::{debug, warn};
use serde_json::Value;
use std::path::Path;

use crate::blueprint::Blueprint;
use crate::error::Result;
use crate::file_map::{FileMap, FileMapVariables};
use crate::options::InstallOptions;
use crate::strings::NameTokens;

/// Free-form template variables, in insertion order.
pub type Locals = serde_json::Map<String, Value>;

/// Key a custom hook must not set; the engine owns the file map.
pub const FILE_MAP_KEY: &str = "fileMap";

/// The variables templates are rendered with.
///
/// Derived names are always present; custom keys from the blueprint's
/// `locals` hook come on top and may shadow them in templates.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalsBag {
    pub dasherized_package_name: String,
    pub classified_package_name: String,
    pub dasherized_module_name: String,
    pub classified_module_name: String,
    pub camelized_module_name: String,
    pub decamelized_module_name: String,
    pub file_map: FileMap,
    pub has_path_token: bool,
    pub target_files: Vec<String>,
    pub custom: Locals,
}

impl LocalsBag {
    /// Builds the bag for a package and module name.
    ///
    /// A custom `fileMap` key is dropped with a warning.
    pub fn new(
        package_name: &str,
        module_name: &str,
        file_map: FileMap,
        has_path_token: bool,
        target_files: Vec<String>,
        mut custom: Locals,
    ) -> Self {
        if custom.remove(FILE_MAP_KEY).is_some() {
            warn!("Ignoring custom local '{FILE_MAP_KEY}': it is computed by the engine");
        }

        let package = NameTokens::new(package_name);
        let module = NameTokens::new(module_name);

        Self {
            dasherized_package_name: package.dasherized,
            classified_package_name: package.classified,
            dasherized_module_name: module.dasherized,
            classified_module_name: module.classified,
            camelized_module_name: module.camelized,
            decamelized_module_name: module.decamelized,
            file_map,
            has_path_token,
            target_files,
            custom,
        }
    }

    /// Flattens the bag into the render context.
    pub fn to_context(&self) -> Value {
        let mut context = Locals::new();
        let derived = [
            ("dasherizedPackageName", &self.dasherized_package_name),
            ("classifiedPackageName", &self.classified_package_name),
            ("dasherizedModuleName", &self.dasherized_module_name),
            ("classifiedModuleName", &self.classified_module_name),
            ("camelizedModuleName", &self.camelized_module_name),
            ("decamelizedModuleName", &self.decamelized_module_name),
        ];
        for (key, value) in derived {
            context.insert(key.to_string(), Value::String(value.clone()));
        }

        let file_map = self
            .file_map
            .iter()
            .map(|(token, segment)| (token.clone(), Value::String(segment.clone())))
            .collect();
        context.insert(FILE_MAP_KEY.to_string(), Value::Object(file_map));
        context.insert("hasPathToken".to_string(), Value::Bool(self.has_path_token));
        context.insert(
            "targetFiles".to_string(),
            Value::Array(self.target_files.iter().cloned().map(Value::String).collect()),
        );

        for (key, value) in &self.custom {
            context.insert(key.clone(), value.clone());
        }

        Value::Object(context)
    }

    /// Looks a variable up the way templates see it.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.to_context() {
            Value::Object(mut context) => context.remove(key),
            _ => None,
        }
    }
}

fn relative_to(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl Blueprint {
    /// Collects the inputs of the path token resolvers.
    ///
    /// # Arguments
    /// * `module_name` - Dasherized entity (or package) name
    /// * `options` - Normalized install options
    /// * `custom` - Locals returned by the blueprint's `locals` hook
    pub fn generate_file_map_variables(
        &self,
        module_name: &str,
        options: &InstallOptions,
        custom: &Locals,
    ) -> Result<FileMapVariables> {
        let project = &options.project;
        let pod_path = project
            .config()
            .pod_module_prefix
            .map(|prefix| prefix.rsplit('/').next().unwrap_or_default().to_string())
            .unwrap_or_default();

        let in_repo_addon_root = options
            .in_repo_addon
            .as_deref()
            .and_then(|name| project.find_addon(name))
            .map(|addon| relative_to(&addon.root, project.root()));

        let in_ = options.in_.as_deref().map(|dir| relative_to(dir, project.root()));

        Ok(FileMapVariables {
            dasherized_module_name: module_name.to_string(),
            blueprint_name: self.name().to_string(),
            origin_blueprint_name: options
                .origin_blueprint_name
                .clone()
                .unwrap_or_else(|| self.name().to_string()),
            pod: options.pod,
            pod_path,
            has_path_token: self.has_path_token(options)?,
            in_addon: project.is_addon() || options.in_repo_addon.is_some(),
            in_dummy: project.is_addon() && options.dummy,
            in_repo_addon: options.in_repo_addon.clone(),
            in_repo_addon_root,
            in_,
            locals: custom.clone(),
        })
    }

    /// Computes the template variables for one call.
    ///
    /// # Arguments
    /// * `options` - Install options with an already normalized entity name
    ///
    /// # Returns
    /// * `Result<LocalsBag>` - Derived names, custom locals and the file map
    pub fn locals(&self, options: &InstallOptions) -> Result<LocalsBag> {
        let package_name = options.project.name();
        let module_name = options.entity_name().unwrap_or(&package_name).to_string();
        let names = NameTokens::new(&module_name);

        let custom = self.chain().locals(options)?;
        let variables = self.generate_file_map_variables(&names.dasherized, options, &custom)?;
        let file_map = self.generate_file_map(&variables)?;
        debug!("File map for blueprint '{}': {:?}", self.name(), file_map);

        Ok(LocalsBag::new(
            &package_name,
            &module_name,
            file_map,
            variables.has_path_token,
            options.target_files.clone(),
            custom,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derived_names() {
        let bag = LocalsBag::new(
            "mock-project",
            "foo/bar-baz",
            FileMap::new(),
            false,
            Vec::new(),
            Locals::new(),
        );

        assert_eq!(bag.dasherized_package_name, "mock-project");
        assert_eq!(bag.classified_package_name, "MockProject");
        assert_eq!(bag.dasherized_module_name, "foo/bar-baz");
        assert_eq!(bag.classified_module_name, "FooBarBaz");
        assert_eq!(bag.camelized_module_name, "fooBarBaz");
    }

    #[test]
    fn test_custom_locals_shadow_derived_names_in_context() {
        let mut custom = Locals::new();
        custom.insert("dasherizedModuleName".to_string(), json!("custom"));
        custom.insert("fileMap".to_string(), json!({"__name__": "hijacked"}));

        let mut file_map = FileMap::new();
        file_map.insert("__name__".to_string(), "foo".to_string());
        let bag = LocalsBag::new("p", "foo", file_map, false, Vec::new(), custom);

        assert_eq!(bag.dasherized_module_name, "foo");
        assert_eq!(bag.get("dasherizedModuleName"), Some(json!("custom")));
        assert_eq!(bag.get("fileMap"), Some(json!({"__name__": "foo"})));
    }
}
