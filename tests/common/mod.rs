#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use blueprinter::project::{Addon, Project, ProjectConfig};

/// In-memory project description rooted at a temporary directory.
#[derive(Debug, Clone)]
pub struct MockProject {
    pub root: PathBuf,
    pub name: String,
    pub existing: bool,
    pub addon: bool,
    pub addons: Vec<Addon>,
    pub config: ProjectConfig,
}

impl MockProject {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            name: "mock-project".to_string(),
            existing: false,
            addon: false,
            addons: Vec::new(),
            config: ProjectConfig::default(),
        }
    }

    pub fn existing(mut self) -> Self {
        self.existing = true;
        self
    }

    pub fn addon(mut self, name: &str) -> Self {
        self.addon = true;
        self.name = name.to_string();
        self
    }

    pub fn with_in_repo_addon(mut self, name: &str, relative: &str) -> Self {
        self.addons.push(Addon { name: name.to_string(), root: self.root.join(relative), in_repo: true });
        self
    }

    pub fn with_pod_prefix(mut self, prefix: &str) -> Self {
        self.config.pod_module_prefix = Some(prefix.to_string());
        self
    }

    pub fn shared(self) -> Arc<dyn Project> {
        Arc::new(self)
    }
}

impl Project for MockProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn config(&self) -> ProjectConfig {
        self.config.clone()
    }

    fn is_existing_project(&self) -> bool {
        self.existing
    }

    fn is_addon(&self) -> bool {
        self.addon
    }

    fn addons(&self) -> Vec<Addon> {
        self.addons.clone()
    }
}

pub fn write<C: AsRef<[u8]>>(root: &Path, relative: &str, content: C) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

/// Writes the `basic` and `basic_2` blueprints under `root`.
///
/// `basic_2` shares `.ember-cli` and `gitignore` with `basic` and differs
/// on `foo.txt` and `test.txt`.
pub fn basic_blueprints(root: &Path) {
    write(root, "basic/index.json", r#"{"description": "A basic blueprint"}"#);
    write(root, "basic/files/.DS_Store", "ignored");
    write(root, "basic/files/.ember-cli", "{\n  \"disableAnalytics\": false\n}\n");
    write(root, "basic/files/gitignore", "/dist\n/tmp\n");
    write(root, "basic/files/app/basics/__name__.txt", "{{ classifiedModuleName }}\n");
    write(root, "basic/files/bar", "{{ dasherizedPackageName }}\n");
    write(root, "basic/files/file-to-remove.txt", "remove me\n");
    write(root, "basic/files/foo.txt", "Hello World\n");
    write(root, "basic/files/test.txt", "I AM TESTY\n");

    write(root, "basic_2/index.json", r#"{"description": "Another basic blueprint"}"#);
    write(root, "basic_2/files/.ember-cli", "{\n  \"disableAnalytics\": false\n}\n");
    write(root, "basic_2/files/gitignore", "/dist\n/tmp\n");
    write(root, "basic_2/files/foo.txt", "Hello World, again\n");
    write(root, "basic_2/files/test.txt", "I AM TESTY TOO\n");
}

pub fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|line| line.to_string()).collect()
}
