//! Common constants used throughout blueprinter.

/// Supported blueprint definition file names, tried in order
pub const INDEX_FILES: [&str; 3] = ["index.json", "index.yml", "index.yaml"];

/// Directory inside a blueprint holding its template tree
pub const FILES_DIR: &str = "files";

/// Directory inside a project or addon holding local blueprints
pub const BLUEPRINTS_DIR: &str = "blueprints";

/// Project manifest read by `LocalProject`
pub const PROJECT_MANIFEST: &str = "package.json";

/// Project configuration holding `podModulePrefix`
pub const PROJECT_CONFIG: &str = "config/environment.json";

/// Keyword marking a package as an addon
pub const ADDON_KEYWORD: &str = "ember-addon";

/// Dependency marking a directory as an initialised project
pub const CLI_PACKAGE: &str = "ember-cli";

/// Files never installed
pub const IGNORED_FILES: [&str; 1] = [".DS_Store"];

/// Files left alone when updating an already initialised project
pub const IGNORED_UPDATE_FILES: [&str; 3] = [".gitkeep", "app.css", "LICENSE.md"];

/// Source files installed under a different name
pub const RENAMED_FILES: [(&str, &str); 1] = [("gitignore", ".gitignore")];

/// Built-in blueprints shipped with the crate
pub const BUILTIN_BLUEPRINTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/blueprints");
