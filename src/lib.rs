//! blueprinter resolves named blueprints and installs their templated
//! file trees into a project: path tokens are mapped, file contents are
//! rendered, and every file is classified against the target tree before
//! it is written, skipped or removed.

/// The blueprint record and its file-level operations
pub mod blueprint;

/// Built-in hook sets, including `addon-import`
pub mod builtin;

/// Command-line interface module for the blueprinter application
pub mod cli;

/// Classification of rendered files and conflict resolution
pub mod conflict;

/// Common constants: file names, ignore lists and lookup roots
pub mod constants;

/// Error types and handling for the blueprinter application
pub mod error;

/// Path tokens such as `__name__` and `__root__`
pub mod file_map;

/// Generate and destroy tasks with companion blueprints
pub mod generate;

/// Overridable blueprint hooks and the override chain
pub mod hooks;

/// File ignore patterns
pub mod ignore;

/// Blueprint lookup and loading
pub mod loader;

/// Template variables of one call
pub mod locals;

/// Logger initialization for the binary
pub mod logger;

/// Blueprint definition files
/// Supports JSON and YAML formats (index.json, index.yml, index.yaml)
pub mod manifest;

/// Install options and blueprint option parsing
pub mod options;

/// Core install/uninstall orchestration
pub mod processor;

/// Project context and addon discovery
pub mod project;

/// User output and conflict prompts
pub mod prompt;

/// Template rendering
pub mod renderer;

/// Name case conversions
pub mod strings;
