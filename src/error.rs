//! Error handling for blueprinter.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for blueprint resolution and installation.
///
/// This enum represents all possible errors that can occur within the engine.
/// It implements the standard Error trait through thiserror's derive macro.
#[derive(Error, Debug)]
pub enum Error {
    /// No blueprint with the given name exists on any lookup path
    #[error("Unknown blueprint: {name}")]
    UnknownBlueprint { name: String },

    /// Bad user input: entity names, option values, addon flags.
    /// The message is user-facing and printed as-is.
    #[error("{0}")]
    ValidationError(String),

    /// The action dispatch table has no entry for the requested action
    #[error("Tried to call action \"{action}\" but it does not exist")]
    ActionDispatchError { action: String },

    /// The user chose to quit while resolving a conflict
    #[error("Installation aborted.")]
    ConflictAbort,

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors that occur while walking a blueprint's files
    #[error("Walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    TemplateError(String),

    #[error(transparent)]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors in blueprint manifests or project configuration
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents failures while asking the user a question
    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    /// Represents invalid target file or ignore patterns
    #[error("Invalid glob pattern: {0}.")]
    GlobError(#[from] globset::Error),
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
