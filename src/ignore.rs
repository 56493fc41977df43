//! Ignore patterns for blueprint files.
//! Files matching the ignored set are never installed; files matching the
//! update set are only skipped when the target is an existing project.

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

use crate::constants::{IGNORED_FILES, IGNORED_UPDATE_FILES};
use crate::error::Result;

/// Ignore configuration handed to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreConfig {
    ignored_files: Vec<String>,
    ignored_update_files: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self::new(
            IGNORED_FILES.iter().map(|s| s.to_string()).collect(),
            IGNORED_UPDATE_FILES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl IgnoreConfig {
    pub fn new(ignored_files: Vec<String>, ignored_update_files: Vec<String>) -> Self {
        Self { ignored_files, ignored_update_files }
    }

    pub fn ignored_files(&self) -> &[String] {
        &self.ignored_files
    }

    pub fn ignored_update_files(&self) -> &[String] {
        &self.ignored_update_files
    }

    pub fn ignore_file<S: Into<String>>(mut self, pattern: S) -> Self {
        self.ignored_files.push(pattern.into());
        self
    }

    pub fn ignore_update_file<S: Into<String>>(mut self, pattern: S) -> Self {
        self.ignored_update_files.push(pattern.into());
        self
    }

    /// Compiles the patterns that apply to one call.
    ///
    /// # Arguments
    /// * `is_update` - Whether the target is an existing project
    ///
    /// # Returns
    /// * `Result<IgnoreMatcher>` - Compiled matcher
    ///
    /// # Notes
    /// - A pattern without `/` matches the file name at any depth
    /// - A pattern with `/` matches the whole destination path
    pub fn matcher(&self, is_update: bool) -> Result<IgnoreMatcher> {
        let mut names = GlobSetBuilder::new();
        let mut paths = GlobSetBuilder::new();

        let update_patterns: &[String] = if is_update { self.ignored_update_files.as_slice() } else { &[] };
        for pattern in self.ignored_files.iter().chain(update_patterns) {
            let glob = Glob::new(pattern)?;
            if pattern.contains('/') {
                paths.add(glob);
            } else {
                names.add(glob);
            }
        }
        debug!("Compiled ignore patterns (update: {is_update})");

        Ok(IgnoreMatcher { names: names.build()?, paths: paths.build()? })
    }
}

/// Compiled form of an [`IgnoreConfig`].
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    names: GlobSet,
    paths: GlobSet,
}

impl IgnoreMatcher {
    /// Checks a `/`-separated destination path.
    pub fn is_ignored(&self, relative: &str) -> bool {
        let name = relative.rsplit('/').next().unwrap_or(relative);
        self.names.is_match(name) || self.paths.is_match(relative)
    }
}
