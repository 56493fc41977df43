//! Generate and destroy tasks.
//!
//! Runs a blueprint and its companions: `NAME-test` when it exists, and
//! inside an addon `NAME-addon` (or `addon-import` for blueprints that
//! can be re-exported) on behalf of the main blueprint.

use log::{debug, info};

use crate::blueprint::Blueprint;
use crate::builtin::ADDON_IMPORT;
use crate::error::Result;
use crate::loader::SearchContext;
use crate::options::InstallOptions;
use crate::processor::{ActionLog, Processor};

/// Whether a task installs or removes files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Install,
    Uninstall,
}

/// One `generate` or `destroy` invocation.
pub struct GenerateTask<'a> {
    processor: &'a Processor<'a>,
    context: SearchContext,
}

impl<'a> GenerateTask<'a> {
    pub fn new(processor: &'a Processor<'a>, context: SearchContext) -> Self {
        Self { processor, context }
    }

    fn execute(&self, blueprint: &Blueprint, options: &InstallOptions, direction: Direction) -> Result<ActionLog> {
        match direction {
            Direction::Install => self.processor.install(blueprint, options),
            Direction::Uninstall => self.processor.uninstall(blueprint, options),
        }
    }

    /// Runs the named blueprint, then its companions.
    ///
    /// # Arguments
    /// * `name` - Blueprint name as given on the command line
    /// * `options` - Invocation options
    /// * `direction` - Install or uninstall
    ///
    /// # Returns
    /// * `Result<ActionLog>` - Actions of the main blueprint and its companions
    ///
    /// # Errors
    /// * `Error::UnknownBlueprint` if `name` does not resolve
    pub fn run(&self, name: &str, options: &InstallOptions, direction: Direction) -> Result<ActionLog> {
        let main = self.context.require(name)?;
        let mut log = self.execute(&main, options, direction)?;

        if !name.ends_with("-test") {
            let test_name = format!("{name}-test");
            if let Some(test) = self.context.clone().ignore_missing(true).lookup(&test_name)? {
                debug!("Running companion blueprint '{test_name}'");
                log.extend(self.execute(&test, options, direction)?);
            }
        }

        if let Some(addon) = self.addon_companion(name, &main, options)? {
            info!("Running '{}' on behalf of '{}'", addon.name(), name);
            let addon_options = InstallOptions {
                origin_blueprint_name: Some(name.to_string()),
                ..options.clone()
            };
            log.extend(self.execute(&addon, &addon_options, direction)?);
        }

        Ok(log)
    }

    /// Picks the blueprint that mirrors `main` into the app of an addon.
    fn addon_companion(&self, name: &str, main: &Blueprint, options: &InstallOptions) -> Result<Option<Blueprint>> {
        let in_addon = options.project.is_addon() || options.in_repo_addon.is_some();
        if !in_addon || options.dummy || options.in_.is_some() || name.ends_with("-addon") {
            return Ok(None);
        }

        let lookup = self.context.clone().ignore_missing(true);
        if let Some(addon) = lookup.lookup(&format!("{name}-addon"))? {
            return Ok(Some(addon));
        }
        if options.entity_name().is_some() && main.supports_addon(options)? {
            return lookup.lookup(ADDON_IMPORT);
        }
        Ok(None)
    }
}
