//! Command-line interface implementation for blueprinter.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::conflict::ConflictPolicy;
use crate::options::{Entity, InstallOptions};

/// Command-line arguments structure for blueprinter.
#[derive(Parser, Debug)]
#[command(author, version, about = "blueprinter: generate and remove project files from blueprints", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root, defaults to the current directory
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generates new code from a blueprint
    #[command(visible_alias = "g")]
    Generate(BlueprintArgs),

    /// Removes code generated by a blueprint
    #[command(visible_alias = "d")]
    Destroy(BlueprintArgs),

    /// Installs a project blueprint into the project, optionally limited to
    /// files matching the given globs
    Init(InitArgs),
}

#[derive(ClapArgs, Debug)]
pub struct BlueprintArgs {
    /// Blueprint name, `@scope/name`, or path to a blueprint directory
    #[arg(value_name = "BLUEPRINT")]
    pub blueprint: String,

    /// Name of the entity to generate
    #[arg(value_name = "NAME")]
    pub entity: Option<String>,

    #[command(flatten)]
    pub install: InstallFlags,

    /// Options passed to the blueprint, e.g. `-- --foo=two`
    #[arg(last = true, value_name = "BLUEPRINT_OPTIONS")]
    pub blueprint_options: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct InitArgs {
    /// Only install files matching these globs
    #[arg(value_name = "GLOB")]
    pub globs: Vec<String>,

    /// Blueprint to install
    #[arg(short, long, default_value = "app")]
    pub blueprint: String,

    /// Project name, defaults to the project's package name
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub install: InstallFlags,
}

/// Flags shared by every installing command.
#[derive(ClapArgs, Debug, Default)]
pub struct InstallFlags {
    /// Use the pod file layout
    #[arg(short, long)]
    pub pod: bool,

    /// Report what would change without touching any file
    #[arg(short, long)]
    pub dry_run: bool,

    /// Generate into the addon's dummy app
    #[arg(long)]
    pub dummy: bool,

    /// Generate into the named in-repo addon
    #[arg(long, value_name = "ADDON")]
    pub in_repo_addon: Option<String>,

    /// Generate into the addon at this path
    #[arg(long = "in", value_name = "PATH")]
    pub in_dir: Option<PathBuf>,

    /// Directory to install into, defaults to the project root
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Skip confirmation prompts when overwriting existing files.
    /// This will automatically overwrite any differing file in the target
    /// without asking for confirmation.
    #[arg(long)]
    pub skip_overwrite_check: bool,
}

impl InstallFlags {
    /// Applies the flags on top of `options`.
    pub fn apply(&self, mut options: InstallOptions) -> InstallOptions {
        options.pod = self.pod;
        options.dry_run = self.dry_run;
        options.dummy = self.dummy;
        options.in_repo_addon = self.in_repo_addon.clone();
        options.in_ = self.in_dir.clone();
        if let Some(target) = &self.target {
            options.target = target.clone();
        }
        options
    }

    pub fn policy(&self) -> ConflictPolicy {
        if self.skip_overwrite_check {
            ConflictPolicy::Overwrite
        } else {
            ConflictPolicy::Prompt
        }
    }
}

impl BlueprintArgs {
    /// The entity to generate. Always present so that a blueprint's
    /// `normalize_entity_name` decides whether a missing name is an error.
    pub fn entity(&self) -> Option<Entity> {
        Some(Entity { name: self.entity.clone() })
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Returns
/// * `Args` - Parsed command line arguments
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument
                || e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
