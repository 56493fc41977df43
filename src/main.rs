//! blueprinter's main application entry point.
//! Parses the command line, loads the project and dispatches to the
//! generate, destroy and init tasks.

use anyhow::Context;
use std::sync::Arc;

use blueprinter::{
    cli::{get_args, Args, Command},
    error::{default_error_handler, Error},
    generate::{Direction, GenerateTask},
    loader::SearchContext,
    logger::init_logger,
    options::{parse_custom_args, Entity, InstallOptions},
    processor::Processor,
    project::{LocalProject, Project},
    prompt::DialoguerUi,
    renderer::MiniJinjaRenderer,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        match err.downcast::<Error>() {
            Ok(err) => default_error_handler(err),
            Err(err) => {
                eprintln!("{err:#}");
                std::process::exit(1);
            }
        }
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the project at `--project` or the current directory
/// 2. Resolves the blueprint against the project's lookup paths
/// 3. Parses blueprint options declared by the blueprint
/// 4. Runs the task and prints every action through the UI
fn run(args: Args) -> anyhow::Result<()> {
    let root = match args.project {
        Some(root) => root,
        None => std::env::current_dir().context("failed to read the current directory")?,
    };
    let project: Arc<dyn Project> = Arc::new(
        LocalProject::load(&root)
            .with_context(|| format!("failed to load the project at {}", root.display()))?,
    );

    let renderer = MiniJinjaRenderer::new();
    let ui = DialoguerUi::new();
    let context = SearchContext::for_project(project.as_ref());

    let (command, direction) = match args.command {
        Command::Generate(command) => (command, Direction::Install),
        Command::Destroy(command) => (command, Direction::Uninstall),
        Command::Init(command) => {
            let processor = Processor::new(&renderer, &ui).with_policy(command.install.policy());
            let blueprint = context.require(&command.blueprint)?;
            let mut options = command.install.apply(InstallOptions::new(Arc::clone(&project)));
            options.entity = Some(Entity::new(command.name.unwrap_or_else(|| project.name())));
            options.target_files = command.globs;

            processor.install(&blueprint, &options)?;
            return Ok(());
        }
    };

    let processor = Processor::new(&renderer, &ui).with_policy(command.install.policy());
    let main = context.require(&command.blueprint)?;
    let mut options = command.install.apply(InstallOptions::new(Arc::clone(&project)));
    options.entity = command.entity();
    options.custom = parse_custom_args(&command.blueprint_options, main.available_options());

    GenerateTask::new(&processor, context).run(&command.blueprint, &options, direction)?;

    Ok(())
}
