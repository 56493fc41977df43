//! Install and uninstall pipeline.
//! Maps every blueprint file to its destination, renders it, classifies it
//! against the target tree and commits the resulting action.

use indexmap::IndexMap;
use log::debug;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::blueprint::{list_files, Blueprint};
use crate::conflict::{classify, resolve_conflict, Classification, ConflictPolicy};
use crate::constants::PROJECT_MANIFEST;
use crate::error::{Error, Result};
use crate::file_map::map_path;
use crate::hooks::Chain;
use crate::ignore::IgnoreConfig;
use crate::locals::LocalsBag;
use crate::options::InstallOptions;
use crate::prompt::Ui;
use crate::renderer::TemplateRenderer;

/// Outcome of one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Identical,
    Skip,
    Overwrite,
    Remove,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Identical => "identical",
            ActionKind::Skip => "skip",
            ActionKind::Overwrite => "overwrite",
            ActionKind::Remove => "remove",
        }
    }

    /// Name of the dispatch table entry committing this action.
    pub fn commit_action(&self) -> &'static str {
        match self {
            ActionKind::Create | ActionKind::Overwrite => "write",
            ActionKind::Identical | ActionKind::Skip => "skip",
            ActionKind::Remove => "remove",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the action log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallAction {
    pub kind: ActionKind,
    /// Destination path relative to the target
    pub path: PathBuf,
    /// Rendered content for installs, removed content for removals
    pub content: Vec<u8>,
}

/// Ordered record of everything one call did.
pub type ActionLog = Vec<InstallAction>;

/// Where one blueprint file comes from and goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub source: PathBuf,
    /// Destination relative to the target, `/`-separated
    pub relative: String,
    pub output: PathBuf,
}

/// Commits one action to the file system.
pub type ActionFn = fn(&FileInfo, &InstallAction, &InstallOptions) -> Result<()>;

/// Named commit functions, looked up by [`ActionKind::commit_action`].
#[derive(Clone)]
pub struct ActionTable {
    actions: IndexMap<&'static str, ActionFn>,
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.actions.keys()).finish()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("write", write_action);
        table.insert("skip", skip_action);
        table.insert("remove", remove_action);
        table
    }
}

impl ActionTable {
    pub fn empty() -> Self {
        Self { actions: IndexMap::new() }
    }

    pub fn insert(&mut self, name: &'static str, action: ActionFn) {
        self.actions.insert(name, action);
    }

    pub fn remove(&mut self, name: &str) -> Option<ActionFn> {
        self.actions.shift_remove(name)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn get(&self, name: &str) -> Option<ActionFn> {
        self.actions.get(name).copied()
    }
}

fn write_action(info: &FileInfo, action: &InstallAction, options: &InstallOptions) -> Result<()> {
    if options.dry_run {
        return Ok(());
    }
    if let Some(parent) = info.output.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!("Writing file: {}", info.output.display());
    fs::write(&info.output, &action.content)?;
    Ok(())
}

fn skip_action(info: &FileInfo, _: &InstallAction, _: &InstallOptions) -> Result<()> {
    debug!("Leaving file untouched: {}", info.output.display());
    Ok(())
}

fn remove_action(info: &FileInfo, _: &InstallAction, options: &InstallOptions) -> Result<()> {
    if options.dry_run {
        return Ok(());
    }
    debug!("Removing file: {}", info.output.display());
    fs::remove_file(&info.output)?;
    prune_empty_dirs(info.output.parent(), &options.target)
}

/// Removes `dir` and its ancestors while they are empty, stopping at `root`.
fn prune_empty_dirs(dir: Option<&Path>, root: &Path) -> Result<()> {
    let mut current = dir;
    while let Some(dir) = current {
        if dir == root || !dir.starts_with(root) || fs::read_dir(dir)?.next().is_some() {
            break;
        }
        debug!("Removing empty directory: {}", dir.display());
        fs::remove_dir(dir)?;
        current = dir.parent();
    }
    Ok(())
}

fn target_matcher(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}

/// Fails when `--in-repo-addon` or `--in` names an addon that is not there.
fn check_addon_target(options: &InstallOptions) -> Result<()> {
    if let Some(name) = &options.in_repo_addon {
        if options.project.find_addon(name).is_none() {
            return Err(Error::ValidationError(format!(
                "You specified the 'in-repo-addon' flag, but the in-repo-addon '{name}' does not \
                 exist. Please check the name and try again."
            )));
        }
    }
    if let Some(dir) = &options.in_ {
        let dir = options.project.root().join(dir);
        if !dir.join(PROJECT_MANIFEST).is_file() {
            return Err(Error::ValidationError(format!(
                "You specified the 'in' flag, but the addon at '{}' does not exist. Please check \
                 the path and try again.",
                dir.display()
            )));
        }
    }
    Ok(())
}

/// Installs and uninstalls blueprints.
pub struct Processor<'a> {
    renderer: &'a dyn TemplateRenderer,
    ui: &'a dyn Ui,
    ignore: IgnoreConfig,
    policy: ConflictPolicy,
    actions: ActionTable,
}

impl<'a> Processor<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, ui: &'a dyn Ui) -> Self {
        Self {
            renderer,
            ui,
            ignore: IgnoreConfig::default(),
            policy: ConflictPolicy::default(),
            actions: ActionTable::default(),
        }
    }

    pub fn with_ignore(mut self, ignore: IgnoreConfig) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn ui(&self) -> &dyn Ui {
        self.ui
    }

    pub fn actions_mut(&mut self) -> &mut ActionTable {
        &mut self.actions
    }

    /// Installs `blueprint` into `options.target`.
    ///
    /// # Arguments
    /// * `blueprint` - Blueprint to install
    /// * `options` - Invocation options
    ///
    /// # Returns
    /// * `Result<ActionLog>` - Every action taken, in file order, including
    ///   those of lifecycle hooks
    ///
    /// # Flow
    /// 1. Normalizes the entity name and checks addon flags
    /// 2. Computes locals and the file map
    /// 3. Runs `before_install`
    /// 4. Maps, renders, classifies and commits every file
    /// 5. Runs `after_install`
    pub fn install(&self, blueprint: &Blueprint, options: &InstallOptions) -> Result<ActionLog> {
        self.ui.write_line(&format!("installing {}", blueprint.name()));

        let options = blueprint.normalize_options(options)?;
        check_addon_target(&options)?;
        let locals = blueprint.locals(&options)?;
        let mut log = ActionLog::new();

        self.run_hook(blueprint, &options, &locals, &mut log, |chain, session| {
            chain.before_install(session)
        })?;

        let files = self.plan(blueprint, &options, &locals)?;
        if files.is_empty() && !options.target_files.is_empty() {
            self.ui.write_line(&format!(
                "The globPattern \"{}\" did not match any files, so no file updates will be made.",
                options.target_files.join(" ")
            ));
        }

        let context = locals.to_context();
        for info in files {
            let rendered = self.render(&info, &context)?;
            let existing = if info.output.is_file() { Some(fs::read(&info.output)?) } else { None };

            let kind = match classify(existing.as_deref(), &rendered) {
                Classification::New => ActionKind::Create,
                Classification::Identical => ActionKind::Identical,
                Classification::Differing => resolve_conflict(
                    self.ui,
                    self.policy,
                    &info.relative,
                    existing.as_deref().unwrap_or_default(),
                    &rendered,
                )?,
            };

            let action = InstallAction { kind, path: PathBuf::from(&info.relative), content: rendered };
            self.commit(&info, &action, &options)?;
            self.report(&action);
            log.push(action);
        }

        self.run_hook(blueprint, &options, &locals, &mut log, |chain, session| {
            chain.after_install(session)
        })?;

        Ok(log)
    }

    /// Removes the files `blueprint` would install.
    ///
    /// Destination files that do not exist are left out of the log.
    /// Directories emptied by a removal are pruned up to the target.
    pub fn uninstall(&self, blueprint: &Blueprint, options: &InstallOptions) -> Result<ActionLog> {
        self.ui.write_line(&format!("uninstalling {}", blueprint.name()));

        let options = blueprint.normalize_options(options)?;
        check_addon_target(&options)?;
        let locals = blueprint.locals(&options)?;
        let mut log = ActionLog::new();

        self.run_hook(blueprint, &options, &locals, &mut log, |chain, session| {
            chain.before_uninstall(session)
        })?;

        for info in self.plan(blueprint, &options, &locals)? {
            if !info.output.is_file() {
                debug!("Nothing to remove at {}", info.output.display());
                continue;
            }
            let content = fs::read(&info.output)?;
            let action =
                InstallAction { kind: ActionKind::Remove, path: PathBuf::from(&info.relative), content };
            self.commit(&info, &action, &options)?;
            self.report(&action);
            log.push(action);
        }

        self.run_hook(blueprint, &options, &locals, &mut log, |chain, session| {
            chain.after_uninstall(session)
        })?;

        Ok(log)
    }

    fn run_hook<F>(
        &self,
        blueprint: &Blueprint,
        options: &InstallOptions,
        locals: &LocalsBag,
        log: &mut ActionLog,
        hook: F,
    ) -> Result<()>
    where
        F: FnOnce(Chain<'_>, &mut Session<'_>) -> Result<()>,
    {
        let mut session = Session { processor: self, options, locals, log };
        hook(blueprint.chain(), &mut session)
    }

    /// Maps blueprint files to destinations, dropping ignored files and
    /// files outside the target allow-list.
    pub fn plan(&self, blueprint: &Blueprint, options: &InstallOptions, locals: &LocalsBag) -> Result<Vec<FileInfo>> {
        let files_path = blueprint.files_path(options)?;
        let ignore = self.ignore.matcher(options.project.is_existing_project())?;
        let targets = target_matcher(&options.target_files)?;

        let mut files = Vec::new();
        for source in list_files(&files_path)? {
            let relative = map_path(&source, &locals.file_map);
            if ignore.is_ignored(&source) || ignore.is_ignored(&relative) {
                debug!("Ignoring blueprint file {source}");
                continue;
            }
            if let Some(targets) = &targets {
                if !targets.is_match(&relative) && !targets.is_match(&source) {
                    continue;
                }
            }
            files.push(FileInfo {
                output: options.target.join(&relative),
                source: files_path.join(&source),
                relative,
            });
        }
        Ok(files)
    }

    /// Renders a text file; binary files are passed through untouched.
    fn render(&self, info: &FileInfo, context: &serde_json::Value) -> Result<Vec<u8>> {
        let raw = fs::read(&info.source)?;
        match String::from_utf8(raw) {
            Ok(text) => self
                .renderer
                .render(&text, context)
                .map(String::into_bytes)
                .map_err(|e| Error::TemplateError(format!("{}: {}", info.relative, e))),
            Err(binary) => {
                debug!("Copying binary file {}", info.relative);
                Ok(binary.into_bytes())
            }
        }
    }

    fn commit(&self, info: &FileInfo, action: &InstallAction, options: &InstallOptions) -> Result<()> {
        let name = action.kind.commit_action();
        let commit = self
            .actions
            .get(name)
            .ok_or_else(|| Error::ActionDispatchError { action: name.to_string() })?;
        commit(info, action, options)
    }

    fn report(&self, action: &InstallAction) {
        self.ui.write_line(&format!("  {} {}", action.kind, action.path.display()));
    }
}

/// What lifecycle hooks can see and do during one call.
pub struct Session<'s> {
    processor: &'s Processor<'s>,
    options: &'s InstallOptions,
    locals: &'s LocalsBag,
    log: &'s mut ActionLog,
}

impl<'s> Session<'s> {
    pub fn options(&self) -> &InstallOptions {
        self.options
    }

    pub fn locals(&self) -> &LocalsBag {
        self.locals
    }

    pub fn ui(&self) -> &dyn Ui {
        self.processor.ui
    }

    /// Actions taken so far.
    pub fn actions(&self) -> &[InstallAction] {
        self.log.as_slice()
    }

    /// Removes a file relative to the target and records it.
    ///
    /// # Returns
    /// * `Result<bool>` - `false` if there was nothing to remove
    pub fn remove_file(&mut self, relative: &str) -> Result<bool> {
        let info = FileInfo {
            source: PathBuf::new(),
            relative: relative.to_string(),
            output: self.options.target.join(relative),
        };
        if !info.output.is_file() {
            return Ok(false);
        }

        let content = fs::read(&info.output)?;
        let action = InstallAction { kind: ActionKind::Remove, path: PathBuf::from(relative), content };
        self.processor.commit(&info, &action, self.options)?;
        self.processor.report(&action);
        self.log.push(action);
        Ok(true)
    }

    /// Installs another blueprint with the same processor, appending its
    /// actions to this call's log.
    pub fn install(&mut self, blueprint: &Blueprint, options: &InstallOptions) -> Result<()> {
        let actions = self.processor.install(blueprint, options)?;
        self.log.extend(actions);
        Ok(())
    }

    pub fn uninstall(&mut self, blueprint: &Blueprint, options: &InstallOptions) -> Result<()> {
        let actions = self.processor.uninstall(blueprint, options)?;
        self.log.extend(actions);
        Ok(())
    }
}
