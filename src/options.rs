//! Per-invocation install parameters and blueprint option handling.

use log::warn;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::locals::Locals;
use crate::manifest::{AvailableOption, OptionAlias, OptionType};
use crate::project::Project;
use crate::strings::{camelize, dasherize};

/// The thing a blueprint is instantiated for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entity {
    pub name: Option<String>,
}

impl Entity {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: Some(name.into()) }
    }
}

/// Parameters of one install or uninstall call.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub project: Arc<dyn Project>,
    /// Directory the blueprint's files are installed into
    pub target: PathBuf,
    pub entity: Option<Entity>,
    pub dry_run: bool,
    pub pod: bool,
    pub in_repo_addon: Option<String>,
    /// Addon directory to generate into
    pub in_: Option<PathBuf>,
    /// Generate into the addon's dummy app
    pub dummy: bool,
    /// Set when this blueprint runs on behalf of another one
    pub origin_blueprint_name: Option<String>,
    /// Glob allow-list of destination files
    pub target_files: Vec<String>,
    /// Blueprint-specific options, keyed by camelized option name
    pub custom: Locals,
}

impl InstallOptions {
    /// Options targeting the project root with no entity.
    pub fn new(project: Arc<dyn Project>) -> Self {
        let target = project.root().to_path_buf();
        Self {
            project,
            target,
            entity: None,
            dry_run: false,
            pod: false,
            in_repo_addon: None,
            in_: None,
            dummy: false,
            origin_blueprint_name: None,
            target_files: Vec::new(),
            custom: Locals::new(),
        }
    }

    pub fn with_target<P: Into<PathBuf>>(mut self, target: P) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_entity<S: Into<String>>(mut self, name: S) -> Self {
        self.entity = Some(Entity::new(name));
        self
    }

    pub fn entity_name(&self) -> Option<&str> {
        self.entity.as_ref().and_then(|entity| entity.name.as_deref())
    }

    /// Variables blueprint manifests can reference in their `locals`.
    pub fn template_context(&self) -> Value {
        let mut options = self.custom.clone();
        options.insert("pod".to_string(), Value::Bool(self.pod));
        options.insert("dryRun".to_string(), Value::Bool(self.dry_run));
        options.insert("dummy".to_string(), Value::Bool(self.dummy));
        options.insert("inRepoAddon".to_string(), self.in_repo_addon.clone().into());
        options.insert(
            "originBlueprintName".to_string(),
            self.origin_blueprint_name.clone().into(),
        );

        serde_json::json!({
            "entity": { "name": self.entity_name() },
            "options": options,
            "project": { "name": self.project.name() },
        })
    }
}

/// Resolves a single-dash or double-dash flag through declared aliases.
///
/// Returns the canonical option and, for value aliases, the bound value.
fn find_alias<'a>(flag: &str, available: &'a [AvailableOption]) -> Option<(&'a AvailableOption, Option<Value>)> {
    available.iter().find_map(|option| {
        option.aliases.iter().find_map(|alias| match alias {
            OptionAlias::Flag(name) if name == flag => Some((option, None)),
            OptionAlias::Value(map) => map.get(flag).map(|value| (option, Some(value.clone()))),
            OptionAlias::Flag(_) => None,
        })
    })
}

/// Parses raw blueprint arguments (`--custom-command`, `--foo=two`,
/// `--foo two`, `-two`, `--no-lint`) into camelized option values.
pub fn parse_custom_args(args: &[String], available: &[AvailableOption]) -> Locals {
    let mut parsed = Locals::new();
    let mut args = args.iter().peekable();

    while let Some(arg) = args.next() {
        let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
            warn!("Ignoring unexpected argument '{arg}'");
            continue;
        };

        let (flag, inline) = match flag.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_string())),
            None => (flag, None),
        };

        let declared = match find_alias(flag, available) {
            Some((option, Some(value))) => {
                parsed.insert(camelize(&option.name), value);
                continue;
            }
            Some((option, None)) => Some(option),
            None => None,
        };

        let (name, negated) = match (declared, flag.strip_prefix("no-")) {
            (Some(option), _) => (camelize(&option.name), false),
            (None, Some(rest)) if inline.is_none() => (camelize(rest), true),
            (None, _) => (camelize(flag), false),
        };
        let declared = declared.or_else(|| available.iter().find(|o| camelize(&o.name) == name));

        let takes_value = declared.is_some_and(|o| o.option_type != OptionType::Boolean);
        let value = if negated {
            Value::Bool(false)
        } else if let Some(value) = inline {
            Value::String(value)
        } else if takes_value && args.peek().is_some_and(|next| !next.starts_with('-')) {
            args.next().map(|next| Value::String(next.clone())).unwrap_or(Value::Null)
        } else {
            Value::Bool(true)
        };

        parsed.insert(name, value);
    }

    parsed
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce(option: &AvailableOption, value: &Value) -> Result<Value> {
    let invalid = || {
        Error::ValidationError(format!(
            "Expected --{} to be a {:?} value, got '{}'",
            dasherize(&option.name),
            option.option_type,
            describe(value)
        ))
    };

    match (option.option_type, value) {
        (OptionType::String | OptionType::Path, Value::String(_)) => Ok(value.clone()),
        (OptionType::String | OptionType::Path, Value::Bool(_) | Value::Number(_)) => {
            Ok(Value::String(describe(value)))
        }
        (OptionType::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (OptionType::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        (OptionType::Number, Value::Number(_)) => Ok(value.clone()),
        (OptionType::Number, Value::String(s)) => {
            if let Ok(n) = s.parse::<i64>() {
                return Ok(Value::from(n));
            }
            s.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

/// Applies declared defaults, type coercion and allowed-value checks to
/// `custom`. Undeclared options pass through untouched.
pub fn apply_available_options(available: &[AvailableOption], custom: &mut Locals) -> Result<()> {
    for option in available {
        let key = camelize(&option.name);
        let Some(value) = custom.get(&key) else {
            if let Some(default) = &option.default {
                custom.insert(key, default.clone());
            }
            continue;
        };

        let value = coerce(option, value)?;
        if !option.values.is_empty() && !option.values.contains(&value) {
            let allowed: Vec<String> = option.values.iter().map(describe).collect();
            return Err(Error::ValidationError(format!(
                "Expected --{} to be one of: {}",
                dasherize(&option.name),
                allowed.join(", ")
            )));
        }
        custom.insert(key, value);
    }
    Ok(())
}
