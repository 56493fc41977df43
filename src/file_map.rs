//! File-map tokens: placeholder path segments such as `__name__` or
//! `__root__` resolved per invocation into concrete path segments.

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use crate::constants::RENAMED_FILES;
use crate::error::Result;
use crate::locals::Locals;
use crate::strings::pluralize;

/// Reserved name that must never become a path token.
pub const LOCALS_KEY: &str = "locals";

/// Inputs every token resolver sees.
///
/// Computed once per install/uninstall call and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMapVariables {
    pub dasherized_module_name: String,
    pub blueprint_name: String,
    pub origin_blueprint_name: String,
    pub pod: bool,
    pub pod_path: String,
    pub has_path_token: bool,
    pub in_addon: bool,
    pub in_dummy: bool,
    pub in_repo_addon: Option<String>,
    /// Location of the in-repo addon, relative to the project root
    pub in_repo_addon_root: Option<String>,
    /// Addon directory given through `--in`, relative to the project root
    #[serde(rename = "in")]
    pub in_: Option<String>,
    pub locals: Locals,
}

impl FileMapVariables {
    /// Whether the pod layout replaces `__name__`/`__path__`/`__test__`.
    pub fn uses_pod_path(&self) -> bool {
        self.pod && self.has_path_token
    }
}

/// Resolves one token to a path segment.
pub type TokenFn = Arc<dyn Fn(&FileMapVariables) -> Result<String>>;

/// Token name to resolver, in substitution order.
pub type FileMapTokens = IndexMap<String, TokenFn>;

/// Token name to the concrete segment for one invocation.
pub type FileMap = IndexMap<String, String>;

pub fn token<F>(resolve: F) -> TokenFn
where
    F: Fn(&FileMapVariables) -> String + 'static,
{
    Arc::new(move |vars| Ok(resolve(vars)))
}

/// A resolver that can fail, e.g. one rendering a template.
pub fn try_token<F>(resolve: F) -> TokenFn
where
    F: Fn(&FileMapVariables) -> Result<String> + 'static,
{
    Arc::new(resolve)
}

/// Joins two `/`-separated path fragments, ignoring an empty head.
pub fn join_segments(head: &str, tail: &str) -> String {
    if head.is_empty() {
        tail.to_string()
    } else {
        format!("{}/{}", head.trim_end_matches('/'), tail)
    }
}

/// The tokens every blueprint gets.
pub fn standard_tokens() -> FileMapTokens {
    let mut tokens = FileMapTokens::new();

    tokens.insert(
        "__name__".to_string(),
        token(|vars| {
            if vars.uses_pod_path() {
                vars.blueprint_name.clone()
            } else {
                vars.dasherized_module_name.clone()
            }
        }),
    );

    tokens.insert(
        "__path__".to_string(),
        token(|vars| {
            if vars.uses_pod_path() {
                return join_segments(&vars.pod_path, &vars.dasherized_module_name);
            }
            let blueprint_name = match vars.blueprint_name.find("-test") {
                Some(index) => &vars.blueprint_name[..index],
                None => vars.blueprint_name.as_str(),
            };
            pluralize(blueprint_name)
        }),
    );

    tokens.insert(
        "__root__".to_string(),
        token(|vars| {
            if let Some(addon_root) = &vars.in_repo_addon_root {
                return join_segments(addon_root, "addon");
            }
            if let Some(dir) = &vars.in_ {
                return join_segments(dir, "addon");
            }
            if vars.in_dummy {
                return "tests/dummy/app".to_string();
            }
            if vars.in_addon {
                return "addon".to_string();
            }
            "app".to_string()
        }),
    );

    tokens.insert(
        "__test__".to_string(),
        token(|vars| {
            if vars.uses_pod_path() {
                vars.blueprint_name.clone()
            } else {
                format!("{}-test", vars.dasherized_module_name)
            }
        }),
    );

    tokens
}

/// Layers custom tokens over the standard ones; a custom token with a
/// standard name replaces the resolver but keeps its position.
pub fn merge_tokens(mut base: FileMapTokens, custom: FileMapTokens) -> FileMapTokens {
    for (name, resolve) in custom {
        base.insert(name, resolve);
    }
    base
}

/// Applies every resolver to `vars`.
///
/// # Errors
/// * The first error a resolver returns
pub fn resolve_tokens(tokens: &FileMapTokens, vars: &FileMapVariables) -> Result<FileMap> {
    tokens
        .iter()
        .filter(|(name, _)| name.as_str() != LOCALS_KEY)
        .map(|(name, resolve)| Ok((name.clone(), resolve(vars)?)))
        .collect()
}

/// Maps a `/`-separated source path to its destination path.
pub fn map_path(relative: &str, file_map: &FileMap) -> String {
    let renamed = RENAMED_FILES
        .iter()
        .find(|(from, _)| *from == relative)
        .map(|(_, to)| *to)
        .unwrap_or(relative);

    file_map
        .iter()
        .fold(renamed.to_string(), |path, (token, value)| path.replace(token.as_str(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> FileMapVariables {
        FileMapVariables {
            dasherized_module_name: "foo-baz".to_string(),
            blueprint_name: "controller".to_string(),
            origin_blueprint_name: "controller".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_classic_layout() {
        let map = resolve_tokens(&standard_tokens(), &vars()).unwrap();
        assert_eq!(map["__name__"], "foo-baz");
        assert_eq!(map["__path__"], "controllers");
        assert_eq!(map["__root__"], "app");
        assert_eq!(map["__test__"], "foo-baz-test");
    }

    #[test]
    fn test_pod_layout_with_path_token() {
        let vars = FileMapVariables {
            pod: true,
            has_path_token: true,
            pod_path: "pods".to_string(),
            ..vars()
        };
        let map = resolve_tokens(&standard_tokens(), &vars).unwrap();
        assert_eq!(map["__name__"], "controller");
        assert_eq!(map["__path__"], "pods/foo-baz");
        assert_eq!(map["__test__"], "controller");
    }

    #[test]
    fn test_path_strips_test_suffix() {
        let vars = FileMapVariables { blueprint_name: "service-test".to_string(), ..vars() };
        let map = resolve_tokens(&standard_tokens(), &vars).unwrap();
        assert_eq!(map["__path__"], "services");
    }

    #[test]
    fn test_root_variants() {
        let root = |vars: FileMapVariables| resolve_tokens(&standard_tokens(), &vars).unwrap()["__root__"].clone();

        assert_eq!(root(FileMapVariables { in_addon: true, ..vars() }), "addon");
        assert_eq!(
            root(FileMapVariables { in_addon: true, in_dummy: true, ..vars() }),
            "tests/dummy/app"
        );
        assert_eq!(
            root(FileMapVariables {
                in_addon: true,
                in_repo_addon: Some("other-thing".to_string()),
                in_repo_addon_root: Some("non-lib/other-thing".to_string()),
                ..vars()
            }),
            "non-lib/other-thing/addon"
        );
        assert_eq!(root(FileMapVariables { in_: Some("lib/thing".to_string()), ..vars() }), "lib/thing/addon");
    }

    #[test]
    fn test_custom_tokens_merge_over_standard() {
        let mut custom = FileMapTokens::new();
        custom.insert("__foo__".to_string(), token(|_| "foo".to_string()));
        custom.insert("__root__".to_string(), token(|_| "src".to_string()));

        let map = resolve_tokens(&merge_tokens(standard_tokens(), custom), &vars()).unwrap();
        assert_eq!(map["__foo__"], "foo");
        assert_eq!(map["__root__"], "src");
        assert_eq!(map["__name__"], "foo-baz");
    }

    #[test]
    fn test_locals_key_is_never_resolved() {
        let mut custom = FileMapTokens::new();
        custom.insert(LOCALS_KEY.to_string(), token(|_| "oops".to_string()));

        let map = resolve_tokens(&merge_tokens(standard_tokens(), custom), &vars()).unwrap();
        assert!(!map.contains_key(LOCALS_KEY));
    }

    #[test]
    fn test_failing_resolver_is_an_error() {
        let mut custom = FileMapTokens::new();
        custom.insert(
            "__lib__".to_string(),
            try_token(|_| Err(crate::error::Error::TemplateError("bad token".to_string()))),
        );

        let result = resolve_tokens(&merge_tokens(standard_tokens(), custom), &vars());
        assert!(matches!(result, Err(crate::error::Error::TemplateError(_))));
    }

    #[test]
    fn test_map_path() {
        let map = resolve_tokens(&standard_tokens(), &vars()).unwrap();
        assert_eq!(map_path("__root__/__path__/__name__.js", &map), "app/controllers/foo-baz.js");
        assert_eq!(map_path("gitignore", &map), ".gitignore");
        assert_eq!(map_path("nested/gitignore", &map), "nested/gitignore");
    }
}
