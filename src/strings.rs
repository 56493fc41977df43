//! Naming tokens derived from entity names.
//!
//! The case conversions follow the conventions blueprint templates are
//! written against: `dasherize` keeps path separators, `classify` and
//! `camelize` treat `-`, `_`, `.` and whitespace as word boundaries.

use cruet::Inflector;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static DECAMELIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());
static DASHERIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ _]").unwrap());
static CAMELIZE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.\s]+(.)?").unwrap());
static CAMELIZE_LEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|/)([A-Z])").unwrap());
static CLASSIFY_LEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-_]+(.)?").unwrap());
static CLASSIFY_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)[-_.\s]+(.)?").unwrap());
static CLASSIFY_INITIALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/|\.)([a-z])").unwrap());

fn upper(caps: &Captures<'_>, group: usize) -> String {
    caps.get(group).map(|m| m.as_str().to_uppercase()).unwrap_or_default()
}

/// `innerHTML` -> `inner_html`
pub fn decamelize(s: &str) -> String {
    DECAMELIZE.replace_all(s, "${1}_${2}").to_lowercase()
}

/// `innerHTML` -> `inner-html`, `foo/barBaz` -> `foo/bar-baz`
pub fn dasherize(s: &str) -> String {
    DASHERIZE.replace_all(&decamelize(s), "-").into_owned()
}

/// `mock-project` -> `mockProject`
pub fn camelize(s: &str) -> String {
    let joined = CAMELIZE_WORDS.replace_all(s, |caps: &Captures<'_>| upper(caps, 1));
    CAMELIZE_LEADING
        .replace_all(&joined, |caps: &Captures<'_>| caps[0].to_lowercase())
        .into_owned()
}

/// `mock-project` -> `MockProject`
pub fn classify(s: &str) -> String {
    let parts: Vec<String> = s
        .split('/')
        .map(|part| {
            let part = CLASSIFY_LEADING.replace(part, |caps: &Captures<'_>| {
                caps.get(1).map(|m| format!("_{}", m.as_str().to_uppercase())).unwrap_or_default()
            });
            CLASSIFY_WORDS
                .replace_all(&part, |caps: &Captures<'_>| format!("{}{}", &caps[1], upper(caps, 2)))
                .into_owned()
        })
        .collect();

    CLASSIFY_INITIALS
        .replace_all(&parts.join("/"), |caps: &Captures<'_>| caps[0].to_uppercase())
        .into_owned()
}

pub fn pluralize(s: &str) -> String {
    s.to_plural()
}

pub fn singularize(s: &str) -> String {
    s.to_singular()
}

/// The case family of one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTokens {
    pub camelized: String,
    pub classified: String,
    pub dasherized: String,
    pub decamelized: String,
}

impl NameTokens {
    /// Derives every case variant of `name`.
    ///
    /// Path separators are kept in the dasherized form (it is used to build
    /// paths) and replaced by dashes in the others.
    pub fn new(name: &str) -> Self {
        let sanitized = name.replace('/', "-");
        Self {
            camelized: camelize(&sanitized),
            classified: classify(&sanitized),
            dasherized: dasherize(name),
            decamelized: decamelize(&sanitized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dasherize() {
        assert_eq!(dasherize("mock-project"), "mock-project");
        assert_eq!(dasherize("innerHTML"), "inner-html");
        assert_eq!(dasherize("action_name"), "action-name");
        assert_eq!(dasherize("css class name"), "css-class-name");
        assert_eq!(dasherize("foo/barBaz"), "foo/bar-baz");
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("mock-project"), "mockProject");
        assert_eq!(camelize("innerHTML"), "innerHTML");
        assert_eq!(camelize("action_name"), "actionName");
        assert_eq!(camelize("PrivateDocs/OwnerInvoice"), "privateDocs/ownerInvoice");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("mock-project"), "MockProject");
        assert_eq!(classify("foo-bar-baz"), "FooBarBaz");
        assert_eq!(classify("my favorite items"), "MyFavoriteItems");
        assert_eq!(classify("private-docs/owner-invoice"), "PrivateDocs/OwnerInvoice");
    }

    #[test]
    fn test_decamelize() {
        assert_eq!(decamelize("innerHTML"), "inner_html");
        assert_eq!(decamelize("mock-project"), "mock-project");
    }

    #[test]
    fn test_name_tokens_sanitizes_separators() {
        let tokens = NameTokens::new("foo/bar-baz");
        assert_eq!(tokens.dasherized, "foo/bar-baz");
        assert_eq!(tokens.classified, "FooBarBaz");
        assert_eq!(tokens.camelized, "fooBarBaz");
        assert_eq!(tokens.decamelized, "foo-bar-baz");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("test"), "tests");
        assert_eq!(pluralize("component"), "components");
        assert_eq!(singularize("components"), "component");
    }
}
