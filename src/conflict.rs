//! Classification of rendered files against what is already on disk, and
//! resolution of the differing ones.

use log::debug;
use similar::TextDiff;

use crate::error::{Error, Result};
use crate::processor::ActionKind;
use crate::prompt::Ui;

/// How a rendered file relates to the existing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    New,
    Identical,
    Differing,
}

/// Compares a rendered file with the current destination content.
pub fn classify(existing: Option<&[u8]>, rendered: &[u8]) -> Classification {
    match existing {
        None => Classification::New,
        Some(existing) if existing == rendered => Classification::Identical,
        Some(_) => Classification::Differing,
    }
}

/// What to do with a differing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Ask the user for each differing file
    #[default]
    Prompt,
    Overwrite,
    Skip,
}

/// A user's answer to a conflict prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAnswer {
    Skip,
    Overwrite,
    /// Show the differences and ask again
    Diff,
    Quit,
}

impl ConflictAnswer {
    pub const ALL: [ConflictAnswer; 4] = [
        ConflictAnswer::Overwrite,
        ConflictAnswer::Skip,
        ConflictAnswer::Diff,
        ConflictAnswer::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConflictAnswer::Skip => "No, skip",
            ConflictAnswer::Overwrite => "Yes, overwrite",
            ConflictAnswer::Diff => "Diff",
            ConflictAnswer::Quit => "Quit",
        }
    }
}

/// Unified diff between the existing and the rendered content.
pub fn unified_diff(path: &str, existing: &[u8], rendered: &[u8]) -> String {
    let old = String::from_utf8_lossy(existing);
    let new = String::from_utf8_lossy(rendered);
    TextDiff::from_lines(old.as_ref(), new.as_ref())
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

/// Decides between overwriting and skipping a differing file.
///
/// # Arguments
/// * `ui` - Asked when the policy is [`ConflictPolicy::Prompt`]
/// * `policy` - Conflict policy of the processor
/// * `path` - Destination path relative to the target, for display
/// * `existing` - Current destination content
/// * `rendered` - Content the blueprint would write
///
/// # Errors
/// * `Error::ConflictAbort` if the user quits
pub fn resolve_conflict(
    ui: &dyn Ui,
    policy: ConflictPolicy,
    path: &str,
    existing: &[u8],
    rendered: &[u8],
) -> Result<ActionKind> {
    match policy {
        ConflictPolicy::Overwrite => return Ok(ActionKind::Overwrite),
        ConflictPolicy::Skip => return Ok(ActionKind::Skip),
        ConflictPolicy::Prompt => {}
    }

    loop {
        let answer = ui.prompt_conflict(path)?;
        debug!("Conflict on {path} answered with {answer:?}");
        match answer {
            ConflictAnswer::Skip => return Ok(ActionKind::Skip),
            ConflictAnswer::Overwrite => return Ok(ActionKind::Overwrite),
            ConflictAnswer::Diff => ui.write_line(&unified_diff(path, existing, rendered)),
            ConflictAnswer::Quit => return Err(Error::ConflictAbort),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(None, b"a"), Classification::New);
        assert_eq!(classify(Some(b"a"), b"a"), Classification::Identical);
        assert_eq!(classify(Some(b"a"), b"b"), Classification::Differing);
    }

    #[test]
    fn test_unified_diff() {
        let diff = unified_diff("foo.txt", b"one\ntwo\n", b"one\nthree\n");
        assert!(diff.contains("--- a/foo.txt"));
        assert!(diff.contains("-two"));
        assert!(diff.contains("+three"));
    }
}
