//! User interaction: status lines and conflict prompts.

use dialoguer::Select;
use std::cell::RefCell;

use crate::conflict::ConflictAnswer;
use crate::error::{Error, Result};

/// Output and interactive input of the engine.
pub trait Ui {
    /// Writes one status line.
    fn write_line(&self, line: &str);

    /// Asks what to do with a destination file that differs from the
    /// rendered one.
    ///
    /// # Arguments
    /// * `path` - Destination path relative to the target
    fn prompt_conflict(&self, path: &str) -> Result<ConflictAnswer>;
}

/// Terminal implementation backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerUi;

impl DialoguerUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for DialoguerUi {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }

    fn prompt_conflict(&self, path: &str) -> Result<ConflictAnswer> {
        let labels: Vec<&str> = ConflictAnswer::ALL.iter().map(ConflictAnswer::label).collect();
        let selection = Select::new()
            .with_prompt(format!("Overwrite {path}?"))
            .default(0)
            .items(&labels)
            .interact()?;

        Ok(ConflictAnswer::ALL[selection])
    }
}

/// Non-interactive implementation that records every line and answers
/// conflicts from a queue.
#[derive(Debug, Default)]
pub struct RecordingUi {
    lines: RefCell<Vec<String>>,
    answers: RefCell<Vec<ConflictAnswer>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues answers, returned in order.
    pub fn with_answers<I: IntoIterator<Item = ConflictAnswer>>(answers: I) -> Self {
        let mut answers: Vec<ConflictAnswer> = answers.into_iter().collect();
        answers.reverse();
        Self { lines: RefCell::default(), answers: RefCell::new(answers) }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// Every recorded line joined with newlines.
    pub fn output(&self) -> String {
        self.lines.borrow().join("\n")
    }
}

impl Ui for RecordingUi {
    fn write_line(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_string());
    }

    fn prompt_conflict(&self, path: &str) -> Result<ConflictAnswer> {
        self.answers.borrow_mut().pop().ok_or_else(|| {
            Error::ConfigError(format!("No answer available for the conflict on {path}"))
        })
    }
}
