//! Template rendering for blueprint files.
//! File contents are MiniJinja templates rendered against the call's
//! locals, with the naming conversions available as filters.
use crate::error::{Error, Result};
use crate::strings;
use minijinja::Environment;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer that keeps trailing newlines and knows the
    /// `camelize`, `classify`, `dasherize`, `decamelize`, `pluralize` and
    /// `singularize` filters.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_filter("camelize", |value: String| strings::camelize(&value));
        env.add_filter("classify", |value: String| strings::classify(&value));
        env.add_filter("dasherize", |value: String| strings::dasherize(&value));
        env.add_filter("decamelize", |value: String| strings::decamelize(&value));
        env.add_filter("pluralize", |value: String| strings::pluralize(&value));
        env.add_filter("singularize", |value: String| strings::singularize(&value));
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - JSON context for variable interpolation
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    ///
    /// # Errors
    /// * `Error::MinijinjaError` if the template does not parse or fails to render
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env.render_str(template, context).map_err(Error::MinijinjaError)
    }
}
