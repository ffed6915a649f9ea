//! Macro expansion over an [`InstanceContext`] using `minijinja`.

use super::InstanceContext;
use minijinja::Environment;
use std::fmt;
use thiserror::Error;

/// Error returned when a macro expression cannot be rendered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to resolve macro expression '{template}': {reason}")]
pub struct TemplateError {
    /// Raw expression that failed.
    pub template: String,
    /// Renderer failure reason.
    pub reason: String,
}

/// Template engine constructed once and passed to the components that need it.
///
/// Expressions use `minijinja` syntax (`{{ tc.order.id }}`). Text without
/// any template markers is returned unchanged without invoking the renderer.
pub struct TemplateEngine {
    environment: Environment<'static>,
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine").finish_non_exhaustive()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Creates an engine with the default environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            environment: Environment::new(),
        }
    }

    /// Resolves macro expressions in `template` against `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when the expression is syntactically invalid
    /// or evaluation fails.
    pub fn resolve(
        &self,
        template: &str,
        context: &InstanceContext,
    ) -> Result<String, TemplateError> {
        if !contains_markers(template) {
            return Ok(template.to_owned());
        }

        self.environment
            .render_str(template, context.template_scope())
            .map_err(|error| TemplateError {
                template: template.to_owned(),
                reason: error.to_string(),
            })
    }
}

fn contains_markers(template: &str) -> bool {
    template.contains("{{") || template.contains("{%")
}
