//! Structured instruction prompt assembly
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Custom output templates are validated at render time
//! - 1.0.0: Sectioned builder with connectors, delimiters, and placeholder bindings

use crate::core::{sections, ConfigSource};

use super::placeholders::{Bindings, ParamValue};
use super::template::{self, PromptError, DEFAULT_OUTPUT_TEMPLATE};

/// Prefix of the trailing content line
pub const CONTENT_PREFIX: &str = "Content to perform the objective:";

pub const DEFAULT_ERROR_RESPONSE: &str = "Lo siento, no puedo ayudarte con eso";

/// Labels printed in front of each non-empty section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connectors {
    pub role: String,
    pub intro: String,
    pub objectives: String,
    pub how: String,
    pub restrictions: String,
    pub format: String,
    pub parameters: String,
}

impl Default for Connectors {
    fn default() -> Self {
        Self {
            role: "Role:".to_string(),
            intro: "Introduction:".to_string(),
            objectives: "Objectives:".to_string(),
            how: "Approach:".to_string(),
            restrictions: "Conditions:".to_string(),
            format: "Output Format:".to_string(),
            parameters: "Parametros:".to_string(),
        }
    }
}

/// Separators joining the entries of list sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub objectives: String,
    pub restrictions: String,
    pub parameters: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            objectives: "\n".to_string(),
            restrictions: "\n".to_string(),
            parameters: "\n".to_string(),
        }
    }
}

/// Builder for sectioned instruction prompts
///
/// Sections with no content render as nothing, so callers can leave any of
/// them empty without managing blank lines themselves.
///
/// # Example
///
/// ```ignore
/// let mut prompt = PromptBuilder::new().with_role("SQL expert");
/// prompt.add_objective("Translate {{input}}", Some(&Bindings::named([("input", "top users")])));
/// prompt.add_param("Dialect", "sqlite");
/// prompt.add_restriction("Only SELECT statements");
/// let text = prompt.render(None)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PromptBuilder {
    role: String,
    intro: String,
    how: String,
    format: String,
    content: String,
    error_response: String,
    objectives: Vec<String>,
    parameters: Vec<String>,
    restrictions: Vec<String>,
    connectors: Connectors,
    delimiters: Delimiters,
    output_template: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    /// Builder with every section empty and default connectors
    pub fn new() -> Self {
        Self::from_config(None, None)
    }

    /// Build from optional settings and a fallback role
    ///
    /// Each field takes the first non-empty value from: the settings, the
    /// fallback (role only), the literal default.
    pub fn from_config(config: Option<&ConfigSource>, role: Option<&str>) -> Self {
        let lookup = |section: &str, key: &str, fallback: Option<&str>, default: &str| {
            config
                .and_then(|c| c.get(section, key))
                .filter(|v| !v.is_empty())
                .or(fallback.filter(|f| !f.is_empty()))
                .unwrap_or(default)
                .to_string()
        };
        let completion = |key: &str, default: &str| lookup(sections::COMPLETION, key, None, default);
        let connector = |key: &str, default: &str| lookup(sections::CONNECTORS, key, None, default);

        let connector_defaults = Connectors::default();
        let delimiter_defaults = Delimiters::default();

        Self {
            role: lookup(sections::COMPLETION, "initial_prompt", role, ""),
            intro: completion("intro", ""),
            how: completion("how", ""),
            format: completion("format", ""),
            content: String::new(),
            error_response: completion("error_response", DEFAULT_ERROR_RESPONSE),
            objectives: Vec::new(),
            parameters: Vec::new(),
            restrictions: Vec::new(),
            connectors: Connectors {
                role: connector("role", &connector_defaults.role),
                intro: connector("intro", &connector_defaults.intro),
                objectives: connector("objectives", &connector_defaults.objectives),
                how: connector("how", &connector_defaults.how),
                restrictions: connector("restrictions", &connector_defaults.restrictions),
                format: connector("format", &connector_defaults.format),
                parameters: connector("parameters", &connector_defaults.parameters),
            },
            delimiters: Delimiters {
                objectives: completion("objective_delimiter", &delimiter_defaults.objectives),
                restrictions: completion("restriction_delimiter", &delimiter_defaults.restrictions),
                parameters: completion("parameter_delimiter", &delimiter_defaults.parameters),
            },
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = intro.into();
        self
    }

    /// Set the approach ("how") section
    pub fn with_approach(mut self, how: impl Into<String>) -> Self {
        self.how = how.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Free content, rendered only when `render` is called with `None`
    ///
    /// An explicit `Some("")` renders no content line at all.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_connectors(mut self, connectors: Connectors) -> Self {
        self.connectors = connectors;
        self
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Replace the output template; it is checked when rendering
    pub fn with_output_template(mut self, template: impl Into<String>) -> Self {
        self.output_template = template.into();
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn error_response(&self) -> &str {
        &self.error_response
    }

    pub fn connectors(&self) -> &Connectors {
        &self.connectors
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn objectives(&self) -> &[String] {
        &self.objectives
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn restrictions(&self) -> &[String] {
        &self.restrictions
    }

    /// Append an objective, filling `{{name}}` placeholders when bindings are given
    pub fn add_objective(&mut self, objective: &str, bindings: Option<&Bindings>) {
        let objective = match bindings {
            Some(b) if !b.is_empty() => b.apply(objective),
            _ => objective.to_string(),
        };
        self.objectives.push(objective);
    }

    /// Append `"\n{description}: {value}"`; falsy values are skipped
    pub fn add_param(&mut self, description: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        if value.is_truthy() {
            self.parameters.push(format!("\n{description}: {value}"));
        }
    }

    /// Append a restriction verbatim
    pub fn add_restriction(&mut self, restriction: &str) {
        self.restrictions.push(restriction.to_string());
    }

    /// Remove the last `n` objectives, or all of them when `n` is `None`
    pub fn clean_objectives(&mut self, n: Option<usize>) {
        drop_last(&mut self.objectives, n);
    }

    pub fn clean_restrictions(&mut self, n: Option<usize>) {
        drop_last(&mut self.restrictions, n);
    }

    pub fn clean_parameters(&mut self, n: Option<usize>) {
        drop_last(&mut self.parameters, n);
    }

    /// Empty the list sections; scalar sections are kept
    pub fn clear_all(&mut self) {
        self.objectives.clear();
        self.parameters.clear();
        self.restrictions.clear();
    }

    /// Render the prompt text
    ///
    /// The result is trimmed and ends with exactly one newline. Fails only
    /// when a custom output template is malformed.
    pub fn render(&self, trailing_content: Option<&str>) -> Result<String, PromptError> {
        let role = format_section(&self.connectors.role, &self.role);
        let intro = format_section(&self.connectors.intro, &self.intro);
        let objectives = format_section(
            &self.connectors.objectives,
            &self.objectives.join(self.delimiters.objectives.as_str()),
        );
        let how = format_section(&self.connectors.how, &self.how);
        let restrictions = format_section(
            &self.connectors.restrictions,
            &self.restrictions.join(self.delimiters.restrictions.as_str()),
        );
        let parameters = format_section(
            &self.connectors.parameters,
            &self.parameters.join(self.delimiters.parameters.as_str()),
        );
        let format = format_section(&self.connectors.format, &self.format);

        let trailing = trailing_content.unwrap_or(self.content.as_str());
        let content = if trailing.is_empty() {
            String::new()
        } else {
            format!("{CONTENT_PREFIX} {trailing}")
        };

        let filled = template::fill(
            &self.output_template,
            &[
                ("role", role.as_str()),
                ("intro", intro.as_str()),
                ("objectives", objectives.as_str()),
                ("parameters", parameters.as_str()),
                ("how", how.as_str()),
                ("restrictions", restrictions.as_str()),
                ("format", format.as_str()),
                ("content", content.as_str()),
            ],
        )?;

        Ok(format!("{}\n", filled.trim()))
    }
}

fn format_section(connector: &str, body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!("{connector} {body}")
    }
}

/// Truncate like `list[:-n]`: `n == 0` or `n >= len` empties the list
fn drop_last(items: &mut Vec<String>, n: Option<usize>) {
    match n {
        Some(n) if n > 0 => {
            let keep = items.len().saturating_sub(n);
            items.truncate(keep);
        }
        _ => items.clear(),
    }
}
