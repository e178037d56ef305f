//! Output template filling
//!
//! Templates name sections with single braces (`{role}`); `{{` and `}}` are
//! literal braces. Every section must appear, and unknown names are rejected.

use thiserror::Error;

pub const DEFAULT_OUTPUT_TEMPLATE: &str =
    "{role}\n{intro}\n{objectives}\n{parameters}\n{how}\n{restrictions}\n{format}\n{content}";

/// Placeholders every output template must contain
pub const TEMPLATE_FIELDS: [&str; 8] = [
    "role",
    "intro",
    "objectives",
    "parameters",
    "how",
    "restrictions",
    "format",
    "content",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("Output template is missing placeholder {{{0}}}")]
    MissingPlaceholder(String),

    #[error("Output template references unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),

    #[error("Unbalanced brace in output template at byte {0}")]
    UnbalancedBrace(usize),
}

/// Fill `template` with `values`; nothing is returned unless every field was placed
pub fn fill(template: &str, values: &[(&str, &str)]) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut seen: Vec<&str> = Vec::with_capacity(values.len());
    let mut rest = template;

    while let Some(idx) = rest.find(['{', '}']) {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        let position = template.len() - tail.len();

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if tail.starts_with('}') {
            return Err(PromptError::UnbalancedBrace(position));
        } else {
            let close = tail
                .find('}')
                .ok_or(PromptError::UnbalancedBrace(position))?;
            let name = &tail[1..close];
            let (key, value) = values
                .iter()
                .find(|(k, _)| *k == name)
                .ok_or_else(|| PromptError::UnknownPlaceholder(name.to_string()))?;
            out.push_str(value);
            if !seen.contains(key) {
                seen.push(*key);
            }
            rest = &tail[close + 1..];
        }
    }
    out.push_str(rest);

    if let Some((missing, _)) = values.iter().find(|(k, _)| !seen.contains(k)) {
        return Err(PromptError::MissingPlaceholder(missing.to_string()));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_fields() -> Vec<(&'static str, &'static str)> {
        TEMPLATE_FIELDS.iter().map(|f| (*f, *f)).collect()
    }

    #[test]
    fn test_default_template_order() {
        let filled = fill(DEFAULT_OUTPUT_TEMPLATE, &all_fields()).unwrap();
        assert_eq!(
            filled,
            "role\nintro\nobjectives\nparameters\nhow\nrestrictions\nformat\ncontent"
        );
    }

    #[test]
    fn test_escaped_braces() {
        let template = "{{json}} {role}{intro}{objectives}{parameters}{how}{restrictions}{format}{content} }}";
        let filled = fill(template, &all_fields()).unwrap();
        assert!(filled.starts_with("{json} role"));
        assert!(filled.ends_with("content }"));
    }

    #[test]
    fn test_missing_placeholder() {
        let template = "{role}\n{intro}\n{objectives}\n{parameters}\n{how}\n{restrictions}\n{format}";
        assert_eq!(
            fill(template, &all_fields()),
            Err(PromptError::MissingPlaceholder("content".to_string()))
        );
    }

    #[test]
    fn test_unknown_placeholder() {
        let template = format!("{DEFAULT_OUTPUT_TEMPLATE}\n{{footer}}");
        assert_eq!(
            fill(&template, &all_fields()),
            Err(PromptError::UnknownPlaceholder("footer".to_string()))
        );
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(
            fill("{role", &all_fields()),
            Err(PromptError::UnbalancedBrace(0))
        );
        assert_eq!(
            fill("x } y", &all_fields()),
            Err(PromptError::UnbalancedBrace(2))
        );
    }

    #[test]
    fn test_repeated_placeholder_allowed() {
        let template = format!("{{role}} {DEFAULT_OUTPUT_TEMPLATE}");
        let filled = fill(&template, &all_fields()).unwrap();
        assert!(filled.starts_with("role role\n"));
    }

    #[test]
    fn test_error_message() {
        let err = PromptError::MissingPlaceholder("how".to_string());
        assert_eq!(err.to_string(), "Output template is missing placeholder {how}");
    }
}
