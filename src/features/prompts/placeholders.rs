//! `{{name}}` placeholder substitution for objective text

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static PLACEHOLDER_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn placeholder_pattern() -> Option<&'static Regex> {
    PLACEHOLDER_PATTERN
        .get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").ok())
        .as_ref()
}

/// Distinct placeholder names in `template`, in order of first occurrence
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    if let Some(re) = placeholder_pattern() {
        for caps in re.captures_iter(template) {
            let name = &caps[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Values substituted into `{{name}}` tokens
#[derive(Debug, Clone, PartialEq)]
pub enum Bindings {
    /// Replace every `{{name}}` with its value, applied in insertion order
    Named(Vec<(String, String)>),
    /// Applied only when the count matches the distinct placeholders in the text
    Positional(Vec<String>),
}

impl Bindings {
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }

    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self::Positional(values.into_iter().map(|v| v.to_string()).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Bindings::Named(pairs) => pairs.is_empty(),
            Bindings::Positional(values) => values.is_empty(),
        }
    }

    /// Substitute placeholders in `template`; a positional length mismatch leaves it untouched
    pub fn apply(&self, template: &str) -> String {
        match self {
            Bindings::Named(pairs) => pairs.iter().fold(template.to_string(), |text, (k, v)| {
                text.replace(&token(k), v)
            }),
            Bindings::Positional(values) => {
                let names = placeholder_names(template);
                if names.len() != values.len() {
                    return template.to_string();
                }
                names
                    .iter()
                    .zip(values)
                    .fold(template.to_string(), |text, (name, value)| {
                        text.replace(&token(name), value)
                    })
            }
        }
    }
}

fn token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// A parameter value; falsy values are never rendered
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            ParamValue::None => false,
            ParamValue::Bool(b) => *b,
            ParamValue::Int(i) => *i != 0,
            ParamValue::Float(f) => *f != 0.0,
            ParamValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => Ok(()),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_replaces_every_occurrence() {
        let bindings = Bindings::named([("input", "hello")]);
        assert_eq!(
            bindings.apply("Translate {{input}} then repeat {{input}}"),
            "Translate hello then repeat hello"
        );
    }

    #[test]
    fn test_named_ignores_unknown_tokens() {
        let bindings = Bindings::named([("table", "users")]);
        assert_eq!(
            bindings.apply("Query {{table}} for {{column}}"),
            "Query users for {{column}}"
        );
    }

    #[test]
    fn test_positional_in_first_occurrence_order() {
        let bindings = Bindings::positional(["users", "email"]);
        assert_eq!(
            bindings.apply("Select {{column}} from {{table}}"),
            "Select users from email"
        );
    }

    #[test]
    fn test_positional_counts_distinct_tokens() {
        let bindings = Bindings::positional(["x"]);
        assert_eq!(bindings.apply("{{a}} and {{a}}"), "x and x");
    }

    #[test]
    fn test_positional_length_mismatch_is_noop() {
        let text = "Select {{column}} from {{table}}";
        assert_eq!(Bindings::positional(["only_one"]).apply(text), text);
        assert_eq!(Bindings::positional(["a", "b", "c"]).apply(text), text);
    }

    #[test]
    fn test_placeholder_names_distinct() {
        assert_eq!(
            placeholder_names("{{a}} {{b}} {{a}} {{$input}}"),
            vec!["a", "b", "$input"]
        );
        assert!(placeholder_names("no tokens { here }").is_empty());
    }

    #[test]
    fn test_param_truthiness() {
        assert!(!ParamValue::from("").is_truthy());
        assert!(!ParamValue::from(0).is_truthy());
        assert!(!ParamValue::from(0.0).is_truthy());
        assert!(!ParamValue::from(false).is_truthy());
        assert!(!ParamValue::from(None::<&str>).is_truthy());
        assert!(ParamValue::from("x").is_truthy());
        assert!(ParamValue::from(-1).is_truthy());
        assert!(ParamValue::from(Some(5)).is_truthy());
    }

    #[test]
    fn test_param_display() {
        assert_eq!(ParamValue::from(42).to_string(), "42");
        assert_eq!(ParamValue::from(2.5).to_string(), "2.5");
        assert_eq!(ParamValue::from(true).to_string(), "true");
        assert_eq!(ParamValue::from("mysql").to_string(), "mysql");
    }
}
