//! Inventory of the variables a configuration document declares.
//!
//! Extraction walks the same references substitution would resolve, but only
//! records each variable's name, declared default, and whether it is
//! required. Nothing is looked up.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

use super::template::{Operator, Pattern, Scanner, Token};

/// A variable referenced by a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Declared default (`-` / `:-`), unresolved.
    pub default_value: Option<String>,
    /// Declared with `?` / `:?`.
    pub required: bool,
}

impl Variable {
    fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_value: None,
            required: false,
        }
    }
}

/// Collect every variable referenced in the string leaves of `tree`.
///
/// When a name appears more than once, the last occurrence in document order
/// wins. References nested inside defaults and error messages are included.
/// `pattern` defaults to the `$` syntax.
///
/// # Example
///
/// ```
/// use compose_core::config::extract_variables;
///
/// let doc: serde_yaml::Value = serde_yaml::from_str(r#"
/// services:
///   web:
///     image: "nginx:${TAG:-latest}"
///     environment:
///       - "PASSWORD=${DB_PASSWORD:?required}"
/// "#).unwrap();
///
/// let vars = extract_variables(&doc, None);
/// assert_eq!(vars["TAG"].default_value.as_deref(), Some("latest"));
/// assert!(vars["DB_PASSWORD"].required);
/// ```
pub fn extract_variables(tree: &Value, pattern: Option<&Pattern>) -> BTreeMap<String, Variable> {
    let pattern = pattern.copied().unwrap_or_default();
    let mut found = BTreeMap::new();
    walk(tree, &pattern, &mut found);
    found
}

fn walk(value: &Value, pattern: &Pattern, found: &mut BTreeMap<String, Variable>) {
    match value {
        Value::String(s) => extract_from_str(s, pattern, found),
        Value::Mapping(map) => {
            for item in map.values() {
                walk(item, pattern, found);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                walk(item, pattern, found);
            }
        }
        Value::Tagged(tagged) => walk(&tagged.value, pattern, found),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Record the variables referenced in a single string.
pub(crate) fn extract_from_str(
    input: &str,
    pattern: &Pattern,
    found: &mut BTreeMap<String, Variable>,
) {
    let chain = Operator::chain_for(input);

    for token in Scanner::new(input, pattern) {
        let expr = match token {
            Token::Named(name) => {
                found.insert(name.to_string(), Variable::plain(name));
                continue;
            }
            Token::Braced(expr) => expr,
            Token::Literal(_) | Token::Escaped | Token::Invalid => continue,
        };

        let Some(operator) = Operator::detect(expr, &chain) else {
            found.insert(expr.to_string(), Variable::plain(expr));
            continue;
        };
        let Some((name, argument)) = expr.split_once(operator.separator()) else {
            continue;
        };

        let variable = if operator.is_required() {
            Variable {
                name: name.to_string(),
                default_value: None,
                required: true,
            }
        } else {
            Variable {
                name: name.to_string(),
                default_value: Some(argument.to_string()),
                required: false,
            }
        };
        found.insert(variable.name.clone(), variable);
        extract_from_str(argument, pattern, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn extracts_all_forms() {
        let tree = doc(r#"
services:
  web:
    image: "${IMAGE}:${TAG:-latest}"
    command: "run $MODE"
    environment:
      SECRET: "${SECRET:?secret is required}"
      OPTIONAL: "${OPTIONAL?}"
      HARD: "${HARD-fallback}"
"#);
        let vars = extract_variables(&tree, None);

        let names: Vec<&str> = vars.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["HARD", "IMAGE", "MODE", "OPTIONAL", "SECRET", "TAG"]
        );
        assert_eq!(vars["TAG"].default_value.as_deref(), Some("latest"));
        assert_eq!(vars["HARD"].default_value.as_deref(), Some("fallback"));
        assert!(vars["SECRET"].required);
        assert!(vars["OPTIONAL"].required);
        assert!(!vars["IMAGE"].required);
        assert_eq!(vars["MODE"], Variable::plain("MODE"));
    }

    #[test]
    fn skips_escaped_and_invalid() {
        let tree = doc(r#"
cmd: "echo $$HOME costs $5"
"#);
        assert!(extract_variables(&tree, None).is_empty());
    }

    #[test]
    fn walks_maps_inside_lists() {
        let tree = doc(r#"
services:
  - name: web
    ports:
      - target: "${PORT:-80}"
"#);
        let vars = extract_variables(&tree, None);
        assert_eq!(vars["PORT"].default_value.as_deref(), Some("80"));
    }

    #[test]
    fn includes_nested_references() {
        let tree = Value::String("${FOO:-${BAR}}".to_string());
        let vars = extract_variables(&tree, None);
        assert_eq!(vars["FOO"].default_value.as_deref(), Some("${BAR}"));
        assert_eq!(vars["BAR"], Variable::plain("BAR"));
    }

    #[test]
    fn last_occurrence_wins() {
        let tree = doc(r#"
a: "${TAG:-one}"
b: "${TAG:-two}"
"#);
        let vars = extract_variables(&tree, None);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["TAG"].default_value.as_deref(), Some("two"));
    }

    #[test]
    fn uses_substitution_precedence() {
        let tree = Value::String("${FOO:-really?}".to_string());
        let vars = extract_variables(&tree, None);
        assert_eq!(vars["FOO"].default_value.as_deref(), Some("really?"));
        assert!(!vars["FOO"].required);
    }

    #[test]
    fn ignores_keys_and_scalars() {
        let tree = doc(r#"
"${KEY}": 1
flag: true
"#);
        assert!(extract_variables(&tree, None).is_empty());
    }

    #[test]
    fn custom_pattern() {
        let tree = Value::String("%{NAME:-x} ${OTHER}".to_string());
        let vars = extract_variables(&tree, Some(&Pattern::new('%')));
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["NAME"].default_value.as_deref(), Some("x"));
    }
}
