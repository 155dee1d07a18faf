//! Interpolation of whole configuration documents.
//!
//! Every string value in the document is substituted; mapping keys and
//! non-string scalars are left as they are. A failure anywhere aborts the
//! whole document, annotated with the path of the offending value.

use serde_yaml::{Mapping as YamlMapping, Value};

use super::template::{substitute_with, Mapping, Pattern, SubstituteFunc};
use crate::error::{ComposeError, Result};

/// Options for document interpolation.
#[derive(Clone, Default)]
pub struct InterpolateOptions {
    /// Reference syntax.
    pub pattern: Pattern,
    /// Operator chain; empty selects the default chain per value.
    pub operators: Vec<SubstituteFunc>,
}

impl std::fmt::Debug for InterpolateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterpolateOptions")
            .field("pattern", &self.pattern)
            .field("operators", &self.operators.len())
            .finish()
    }
}

/// Interpolate every string leaf of `tree` with the default syntax.
///
/// # Errors
///
/// Returns [`ComposeError::Interpolation`] carrying the dotted path of the
/// first value that failed.
///
/// # Example
///
/// ```
/// use compose_core::config::{interpolate, Environment};
///
/// let doc: serde_yaml::Value = serde_yaml::from_str("image: ${TAG:-latest}").unwrap();
/// let resolved = interpolate(&doc, &Environment::new()).unwrap();
/// assert_eq!(resolved["image"], "latest");
/// ```
pub fn interpolate(tree: &Value, mapping: &dyn Mapping) -> Result<Value> {
    interpolate_with(tree, mapping, &InterpolateOptions::default())
}

/// Interpolate every string leaf of `tree` with explicit options.
pub fn interpolate_with(
    tree: &Value,
    mapping: &dyn Mapping,
    options: &InterpolateOptions,
) -> Result<Value> {
    let mut path = Vec::new();
    recurse(tree, mapping, options, &mut path)
}

fn recurse(
    value: &Value,
    mapping: &dyn Mapping,
    options: &InterpolateOptions,
    path: &mut Vec<String>,
) -> Result<Value> {
    match value {
        Value::String(s) => {
            if !s.contains(options.pattern.delimiter()) {
                return Ok(value.clone());
            }
            substitute_with(s, mapping, &options.pattern, &options.operators)
                .map(Value::String)
                .map_err(|source| ComposeError::Interpolation {
                    path: render_path(path),
                    source: Box::new(source),
                })
        }
        Value::Mapping(map) => {
            let mut out = YamlMapping::with_capacity(map.len());
            for (key, item) in map {
                path.push(key_segment(key));
                let resolved = recurse(item, mapping, options, path);
                path.pop();
                out.insert(key.clone(), resolved?);
            }
            Ok(Value::Mapping(out))
        }
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(format!("[{}]", index));
                let resolved = recurse(item, mapping, options, path);
                path.pop();
                out.push(resolved?);
            }
            Ok(Value::Sequence(out))
        }
        Value::Tagged(tagged) => {
            let mut tagged = tagged.clone();
            tagged.value = recurse(&tagged.value, mapping, options, path)?;
            Ok(Value::Tagged(tagged))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

fn key_segment(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn render_path(path: &[String]) -> String {
    let mut rendered = String::new();
    for segment in path {
        if !rendered.is_empty() && !segment.starts_with('[') {
            rendered.push('.');
        }
        rendered.push_str(segment);
    }
    rendered
}
