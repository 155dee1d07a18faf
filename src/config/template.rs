//! Variable substitution for compose values.
//!
//! Compose files reference variables with a shell-like syntax:
//!
//! - `$VAR` / `${VAR}` - replaced with the value of `VAR`, blank if unset
//! - `${VAR:-default}` - `default` if `VAR` is unset or empty
//! - `${VAR-default}` - `default` if `VAR` is unset
//! - `${VAR:?message}` - error if `VAR` is unset or empty
//! - `${VAR?message}` - error if `VAR` is unset
//! - `$$` - a literal `$`
//!
//! Defaults and messages may themselves contain references, so
//! `${FOO:-${BAR}}` falls back to the value of `BAR`.
//!
//! # Example
//!
//! ```
//! use compose_core::config::substitute;
//!
//! let mapping = |name: &str| (name == "TAG").then(|| "1.25".to_string());
//! let image = substitute("nginx:${TAG:-latest}", &mapping).unwrap();
//! assert_eq!(image, "nginx:1.25");
//! ```

use tracing::warn;

use crate::error::{ComposeError, Result};

/// Resolves variable names to values.
///
/// `None` means the variable is absent, which is distinct from a variable
/// that is present with an empty value.
pub trait Mapping {
    /// Look up a variable by name.
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<F> Mapping for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// A substitution operator.
///
/// Receives the inner expression of a braced reference (`FOO:-bar` for
/// `${FOO:-bar}`). Returns `Ok(None)` when the operator does not apply to the
/// expression, `Ok(Some(value))` with the substituted value otherwise.
pub type SubstituteFunc = fn(&str, &dyn Mapping) -> Result<Option<String>>;

/// Reference syntax recognised by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    delimiter: char,
}

impl Pattern {
    /// Create a pattern using `delimiter` in place of `$`.
    pub const fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// The character introducing a reference.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new('$')
    }
}

/// The built-in substitution operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `:?` - fail if unset or empty.
    RequiredNonEmpty,
    /// `?` - fail if unset.
    Required,
    /// `:-` - default if unset or empty.
    SoftDefault,
    /// `-` - default if unset.
    HardDefault,
}

impl Operator {
    /// The separator between the variable name and its argument.
    pub fn separator(self) -> &'static str {
        match self {
            Self::RequiredNonEmpty => ":?",
            Self::Required => "?",
            Self::SoftDefault => ":-",
            Self::HardDefault => "-",
        }
    }

    /// Whether the argument is an error message rather than a default.
    pub fn is_required(self) -> bool {
        matches!(self, Self::RequiredNonEmpty | Self::Required)
    }

    /// The function implementing this operator.
    pub fn func(self) -> SubstituteFunc {
        match self {
            Self::RequiredNonEmpty => required_non_empty,
            Self::Required => required,
            Self::SoftDefault => soft_default,
            Self::HardDefault => hard_default,
        }
    }

    /// Order in which operators are tried for references inside `template`.
    ///
    /// This looks at the raw template, not at the individual reference: when
    /// a `-` appears before the first `?`, defaults are tried first, otherwise
    /// the required operators are. A `-` or `?` elsewhere in the string can
    /// therefore pick the order for an unrelated reference.
    pub fn chain_for(template: &str) -> [Operator; 4] {
        match (template.find('-'), template.find('?')) {
            (Some(hyphen), Some(question)) if hyphen < question => [
                Self::SoftDefault,
                Self::HardDefault,
                Self::RequiredNonEmpty,
                Self::Required,
            ],
            _ => [
                Self::RequiredNonEmpty,
                Self::Required,
                Self::SoftDefault,
                Self::HardDefault,
            ],
        }
    }

    /// Find the first operator in `chain` whose separator occurs in `expr`.
    pub fn detect(expr: &str, chain: &[Operator]) -> Option<Operator> {
        chain
            .iter()
            .copied()
            .find(|op| expr.contains(op.separator()))
    }
}

/// The default operator chain for `template`, as functions.
pub fn default_operators(template: &str) -> Vec<SubstituteFunc> {
    Operator::chain_for(template)
        .into_iter()
        .map(Operator::func)
        .collect()
}

/// A lexical unit of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Text without references.
    Literal(&'a str),
    /// A doubled delimiter.
    Escaped,
    /// `$NAME`
    Named(&'a str),
    /// The inner expression of `${...}`, braces balanced.
    Braced(&'a str),
    /// A delimiter that starts no valid reference.
    Invalid,
}

/// Splits a template into [`Token`]s.
///
/// After an [`Token::Invalid`] scanning resumes right after the delimiter.
pub(crate) struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    delimiter: char,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(input: &'a str, pattern: &Pattern) -> Self {
        Self {
            input,
            pos: 0,
            delimiter: pattern.delimiter(),
        }
    }

    fn reference(&self, after: &'a str) -> (Token<'a>, usize) {
        if after.starts_with(self.delimiter) {
            return (Token::Escaped, self.delimiter.len_utf8());
        }

        let name = identifier_len(after);
        if name > 0 {
            return (Token::Named(&after[..name]), name);
        }

        if let Some(body) = after.strip_prefix('{') {
            if let Some(close) = self.braced_len(body) {
                return (Token::Braced(&body[..close]), close + 2);
            }
        }

        (Token::Invalid, 0)
    }

    /// Length of a braced expression, excluding the closing brace.
    fn braced_len(&self, body: &str) -> Option<usize> {
        let name = identifier_len(body);
        if name == 0 {
            return None;
        }

        let tail = &body[name..];
        if tail.starts_with('}') {
            return Some(name);
        }

        let has_operator = [":-", ":?", "-", "?"]
            .iter()
            .any(|sep| tail.starts_with(sep));
        if !has_operator {
            return None;
        }

        closing_brace_index(body, self.delimiter)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if !rest.starts_with(self.delimiter) {
            let end = rest.find(self.delimiter).unwrap_or(rest.len());
            self.pos += end;
            return Some(Token::Literal(&rest[..end]));
        }

        let skip = self.delimiter.len_utf8();
        let (token, consumed) = self.reference(&rest[skip..]);
        self.pos += skip + consumed;
        Some(token)
    }
}

/// Length of the identifier (`[_a-zA-Z][_a-zA-Z0-9]*`) at the start of `s`.
fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

/// Index of the brace closing an already opened `${`, counting nested opens.
fn closing_brace_index(body: &str, delimiter: char) -> Option<usize> {
    let mut open = String::with_capacity(2);
    open.push(delimiter);
    open.push('{');

    let mut depth = 1usize;
    let mut i = 0;
    while i < body.len() {
        let rest = &body[i..];
        if rest.starts_with('}') {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
            i += 1;
        } else if rest.starts_with(open.as_str()) {
            depth += 1;
            i += open.len();
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

/// Substitute variables in `template` using the default syntax and operators.
///
/// # Errors
///
/// Returns [`ComposeError::InvalidTemplate`] for malformed references and for
/// required variables without a value.
pub fn substitute(template: &str, mapping: &dyn Mapping) -> Result<String> {
    substitute_with(template, mapping, &Pattern::default(), &[])
}

/// Substitute variables with an explicit syntax and operator chain.
///
/// An empty `operators` slice selects [`default_operators`] for `template`.
/// Operators are tried in order and the first that applies wins; when none
/// applies the whole expression is looked up as a plain name.
pub fn substitute_with(
    template: &str,
    mapping: &dyn Mapping,
    pattern: &Pattern,
    operators: &[SubstituteFunc],
) -> Result<String> {
    let defaults;
    let operators = if operators.is_empty() {
        defaults = default_operators(template);
        defaults.as_slice()
    } else {
        operators
    };

    let mut result = String::with_capacity(template.len());
    for token in Scanner::new(template, pattern) {
        match token {
            Token::Literal(text) => result.push_str(text),
            Token::Escaped => result.push(pattern.delimiter()),
            Token::Named(name) => result.push_str(&lookup_or_blank(name, mapping)),
            Token::Braced(expr) => match apply_operators(expr, mapping, operators)? {
                Some(value) => result.push_str(&value),
                None => result.push_str(&lookup_or_blank(expr, mapping)),
            },
            Token::Invalid => return Err(ComposeError::invalid_template(template)),
        }
    }

    Ok(result)
}

/// Check if a string references any variable.
pub fn has_interpolation(input: &str) -> bool {
    Scanner::new(input, &Pattern::default())
        .any(|token| matches!(token, Token::Named(_) | Token::Braced(_)))
}

fn apply_operators(
    expr: &str,
    mapping: &dyn Mapping,
    operators: &[SubstituteFunc],
) -> Result<Option<String>> {
    for operator in operators {
        if let Some(value) = operator(expr, mapping)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn lookup_or_blank(name: &str, mapping: &dyn Mapping) -> String {
    mapping.lookup(name).unwrap_or_else(|| {
        warn!(
            "The {:?} variable is not set. Defaulting to a blank string.",
            name
        );
        String::new()
    })
}

/// `${VAR:-default}`: default when unset or empty.
pub fn soft_default(expr: &str, mapping: &dyn Mapping) -> Result<Option<String>> {
    let Some((name, default)) = expr.split_once(Operator::SoftDefault.separator()) else {
        return Ok(None);
    };
    let default = substitute(default, mapping)?;
    match mapping.lookup(name) {
        Some(value) if !value.is_empty() => Ok(Some(value)),
        _ => Ok(Some(default)),
    }
}

/// `${VAR-default}`: default only when unset.
pub fn hard_default(expr: &str, mapping: &dyn Mapping) -> Result<Option<String>> {
    let Some((name, default)) = expr.split_once(Operator::HardDefault.separator()) else {
        return Ok(None);
    };
    let default = substitute(default, mapping)?;
    Ok(Some(mapping.lookup(name).unwrap_or(default)))
}

/// `${VAR:?message}`: error when unset or empty.
pub fn required_non_empty(expr: &str, mapping: &dyn Mapping) -> Result<Option<String>> {
    with_required(expr, mapping, Operator::RequiredNonEmpty, |v| !v.is_empty())
}

/// `${VAR?message}`: error when unset.
pub fn required(expr: &str, mapping: &dyn Mapping) -> Result<Option<String>> {
    with_required(expr, mapping, Operator::Required, |_| true)
}

fn with_required(
    expr: &str,
    mapping: &dyn Mapping,
    operator: Operator,
    valid: fn(&str) -> bool,
) -> Result<Option<String>> {
    let Some((name, message)) = expr.split_once(operator.separator()) else {
        return Ok(None);
    };
    let message = substitute(message, mapping)?;
    match mapping.lookup(name) {
        Some(value) if valid(&value) => Ok(Some(value)),
        _ => Err(ComposeError::invalid_template(format!(
            "required variable {} is missing a value: {}",
            name, message
        ))),
    }
}
