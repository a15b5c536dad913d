use std::collections::BTreeMap;

use anyhow::{Context, Result};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("no binding for placeholder `{{{0}}}`")]
    Missing(String),
    #[error("malformed placeholder in argument `{0}`")]
    Malformed(String),
    #[error("placeholder `{{{0}}}` expands to several arguments and must be a whole argument")]
    Splice(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    One(String),
    Many(Vec<String>),
}

/// Values substituted into a [`Template`].
#[derive(Debug, Clone, Default)]
pub struct Bindings(BTreeMap<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), Value::One(value.into()));
        self
    }

    /// Bind `key` to a list. The list is spliced in as separate arguments, so
    /// `{key}` must make up a whole argument. An empty list drops the argument.
    pub fn set_many(mut self, key: &str, values: Vec<String>) -> Self {
        self.0.insert(key.to_string(), Value::Many(values));
        self
    }
}

/// An argument vector with `{placeholder}` references.
///
/// `{{` and `}}` stand for literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    tokens: Vec<String>,
}

impl Template {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a command line into arguments with POSIX shell-word rules.
    /// Nothing is expanded; quotes only group words.
    pub fn parse(line: &str) -> Result<Self> {
        let tokens =
            shell_words::split(line).with_context(|| format!("cannot split command `{line}`"))?;
        Ok(Self { tokens })
    }

    pub fn render(&self, bindings: &Bindings) -> Result<Vec<String>, TemplateError> {
        let mut out = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            if let Some(key) = sole_placeholder(token)
                && let Some(Value::Many(values)) = bindings.0.get(key)
            {
                out.extend(values.iter().cloned());
                continue;
            }
            out.push(render_token(token, bindings)?);
        }
        Ok(out)
    }
}

fn sole_placeholder(token: &str) -> Option<&str> {
    let inner = token.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(['{', '}']) {
        return None;
    }
    Some(inner)
}

fn render_token(token: &str, bindings: &Bindings) -> Result<String, TemplateError> {
    let malformed = || TemplateError::Malformed(token.to_string());
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(malformed()),
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => return Err(malformed()),
                        Some(k) => key.push(k),
                    }
                }
                if key.is_empty() {
                    return Err(malformed());
                }
                match bindings.0.get(&key) {
                    Some(Value::One(value)) => out.push_str(value),
                    Some(Value::Many(_)) => return Err(TemplateError::Splice(key)),
                    None => return Err(TemplateError::Missing(key)),
                }
            }
            c => out.push(c),
        }
    }

    Ok(out)
}
