/*
 * filters.rs
 * Copyright (c) 2026 The brine developers
 */

//! Filter registry and the built-in filter library.
//!
//! A filter is a pure function of one input value plus evaluated
//! positional/keyword arguments; it has no access to the context.
//! Registration under an existing name replaces the previous binding.
//! Filters are looked up by name at evaluation time only — an unknown
//! filter name is a render-time [`TemplateError::Filter`], never a parse
//! error.
//!
//! The built-in library is intentionally small; the registry and the
//! argument contract are the point.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{TemplateError, TemplateResult};
use crate::value::Value;

/// Evaluated arguments for one filter invocation.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    pub positional: Vec<Value>,
    pub keyword: Vec<(String, Value)>,
}

impl FilterArgs {
    /// Look up a keyword argument by name.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Fail unless between `min` and `max` positional arguments were given.
    pub fn expect_positional(&self, filter: &str, min: usize, max: usize) -> TemplateResult<()> {
        let n = self.positional.len();
        if n < min || n > max {
            return Err(filter_error(
                filter,
                format!("expected between {min} and {max} arguments, got {n}"),
            ));
        }
        Ok(())
    }

    /// Fail if any arguments were given at all.
    pub fn expect_none(&self, filter: &str) -> TemplateResult<()> {
        if self.positional.is_empty() && self.keyword.is_empty() {
            Ok(())
        } else {
            Err(filter_error(filter, "takes no arguments"))
        }
    }
}

/// Build a [`TemplateError::Filter`].
pub fn filter_error(name: &str, message: impl Into<String>) -> TemplateError {
    TemplateError::Filter {
        name: name.to_string(),
        message: message.into(),
    }
}

/// A filter capability: `(input, args) -> value`.
pub trait Filter: Send + Sync {
    fn apply(&self, input: &Value, args: &FilterArgs) -> TemplateResult<Value>;
}

impl<F> Filter for F
where
    F: Fn(&Value, &FilterArgs) -> TemplateResult<Value> + Send + Sync,
{
    fn apply(&self, input: &Value, args: &FilterArgs) -> TemplateResult<Value> {
        self(input, args)
    }
}

/// Name → filter mapping. Cloning shares the filter implementations.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Arc<dyn Filter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in library installed.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Register a filter. An existing binding under the same name is
    /// replaced.
    pub fn register(&mut self, name: impl Into<String>, filter: impl Filter + 'static) {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        self.filters.get(name)
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FilterRegistry").field("filters", &names).finish()
    }
}

fn register_builtins(registry: &mut FilterRegistry) {
    registry.register("upcase", |input: &Value, args: &FilterArgs| {
        args.expect_none("upcase")?;
        Ok(Value::String(input.render_to_string().to_uppercase()))
    });

    registry.register("downcase", |input: &Value, args: &FilterArgs| {
        args.expect_none("downcase")?;
        Ok(Value::String(input.render_to_string().to_lowercase()))
    });

    registry.register("capitalize", |input: &Value, args: &FilterArgs| {
        args.expect_none("capitalize")?;
        let s = input.render_to_string();
        let mut chars = s.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
            None => String::new(),
        };
        Ok(Value::String(capitalized))
    });

    registry.register("strip", |input: &Value, args: &FilterArgs| {
        args.expect_none("strip")?;
        Ok(Value::String(input.render_to_string().trim().to_string()))
    });

    registry.register("append", |input: &Value, args: &FilterArgs| {
        args.expect_positional("append", 1, 1)?;
        let mut s = input.render_to_string();
        s.push_str(&args.positional[0].render_to_string());
        Ok(Value::String(s))
    });

    registry.register("prepend", |input: &Value, args: &FilterArgs| {
        args.expect_positional("prepend", 1, 1)?;
        let mut s = args.positional[0].render_to_string();
        s.push_str(&input.render_to_string());
        Ok(Value::String(s))
    });

    registry.register("size", |input: &Value, args: &FilterArgs| {
        args.expect_none("size")?;
        let size = match input {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        };
        Ok(Value::Integer(size as i64))
    });

    registry.register("first", |input: &Value, args: &FilterArgs| {
        args.expect_none("first")?;
        match input {
            Value::Array(items) => Ok(items.first().cloned().unwrap_or(Value::Nil)),
            _ => Ok(Value::Nil),
        }
    });

    registry.register("last", |input: &Value, args: &FilterArgs| {
        args.expect_none("last")?;
        match input {
            Value::Array(items) => Ok(items.last().cloned().unwrap_or(Value::Nil)),
            _ => Ok(Value::Nil),
        }
    });

    registry.register("join", |input: &Value, args: &FilterArgs| {
        args.expect_positional("join", 0, 1)?;
        let separator = args
            .positional
            .first()
            .map(|v| v.render_to_string())
            .unwrap_or_else(|| " ".to_string());
        match input {
            Value::Array(items) => Ok(Value::String(
                items
                    .iter()
                    .map(|v| v.render_to_string())
                    .collect::<Vec<_>>()
                    .join(&separator),
            )),
            other => Ok(Value::String(other.render_to_string())),
        }
    });

    registry.register("default", |input: &Value, args: &FilterArgs| {
        args.expect_positional("default", 1, 1)?;
        let allow_false = args
            .keyword("allow_false")
            .map(Value::is_truthy)
            .unwrap_or(false);
        let keep = if allow_false {
            !matches!(input, Value::Nil | Value::Undefined) && !input.is_empty_value()
        } else {
            input.is_truthy() && !input.is_empty_value()
        };
        Ok(if keep {
            input.clone()
        } else {
            args.positional[0].clone()
        })
    });
}
