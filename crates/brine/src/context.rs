/*
 * context.rs
 * Copyright (c) 2026 The brine developers
 */

//! The runtime variable environment.
//!
//! A [`Context`] is created per render call and discarded when the render
//! finishes. It holds the caller-supplied globals plus a stack of mutable
//! scope frames: `assign` writes the innermost frame, block tags (loops)
//! push and pop frames around their bodies. Lookup walks frames
//! innermost-first, then the globals.
//!
//! Resolution of a missing name depends on the undefined policy: lenient
//! contexts produce [`Value::Undefined`] (renders empty, falsy), strict
//! contexts fail with [`TemplateError::Undefined`].

use std::collections::BTreeMap;

use crate::error::{TemplateError, TemplateResult};
use crate::expression::PathSegment;
use crate::value::Value;

/// Per-render variable scopes.
#[derive(Debug, Clone)]
pub struct Context {
    globals: BTreeMap<String, Value>,
    scopes: Vec<BTreeMap<String, Value>>,
    strict: bool,
    /// Current `include` nesting depth, used to break include cycles.
    pub(crate) include_depth: usize,
}

impl Context {
    /// Create a context over the given globals. One mutable frame for
    /// template-level `assign`s is pushed immediately.
    pub fn new(globals: BTreeMap<String, Value>, strict: bool) -> Self {
        Self {
            globals,
            scopes: vec![BTreeMap::new()],
            strict,
            include_depth: 0,
        }
    }

    /// Build a context from a JSON object (or `null` for no globals).
    pub fn from_json(globals: &serde_json::Value, strict: bool) -> TemplateResult<Self> {
        let map = match globals {
            serde_json::Value::Null => BTreeMap::new(),
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
            other => {
                return Err(TemplateError::type_error(format!(
                    "template globals must be an object, not {other}"
                )));
            }
        };
        Ok(Self::new(map, strict))
    }

    /// Push a fresh scope frame (block entry).
    pub fn push_scope(&mut self) {
        self.scopes.push(BTreeMap::new());
    }

    /// Pop the innermost scope frame (block exit).
    pub fn pop_scope(&mut self) {
        // The frame created in `new` is never popped.
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the innermost mutable frame.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
    }

    /// Resolve a variable path. Missing names and keys yield
    /// [`Value::Undefined`] in lenient mode and fail in strict mode.
    pub fn resolve(&self, path: &[PathSegment]) -> TemplateResult<Value> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(Value::Undefined);
        };
        let root = match first {
            PathSegment::Key(name) => self.lookup(name),
            PathSegment::Index(_) => None,
        };
        let Some(root) = root else {
            return self.undefined(path, 1);
        };

        let mut current = root.clone();
        for (i, segment) in rest.iter().enumerate() {
            match step(&current, segment) {
                Some(next) => current = next,
                None => return self.undefined(path, i + 2),
            }
        }
        Ok(current)
    }

    fn undefined(&self, path: &[PathSegment], upto: usize) -> TemplateResult<Value> {
        if self.strict {
            Err(TemplateError::Undefined {
                path: path_to_string(&path[..upto]),
            })
        } else {
            Ok(Value::Undefined)
        }
    }
}

/// Navigate one path segment into a value.
fn step(value: &Value, segment: &PathSegment) -> Option<Value> {
    match (value, segment) {
        (Value::Object(map), PathSegment::Key(key)) => match map.get(key) {
            Some(v) => Some(v.clone()),
            None if key == "size" => Some(Value::Integer(map.len() as i64)),
            None => None,
        },
        (Value::Array(items), PathSegment::Index(i)) => {
            let idx = if *i < 0 { items.len() as i64 + i } else { *i };
            usize::try_from(idx).ok().and_then(|idx| items.get(idx)).cloned()
        }
        (Value::Array(items), PathSegment::Key(key)) => match key.as_str() {
            "first" => items.first().cloned(),
            "last" => items.last().cloned(),
            "size" => Some(Value::Integer(items.len() as i64)),
            _ => None,
        },
        (Value::String(s), PathSegment::Key(key)) if key == "size" => {
            Some(Value::Integer(s.chars().count() as i64))
        }
        _ => None,
    }
}

/// Render a path for error messages, e.g. `settings.items[0]`.
pub(crate) fn path_to_string(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        match segment {
            PathSegment::Key(name) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(name);
            }
            PathSegment::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
        }
    }
    out
}
