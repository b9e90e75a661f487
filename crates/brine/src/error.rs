/*
 * error.rs
 * Copyright (c) 2026 The brine developers
 */

//! Error types for template compilation and rendering.
//!
//! The taxonomy is deliberate: `Syntax` and `Tag` are only ever produced at
//! compile time, the rest only at render time. Both rendering strategies
//! raise the same variant at the same logical evaluation point.

use thiserror::Error;

/// Errors that can occur while compiling or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Malformed token, tag or expression structure. Compile time only.
    #[error("syntax error: {message} (line {line}, column {column})")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// An unresolved variable path while the environment is in strict mode.
    #[error("undefined variable: {path}")]
    Undefined { path: String },

    /// An operator was applied to operands it is not defined for.
    #[error("type error: {message}")]
    Type { message: String },

    /// Unknown filter name, or a filter rejected its arguments.
    #[error("filter error in '{name}': {message}")]
    Filter { name: String, message: String },

    /// Tag-specific structural violation, e.g. `else` without an open `if`.
    #[error("tag error: {message} (line {line}, column {column})")]
    Tag {
        message: String,
        line: usize,
        column: usize,
    },

    /// The loader could not find a named template.
    #[error("template not found: {name}")]
    TemplateNotFound { name: String },
}

impl TemplateError {
    /// Convenience constructor for syntax errors.
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        TemplateError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }

    /// Convenience constructor for tag errors.
    pub fn tag(message: impl Into<String>, line: usize, column: usize) -> Self {
        TemplateError::Tag {
            message: message.into(),
            line,
            column,
        }
    }

    /// Convenience constructor for type errors.
    pub fn type_error(message: impl Into<String>) -> Self {
        TemplateError::Type {
            message: message.into(),
        }
    }

    /// True for error kinds that are only produced at compile time.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            TemplateError::Syntax { .. } | TemplateError::Tag { .. }
        )
    }
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
