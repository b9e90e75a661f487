/*
 * lib.rs
 * Copyright (c) 2026 The brine developers
 */

//! A small Liquid-style template engine.
//!
//! Templates mix literal text with `{{ expression }}` output statements and
//! `{% tag %}` constructs. Expressions support dotted/indexed variable
//! paths, filter pipelines, boolean operators, comparisons, `contains` and
//! an inline conditional form (`{{ a if cond else b }}`). Tags and filters
//! live in per-environment registries and can be replaced or extended by
//! the embedding application.
//!
//! Rendering is async-first: the one evaluator is asynchronous (template
//! loaders may suspend), and the blocking entry points drive the identical
//! future on the current thread, so both modes produce byte-identical
//! output.
//!
//! ```
//! use brine::Environment;
//!
//! let env = Environment::new();
//! let template = env.parse("Hello, {{ name | upcase }}!")?;
//! let out = template.render(&serde_json::json!({"name": "world"}))?;
//! assert_eq!(out, "Hello, WORLD!");
//! # Ok::<(), brine::TemplateError>(())
//! ```

pub mod ast;
pub mod context;
pub mod environment;
pub mod error;
pub mod expression;
pub mod filters;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod render;
pub mod tags;
pub mod value;

pub use context::Context;
pub use environment::{Environment, Template};
pub use error::{TemplateError, TemplateResult};
pub use filters::{Filter, FilterArgs, FilterRegistry};
pub use loader::{DictLoader, Loader, NullLoader};
pub use tags::{TagParser, TagRegistry};
pub use value::Value;
