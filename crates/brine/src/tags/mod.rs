/*
 * tags/mod.rs
 * Copyright (c) 2026 The brine developers
 */

//! Tag registry and the built-in tag set.
//!
//! A tag parser owns the syntax of one `{% name ... %}` construct: it
//! receives the opening tag, the token stream and the template parser, and
//! returns a single [`Node`]. Block tags consume their own closing tags via
//! [`Parser::parse_block`]. Registration under an existing name replaces
//! the previous binding, so configuration can override any built-in.

mod assignment;
mod comment;
mod control;
mod extra;
mod include;
mod iteration;

use std::collections::HashMap;
use std::sync::Arc;

pub use assignment::{AssignTag, EchoTag};
pub use comment::CommentTag;
pub use control::{IfTag, UnlessTag};
pub use extra::IfNotTag;
pub use include::IncludeTag;
pub use iteration::ForTag;

use crate::ast::Node;
use crate::error::TemplateResult;
use crate::parser::{Parser, TagToken, TokenStream};

/// Parse capability for one tag name.
pub trait TagParser: Send + Sync {
    fn parse(
        &self,
        tag: &TagToken,
        stream: &mut TokenStream<'_>,
        parser: &Parser<'_>,
    ) -> TemplateResult<Node>;
}

/// Name → tag parser mapping. Cloning shares the parser implementations.
#[derive(Clone, Default)]
pub struct TagRegistry {
    tags: HashMap<String, Arc<dyn TagParser>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in tags installed.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("if", IfTag);
        registry.register("unless", UnlessTag);
        registry.register("for", ForTag);
        registry.register("assign", AssignTag);
        registry.register("echo", EchoTag);
        registry.register("comment", CommentTag);
        registry.register("include", IncludeTag);
        registry
    }

    /// Register a tag. An existing binding under the same name is replaced.
    pub fn register(&mut self, name: impl Into<String>, tag: impl TagParser + 'static) {
        self.tags.insert(name.into(), Arc::new(tag));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn TagParser>> {
        self.tags.get(name)
    }
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.tags.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TagRegistry").field("tags", &names).finish()
    }
}
