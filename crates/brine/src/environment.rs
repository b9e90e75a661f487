/*
 * environment.rs
 * Copyright (c) 2026 The brine developers
 */

//! The configuration root and compiled template handle.
//!
//! An [`Environment`] bundles the tag registry, the filter registry, the
//! partial loader and the undefined-variable policy. Templates compiled by
//! one environment keep a handle to its configuration, so a template can be
//! rendered long after (and concurrently with) other templates from the
//! same environment.

use std::sync::Arc;

use crate::context::Context;
use crate::error::TemplateResult;
use crate::filters::{Filter, FilterRegistry};
use crate::loader::{Loader, NullLoader};
use crate::parser::Parser;
use crate::render::Renderer;
use crate::tags::{TagParser, TagRegistry};

/// Engine configuration: registries, loader and policies.
#[derive(Clone)]
pub struct Environment {
    tags: TagRegistry,
    filters: FilterRegistry,
    loader: Arc<dyn Loader>,
    strict_variables: bool,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("tags", &self.tags)
            .field("filters", &self.filters)
            .field("strict_variables", &self.strict_variables)
            .finish_non_exhaustive()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            tags: TagRegistry::with_builtins(),
            filters: FilterRegistry::with_builtins(),
            loader: Arc::new(NullLoader),
            strict_variables: false,
        }
    }
}

impl Environment {
    /// An environment with the built-in tags and filters, no loader, and
    /// lenient undefined variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the partial loader.
    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Make unresolvable variables a render error instead of rendering
    /// empty.
    pub fn with_strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    /// Register a tag, replacing any existing tag of the same name
    /// (built-ins included).
    pub fn register_tag(&mut self, name: impl Into<String>, tag: impl TagParser + 'static) {
        self.tags.register(name, tag);
    }

    /// Register a filter, replacing any existing filter of the same name.
    pub fn register_filter(&mut self, name: impl Into<String>, filter: impl Filter + 'static) {
        self.filters.register(name, filter);
    }

    pub fn strict_variables(&self) -> bool {
        self.strict_variables
    }

    pub(crate) fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub(crate) fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub(crate) fn loader(&self) -> &dyn Loader {
        self.loader.as_ref()
    }

    /// Compile a template. All syntax errors surface here; a returned
    /// [`Template`] renders without further parsing (partials excepted).
    pub fn parse(&self, source: &str) -> TemplateResult<Template> {
        tracing::debug!(bytes = source.len(), "compiling template");
        let nodes = Parser::new(self).parse(source)?;
        Ok(Template {
            nodes: Arc::new(nodes),
            env: Arc::new(self.clone()),
        })
    }
}

/// A compiled template. Cheap to clone and safe to render from several
/// tasks at once; each render gets its own [`Context`].
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Arc<crate::ast::NodeList>,
    env: Arc<Environment>,
}

impl Template {
    /// Render with the given JSON globals, blocking on any loader I/O.
    /// Drives the exact future [`Template::render_async`] would, so output
    /// is byte-identical between the two entry points.
    pub fn render(&self, globals: &serde_json::Value) -> TemplateResult<String> {
        pollster::block_on(self.render_async(globals))
    }

    /// Render with the given JSON globals.
    pub async fn render_async(&self, globals: &serde_json::Value) -> TemplateResult<String> {
        let mut ctx = Context::from_json(globals, self.env.strict_variables)?;
        let mut out = String::new();
        self.render_into_async(&mut ctx, &mut out).await?;
        Ok(out)
    }

    /// Render into a caller-owned buffer and context. On error the buffer
    /// keeps the output produced before the failure.
    pub async fn render_into_async(
        &self,
        ctx: &mut Context,
        out: &mut String,
    ) -> TemplateResult<()> {
        Renderer::new(&self.env).render_nodes(&self.nodes, ctx, out).await
    }

    /// Blocking form of [`Template::render_into_async`].
    pub fn render_into(&self, ctx: &mut Context, out: &mut String) -> TemplateResult<()> {
        pollster::block_on(self.render_into_async(ctx, out))
    }
}
