/*
 * ast.rs
 * Copyright (c) 2026 The brine developers
 */

//! The compiled node tree.
//!
//! A template compiles to a [`NodeList`]. Built-in tags are plain enum
//! variants; tags registered by configuration compile to [`Node::Custom`],
//! which carries its own render capability so the core renderer never has
//! to know extension tags by name.
//!
//! Ownership is strictly tree-shaped. Nothing in the tree refers back to
//! the registries; they were consulted at parse time and are looked up by
//! name at render time (filters). A compiled tree is immutable and may be
//! shared across concurrent renders.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::TemplateResult;
use crate::expression::Expression;
use crate::render::Renderer;

/// An ordered sequence of nodes, rendered in document order.
pub type NodeList = Vec<Node>;

/// A node in the compiled template tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// Literal template text, emitted as-is.
    Text(String),

    /// `{{ expr }}` — evaluate and append the stringified result.
    Output(Expression),

    /// `{% if %}` / `{% elsif %}` / `{% else %}` / `{% endif %}` and the
    /// inverted `{% unless %}` form.
    If(IfNode),

    /// `{% for x in expr %}` ... `{% else %}` ... `{% endfor %}`.
    For(ForNode),

    /// `{% assign name = expr %}` — binds in the innermost scope, no output.
    Assign { name: String, expr: Expression },

    /// `{% echo expr %}` — output-statement semantics in tag position.
    Echo(Expression),

    /// `{% include 'name' %}` — render a partial via the loader, sharing
    /// the current scope. Position kept for render-time tag errors.
    Include {
        name: Expression,
        line: usize,
        column: usize,
    },

    /// An extension tag with an attached render capability.
    Custom(Arc<dyn CustomNode>),
}

/// Conditional branches: `(condition, body)` pairs tried in order, then an
/// optional `else` body.
#[derive(Debug, Clone)]
pub struct IfNode {
    pub branches: Vec<(Expression, NodeList)>,
    pub else_branch: Option<NodeList>,
}

/// A `for` loop over an iterable expression.
#[derive(Debug, Clone)]
pub struct ForNode {
    pub var: String,
    pub iterable: Expression,
    pub body: NodeList,
    /// Rendered when the iterable produces no items.
    pub else_branch: Option<NodeList>,
}

/// Render capability attached to extension tag nodes.
///
/// Implementations get the renderer (for evaluating expressions and
/// rendering nested node lists), the live context and the output buffer.
/// The returned future is the suspension-capable path; the direct strategy
/// drives the same future to completion.
pub trait CustomNode: fmt::Debug + Send + Sync {
    fn render<'a>(
        &'a self,
        renderer: &'a Renderer<'a>,
        ctx: &'a mut Context,
        out: &'a mut String,
    ) -> BoxFuture<'a, TemplateResult<()>>;
}
