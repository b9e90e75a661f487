/*
 * render.rs
 * Copyright (c) 2026 The brine developers
 */

//! Node tree rendering and expression evaluation.
//!
//! There is exactly one rendering implementation and it is asynchronous:
//! loaders may suspend, so every node renders inside a future. The blocking
//! entry points drive the very same future to completion on the current
//! thread, which is what guarantees byte-identical output between the two
//! modes.
//!
//! Recursion through the node tree goes via [`BoxFuture`]; an async fn
//! cannot recurse without boxing.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use futures::future::BoxFuture;

use crate::ast::{ForNode, IfNode, Node};
use crate::context::Context;
use crate::environment::Environment;
use crate::error::{TemplateError, TemplateResult};
use crate::expression::{CompareOp, Expression, FilterCall, Literal};
use crate::filters::{filter_error, FilterArgs};
use crate::parser::Parser;
use crate::value::Value;

/// Maximum `include` nesting before a cycle is assumed.
const MAX_INCLUDE_DEPTH: usize = 16;

/// Renders compiled node trees against a context.
pub struct Renderer<'t> {
    env: &'t Environment,
}

impl<'t> Renderer<'t> {
    pub fn new(env: &'t Environment) -> Self {
        Self { env }
    }

    /// Render a node list into `out`. On error, `out` keeps whatever was
    /// produced before the failing node.
    pub fn render_nodes<'a>(
        &'a self,
        nodes: &'a [Node],
        ctx: &'a mut Context,
        out: &'a mut String,
    ) -> BoxFuture<'a, TemplateResult<()>> {
        Box::pin(async move {
            for node in nodes {
                self.render_node(node, ctx, out).await?;
            }
            Ok(())
        })
    }

    async fn render_node(
        &self,
        node: &Node,
        ctx: &mut Context,
        out: &mut String,
    ) -> TemplateResult<()> {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output(expr) | Node::Echo(expr) => {
                let value = self.evaluate(expr, ctx).await?;
                out.push_str(&value.render_to_string());
            }
            Node::If(if_node) => self.render_if(if_node, ctx, out).await?,
            Node::For(for_node) => self.render_for(for_node, ctx, out).await?,
            Node::Assign { name, expr } => {
                let value = self.evaluate(expr, ctx).await?;
                ctx.assign(name.clone(), value);
            }
            Node::Include { name, line, column } => {
                self.render_include(name, *line, *column, ctx, out).await?;
            }
            Node::Custom(custom) => custom.render(self, ctx, out).await?,
        }
        Ok(())
    }

    async fn render_if(
        &self,
        node: &IfNode,
        ctx: &mut Context,
        out: &mut String,
    ) -> TemplateResult<()> {
        for (condition, body) in &node.branches {
            if self.evaluate(condition, ctx).await?.is_truthy() {
                return self.render_nodes(body, ctx, out).await;
            }
        }
        if let Some(else_branch) = &node.else_branch {
            return self.render_nodes(else_branch, ctx, out).await;
        }
        Ok(())
    }

    async fn render_for(
        &self,
        node: &ForNode,
        ctx: &mut Context,
        out: &mut String,
    ) -> TemplateResult<()> {
        let iterable = self.evaluate(&node.iterable, ctx).await?;
        let items: Vec<Value> = match iterable {
            Value::Array(items) => items,
            // Objects iterate as [key, value] pairs in key order.
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Value::Array(vec![Value::String(k), v]))
                .collect(),
            Value::Nil | Value::Undefined => Vec::new(),
            scalar => vec![scalar],
        };

        if items.is_empty() {
            if let Some(else_branch) = &node.else_branch {
                return self.render_nodes(else_branch, ctx, out).await;
            }
            return Ok(());
        }

        let length = items.len();
        ctx.push_scope();
        let result = async {
            for (i, item) in items.into_iter().enumerate() {
                ctx.assign(node.var.clone(), item);
                ctx.assign("forloop", forloop_value(i, length));
                self.render_nodes(&node.body, ctx, out).await?;
            }
            Ok(())
        }
        .await;
        ctx.pop_scope();
        result
    }

    async fn render_include(
        &self,
        name: &Expression,
        line: usize,
        column: usize,
        ctx: &mut Context,
        out: &mut String,
    ) -> TemplateResult<()> {
        let name = self.evaluate(name, ctx).await?.render_to_string();
        if ctx.include_depth >= MAX_INCLUDE_DEPTH {
            return Err(TemplateError::tag(
                format!("include depth exceeded at '{name}' (cycle?)"),
                line,
                column,
            ));
        }
        tracing::debug!(name = %name, depth = ctx.include_depth, "rendering partial");
        let source = self.env.loader().load(&name).await?;
        let nodes = Parser::new(self.env).parse(&source)?;

        // Partials share the caller's scope; assigns inside the partial
        // remain visible after it returns.
        ctx.include_depth += 1;
        let result = self.render_nodes(&nodes, ctx, out).await;
        ctx.include_depth -= 1;
        result
    }

    /// Evaluate an expression to a value. Takes the context immutably:
    /// expression evaluation never writes variables.
    pub fn evaluate<'a>(
        &'a self,
        expr: &'a Expression,
        ctx: &'a Context,
    ) -> BoxFuture<'a, TemplateResult<Value>> {
        Box::pin(async move {
            match expr {
                Expression::Literal(literal) => Ok(literal_value(literal)),
                Expression::Path(path) => ctx.resolve(path),
                Expression::Not(inner) => {
                    let value = self.evaluate(inner, ctx).await?;
                    Ok(Value::Bool(!value.is_truthy()))
                }
                Expression::And(left, right) => {
                    if !self.evaluate(left, ctx).await?.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(self.evaluate(right, ctx).await?.is_truthy()))
                }
                Expression::Or(left, right) => {
                    if self.evaluate(left, ctx).await?.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(self.evaluate(right, ctx).await?.is_truthy()))
                }
                Expression::Comparison { op, left, right } => {
                    self.eval_comparison(*op, left, right, ctx).await
                }
                Expression::Contains { haystack, needle } => {
                    let haystack = self.evaluate(haystack, ctx).await?;
                    let needle = self.evaluate(needle, ctx).await?;
                    Ok(Value::Bool(haystack.contains(&needle)?))
                }
                Expression::Filtered { base, filters } => {
                    let value = self.evaluate(base, ctx).await?;
                    self.apply_filters(value, filters, ctx).await
                }
                Expression::Conditional {
                    value,
                    condition,
                    alternative,
                    tail_filters,
                } => {
                    let selected = if self.evaluate(condition, ctx).await?.is_truthy() {
                        self.evaluate(value, ctx).await?
                    } else if let Some(alternative) = alternative {
                        self.evaluate(alternative, ctx).await?
                    } else {
                        Value::Undefined
                    };
                    self.apply_filters(selected, tail_filters, ctx).await
                }
            }
        })
    }

    async fn eval_comparison(
        &self,
        op: CompareOp,
        left: &Expression,
        right: &Expression,
        ctx: &Context,
    ) -> TemplateResult<Value> {
        // The empty/blank keywords only exist inside == and !=, where they
        // test the other operand's shape rather than its identity.
        if matches!(op, CompareOp::Eq | CompareOp::Ne) {
            if let Some(result) = self.eval_shape_equality(left, right, ctx).await? {
                let result = if op == CompareOp::Eq { result } else { !result };
                return Ok(Value::Bool(result));
            }
        }

        let left = self.evaluate(left, ctx).await?;
        let right = self.evaluate(right, ctx).await?;
        let result = match op {
            CompareOp::Eq => left.equals(&right),
            CompareOp::Ne => !left.equals(&right),
            CompareOp::Lt => left.compare(&right)? == Ordering::Less,
            CompareOp::Le => left.compare(&right)? != Ordering::Greater,
            CompareOp::Gt => left.compare(&right)? == Ordering::Greater,
            CompareOp::Ge => left.compare(&right)? != Ordering::Less,
        };
        Ok(Value::Bool(result))
    }

    /// `Some(answer)` when one operand is the `empty` or `blank` keyword,
    /// `None` for ordinary equality.
    async fn eval_shape_equality(
        &self,
        left: &Expression,
        right: &Expression,
        ctx: &Context,
    ) -> TemplateResult<Option<bool>> {
        let (keyword, other) = match (left, right) {
            (Expression::Literal(lit @ (Literal::Empty | Literal::Blank)), other)
            | (other, Expression::Literal(lit @ (Literal::Empty | Literal::Blank))) => {
                (lit, other)
            }
            _ => return Ok(None),
        };
        let value = self.evaluate(other, ctx).await?;
        Ok(Some(match keyword {
            Literal::Empty => value.is_empty_value(),
            _ => value.is_blank_value(),
        }))
    }

    async fn apply_filters(
        &self,
        mut value: Value,
        filters: &[FilterCall],
        ctx: &Context,
    ) -> TemplateResult<Value> {
        for call in filters {
            let mut args = FilterArgs::default();
            for arg in &call.args {
                args.positional.push(self.evaluate(arg, ctx).await?);
            }
            for (key, arg) in &call.kwargs {
                args.keyword.push((key.clone(), self.evaluate(arg, ctx).await?));
            }
            let filter = self
                .env
                .filters()
                .get(&call.name)
                .ok_or_else(|| filter_error(&call.name, "unknown filter"))?;
            value = filter.apply(&value, &args)?;
        }
        Ok(value)
    }
}

/// Literals evaluate to themselves; the `empty`/`blank` keywords have no
/// standalone value and fall back to nil outside comparisons.
fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Nil | Literal::Empty | Literal::Blank => Value::Nil,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Str(s) => Value::String(s.clone()),
    }
}

/// The `forloop` helper object bound on every iteration.
fn forloop_value(index0: usize, length: usize) -> Value {
    let mut map = BTreeMap::new();
    map.insert("index".to_string(), Value::Integer(index0 as i64 + 1));
    map.insert("index0".to_string(), Value::Integer(index0 as i64));
    map.insert("first".to_string(), Value::Bool(index0 == 0));
    map.insert("last".to_string(), Value::Bool(index0 + 1 == length));
    map.insert("length".to_string(), Value::Integer(length as i64));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parse_filtered_expression;

    fn eval(source: &str, globals: serde_json::Value) -> TemplateResult<Value> {
        let env = Environment::new();
        let renderer = Renderer::new(&env);
        let ctx = Context::from_json(&globals, false).unwrap();
        let expr = parse_filtered_expression(source, 1, 1).unwrap();
        pollster::block_on(renderer.evaluate(&expr, &ctx))
    }

    #[test]
    fn test_boolean_operators_yield_booleans() {
        let globals = serde_json::json!({"s": "x"});
        // `and`/`or` normalize to booleans rather than returning operands.
        assert_eq!(eval("s and true", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("s or false", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("not s", globals).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_comparison_type_rules() {
        let globals = serde_json::json!({});
        assert_eq!(eval("1 == 1.0", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("1 < 2.5", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("'a' < 'b'", globals.clone()).unwrap(), Value::Bool(true));
        // Cross-type equality is false, cross-type ordering is an error.
        assert_eq!(eval("1 == '1'", globals.clone()).unwrap(), Value::Bool(false));
        assert!(matches!(
            eval("1 < 'a'", globals),
            Err(TemplateError::Type { .. })
        ));
    }

    #[test]
    fn test_empty_and_blank_keywords() {
        let globals = serde_json::json!({"s": "", "ws": "  ", "items": []});
        assert_eq!(eval("s == empty", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("items == empty", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("ws == empty", globals.clone()).unwrap(), Value::Bool(false));
        assert_eq!(eval("ws == blank", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("empty == s", globals.clone()).unwrap(), Value::Bool(true));
        assert_eq!(eval("s != empty", globals).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_conditional_without_alternative_is_undefined() {
        let value = eval("'x' if false", serde_json::json!({})).unwrap();
        assert_eq!(value, Value::Undefined);
        assert_eq!(value.render_to_string(), "");
    }

    #[test]
    fn test_unknown_filter_is_a_render_error() {
        assert!(matches!(
            eval("'x' | frobnicate", serde_json::json!({})),
            Err(TemplateError::Filter { .. })
        ));
    }
}
