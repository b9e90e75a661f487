/*
 * tags/extra.rs
 * Copyright (c) 2026 The brine developers
 */

//! Extension tags that are not installed by default.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::ast::{CustomNode, Node, NodeList};
use crate::context::Context;
use crate::error::{TemplateError, TemplateResult};
use crate::expression::{parse_expression, Expression};
use crate::parser::{Parser, TagToken, TokenStream};
use crate::render::Renderer;
use crate::tags::TagParser;

/// `{% ifnot cond %}` ... `{% else %}` ... `{% endifnot %}`: renders its
/// body when the condition is falsy. Register it with
/// `Environment::register_tag("ifnot", IfNotTag)`.
pub struct IfNotTag;

impl TagParser for IfNotTag {
    fn parse(
        &self,
        tag: &TagToken,
        stream: &mut TokenStream<'_>,
        parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let condition = parse_expression(&tag.args, tag.line, tag.column)?;
        let body = parser.parse_block(stream, &["else", "endifnot"])?;

        let next = stream.next_tag()?;
        let else_branch = match next.name.as_str() {
            "else" => {
                let else_branch = parser.parse_block(stream, &["endifnot"])?;
                stream.next_tag()?; // endifnot
                Some(else_branch)
            }
            "endifnot" => None,
            other => {
                return Err(TemplateError::tag(
                    format!("unexpected tag '{other}' in ifnot block"),
                    next.line,
                    next.column,
                ));
            }
        };
        Ok(Node::Custom(Arc::new(IfNotNode {
            condition,
            body,
            else_branch,
        })))
    }
}

#[derive(Debug)]
struct IfNotNode {
    condition: Expression,
    body: NodeList,
    else_branch: Option<NodeList>,
}

impl CustomNode for IfNotNode {
    fn render<'a>(
        &'a self,
        renderer: &'a Renderer<'a>,
        ctx: &'a mut Context,
        out: &'a mut String,
    ) -> BoxFuture<'a, TemplateResult<()>> {
        Box::pin(async move {
            let condition = renderer.evaluate(&self.condition, ctx).await?;
            if !condition.is_truthy() {
                renderer.render_nodes(&self.body, ctx, out).await?;
            } else if let Some(else_branch) = &self.else_branch {
                renderer.render_nodes(else_branch, ctx, out).await?;
            }
            Ok(())
        })
    }
}
