/*
 * tags/control.rs
 * Copyright (c) 2026 The brine developers
 */

//! `{% if %}` and `{% unless %}`.

use crate::ast::{IfNode, Node};
use crate::error::{TemplateError, TemplateResult};
use crate::expression::{parse_expression, Expression};
use crate::parser::{Parser, TagToken, TokenStream};
use crate::tags::TagParser;

/// `{% if cond %}` ... `{% elsif cond %}` ... `{% else %}` ... `{% endif %}`.
pub struct IfTag;

impl TagParser for IfTag {
    fn parse(
        &self,
        tag: &TagToken,
        stream: &mut TokenStream<'_>,
        parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let condition = parse_expression(&tag.args, tag.line, tag.column)?;
        let body = parser.parse_block(stream, &["elsif", "else", "endif"])?;

        let mut branches = vec![(condition, body)];
        loop {
            let next = stream.next_tag()?;
            match next.name.as_str() {
                "elsif" => {
                    let condition = parse_expression(&next.args, next.line, next.column)?;
                    let body = parser.parse_block(stream, &["elsif", "else", "endif"])?;
                    branches.push((condition, body));
                }
                "else" => {
                    let else_branch = parser.parse_block(stream, &["endif"])?;
                    stream.next_tag()?; // endif
                    return Ok(Node::If(IfNode {
                        branches,
                        else_branch: Some(else_branch),
                    }));
                }
                "endif" => {
                    return Ok(Node::If(IfNode {
                        branches,
                        else_branch: None,
                    }));
                }
                other => {
                    return Err(TemplateError::tag(
                        format!("unexpected tag '{other}' in if block"),
                        next.line,
                        next.column,
                    ));
                }
            }
        }
    }
}

/// `{% unless cond %}` ... `{% else %}` ... `{% endunless %}`: an `if` with
/// the condition inverted at parse time.
pub struct UnlessTag;

impl TagParser for UnlessTag {
    fn parse(
        &self,
        tag: &TagToken,
        stream: &mut TokenStream<'_>,
        parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let condition = parse_expression(&tag.args, tag.line, tag.column)?;
        let condition = Expression::Not(Box::new(condition));
        let body = parser.parse_block(stream, &["else", "endunless"])?;

        let next = stream.next_tag()?;
        let else_branch = match next.name.as_str() {
            "else" => {
                let else_branch = parser.parse_block(stream, &["endunless"])?;
                stream.next_tag()?; // endunless
                Some(else_branch)
            }
            _ => None, // endunless
        };
        Ok(Node::If(IfNode {
            branches: vec![(condition, body)],
            else_branch,
        }))
    }
}
