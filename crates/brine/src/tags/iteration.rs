/*
 * tags/iteration.rs
 * Copyright (c) 2026 The brine developers
 */

//! `{% for %}`.

use crate::ast::{ForNode, Node};
use crate::error::TemplateResult;
use crate::expression::parse_for_args;
use crate::parser::{Parser, TagToken, TokenStream};
use crate::tags::TagParser;

/// `{% for x in expr %}` ... `{% else %}` ... `{% endfor %}`. The `else`
/// body renders when the iterable produces no items.
pub struct ForTag;

impl TagParser for ForTag {
    fn parse(
        &self,
        tag: &TagToken,
        stream: &mut TokenStream<'_>,
        parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let (var, iterable) = parse_for_args(&tag.args, tag.line, tag.column)?;
        let body = parser.parse_block(stream, &["else", "endfor"])?;

        let next = stream.next_tag()?;
        let else_branch = match next.name.as_str() {
            "else" => {
                let else_branch = parser.parse_block(stream, &["endfor"])?;
                stream.next_tag()?; // endfor
                Some(else_branch)
            }
            _ => None, // endfor
        };
        Ok(Node::For(ForNode {
            var,
            iterable,
            body,
            else_branch,
        }))
    }
}
