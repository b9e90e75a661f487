/*
 * tags/comment.rs
 * Copyright (c) 2026 The brine developers
 */

//! `{% comment %}`.

use crate::ast::Node;
use crate::error::{TemplateError, TemplateResult};
use crate::lexer::TokenKind;
use crate::parser::{Parser, TagToken, TokenStream};
use crate::tags::TagParser;

/// `{% comment %}` ... `{% endcomment %}`. The body is discarded without
/// being parsed, so it may contain malformed template syntax. Nested
/// comment blocks are tracked so an inner `{% endcomment %}` does not
/// close the outer comment.
pub struct CommentTag;

impl TagParser for CommentTag {
    fn parse(
        &self,
        tag: &TagToken,
        stream: &mut TokenStream<'_>,
        _parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let mut depth = 1usize;
        loop {
            let Some(token) = stream.next()? else {
                return Err(TemplateError::tag(
                    "comment block never closed",
                    tag.line,
                    tag.column,
                ));
            };
            if let TokenKind::Tag { name, .. } = &token.kind {
                match name.as_str() {
                    "comment" => depth += 1,
                    "endcomment" => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(Node::Text(String::new()));
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
