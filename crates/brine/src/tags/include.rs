/*
 * tags/include.rs
 * Copyright (c) 2026 The brine developers
 */

//! `{% include %}`.

use crate::ast::Node;
use crate::error::TemplateResult;
use crate::expression::parse_filtered_expression;
use crate::parser::{Parser, TagToken, TokenStream};
use crate::tags::TagParser;

/// `{% include 'name' %}`. The name may be any expression; it is
/// stringified at render time and handed to the environment's loader. The
/// partial shares the including template's scope.
pub struct IncludeTag;

impl TagParser for IncludeTag {
    fn parse(
        &self,
        tag: &TagToken,
        _stream: &mut TokenStream<'_>,
        _parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let name = parse_filtered_expression(&tag.args, tag.line, tag.column)?;
        Ok(Node::Include {
            name,
            line: tag.line,
            column: tag.column,
        })
    }
}
