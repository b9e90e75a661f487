/*
 * tags/assignment.rs
 * Copyright (c) 2026 The brine developers
 */

//! `{% assign %}` and `{% echo %}`.

use crate::ast::Node;
use crate::error::TemplateResult;
use crate::expression::{parse_assign_args, parse_filtered_expression};
use crate::parser::{Parser, TagToken, TokenStream};
use crate::tags::TagParser;

/// `{% assign name = expr %}`. The right-hand side takes the full output
/// grammar, filters and inline conditionals included.
pub struct AssignTag;

impl TagParser for AssignTag {
    fn parse(
        &self,
        tag: &TagToken,
        _stream: &mut TokenStream<'_>,
        _parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let (name, expr) = parse_assign_args(&tag.args, tag.line, tag.column)?;
        Ok(Node::Assign { name, expr })
    }
}

/// `{% echo expr %}`: an output statement in tag position.
pub struct EchoTag;

impl TagParser for EchoTag {
    fn parse(
        &self,
        tag: &TagToken,
        _stream: &mut TokenStream<'_>,
        _parser: &Parser<'_>,
    ) -> TemplateResult<Node> {
        let expr = parse_filtered_expression(&tag.args, tag.line, tag.column)?;
        Ok(Node::Echo(expr))
    }
}
