/*
 * parser.rs
 * Copyright (c) 2026 The brine developers
 */

//! Template parser.
//!
//! Turns the lexer's token stream into a [`NodeList`]. For every tag the
//! parser consults the environment's tag registry; tag parsers receive the
//! stream cursor and can recursively request nested blocks up to a set of
//! terminator tag names. Nesting is handled by recursion: an inner block
//! consumes its own terminators, so an inner `{% endif %}` can never close
//! an outer `{% if %}`.
//!
//! All errors raised here (and by the expression parser it calls) are
//! compile-time errors; a partially parsed tree is never returned.

use crate::ast::{Node, NodeList};
use crate::environment::Environment;
use crate::error::{TemplateError, TemplateResult};
use crate::expression::parse_filtered_expression;
use crate::lexer::{Lexer, Token, TokenKind};

/// A `{% name args %}` tag as handed to a tag parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    pub name: String,
    pub args: String,
    pub line: usize,
    pub column: usize,
}

/// Cursor over the lexer's token stream. Consumed exactly once; supports
/// one token of lookahead so tag parsers can peek the next tag name.
pub struct TokenStream<'s> {
    lexer: Lexer<'s>,
    peeked: Option<Option<Token>>,
    line: usize,
    column: usize,
}

impl<'s> TokenStream<'s> {
    pub fn new(lexer: Lexer<'s>) -> Self {
        Self {
            lexer,
            peeked: None,
            line: 1,
            column: 1,
        }
    }

    /// Position of the most recently consumed token, for end-of-input
    /// errors.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> TemplateResult<Option<Token>> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        if let Some(token) = &token {
            self.line = token.line;
            self.column = token.column;
        }
        Ok(token)
    }

    /// Peek the next token without consuming it.
    pub fn peek(&mut self) -> TemplateResult<Option<&Token>> {
        if self.peeked.is_none() {
            let token = self.lexer.next_token()?;
            self.peeked = Some(token);
        }
        Ok(self.peeked.as_ref().and_then(Option::as_ref))
    }

    /// The name of the next tag, if the next token is a tag.
    pub fn peek_tag_name(&mut self) -> TemplateResult<Option<&str>> {
        Ok(match self.peek()? {
            Some(Token {
                kind: TokenKind::Tag { name, .. },
                ..
            }) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Consume the next token, which must be a tag.
    pub fn next_tag(&mut self) -> TemplateResult<TagToken> {
        match self.next()? {
            Some(Token {
                kind: TokenKind::Tag { name, args },
                line,
                column,
            }) => Ok(TagToken {
                name,
                args,
                line,
                column,
            }),
            _ => {
                let (line, column) = self.position();
                Err(TemplateError::tag("expected a tag", line, column))
            }
        }
    }
}

/// Structural tag names that only ever appear as part of an enclosing
/// block and are meaningless on their own.
const ORPHAN_TAGS: &[&str] = &[
    "else",
    "elsif",
    "endif",
    "endunless",
    "endfor",
    "endcomment",
    "endraw",
];

/// Template parser, tied to an environment for its tag registry.
pub struct Parser<'e> {
    env: &'e Environment,
}

impl<'e> Parser<'e> {
    pub fn new(env: &'e Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &Environment {
        self.env
    }

    /// Parse a whole template.
    pub fn parse(&self, source: &str) -> TemplateResult<NodeList> {
        let mut stream = TokenStream::new(Lexer::new(source));
        self.parse_block(&mut stream, &[])
    }

    /// Parse nodes until end of input (empty `terminators`) or until the
    /// next tag is one of `terminators`. The terminator tag itself is left
    /// in the stream for the caller to consume via [`TokenStream::next_tag`].
    pub fn parse_block(
        &self,
        stream: &mut TokenStream<'_>,
        terminators: &[&str],
    ) -> TemplateResult<NodeList> {
        let mut nodes = Vec::new();
        loop {
            if !terminators.is_empty() {
                if let Some(name) = stream.peek_tag_name()? {
                    if terminators.contains(&name) {
                        return Ok(nodes);
                    }
                }
            }

            let Some(token) = stream.next()? else {
                if terminators.is_empty() {
                    return Ok(nodes);
                }
                let (line, column) = stream.position();
                return Err(TemplateError::tag(
                    format!("missing closing tag: expected one of {terminators:?}"),
                    line,
                    column,
                ));
            };

            match token.kind {
                TokenKind::Text(text) => nodes.push(Node::Text(text)),
                TokenKind::Output { expr } => {
                    let expr = parse_filtered_expression(&expr, token.line, token.column)?;
                    nodes.push(Node::Output(expr));
                }
                TokenKind::Tag { name, args } => {
                    let tag = TagToken {
                        name,
                        args,
                        line: token.line,
                        column: token.column,
                    };
                    let Some(tag_parser) = self.env.tags().get(&tag.name) else {
                        let message = if ORPHAN_TAGS.contains(&tag.name.as_str()) {
                            format!("unexpected tag '{}'", tag.name)
                        } else {
                            format!("unknown tag '{}'", tag.name)
                        };
                        return Err(TemplateError::tag(message, tag.line, tag.column));
                    };
                    let tag_parser = tag_parser.clone();
                    nodes.push(tag_parser.parse(&tag, stream, self)?);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;

    fn parse(source: &str) -> TemplateResult<NodeList> {
        let env = Environment::new();
        Parser::new(&env).parse(source)
    }

    #[test]
    fn test_text_and_output() {
        let nodes = parse("a {{ b }} c").unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(matches!(&nodes[0], Node::Text(t) if t == "a "));
        assert!(matches!(&nodes[1], Node::Output(Expression::Path(_))));
        assert!(matches!(&nodes[2], Node::Text(t) if t == " c"));
    }

    #[test]
    fn test_nested_if_terminators() {
        // The inner endif must not close the outer if.
        let nodes = parse("{% if a %}{% if b %}x{% endif %}y{% endif %}").unwrap();
        assert_eq!(nodes.len(), 1);
        let Node::If(outer) = &nodes[0] else {
            panic!("expected if node");
        };
        assert_eq!(outer.branches.len(), 1);
        assert_eq!(outer.branches[0].1.len(), 2);
    }

    #[test]
    fn test_orphan_else_is_a_tag_error() {
        assert!(matches!(
            parse("{% else %}").unwrap_err(),
            TemplateError::Tag { .. }
        ));
        assert!(matches!(
            parse("x{% endif %}").unwrap_err(),
            TemplateError::Tag { .. }
        ));
    }

    #[test]
    fn test_unknown_tag_is_a_tag_error() {
        let err = parse("{% widget %}").unwrap_err();
        match err {
            TemplateError::Tag { message, .. } => {
                assert!(message.contains("unknown tag 'widget'"));
            }
            other => panic!("expected tag error, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_block_is_a_tag_error() {
        assert!(matches!(
            parse("{% if a %}x").unwrap_err(),
            TemplateError::Tag { .. }
        ));
    }

    #[test]
    fn test_malformed_output_is_a_syntax_error() {
        assert!(matches!(
            parse("{{ a b }}").unwrap_err(),
            TemplateError::Syntax { .. }
        ));
    }
}
