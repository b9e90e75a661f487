/*
 * expression.rs
 * Copyright (c) 2026 The brine developers
 */

//! Expression AST and parser.
//!
//! Expressions appear in output statements (`{{ ... }}`) and in tag
//! arguments (`if`, `assign`, `echo`, ...). The grammar, from loosest to
//! tightest binding:
//!
//! 1. inline conditional suffix: `value if cond [else alt] [|| filters]`
//! 2. `or`
//! 3. `and`
//! 4. `not` (prefix)
//! 5. comparison (`==`, `!=`, `<>`, `<`, `<=`, `>`, `>=`) and `contains`
//! 6. filter pipeline (`|`)
//! 7. primary: literal, variable path, parenthesised sub-expression
//!
//! Two consequences worth calling out: a filter pipeline binds to the base
//! value, so `'hello' | upcase if true` filters first and branches second;
//! and the `||` tail filters of an inline conditional apply after branch
//! selection, to whichever branch was chosen.
//!
//! [`parse_expression`] accepts the boolean grammar (tag conditions);
//! [`parse_filtered_expression`] additionally accepts the inline
//! conditional suffix (output statements, `assign`, `echo`).

use crate::error::{TemplateError, TemplateResult};

/// A literal expression term.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Str(String),
    /// The `empty` keyword; compares equal to `""`, `[]` and `{}`.
    Empty,
    /// The `blank` keyword; like `empty` plus whitespace-only strings,
    /// `nil` and `false`.
    Blank,
}

/// One step of a variable path: a name (`a.b` or `a["b"]`) or an array
/// index (`a[0]`, `a[-1]`).
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Key(String),
    Index(i64),
}

/// A single filter invocation in a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    pub name: String,
    pub args: Vec<Expression>,
    pub kwargs: Vec<(String, Expression)>,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An expression tree. Immutable once parsed; evaluation never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Path(Vec<PathSegment>),
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Comparison {
        op: CompareOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Contains {
        haystack: Box<Expression>,
        needle: Box<Expression>,
    },
    Filtered {
        base: Box<Expression>,
        filters: Vec<FilterCall>,
    },
    Conditional {
        value: Box<Expression>,
        condition: Box<Expression>,
        alternative: Option<Box<Expression>>,
        /// Applied after branch selection.
        tail_filters: Vec<FilterCall>,
    },
}

// ----------------------------------------------------------------------------
// Scanner
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum ExprToken {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Pipe,
    DoublePipe,
    Colon,
    Comma,
    Dot,
    Assign,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

fn scan(text: &str, line: usize, column: usize) -> TemplateResult<Vec<ExprToken>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != quote {
                    end += 1;
                }
                if end == chars.len() {
                    return Err(TemplateError::syntax(
                        "unterminated string literal",
                        line,
                        column,
                    ));
                }
                tokens.push(ExprToken::Str(chars[start..end].iter().collect()));
                i = end + 1;
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(ExprToken::DoublePipe);
                    i += 2;
                } else {
                    tokens.push(ExprToken::Pipe);
                    i += 1;
                }
            }
            ':' => {
                tokens.push(ExprToken::Colon);
                i += 1;
            }
            ',' => {
                tokens.push(ExprToken::Comma);
                i += 1;
            }
            '.' => {
                tokens.push(ExprToken::Dot);
                i += 1;
            }
            '[' => {
                tokens.push(ExprToken::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(ExprToken::RBracket);
                i += 1;
            }
            '(' => {
                tokens.push(ExprToken::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(ExprToken::RParen);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(ExprToken::Eq);
                    i += 2;
                } else {
                    tokens.push(ExprToken::Assign);
                    i += 1;
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(ExprToken::Ne);
                    i += 2;
                } else {
                    return Err(TemplateError::syntax("unexpected '!'", line, column));
                }
            }
            '<' => match chars.get(i + 1) {
                Some('=') => {
                    tokens.push(ExprToken::Le);
                    i += 2;
                }
                Some('>') => {
                    tokens.push(ExprToken::Ne);
                    i += 2;
                }
                _ => {
                    tokens.push(ExprToken::Lt);
                    i += 1;
                }
            },
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(ExprToken::Ge);
                    i += 2;
                } else {
                    tokens.push(ExprToken::Gt);
                    i += 1;
                }
            }
            '-' if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                let (token, next) = scan_number(&chars, i, line, column)?;
                tokens.push(token);
                i = next;
            }
            c if c.is_ascii_digit() => {
                let (token, next) = scan_number(&chars, i, line, column)?;
                tokens.push(token);
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(ExprToken::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(TemplateError::syntax(
                    format!("unexpected character '{other}' in expression"),
                    line,
                    column,
                ));
            }
        }
    }
    Ok(tokens)
}

fn scan_number(
    chars: &[char],
    start: usize,
    line: usize,
    column: usize,
) -> TemplateResult<(ExprToken, usize)> {
    let mut i = start;
    if chars[i] == '-' {
        i += 1;
    }
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let mut is_float = false;
    if i < chars.len() && chars[i] == '.' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
        is_float = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    let text: String = chars[start..i].iter().collect();
    let token = if is_float {
        ExprToken::Float(text.parse().map_err(|_| {
            TemplateError::syntax(format!("malformed number '{text}'"), line, column)
        })?)
    } else {
        ExprToken::Int(text.parse().map_err(|_| {
            TemplateError::syntax(format!("malformed number '{text}'"), line, column)
        })?)
    };
    Ok((token, i))
}

// ----------------------------------------------------------------------------
// Parser
// ----------------------------------------------------------------------------

struct ExprParser {
    tokens: Vec<ExprToken>,
    pos: usize,
    line: usize,
    column: usize,
}

impl ExprParser {
    fn new(text: &str, line: usize, column: usize) -> TemplateResult<Self> {
        Ok(Self {
            tokens: scan(text, line, column)?,
            pos: 0,
            line,
            column,
        })
    }

    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&ExprToken> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<ExprToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &ExprToken) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(ExprToken::Ident(name)) if name == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &ExprToken, what: &str) -> TemplateResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax(message, self.line, self.column)
    }

    fn expect_end(&self) -> TemplateResult<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing tokens in expression"))
        }
    }

    /// Inline conditional: `value if cond [else alt] [|| filters]`.
    fn parse_ternary(&mut self) -> TemplateResult<Expression> {
        let value = self.parse_or()?;
        if !self.eat_keyword("if") {
            return Ok(value);
        }
        let condition = self.parse_or()?;
        let alternative = if self.eat_keyword("else") {
            Some(Box::new(self.parse_or()?))
        } else {
            None
        };
        let tail_filters = if self.eat(&ExprToken::DoublePipe) {
            self.parse_filter_chain()?
        } else {
            Vec::new()
        };
        Ok(Expression::Conditional {
            value: Box::new(value),
            condition: Box::new(condition),
            alternative,
            tail_filters,
        })
    }

    fn parse_or(&mut self) -> TemplateResult<Expression> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> TemplateResult<Expression> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> TemplateResult<Expression> {
        if self.eat_keyword("not") {
            let inner = self.parse_not()?;
            Ok(Expression::Not(Box::new(inner)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> TemplateResult<Expression> {
        let left = self.parse_filtered()?;
        let op = match self.peek() {
            Some(ExprToken::Eq) => Some(CompareOp::Eq),
            Some(ExprToken::Ne) => Some(CompareOp::Ne),
            Some(ExprToken::Lt) => Some(CompareOp::Lt),
            Some(ExprToken::Le) => Some(CompareOp::Le),
            Some(ExprToken::Gt) => Some(CompareOp::Gt),
            Some(ExprToken::Ge) => Some(CompareOp::Ge),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let right = self.parse_filtered()?;
            return Ok(Expression::Comparison {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        if self.eat_keyword("contains") {
            let needle = self.parse_filtered()?;
            return Ok(Expression::Contains {
                haystack: Box::new(left),
                needle: Box::new(needle),
            });
        }
        Ok(left)
    }

    fn parse_filtered(&mut self) -> TemplateResult<Expression> {
        let base = self.parse_primary()?;
        if self.peek() != Some(&ExprToken::Pipe) {
            return Ok(base);
        }
        self.pos += 1;
        let filters = self.parse_filter_chain()?;
        Ok(Expression::Filtered {
            base: Box::new(base),
            filters,
        })
    }

    /// One or more filter calls separated by `|`. The leading pipe (or
    /// `||` for tail filters) has already been consumed.
    fn parse_filter_chain(&mut self) -> TemplateResult<Vec<FilterCall>> {
        let mut filters = vec![self.parse_filter_call()?];
        while self.eat(&ExprToken::Pipe) {
            filters.push(self.parse_filter_call()?);
        }
        Ok(filters)
    }

    fn parse_filter_call(&mut self) -> TemplateResult<FilterCall> {
        let name = match self.next() {
            Some(ExprToken::Ident(name)) => name,
            _ => return Err(self.error("expected filter name after '|'")),
        };
        let mut args = Vec::new();
        let mut kwargs = Vec::new();
        if self.eat(&ExprToken::Colon) {
            loop {
                // `ident:` starts a keyword argument.
                let is_kwarg = matches!(self.peek(), Some(ExprToken::Ident(_)))
                    && self.peek_at(1) == Some(&ExprToken::Colon);
                if is_kwarg {
                    let Some(ExprToken::Ident(key)) = self.next() else {
                        unreachable!("peeked an identifier");
                    };
                    self.pos += 1; // colon
                    kwargs.push((key, self.parse_primary()?));
                } else {
                    args.push(self.parse_primary()?);
                }
                if !self.eat(&ExprToken::Comma) {
                    break;
                }
            }
        }
        Ok(FilterCall { name, args, kwargs })
    }

    fn parse_primary(&mut self) -> TemplateResult<Expression> {
        match self.next() {
            Some(ExprToken::Str(s)) => Ok(Expression::Literal(Literal::Str(s))),
            Some(ExprToken::Int(i)) => Ok(Expression::Literal(Literal::Integer(i))),
            Some(ExprToken::Float(f)) => Ok(Expression::Literal(Literal::Float(f))),
            Some(ExprToken::LParen) => {
                let inner = self.parse_or()?;
                self.expect(&ExprToken::RParen, "')'")?;
                Ok(inner)
            }
            Some(ExprToken::Ident(name)) => match name.as_str() {
                "true" => Ok(Expression::Literal(Literal::Bool(true))),
                "false" => Ok(Expression::Literal(Literal::Bool(false))),
                "nil" | "null" => Ok(Expression::Literal(Literal::Nil)),
                "empty" => Ok(Expression::Literal(Literal::Empty)),
                "blank" => Ok(Expression::Literal(Literal::Blank)),
                _ => self.parse_path(name),
            },
            Some(other) => Err(self.error(format!("unexpected token {other:?}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn parse_path(&mut self, first: String) -> TemplateResult<Expression> {
        let mut segments = vec![PathSegment::Key(first)];
        loop {
            if self.eat(&ExprToken::Dot) {
                match self.next() {
                    Some(ExprToken::Ident(name)) => segments.push(PathSegment::Key(name)),
                    _ => return Err(self.error("expected name after '.'")),
                }
            } else if self.eat(&ExprToken::LBracket) {
                match self.next() {
                    Some(ExprToken::Int(i)) => segments.push(PathSegment::Index(i)),
                    Some(ExprToken::Str(key)) => segments.push(PathSegment::Key(key)),
                    _ => return Err(self.error("expected index or quoted key after '['")),
                }
                self.expect(&ExprToken::RBracket, "']'")?;
            } else {
                return Ok(Expression::Path(segments));
            }
        }
    }
}

/// Parse a boolean expression (tag conditions). The inline conditional
/// suffix is not accepted here.
pub fn parse_expression(text: &str, line: usize, column: usize) -> TemplateResult<Expression> {
    let mut parser = ExprParser::new(text, line, column)?;
    if parser.tokens.is_empty() {
        return Err(parser.error("empty expression"));
    }
    let expr = parser.parse_or()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse an output expression: filters plus the optional inline
/// conditional suffix. Used by `{{ ... }}`, `assign` and `echo`.
pub fn parse_filtered_expression(
    text: &str,
    line: usize,
    column: usize,
) -> TemplateResult<Expression> {
    let mut parser = ExprParser::new(text, line, column)?;
    if parser.tokens.is_empty() {
        return Err(parser.error("empty expression"));
    }
    let expr = parser.parse_ternary()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse `name = expr` for the `assign` tag.
pub(crate) fn parse_assign_args(
    text: &str,
    line: usize,
    column: usize,
) -> TemplateResult<(String, Expression)> {
    let mut parser = ExprParser::new(text, line, column)?;
    let name = match parser.next() {
        Some(ExprToken::Ident(name)) => name,
        _ => return Err(parser.error("expected a variable name in assign")),
    };
    parser.expect(&ExprToken::Assign, "'=' in assign")?;
    let expr = parser.parse_ternary()?;
    parser.expect_end()?;
    Ok((name, expr))
}

/// Parse `name in expr` for the `for` tag.
pub(crate) fn parse_for_args(
    text: &str,
    line: usize,
    column: usize,
) -> TemplateResult<(String, Expression)> {
    let mut parser = ExprParser::new(text, line, column)?;
    let name = match parser.next() {
        Some(ExprToken::Ident(name)) => name,
        _ => return Err(parser.error("expected a loop variable name")),
    };
    if !parser.eat_keyword("in") {
        return Err(parser.error("expected 'in' after the loop variable"));
    }
    let expr = parser.parse_or()?;
    parser.expect_end()?;
    Ok((name, expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Expression {
        parse_filtered_expression(text, 1, 1).unwrap()
    }

    fn parse_bool(text: &str) -> Expression {
        parse_expression(text, 1, 1).unwrap()
    }

    fn path(names: &[&str]) -> Expression {
        Expression::Path(names.iter().map(|n| PathSegment::Key(n.to_string())).collect())
    }

    fn lit_str(s: &str) -> Expression {
        Expression::Literal(Literal::Str(s.to_string()))
    }

    // ========================================================================
    // Primaries and paths
    // ========================================================================

    #[test]
    fn test_literals() {
        assert_eq!(parse("42"), Expression::Literal(Literal::Integer(42)));
        assert_eq!(parse("-3"), Expression::Literal(Literal::Integer(-3)));
        assert_eq!(parse("1.5"), Expression::Literal(Literal::Float(1.5)));
        assert_eq!(parse("'hi'"), lit_str("hi"));
        assert_eq!(parse("\"hi\""), lit_str("hi"));
        assert_eq!(parse("true"), Expression::Literal(Literal::Bool(true)));
        assert_eq!(parse("nil"), Expression::Literal(Literal::Nil));
        assert_eq!(parse("empty"), Expression::Literal(Literal::Empty));
    }

    #[test]
    fn test_paths() {
        assert_eq!(parse("settings.foo"), path(&["settings", "foo"]));
        assert_eq!(
            parse("items[0]"),
            Expression::Path(vec![
                PathSegment::Key("items".to_string()),
                PathSegment::Index(0)
            ])
        );
        assert_eq!(
            parse("a[\"b c\"].d"),
            Expression::Path(vec![
                PathSegment::Key("a".to_string()),
                PathSegment::Key("b c".to_string()),
                PathSegment::Key("d".to_string()),
            ])
        );
    }

    // ========================================================================
    // Precedence
    // ========================================================================

    #[test]
    fn test_not_binds_looser_than_comparison() {
        assert_eq!(
            parse_bool("not foo == true"),
            Expression::Not(Box::new(Expression::Comparison {
                op: CompareOp::Eq,
                left: Box::new(path(&["foo"])),
                right: Box::new(Expression::Literal(Literal::Bool(true))),
            }))
        );
    }

    #[test]
    fn test_not_binds_tighter_than_and() {
        assert_eq!(
            parse_bool("not foo and not bar"),
            Expression::And(
                Box::new(Expression::Not(Box::new(path(&["foo"])))),
                Box::new(Expression::Not(Box::new(path(&["bar"])))),
            )
        );
    }

    #[test]
    fn test_parenthesised_containment() {
        assert_eq!(
            parse_bool("not (foo contains 'z')"),
            Expression::Not(Box::new(Expression::Contains {
                haystack: Box::new(path(&["foo"])),
                needle: Box::new(lit_str("z")),
            }))
        );
    }

    #[test]
    fn test_filter_binds_to_base_value() {
        // The filter applies before the inline conditional selects.
        let expr = parse("'hello' | upcase if true");
        match expr {
            Expression::Conditional { value, .. } => match *value {
                Expression::Filtered { base, filters } => {
                    assert_eq!(*base, lit_str("hello"));
                    assert_eq!(filters.len(), 1);
                    assert_eq!(filters[0].name, "upcase");
                }
                other => panic!("expected filtered value, got {other:?}"),
            },
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_tail_filters_attach_to_the_conditional() {
        let expr = parse("greeting if settings.foo else 'bar' || upcase");
        match expr {
            Expression::Conditional {
                value,
                condition,
                alternative,
                tail_filters,
            } => {
                assert_eq!(*value, path(&["greeting"]));
                assert_eq!(*condition, path(&["settings", "foo"]));
                assert_eq!(alternative.map(|a| *a), Some(lit_str("bar")));
                assert_eq!(tail_filters.len(), 1);
                assert_eq!(tail_filters[0].name, "upcase");
            }
            other => panic!("expected conditional, got {other:?}"),
        }
    }

    #[test]
    fn test_filter_arguments() {
        let expr = parse("x | default: true, allow_false: true");
        match expr {
            Expression::Filtered { filters, .. } => {
                assert_eq!(filters[0].name, "default");
                assert_eq!(
                    filters[0].args,
                    vec![Expression::Literal(Literal::Bool(true))]
                );
                assert_eq!(
                    filters[0].kwargs,
                    vec![(
                        "allow_false".to_string(),
                        Expression::Literal(Literal::Bool(true))
                    )]
                );
            }
            other => panic!("expected filtered expression, got {other:?}"),
        }
    }

    #[test]
    fn test_chained_filters_keep_order() {
        let expr = parse("x | append: 'a' | upcase");
        match expr {
            Expression::Filtered { filters, .. } => {
                let names: Vec<&str> = filters.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(names, vec!["append", "upcase"]);
            }
            other => panic!("expected filtered expression, got {other:?}"),
        }
    }

    // ========================================================================
    // Tag argument helpers
    // ========================================================================

    #[test]
    fn test_assign_args() {
        let (name, expr) = parse_assign_args("foo = 'hello' if false", 1, 1).unwrap();
        assert_eq!(name, "foo");
        assert!(matches!(expr, Expression::Conditional { .. }));
    }

    #[test]
    fn test_for_args() {
        let (name, expr) = parse_for_args("item in collection.items", 1, 1).unwrap();
        assert_eq!(name, "item");
        assert_eq!(expr, path(&["collection", "items"]));
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn test_parse_errors() {
        assert!(parse_filtered_expression("", 1, 1).is_err());
        assert!(parse_filtered_expression("'unterminated", 1, 1).is_err());
        assert!(parse_filtered_expression("a b", 1, 1).is_err());
        assert!(parse_filtered_expression("a ==", 1, 1).is_err());
        assert!(parse_filtered_expression("(a", 1, 1).is_err());
        assert!(parse_filtered_expression("a | ", 1, 1).is_err());
        assert!(parse_expression("'x' if true", 1, 1).is_err(), "no ternary in boolean grammar");
        assert!(parse_assign_args("= 1", 1, 1).is_err());
        assert!(parse_for_args("x of y", 1, 1).is_err());
    }
}
