/*
 * lexer.rs
 * Copyright (c) 2026 The brine developers
 */

//! Template tokenizer.
//!
//! A single left-to-right pass over the source that produces literal text
//! runs, tag tokens (`{% name args %}`) and output tokens (`{{ expr }}`).
//! Whitespace-control markers (`{{-`, `-%}`, ...) are applied here: a
//! leading `-` trims the end of the preceding text run, a trailing `-`
//! trims the start of the following one. `{% raw %}` blocks are also
//! resolved here, before any parsing, so their content reaches the parser
//! as plain text.
//!
//! The lexer is a lazy, non-restartable stream: the parser pulls tokens
//! exactly once via [`Lexer::next_token`].

use crate::error::{TemplateError, TemplateResult};

/// What kind of token was scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of literal template text.
    Text(String),

    /// A `{% name args %}` tag with its name and raw argument text.
    Tag { name: String, args: String },

    /// A `{{ expr }}` output statement with its raw expression text.
    Output { expr: String },
}

/// A token with its source position (1-based line and column of the first
/// character, or of the opening delimiter for tags and outputs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// Streaming tokenizer over template source text.
pub struct Lexer<'s> {
    source: &'s str,
    cursor: usize,
    line: usize,
    column: usize,
    /// Set by a trailing `-` marker: trim leading whitespace of the next
    /// text run.
    trim_next: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            cursor: 0,
            line: 1,
            column: 1,
            trim_next: false,
        }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.cursor..]
    }

    /// Advance the cursor over `len` bytes, updating line/column counts.
    fn advance(&mut self, len: usize) {
        let skipped = &self.source[self.cursor..self.cursor + len];
        for ch in skipped.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.cursor += len;
    }

    /// Scan the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> TemplateResult<Option<Token>> {
        if self.rest().is_empty() {
            return Ok(None);
        }

        let rest = self.rest();
        let next_output = rest.find("{{");
        let next_tag = rest.find("{%");
        let next_delim = match (next_output, next_tag) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        let token = match next_delim {
            Some(0) if rest.starts_with("{%") => self.scan_tag()?,
            Some(0) => self.scan_output()?,
            Some(idx) => self.scan_text(idx),
            None => self.scan_text(rest.len()),
        };
        Ok(Some(token))
    }

    /// Emit the text run ending at the next delimiter (or end of input),
    /// applying any pending or upcoming whitespace control.
    fn scan_text(&mut self, len: usize) -> Token {
        let line = self.line;
        let column = self.column;
        let raw = &self.source[self.cursor..self.cursor + len];
        self.advance(len);

        let mut text = raw;
        if self.trim_next {
            text = text.trim_start();
            self.trim_next = false;
        }
        // A `{{-` or `{%-` immediately after this run trims its end.
        if self.rest().starts_with("{{-") || self.rest().starts_with("{%-") {
            text = text.trim_end();
        }
        Token {
            kind: TokenKind::Text(text.to_string()),
            line,
            column,
        }
    }

    /// Scan a `{{ ... }}` output statement.
    fn scan_output(&mut self) -> TemplateResult<Token> {
        let line = self.line;
        let column = self.column;
        self.advance(2);

        let rest = self.rest();
        let Some(end) = rest.find("}}") else {
            return Err(TemplateError::syntax(
                "output statement is never closed: expected '}}'",
                line,
                column,
            ));
        };
        let mut inner = &rest[..end];
        self.advance(end + 2);

        if let Some(stripped) = inner.strip_prefix('-') {
            // Leading '-' only affects the preceding text run, which was
            // already trimmed when it was emitted.
            inner = stripped;
        }
        if let Some(stripped) = inner.strip_suffix('-') {
            inner = stripped;
            self.trim_next = true;
        }

        Ok(Token {
            kind: TokenKind::Output {
                expr: inner.trim().to_string(),
            },
            line,
            column,
        })
    }

    /// Scan a `{% name args %}` tag. `{% raw %}` blocks are resolved in
    /// place and returned as a text token.
    fn scan_tag(&mut self) -> TemplateResult<Token> {
        let line = self.line;
        let column = self.column;
        self.advance(2);

        let rest = self.rest();
        let Some(end) = rest.find("%}") else {
            return Err(TemplateError::syntax(
                "tag is never closed: expected '%}'",
                line,
                column,
            ));
        };
        let mut inner = &rest[..end];
        self.advance(end + 2);

        if let Some(stripped) = inner.strip_prefix('-') {
            inner = stripped;
        }
        if let Some(stripped) = inner.strip_suffix('-') {
            inner = stripped;
            self.trim_next = true;
        }

        let inner = inner.trim();
        let name: String = inner
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if name.is_empty() {
            return Err(TemplateError::syntax("missing tag name", line, column));
        }
        let args = inner[name.len()..].trim().to_string();

        if name == "raw" {
            return self.scan_raw_block(line, column);
        }

        Ok(Token {
            kind: TokenKind::Tag { name, args },
            line,
            column,
        })
    }

    /// Consume everything up to the matching `{% endraw %}` and return it
    /// as literal text.
    fn scan_raw_block(&mut self, line: usize, column: usize) -> TemplateResult<Token> {
        let start = self.cursor;
        let mut search = self.cursor;
        while let Some(found) = self.source[search..].find("{%") {
            let open = search + found;
            let closer = &self.source[open + 2..];
            let after = closer.strip_prefix('-').unwrap_or(closer);
            if after.trim_start().starts_with("endraw") {
                let mut text = &self.source[start..open];
                if self.trim_next {
                    text = text.trim_start();
                    self.trim_next = false;
                }
                if closer.starts_with('-') {
                    text = text.trim_end();
                }
                let text = text.to_string();
                self.advance(open - self.cursor);
                // Consume the endraw tag itself, including its markers.
                let rest = self.rest();
                let end = rest.find("%}").ok_or_else(|| {
                    TemplateError::syntax("tag is never closed: expected '%}'", self.line, self.column)
                })?;
                let endraw_inner = &rest[..end];
                let trims_after = endraw_inner.ends_with('-');
                self.advance(end + 2);
                self.trim_next = trims_after;
                return Ok(Token {
                    kind: TokenKind::Text(text),
                    line,
                    column,
                });
            }
            search = open + 2;
        }
        Err(TemplateError::syntax(
            "raw block is never closed: expected '{% endraw %}'",
            line,
            column,
        ))
    }
}

/// Tokenize a whole template eagerly. Convenience for tests; the parser
/// consumes the lexer as a stream.
pub fn tokenize(source: &str) -> TemplateResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
