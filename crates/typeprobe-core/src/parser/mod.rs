mod expression;
mod statement;
mod types;


use crate::ast::{Ident, NodeId, Script, Spanned, MAX_NESTING_DEPTH, NESTED_TOO_DEEPLY};
use crate::diagnostics::{Diagnostic, DiagnosticHandler};
use crate::lexer::{Token, TokenKind};
use crate::span::Span;
use std::sync::Arc;

pub use expression::ExpressionParser;
pub use statement::StatementParser;
pub use types::TypeParser;

#[derive(Debug, Clone)]
pub struct ParserError {
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}", self.message, self.span.line)
    }
}

impl std::error::Error for ParserError {}

/// Saved parser position for speculative parsing
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    position: usize,
    next_node_id: u32,
    depth: usize,
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    next_node_id: u32,
    /// Nesting of the syntax being parsed, bounded by [`MAX_NESTING_DEPTH`]
    depth: usize,
    diagnostic_handler: Arc<dyn DiagnosticHandler>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, diagnostic_handler: Arc<dyn DiagnosticHandler>) -> Self {
        let mut tokens = tokens;
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end, 0, 0)));
        }
        Parser {
            tokens,
            position: 0,
            next_node_id: 0,
            depth: 0,
            diagnostic_handler,
        }
    }

    /// Number expression ids from `first` so ids stay unique across files
    pub fn with_first_node_id(mut self, first: u32) -> Self {
        self.next_node_id = first;
        self
    }

    /// First id not handed out yet
    pub fn next_node_id(&self) -> u32 {
        self.next_node_id
    }

    pub fn parse(&mut self) -> Result<Script, ParserError> {
        let start_span = self.current_span();
        let mut statements = Vec::new();

        while !self.is_at_end() {
            let before = self.position;
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.report_error(&e.message, e.span);
                    // Error recovery: skip to next statement
                    self.synchronize(before);
                }
            }
        }

        let end_span = statements
            .last()
            .map(|statement| statement.span())
            .unwrap_or(start_span);

        Ok(Script::new(statements, start_span.combine(&end_span)))
    }

    // Token stream management
    fn current(&self) -> &Token {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn peek(&self, offset: usize) -> &Token {
        let index = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParserError> {
        if self.check(&kind) {
            return Ok(self.advance());
        }

        Err(self.error_here(message))
    }

    fn error_here(&self, message: &str) -> ParserError {
        ParserError {
            message: message.to_string(),
            span: self.current_span(),
        }
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the last consumed token
    fn previous_span(&self) -> Span {
        if self.position == 0 {
            self.current_span()
        } else {
            self.tokens[self.position - 1].span
        }
    }

    /// Span from `start` through the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.combine(&self.previous_span())
    }

    /// True when a line break separates the previous token from the current one
    fn has_preceding_line_break(&self) -> bool {
        self.position > 0 && self.current().span.line > self.tokens[self.position - 1].span.line
    }

    fn is_contextual(&self, word: &str) -> bool {
        matches!(&self.current().kind, TokenKind::Identifier(name) if name == word)
    }

    fn eat_contextual(&mut self, word: &str) -> bool {
        if self.is_contextual(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Statement terminator with automatic semicolon insertion
    fn consume_semicolon(&mut self) -> Result<(), ParserError> {
        if self.match_token(&[TokenKind::Semicolon]) {
            return Ok(());
        }
        if self.check(&TokenKind::RightBrace) || self.is_at_end() || self.has_preceding_line_break()
        {
            return Ok(());
        }
        Err(self.error_here("';' expected."))
    }

    fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            position: self.position,
            next_node_id: self.next_node_id,
            depth: self.depth,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.position;
        self.next_node_id = checkpoint.next_node_id;
        self.depth = checkpoint.depth;
    }

    /// Run `parse`, rewinding and returning `None` if it fails
    fn try_parse<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, ParserError>) -> Option<T> {
        let checkpoint = self.checkpoint();
        match parse(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.restore(checkpoint);
                None
            }
        }
    }

    /// Count one more level of nesting, failing past [`MAX_NESTING_DEPTH`].
    ///
    /// The level is given back by the enclosing [`Parser::nested`].
    fn descend(&mut self) -> Result<(), ParserError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_here(NESTED_TOO_DEEPLY));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one level deeper, restoring the depth afterwards
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, ParserError>) -> Result<T, ParserError> {
        let depth = self.depth;
        let result = match self.descend() {
            Ok(()) => parse(self),
            Err(error) => Err(error),
        };
        self.depth = depth;
        result
    }

    pub(crate) fn parse_identifier(&mut self) -> Result<Ident, ParserError> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let ident = Spanned::new(name.clone(), self.current_span());
                self.advance();
                Ok(ident)
            }
            _ => Err(self.error_here("Identifier expected.")),
        }
    }

    /// Identifier, keyword, string or number usable as a property name
    pub(crate) fn parse_property_name(&mut self) -> Result<Ident, ParserError> {
        let span = self.current_span();
        let name = match &self.current().kind {
            TokenKind::Identifier(name) | TokenKind::String(name) => name.clone(),
            TokenKind::Number(value) => crate::ast::format_number(*value),
            other => match other.identifier_name() {
                Some(keyword) => keyword.to_string(),
                None => return Err(self.error_here("Property assignment expected.")),
            },
        };
        self.advance();
        Ok(Spanned::new(name, span))
    }

    // Error reporting
    fn report_error(&self, message: &str, span: Span) {
        self.diagnostic_handler.report(Diagnostic::error(span, message));
    }

    // Error recovery: skip to next statement boundary
    fn synchronize(&mut self, failed_at: usize) {
        if self.position == failed_at {
            self.advance();
        }

        while !self.is_at_end() {
            if self.tokens[self.position - 1].kind == TokenKind::Semicolon {
                return;
            }
            match &self.current().kind {
                TokenKind::Function
                | TokenKind::Const
                | TokenKind::Let
                | TokenKind::Var
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Interface
                | TokenKind::Class
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::Declare => return,
                _ => {}
            }

            self.advance();
        }
    }
}
