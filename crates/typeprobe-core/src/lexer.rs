use crate::diagnostics::{Diagnostic, DiagnosticHandler};
use crate::span::Span;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Identifier(String),
    String(String),
    Template {
        value: String,
        has_substitutions: bool,
    },
    Number(f64),

    // Keywords
    Const,
    Let,
    Var,
    Function,
    Return,
    Break,
    Continue,
    Throw,
    If,
    Else,
    While,
    For,
    In,
    Class,
    Interface,
    New,
    Typeof,
    Keyof,
    Extends,
    Implements,
    Export,
    Import,
    Declare,
    True,
    False,
    Null,
    Void,
    This,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    QuestionDot,
    DotDotDot,
    Colon,
    Question,
    Arrow,

    // Operators
    Equal,
    EqualEqual,
    EqualEqualEqual,
    BangEqual,
    BangEqualEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,
    QuestionQuestion,
    Amp,
    Pipe,
    Caret,
    Tilde,
    PlusEqual,
    MinusEqual,
    PlusPlus,
    MinusMinus,

    Eof,
}

impl TokenKind {
    /// Identifier text, including keywords usable as property names
    pub fn identifier_name(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Const => "const",
            TokenKind::Let => "let",
            TokenKind::Var => "var",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Throw => "throw",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Class => "class",
            TokenKind::Interface => "interface",
            TokenKind::New => "new",
            TokenKind::Typeof => "typeof",
            TokenKind::Keyof => "keyof",
            TokenKind::Extends => "extends",
            TokenKind::Implements => "implements",
            TokenKind::Export => "export",
            TokenKind::Import => "import",
            TokenKind::Declare => "declare",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Void => "void",
            TokenKind::This => "this",
            _ => return None,
        })
    }
}

fn keyword(text: &str) -> Option<TokenKind> {
    Some(match text {
        "const" => TokenKind::Const,
        "let" => TokenKind::Let,
        "var" => TokenKind::Var,
        "function" => TokenKind::Function,
        "return" => TokenKind::Return,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "throw" => TokenKind::Throw,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "new" => TokenKind::New,
        "typeof" => TokenKind::Typeof,
        "keyof" => TokenKind::Keyof,
        "extends" => TokenKind::Extends,
        "implements" => TokenKind::Implements,
        "export" => TokenKind::Export,
        "import" => TokenKind::Import,
        "declare" => TokenKind::Declare,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "void" => TokenKind::Void,
        "this" => TokenKind::This,
        _ => return None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

pub struct Lexer<'src> {
    source: &'src str,
    position: usize,
    line: usize,
    column: usize,
    diagnostic_handler: Arc<dyn DiagnosticHandler>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, diagnostic_handler: Arc<dyn DiagnosticHandler>) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
            diagnostic_handler,
        }
    }

    /// Tokenize the whole source; the last token is always `Eof`
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            let start = self.position;
            let line = self.line;
            let column = self.column;

            let Some(ch) = self.advance() else {
                return Token::new(TokenKind::Eof, Span::new(start, start, line, column));
            };

            let kind = match ch {
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '{' => TokenKind::LeftBrace,
                '}' => TokenKind::RightBrace,
                '[' => TokenKind::LeftBracket,
                ']' => TokenKind::RightBracket,
                ';' => TokenKind::Semicolon,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                '~' => TokenKind::Tilde,
                '^' => TokenKind::Caret,
                '%' => TokenKind::Percent,
                '/' => TokenKind::Slash,
                '.' => {
                    if self.current() == Some('.') && self.peek(1) == Some('.') {
                        self.advance();
                        self.advance();
                        TokenKind::DotDotDot
                    } else if self.current().is_some_and(|c| c.is_ascii_digit()) {
                        self.number(start)
                    } else {
                        TokenKind::Dot
                    }
                }
                '?' => {
                    if self.eat('?') {
                        TokenKind::QuestionQuestion
                    } else if self.current() == Some('.')
                        && !self.peek(1).is_some_and(|c| c.is_ascii_digit())
                    {
                        self.advance();
                        TokenKind::QuestionDot
                    } else {
                        TokenKind::Question
                    }
                }
                '=' => {
                    if self.eat('>') {
                        TokenKind::Arrow
                    } else if self.eat('=') {
                        if self.eat('=') {
                            TokenKind::EqualEqualEqual
                        } else {
                            TokenKind::EqualEqual
                        }
                    } else {
                        TokenKind::Equal
                    }
                }
                '!' => {
                    if self.eat('=') {
                        if self.eat('=') {
                            TokenKind::BangEqualEqual
                        } else {
                            TokenKind::BangEqual
                        }
                    } else {
                        TokenKind::Bang
                    }
                }
                '<' => {
                    if self.eat('=') {
                        TokenKind::LessEqual
                    } else {
                        TokenKind::Less
                    }
                }
                '>' => {
                    if self.eat('=') {
                        TokenKind::GreaterEqual
                    } else {
                        TokenKind::Greater
                    }
                }
                '+' => {
                    if self.eat('+') {
                        TokenKind::PlusPlus
                    } else if self.eat('=') {
                        TokenKind::PlusEqual
                    } else {
                        TokenKind::Plus
                    }
                }
                '-' => {
                    if self.eat('-') {
                        TokenKind::MinusMinus
                    } else if self.eat('=') {
                        TokenKind::MinusEqual
                    } else {
                        TokenKind::Minus
                    }
                }
                '*' => {
                    if self.eat('*') {
                        TokenKind::StarStar
                    } else {
                        TokenKind::Star
                    }
                }
                '&' => {
                    if self.eat('&') {
                        TokenKind::AmpAmp
                    } else {
                        TokenKind::Amp
                    }
                }
                '|' => {
                    if self.eat('|') {
                        TokenKind::PipePipe
                    } else {
                        TokenKind::Pipe
                    }
                }
                '"' | '\'' => self.string(ch, start, line, column),
                '`' => self.template(start, line, column),
                c if c.is_ascii_digit() => self.number(start),
                c if is_identifier_start(c) => {
                    while self.current().is_some_and(is_identifier_part) {
                        self.advance();
                    }
                    let text = &self.source[start..self.position];
                    keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
                }
                other => {
                    self.report(
                        Span::new(start, self.position, line, column),
                        format!("Invalid character '{}'.", other),
                    );
                    continue;
                }
            };

            return Token::new(kind, Span::new(start, self.position, line, column));
        }
    }

    fn current(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.source[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn report(&self, span: Span, message: String) {
        self.diagnostic_handler.report(Diagnostic::error(span, message));
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.current(), self.peek(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.advance();
                }
                (Some('/'), Some('/')) => {
                    while self.current().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.position;
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    loop {
                        match self.current() {
                            None => {
                                self.report(
                                    Span::new(start, self.position, line, column),
                                    "'*/' expected.".to_string(),
                                );
                                break;
                            }
                            Some('*') if self.peek(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn number(&mut self, start: usize) -> TokenKind {
        let first = &self.source[start..self.position];
        if first == "0" && matches!(self.current(), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O')) {
            let radix = match self.advance() {
                Some('x' | 'X') => 16,
                Some('b' | 'B') => 2,
                _ => 8,
            };
            let digits_start = self.position;
            while self.current().is_some_and(|c| c.is_digit(radix) || c == '_') {
                self.advance();
            }
            let digits = self.source[digits_start..self.position].replace('_', "");
            return TokenKind::Number(u64::from_str_radix(&digits, radix).unwrap_or(0) as f64);
        }

        while self.current().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance();
        }
        if self.current() == Some('.') && !first.starts_with('.') {
            self.advance();
            while self.current().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.advance();
            }
        }
        if matches!(self.current(), Some('e' | 'E')) {
            let sign_or_digit = self.peek(1);
            let has_exponent = match sign_or_digit {
                Some('+' | '-') => self.peek(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_exponent {
                self.advance();
                if matches!(self.current(), Some('+' | '-')) {
                    self.advance();
                }
                while self.current().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = self.source[start..self.position].replace('_', "");
        TokenKind::Number(text.parse::<f64>().unwrap_or(0.0))
    }

    fn escape(&mut self, value: &mut String) {
        match self.advance() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some('u') if self.current() == Some('{') => {
                self.advance();
                let digits_start = self.position;
                while self.current().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.advance();
                }
                let digits = &self.source[digits_start..self.position];
                if let Some(ch) = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                    value.push(ch);
                }
                self.eat('}');
            }
            Some('u') => {
                let digits_start = self.position;
                for _ in 0..4 {
                    if self.current().is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.advance();
                    }
                }
                let digits = &self.source[digits_start..self.position];
                if let Some(ch) = u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
                    value.push(ch);
                }
            }
            Some('\n') => {}
            Some(other) => value.push(other),
            None => {}
        }
    }

    fn string(&mut self, quote: char, start: usize, line: usize, column: usize) -> TokenKind {
        let mut value = String::new();
        loop {
            match self.current() {
                None | Some('\n') => {
                    self.report(
                        Span::new(start, self.position, line, column),
                        "Unterminated string literal.".to_string(),
                    );
                    break;
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.escape(&mut value);
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
        TokenKind::String(value)
    }

    fn template(&mut self, start: usize, line: usize, column: usize) -> TokenKind {
        let mut value = String::new();
        let mut has_substitutions = false;
        loop {
            match self.current() {
                None => {
                    self.report(
                        Span::new(start, self.position, line, column),
                        "Unterminated template literal.".to_string(),
                    );
                    break;
                }
                Some('`') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.escape(&mut value);
                }
                Some('$') if self.peek(1) == Some('{') => {
                    has_substitutions = true;
                    let mut depth = 0usize;
                    while let Some(c) = self.advance() {
                        value.push(c);
                        match c {
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
        TokenKind::Template {
            value,
            has_substitutions,
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingDiagnosticHandler;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let handler = Arc::new(CollectingDiagnosticHandler::new());
        Lexer::new(source, handler)
            .tokenize()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_marker_call_tokens() {
        assert_eq!(
            kinds("expectType<string>().not.toBe<'a'>();"),
            vec![
                TokenKind::Identifier("expectType".to_string()),
                TokenKind::Less,
                TokenKind::Identifier("string".to_string()),
                TokenKind::Greater,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Dot,
                TokenKind::Identifier("not".to_string()),
                TokenKind::Dot,
                TokenKind::Identifier("toBe".to_string()),
                TokenKind::Less,
                TokenKind::String("a".to_string()),
                TokenKind::Greater,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 1.5 0x10 1_000 2e3 .5"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(1.5),
                TokenKind::Number(16.0),
                TokenKind::Number(1000.0),
                TokenKind::Number(2000.0),
                TokenKind::Number(0.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("=> === !== ?. ?? ... && ||"),
            vec![
                TokenKind::Arrow,
                TokenKind::EqualEqualEqual,
                TokenKind::BangEqualEqual,
                TokenKind::QuestionDot,
                TokenKind::QuestionQuestion,
                TokenKind::DotDotDot,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("// line\nconst /* block */ x"),
            vec![
                TokenKind::Const,
                TokenKind::Identifier("x".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes_and_templates() {
        assert_eq!(
            kinds(r#""a\n" `b${c}`"#),
            vec![
                TokenKind::String("a\n".to_string()),
                TokenKind::Template {
                    value: "b${c}".to_string(),
                    has_substitutions: true,
                },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let handler = Arc::new(CollectingDiagnosticHandler::new());
        let tokens = Lexer::new("a\n  bc", handler).tokenize();
        assert_eq!(tokens[1].span, Span::new(4, 6, 2, 3));
    }

    #[test]
    fn test_invalid_character_is_reported() {
        let handler = Arc::new(CollectingDiagnosticHandler::new());
        let tokens = Lexer::new("a # b", handler.clone()).tokenize();
        assert_eq!(tokens.len(), 3);
        assert_eq!(handler.error_count(), 1);
    }
}
