//! Single-pass SQL tokenizer for the extended dialect.
//!
//! The tokenizer never aborts: malformed input produces a [`LexError`] and
//! scanning continues, so one run reports as many problems as possible. The
//! token stream always ends with an EOF token.

use super::{Keyword, Span, Token, TokenKind};

/// What went wrong while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    /// A byte outside every lexical rule.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// EOF inside `'…'`, `x'…'` or `"…"`.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// The numeric-literal grammar required a digit that was not there.
    #[error("expected a digit")]
    ExpectedDigit,
}

/// A tokenizer error with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at bytes {span}")]
pub struct LexError {
    /// The kind of error.
    pub kind: LexErrorKind,
    /// Where it happened.
    pub span: Span,
}

/// Tokenizes the whole input.
///
/// Always returns a token list ending in [`TokenKind::Eof`], regardless of
/// how many errors were collected.
#[must_use]
pub fn tokenize(input: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(input).tokenize()
}

/// A lexer over a single source string.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
    /// Errors collected so far.
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            errors: Vec::new(),
        }
    }

    /// Consumes the lexer, returning all tokens and all errors.
    #[must_use]
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        (tokens, self.errors)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&mut self, kind: LexErrorKind, span: Span) {
        self.errors.push(LexError { kind, span });
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
                self.advance();
            }

            // Line comment: -- to end of line
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                self.advance();
                self.advance();
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // Block comment: /* ... */, not nestable
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let span = self.make_span();
        Token::new(kind, span, String::from(span.slice(self.input)))
    }

    /// Scans the next token, skipping over unexpected characters.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace_and_comments();
            self.start = self.pos;

            let Some(c) = self.advance() else {
                return Token::new(TokenKind::Eof, Span::point(self.input.len()), String::new());
            };

            return match c {
                '(' => self.make_token(TokenKind::LeftParen),
                ')' => self.make_token(TokenKind::RightParen),
                ',' => self.make_token(TokenKind::Comma),
                ';' => self.make_token(TokenKind::Semicolon),
                '+' => self.make_token(TokenKind::Plus),
                '-' => self.make_token(TokenKind::Minus),
                '*' => self.make_token(TokenKind::Star),
                '/' => self.make_token(TokenKind::Slash),
                '=' => self.make_token(TokenKind::Eq),

                '.' => {
                    if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.pos = self.start;
                        self.scan_number()
                    } else {
                        self.make_token(TokenKind::Dot)
                    }
                }

                '<' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::LtEq)
                    } else if self.peek() == Some('>') {
                        self.advance();
                        self.make_token(TokenKind::NotEq)
                    } else {
                        self.make_token(TokenKind::Lt)
                    }
                }
                '>' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::GtEq)
                    } else {
                        self.make_token(TokenKind::Gt)
                    }
                }
                '!' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.make_token(TokenKind::NotEq)
                    } else {
                        self.error(LexErrorKind::UnexpectedCharacter('!'), self.make_span());
                        continue;
                    }
                }

                '?' => {
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.advance();
                    }
                    let digits = &self.input[self.start + 1..self.pos];
                    let index = if digits.is_empty() {
                        None
                    } else {
                        digits.parse::<u32>().ok()
                    };
                    self.make_token(TokenKind::PositionalParam(index))
                }

                '$' | '@' => {
                    if self.peek().is_some_and(is_identifier_start) {
                        let name = self.scan_param_name();
                        self.make_token(TokenKind::NamedParam(name))
                    } else {
                        self.error(LexErrorKind::UnexpectedCharacter(c), self.make_span());
                        continue;
                    }
                }
                ':' => {
                    if self.peek().is_some_and(is_identifier_start) {
                        let name = self.scan_param_name();
                        self.make_token(TokenKind::NamedParam(name))
                    } else {
                        self.make_token(TokenKind::Colon)
                    }
                }

                '\'' => {
                    self.pos = self.start;
                    self.scan_string(false)
                }
                '"' => {
                    self.pos = self.start;
                    self.scan_quoted_identifier()
                }
                'x' | 'X' if self.peek() == Some('\'') => {
                    self.pos = self.start;
                    self.scan_string(true)
                }

                c if c.is_ascii_digit() => {
                    self.pos = self.start;
                    self.scan_number()
                }

                c if is_identifier_start(c) => {
                    self.pos = self.start;
                    self.scan_identifier()
                }

                _ => {
                    self.error(LexErrorKind::UnexpectedCharacter(c), self.make_span());
                    continue;
                }
            };
        }
    }

    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(is_identifier_part) {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier(String::from(text))),
        }
    }

    fn scan_param_name(&mut self) -> String {
        let name_start = self.pos;
        while self.peek().is_some_and(is_identifier_part) {
            self.advance();
        }
        String::from(&self.input[name_start..self.pos])
    }

    /// Scans `'…'` (or `x'…'` when `binary`). A doubled `''` is a literal
    /// quote. On EOF the error is recorded and a token carrying the text
    /// read so far is still produced.
    fn scan_string(&mut self, binary: bool) -> Token {
        if binary {
            self.advance(); // x
        }
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some('\'') => {
                    if self.peek_next() == Some('\'') {
                        value.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    self.error(LexErrorKind::UnterminatedString, self.make_span());
                    break;
                }
            }
        }

        self.make_token(TokenKind::StringLiteral { value, binary })
    }

    /// Scans `"…"`; doubled `""` is a literal quote. Produces an identifier.
    fn scan_quoted_identifier(&mut self) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.peek() {
                Some('"') => {
                    if self.peek_next() == Some('"') {
                        value.push('"');
                        self.advance();
                        self.advance();
                    } else {
                        self.advance();
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    self.error(LexErrorKind::UnterminatedString, self.make_span());
                    break;
                }
            }
        }

        self.make_token(TokenKind::Identifier(value))
    }

    /// Scans a numeric literal following the SQLite grammar: hex `0x…`,
    /// decimal with optional fraction (either side of the dot may hold the
    /// digits), optional `e`/`E` exponent with optional sign.
    fn scan_number(&mut self) -> Token {
        // Hex literal
        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x' | 'X')) {
            self.advance();
            self.advance();
            if !self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.error(LexErrorKind::ExpectedDigit, self.make_span());
            }
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            return self.make_token(TokenKind::Number(String::from(
                self.make_span().slice(self.input),
            )));
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.error(LexErrorKind::ExpectedDigit, self.make_span());
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number(String::from(
            self.make_span().slice(self.input),
        )))
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic() || !c.is_ascii()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric() || !c.is_ascii()
}
