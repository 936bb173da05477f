//! Tokenizer for the extended SQL dialect.
//!
//! Turns a source string into a [`Token`] sequence with byte-accurate
//! [`Span`]s, collecting [`LexError`]s instead of failing.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::{tokenize, LexError, LexErrorKind, Lexer};
