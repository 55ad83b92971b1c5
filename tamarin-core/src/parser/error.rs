use std::fmt::Display;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Debug, PartialEq, Error)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {got} instead")]
    UnexpectedToken { expected: Expected, got: TokenKind },
    #[error("could not parse {literal} as integer")]
    InvalidInteger { literal: String },
    #[error("no prefix parse function for {0} found")]
    NoPrefixFunction(TokenKind),
    #[error("illegal token {literal:?} at offset {offset}")]
    IllegalToken { literal: String, offset: usize },
    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },
    #[error("expression nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

#[derive(Debug, PartialEq)]
pub enum Expected {
    Token(TokenKind),
    Identifier,
    Expression,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Identifier => write!(f, "IDENT"),
            Expected::Expression => write!(f, "an expression"),
        }
    }
}

impl ParseError {
    pub fn unexpected_token(expected: TokenKind, got: &Token) -> ParseError {
        Self::unexpected_other(Expected::Token(expected), got)
    }

    pub fn unexpected_other(expected: Expected, got: &Token) -> ParseError {
        match &got.kind {
            TokenKind::Illegal(literal) if literal.starts_with('"') => {
                ParseError::UnterminatedString { offset: got.start }
            }
            TokenKind::Illegal(literal) => ParseError::IllegalToken {
                literal: literal.to_string(),
                offset: got.start,
            },
            kind => ParseError::UnexpectedToken {
                expected,
                got: kind.clone(),
            },
        }
    }
}
