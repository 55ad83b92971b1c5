pub mod error;
pub mod expressions;
pub mod statements;

use crate::ast::Program;
use crate::lexer::{Token, TokenKind, Tokenizer};
pub use error::{Expected, ParseError};
use statements::parse_statement;

/// Parses a complete source text. The returned program holds every
/// statement that parsed cleanly; callers should refuse to evaluate it when
/// the error list is not empty.
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    Parser::new(Tokenizer::new(source)).parse_program()
}

pub struct Parser<'a> {
    pub iter: std::iter::Peekable<Tokenizer<'a>>,
    last_end: usize,
    /// Whether the most recently consumed token was `;`.
    after_semicolon: bool,
    /// Expressions currently being parsed, innermost included.
    pub(crate) depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: Tokenizer<'a>) -> Self {
        let iter = tokenizer.peekable();
        Self {
            iter,
            last_end: 0,
            after_semicolon: false,
            depth: 0,
        }
    }

    /// Consumes the next token, producing `Eof` past the end of input.
    pub(crate) fn next_token(&mut self) -> Token {
        match self.iter.next() {
            Some(token) => {
                self.last_end = token.end;
                self.after_semicolon = token.kind == TokenKind::SemiColon;
                token
            }
            None => self.eof(),
        }
    }

    /// A clone of the upcoming token, or `Eof`.
    pub(crate) fn peek_token(&mut self) -> Token {
        match self.iter.peek() {
            Some(token) => token.clone(),
            None => self.eof(),
        }
    }

    pub(crate) fn peek_is(&mut self, kind: &TokenKind) -> bool {
        match self.iter.peek() {
            Some(token) => &token.kind == kind,
            None => *kind == TokenKind::Eof,
        }
    }

    /// Consumes the next token only when it has the given kind.
    pub(crate) fn next_if(&mut self, kind: &TokenKind) -> bool {
        match self.iter.next_if(|token| &token.kind == kind) {
            Some(token) => {
                self.last_end = token.end;
                self.after_semicolon = token.kind == TokenKind::SemiColon;
                true
            }
            None => false,
        }
    }

    fn eof(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            start: self.last_end,
            end: self.last_end,
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Result<std::rc::Rc<str>, ParseError> {
        let token = self.peek_token();
        match token.kind {
            TokenKind::Ident(name) => {
                self.next_token();
                Ok(name)
            }
            _ => Err(ParseError::unexpected_other(Expected::Identifier, &token)),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        if self.next_if(&token_kind) {
            Ok(())
        } else {
            let token = self.peek_token();
            Err(ParseError::unexpected_token(token_kind, &token))
        }
    }

    pub fn parse_program(&mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while self.iter.peek().is_some() {
            match parse_statement(self) {
                Ok(statement) => {
                    statements.push(statement);
                    self.next_if(&TokenKind::SemiColon);
                }
                Err(err) => {
                    tracing::debug!(%err, "skipping to the next statement");
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        (Program { statements }, errors)
    }

    /// Discards tokens up to and including the next semicolon, unless the
    /// failed statement already consumed one.
    fn synchronize(&mut self) {
        if self.after_semicolon {
            return;
        }
        for token in self.iter.by_ref() {
            self.last_end = token.end;
            if token.kind == TokenKind::SemiColon {
                break;
            }
        }
    }
}
