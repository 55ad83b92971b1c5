use crate::ast::{Identifier, LetStatement, ReturnStatement, Statement};
use crate::lexer::TokenKind;
use crate::parser::expressions::{parse_expression, Precedence};
use crate::parser::{ParseError, Parser};

pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    match parser.iter.peek().map(|t| &t.kind) {
        Some(TokenKind::Let) => Ok(Statement::Let(parse_let_statement(parser)?)),
        Some(TokenKind::Return) => Ok(Statement::Return(parse_return_statement(parser)?)),
        _ => Ok(Statement::Expression(parse_expression_statement(parser)?)),
    }
}

fn parse_let_statement(parser: &mut Parser) -> Result<LetStatement, ParseError> {
    parser.expect_token(TokenKind::Let)?;
    let name = parser.parse_ident()?;
    parser.expect_token(TokenKind::Assign)?;
    let value = parse_expression(parser, Precedence::Lowest)?;

    Ok(LetStatement {
        identifier: Identifier { name },
        value,
    })
}

fn parse_return_statement(parser: &mut Parser) -> Result<ReturnStatement, ParseError> {
    parser.expect_token(TokenKind::Return)?;

    let bare = [TokenKind::SemiColon, TokenKind::RBrace, TokenKind::Eof]
        .iter()
        .any(|kind| parser.peek_is(kind));
    let value = if bare {
        None
    } else {
        Some(parse_expression(parser, Precedence::Lowest)?)
    };

    Ok(ReturnStatement { value })
}

fn parse_expression_statement(parser: &mut Parser) -> Result<crate::ast::Expression, ParseError> {
    parse_expression(parser, Precedence::Lowest)
}
