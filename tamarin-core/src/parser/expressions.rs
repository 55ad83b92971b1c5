use super::error::{Expected, ParseError};
use super::statements::parse_statement;
use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperationKind, PrefixOperationKind,
};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;
use crate::stack::ensure_sufficient_stack;

/// Deepest expression nesting the parser accepts.
pub const MAX_NESTING: usize = 1_000;

#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

pub fn precedence_of(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Equal | TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan
        | TokenKind::LessEqual
        | TokenKind::GreaterThan
        | TokenKind::GreaterEqual => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub fn parse_expression(parser: &mut Parser, precedence: Precedence) -> Result<Expression, ParseError> {
    if parser.depth >= MAX_NESTING {
        return Err(ParseError::NestingTooDeep(MAX_NESTING));
    }
    parser.depth += 1;
    let result = ensure_sufficient_stack(|| parse_operators(parser, precedence));
    parser.depth -= 1;
    result
}

fn parse_operators(parser: &mut Parser, precedence: Precedence) -> Result<Expression, ParseError> {
    let token = parser.next_token();
    let mut left_expression = prefix_parsing(token, parser)?;

    loop {
        let Some(next_token) = parser.iter.peek() else {
            break;
        };

        let next_precedence = precedence_of(&next_token.kind);
        if precedence >= next_precedence {
            break;
        }

        let next_token = parser.next_token();
        let Some(infix_parse_function) = infix_parsing_function(next_token.kind) else {
            break;
        };
        left_expression = infix_parse_function(left_expression, parser)?;
    }

    Ok(left_expression)
}

fn prefix_operation(
    kind: PrefixOperationKind,
) -> impl FnOnce(&mut Parser) -> Result<Expression, ParseError> {
    move |parser| {
        Ok(Expression::PrefixOperation(
            kind,
            Box::new(parse_expression(parser, Precedence::Prefix)?),
        ))
    }
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

fn parse_sequence<T>(
    parser: &mut Parser,
    parse_element: impl Fn(&mut Parser) -> Result<T, ParseError>,
    separator: TokenKind,
    terminator: TokenKind,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();

    loop {
        if parser.next_if(&terminator) {
            return Ok(elements);
        }
        if parser.peek_is(&TokenKind::Eof) {
            let eof = parser.peek_token();
            return Err(ParseError::unexpected_token(terminator, &eof));
        }
        elements.push(parse_element(parser)?);

        if parser.next_if(&separator) {
            continue;
        }
        if parser.next_if(&terminator) {
            return Ok(elements);
        }
        let next = parser.peek_token();
        return Err(ParseError::unexpected_token(separator, &next));
    }
}

fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expressions = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RBracket,
    )?;
    Ok(Expression::ArrayLiteral(expressions))
}

fn parse_if_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parse_expression(parser, Precedence::Lowest)?);

    parser.expect_token(TokenKind::LBrace)?;
    let consequence = parse_block_statement(parser)?;

    let alternative = if parser.next_if(&TokenKind::Else) {
        parser.expect_token(TokenKind::LBrace)?;
        Some(parse_block_statement(parser)?)
    } else {
        None
    };

    Ok(Expression::IfExpression {
        condition,
        consequence,
        alternative,
    })
}

/// Parses statements up to the closing brace; the opening brace has already
/// been consumed. Semicolons between statements are optional.
fn parse_block_statement(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let mut statements = Vec::new();

    loop {
        if parser.next_if(&TokenKind::RBrace) {
            return Ok(BlockStatement { statements });
        }
        if parser.peek_is(&TokenKind::Eof) {
            let eof = parser.peek_token();
            return Err(ParseError::unexpected_token(TokenKind::RBrace, &eof));
        }
        statements.push(parse_statement(parser)?);
        parser.next_if(&TokenKind::SemiColon);
    }
}

fn parse_function_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let parameters = parse_parameters(parser)?;

    parser.expect_token(TokenKind::LBrace)?;
    let body = parse_block_statement(parser)?;

    Ok(Expression::FunctionLiteral {
        parameters: parameters.into(),
        body: body.into(),
    })
}

fn parse_parameters(parser: &mut Parser) -> Result<Vec<Identifier>, ParseError> {
    parse_sequence(
        parser,
        |parser| parser.parse_ident().map(|name| Identifier { name }),
        TokenKind::Comma,
        TokenKind::RParen,
    )
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident(name) => Ok(Expression::Identifier(Identifier { name })),
        TokenKind::Int(val) => match val.parse() {
            Ok(value) => Ok(Expression::IntegerLiteral(value)),
            Err(_) => Err(ParseError::InvalidInteger {
                literal: val.to_string(),
            }),
        },
        TokenKind::String(val) => Ok(Expression::StringLiteral(val.to_string())),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Bang => prefix_operation(PrefixOperationKind::Bang)(parser),
        TokenKind::Minus => prefix_operation(PrefixOperationKind::Minus)(parser),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => parse_array_literal(parser),
        TokenKind::If => parse_if_expression(parser),
        TokenKind::Function => parse_function_literal(parser),
        TokenKind::Illegal(_) => Err(ParseError::unexpected_other(Expected::Expression, &token)),
        kind => Err(ParseError::NoPrefixFunction(kind)),
    }
}

type InfixFunction = Box<dyn FnOnce(Expression, &mut Parser) -> Result<Expression, ParseError>>;

fn infix_operation(token: TokenKind, kind: InfixOperationKind) -> InfixFunction {
    Box::new(
        move |left: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
            // Parsing the right operand at the operator's own precedence makes
            // operators of equal precedence associate to the left.
            let new_precedence = precedence_of(&token);

            Ok(Expression::InfixOperation(
                kind,
                Box::new(left),
                Box::new(parse_expression(parser, new_precedence)?),
            ))
        },
    )
}

fn parse_call_function(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let arguments = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RParen,
    )?;

    Ok(Expression::CallExpression {
        function: Box::new(left),
        arguments,
    })
}

fn parse_index_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let index = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;

    Ok(Expression::IndexExpression {
        left: Box::new(left),
        index: Box::new(index),
    })
}

pub fn infix_parsing_function(token: TokenKind) -> Option<InfixFunction> {
    use InfixOperationKind as InfixKind;

    match token {
        TokenKind::Plus => Some(infix_operation(TokenKind::Plus, InfixKind::Plus)),
        TokenKind::Minus => Some(infix_operation(TokenKind::Minus, InfixKind::Minus)),
        TokenKind::LessThan => Some(infix_operation(TokenKind::LessThan, InfixKind::LessThan)),
        TokenKind::LessEqual => Some(infix_operation(TokenKind::LessEqual, InfixKind::LessEqual)),
        TokenKind::GreaterThan => Some(infix_operation(
            TokenKind::GreaterThan,
            InfixKind::GreaterThan,
        )),
        TokenKind::GreaterEqual => Some(infix_operation(
            TokenKind::GreaterEqual,
            InfixKind::GreaterEqual,
        )),
        TokenKind::Equal => Some(infix_operation(TokenKind::Equal, InfixKind::Equal)),
        TokenKind::NotEqual => Some(infix_operation(TokenKind::NotEqual, InfixKind::NotEqual)),
        TokenKind::Asterisk => Some(infix_operation(TokenKind::Asterisk, InfixKind::Multiply)),
        TokenKind::Slash => Some(infix_operation(TokenKind::Slash, InfixKind::Divide)),
        TokenKind::LParen => Some(Box::new(parse_call_function)),
        TokenKind::LBracket => Some(Box::new(parse_index_expression)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{precedence_of, Precedence};
    use crate::lexer::TokenKind;

    #[test]
    fn test_precedence_table_is_ordered() {
        let ladder = [
            TokenKind::SemiColon,
            TokenKind::Equal,
            TokenKind::LessEqual,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::LParen,
            TokenKind::LBracket,
        ];
        let levels: Vec<Precedence> = ladder.iter().map(precedence_of).collect();

        assert!(levels.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(Precedence::Product < Precedence::Prefix);
        assert!(Precedence::Prefix < Precedence::Call);
    }
}
