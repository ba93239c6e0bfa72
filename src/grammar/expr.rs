use super::lexer::{Token, TokenKind};
use super::{Parse, ParseErrorKind, ParseRes, Parser, WantedSpec};
use crate::ast::BinaryOp;
use crate::ast::Expr;

impl<'source> Parse<'source> for Expr<'source> {
    fn parse(parser: &mut Parser<'source>) -> ParseRes<Self> {
        parser.with_context("parsing expression", |parser| {
            let token = parser.expect_a_token(Some(WantedSpec::Description("expression")))?;
            match token.kind {
                TokenKind::OpenParen => parse_binary_expression(parser),
                TokenKind::Number => {
                    parser.accept_current();
                    number_literal(parser, &token)
                }
                TokenKind::Identifier => {
                    parser.accept_current();
                    Ok(Expr::Identifier(token.value()))
                }
                _ => parser.reject_token(
                    &token,
                    WantedSpec::Description("open paren, identifier or number"),
                ),
            }
        })
    }
}

fn number_literal<'source>(parser: &Parser<'source>, token: &Token<'source>) -> ParseRes<Expr<'source>> {
    match token.value().parse::<f32>() {
        Ok(value) => Ok(Expr::NumberLiteral(value)),
        Err(_) => parser.emit_error_at(
            token.span(),
            ParseErrorKind::InvalidNumber(token.value().to_string()),
        ),
    }
}

// "(" lhs operator rhs ")", no precedence: the parentheses are mandatory
fn parse_binary_expression<'source>(parser: &mut Parser<'source>) -> ParseRes<Expr<'source>> {
    parser.with_context("parsing binary expression", |parser| {
        parser.nested(|parser| {
            parser.eat(Some("("))?;
            let lhs = parser.parse()?;
            let operator = binary_operator(parser)?;
            let rhs = parser.parse()?;
            parser
                .expect_token(TokenKind::CloseParen)
                .map_err(|x| x.add_context("as the end of the expression"))?;
            parser.accept_current();
            Ok(Expr::binary(operator, lhs, rhs))
        })
    })
}

fn binary_operator(parser: &mut Parser<'_>) -> ParseRes<BinaryOp> {
    let token = parser.expect_a_token(Some(WantedSpec::Description("binary operator")))?;
    match token
        .kind
        .as_operator()
        .and_then(BinaryOp::from_operator)
    {
        Some(op) => {
            parser.accept_current();
            Ok(op)
        }
        None => parser.reject_token(&token, WantedSpec::Description("binary operator")),
    }
}
