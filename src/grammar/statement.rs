use super::{
    identifier::identifier,
    lexer::{Keyword, TokenKind},
    Parse, ParseRes, Parser, WantedSpec,
};
use crate::ast::{Expr, Statement};

impl<'source> Parse<'source> for Statement<'source> {
    fn parse(parser: &mut Parser<'source>) -> ParseRes<Self> {
        parser.with_context("parsing statement", |parser| {
            let token = parser.expect_a_token(Some(WantedSpec::Description("statement")))?;
            let statement = match token.kind {
                TokenKind::Keyword(Keyword::Print) => {
                    parser.with_context("parsing print statement", |parser| {
                        parser.keyword(Keyword::Print)?;
                        Ok(Statement::Print(parser.parse()?))
                    })?
                }
                TokenKind::Keyword(Keyword::Var) => {
                    parser.with_context("parsing variable declaration", |parser| {
                        parser.keyword(Keyword::Var)?;
                        let (name, initializer) = binding(parser)?;
                        Ok(Statement::VariableDeclaration { name, initializer })
                    })?
                }
                TokenKind::Keyword(Keyword::While) => {
                    parser.with_context("parsing while statement", |parser| {
                        parser.nested(while_statement)
                    })?
                }
                TokenKind::Identifier => {
                    parser.with_context("parsing assignment", |parser| {
                        let (name, value) = binding(parser)?;
                        Ok(Statement::VariableAssignment { name, value })
                    })?
                }
                _ => parser.reject_token(
                    &token,
                    WantedSpec::Description("`print`, `var`, `while` or an identifier"),
                )?,
            };
            tracing::trace!(target: "parser", "parsed statement: {statement:?}");
            Ok(statement)
        })
    }
}

// identifier "=" expression
fn binding<'source>(parser: &mut Parser<'source>) -> ParseRes<(&'source str, Expr<'source>)> {
    let name = identifier(parser)?;
    parser.eat(Some("="))?;
    let value = parser.parse()?;
    Ok((name, value))
}

fn while_statement<'source>(parser: &mut Parser<'source>) -> ParseRes<Statement<'source>> {
    parser.keyword(Keyword::While)?;
    let condition = parser
        .parse()
        .map_err(|e| e.add_context("parsing while statement's condition"))?;

    let mut body = Vec::new();
    loop {
        let next = parser.expect_a_token(Some(WantedSpec::Specific(TokenKind::Keyword(
            Keyword::EndWhile,
        ))))?;
        if next.kind == TokenKind::Keyword(Keyword::EndWhile) {
            parser.accept_current();
            break;
        }
        body.push(parser.parse()?);
    }

    Ok(Statement::While { condition, body })
}
