use super::{lexer::TokenKind, ParseRes, Parser};

/// A variable name, borrowed from the source.
pub fn identifier<'source>(parser: &mut Parser<'source>) -> ParseRes<&'source str> {
    parser.with_context("parsing identifier", |parser| {
        let tok = parser.expect_token(TokenKind::Identifier)?;
        parser.accept_current();
        Ok(tok.value())
    })
}
