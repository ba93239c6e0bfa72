use crate::ast::Program;
use crate::error::*;

mod expr;
mod identifier;
pub mod lexer;
mod program;
mod statement;

use lexer::*;

/// How deep parenthesised expressions and loop bodies may nest, counted together.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Recursive descent parser with a single token of lookahead.
pub struct Parser<'source> {
    tokens: std::vec::IntoIter<Token<'source>>,
    current_tok: Option<Token<'source>>,
    metadata: &'source SourceMetadata<'source>,
    depth: usize,
}

/// Parses an already lexed token sequence. Parsing ends when the tokens run out.
pub fn parse<'source>(
    tokens: Vec<Token<'source>>,
    metadata: &'source SourceMetadata<'source>,
) -> ParseRes<Program<'source>> {
    Parser::new(tokens, metadata).parse()
}

impl<'source> Parser<'source> {
    pub fn new(tokens: Vec<Token<'source>>, metadata: &'source SourceMetadata<'source>) -> Self {
        let mut tokens = tokens.into_iter();
        let current_tok = tokens.next();
        Self {
            tokens,
            current_tok,
            metadata,
            depth: 0,
        }
    }

    pub fn peek_token(&self) -> Option<TokenKind> {
        self.current_tok.as_ref().map(|x| x.kind)
    }
    /// Span of the current token, or the end of the input once the tokens ran out.
    pub fn current_token_span(&self) -> Span {
        self.current_tok
            .as_ref()
            .map(|x| x.source.span)
            .unwrap_or_else(|| self.metadata.end_span())
    }
    pub fn accept_current(&mut self) {
        self.current_tok = self.tokens.next();
    }
    pub fn emit_error_at<T>(&self, span: Span, kind: ParseErrorKind) -> ParseRes<T> {
        Err(ParseError::new(kind).with_source(span, self.metadata))
    }
    pub fn expect_a_token(
        &self,
        wanted: Option<WantedSpec<TokenKind>>,
    ) -> ParseRes<Token<'source>> {
        match self.current_tok {
            Some(tok) => Ok(tok),
            None => self.emit_error_at(
                self.metadata.end_span(),
                ParseErrorKind::UnexpectedEOF { wanted },
            ),
        }
    }
    pub fn reject_token<T>(
        &self,
        token: &Token<'source>,
        wanted: WantedSpec<TokenKind>,
    ) -> ParseRes<T> {
        self.emit_error_at(
            token.span(),
            ParseErrorKind::Expected {
                wanted,
                found: token.kind,
                value: token.value().to_string(),
            },
        )
    }
    pub fn expect_token(&self, kind: TokenKind) -> ParseRes<Token<'source>> {
        let tok = self.expect_a_token(Some(WantedSpec::Specific(kind)))?;
        if tok.kind != kind {
            self.reject_token(&tok, WantedSpec::Specific(kind))
        } else {
            Ok(tok)
        }
    }
    /// Consumes the current token. When `expected` is given the token's text has to
    /// match it exactly.
    pub fn eat(&mut self, expected: Option<&'static str>) -> ParseRes<Token<'source>> {
        let tok = self.expect_a_token(expected.map(WantedSpec::Description))?;
        if let Some(text) = expected {
            if tok.value() != text {
                return self.reject_token(&tok, WantedSpec::Description(text));
            }
        }
        self.accept_current();
        Ok(tok)
    }
    pub fn keyword(&mut self, kw: Keyword) -> ParseRes<()> {
        self.expect_token(TokenKind::Keyword(kw))
            .map_err(|e| e.add_context("parsing keyword"))?;
        self.accept_current();
        Ok(())
    }
    pub fn parse<T>(&mut self) -> ParseRes<T>
    where
        T: Parse<'source>,
    {
        T::parse(self)
    }
    /// Runs `cont` one nesting level deeper.
    pub fn nested<F, T>(&mut self, mut cont: F) -> ParseRes<T>
    where
        F: FnMut(&mut Self) -> ParseRes<T>,
    {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.current_token_span();
            return self.emit_error_at(span, ParseErrorKind::NestingTooDeep(MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        let res = cont(self);
        self.depth -= 1;
        res
    }
    pub fn with_context<F, T>(&mut self, context: &'static str, mut cont: F) -> ParseRes<T>
    where
        F: FnMut(&mut Self) -> ParseRes<T>,
    {
        cont(self).map_err(|x| x.add_context(context))
    }
}

pub type ParseRes<T> = Result<T, ParseError>;
pub type ParseError = Error<ParseErrorKind>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    Expected {
        wanted: WantedSpec<TokenKind>,
        found: TokenKind,
        value: String,
    },
    UnexpectedEOF {
        wanted: Option<WantedSpec<TokenKind>>,
    },
    InvalidNumber(String),
    NestingTooDeep(usize),
}

pub trait Parse<'source>: Sized {
    fn parse(parser: &mut Parser<'source>) -> ParseRes<Self>;
}

impl std::error::Error for ParseErrorKind {}

use std::fmt;
impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedEOF { wanted } => {
                write!(f, "unexpected end of input")?;
                if let Some(wanted) = wanted {
                    write!(f, ", expected {}", wanted)
                } else {
                    Ok(())
                }
            }
            Self::Expected {
                wanted,
                found,
                value,
            } => {
                write!(
                    f,
                    "expected {}, but found instead {} {:?}",
                    wanted, found, value
                )
            }
            Self::InvalidNumber(text) => write!(f, "invalid number literal {:?}", text),
            Self::NestingTooDeep(limit) => {
                write!(f, "nesting deeper than {} levels", limit)
            }
        }
    }
}
