use crate::error::{self, SourceMetadata, Span, WantedSpec};
use std::error::Error;
use std::fmt;

impl Error for LexErrorKind {}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Keyword(kw) => write!(f, "keyword `{}`", kw),
            Self::Identifier => write!(f, "identifier"),
            Self::Number => write!(f, "number"),
            Self::OpenParen => write!(f, "opening parentheses '('"),
            Self::CloseParen => write!(f, "closing parentheses ')'"),
            Self::Operator(op) => write!(f, "operator `{}`", op),
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Star => "*",
            Operator::Slash => "/",
            Operator::DoubleEquals => "==",
            Operator::AngleRight => ">",
            Operator::AngleLeft => "<",
            Operator::DoubleAnd => "&&",
            Operator::Equals => "=",
        })
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedChar(ch) => write!(f, "unexpected {:?}", ch),
            Self::Expected { wanted, found } => {
                write!(f, "unexpected {:?}\nexpected {}", found, wanted)
            }
            Self::UnexpectedEOF { wanted } => {
                write!(f, "unexpected end of input, expected {}", wanted)
            }
        }
    }
}

pub struct LexerIter<'a> {
    lexer: Lexer<'a>,
    eof: bool,
}

pub type LexError = error::Error<LexErrorKind>;

impl<'a> Iterator for LexerIter<'a> {
    type Item = Result<Token<'a>, LexError>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            None
        } else {
            let next = self.lexer.next_token();
            if matches!(next, Ok(None) | Err(_)) {
                self.eof = true;
            }
            next.transpose()
        }
    }
}

impl<'a> std::iter::FusedIterator for LexerIter<'a> {}

impl<'a> IntoIterator for Lexer<'a> {
    type IntoIter = LexerIter<'a>;
    type Item = <Self::IntoIter as Iterator>::Item;
    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            eof: false,
        }
    }
}

/// Lexes the whole input up front. Stops at the first error.
pub fn tokenize<'a>(source: &'a SourceMetadata<'a>) -> Result<Vec<Token<'a>>, LexError> {
    let tokens = Lexer::new(source)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(target: "lexer", "produced {} tokens", tokens.len());
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub source: Source<'a>,
}

impl<'a> Token<'a> {
    pub const fn new(kind: TokenKind, source: Source<'a>) -> Self {
        Self { kind, source }
    }
    pub const fn open_paren(source: Source<'a>) -> Self {
        Self::new(TokenKind::OpenParen, source)
    }
    pub const fn close_paren(source: Source<'a>) -> Self {
        Self::new(TokenKind::CloseParen, source)
    }
    pub const fn number(source: Source<'a>) -> Self {
        Self::new(TokenKind::Number, source)
    }
    pub const fn operator(kind: Operator, source: Source<'a>) -> Self {
        Self::new(TokenKind::Operator(kind), source)
    }
    /// Words that spell a keyword become [`TokenKind::Keyword`].
    pub fn word(source: Source<'a>) -> Self {
        match Keyword::from_word(source.source) {
            Some(kw) => Self::new(TokenKind::Keyword(kw), source),
            None => Self::new(TokenKind::Identifier, source),
        }
    }
    /// The text of the token as it appears in the source.
    pub const fn value(&self) -> &'a str {
        self.source.source
    }
    pub const fn span(&self) -> Span {
        self.source.span
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Number,
    Operator(Operator),
    OpenParen,
    CloseParen,
}

impl TokenKind {
    pub const fn as_operator(self) -> Option<Operator> {
        if let TokenKind::Operator(kind) = self {
            Some(kind)
        } else {
            None
        }
    }
    pub const fn is_punctuation(self) -> bool {
        matches!(self, Self::OpenParen | Self::CloseParen)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Print,
    Var,
    While,
    EndWhile,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "print" => Self::Print,
            "var" => Self::Var,
            "while" => Self::While,
            "endwhile" => Self::EndWhile,
            _ => return None,
        })
    }
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Var => "var",
            Self::While => "while",
            Self::EndWhile => "endwhile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Star,
    Slash,
    DoubleEquals,
    AngleRight,
    AngleLeft,
    DoubleAnd,
    Equals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source<'source> {
    pub span: Span,
    pub source: &'source str,
}

pub struct Lexer<'a> {
    input: std::iter::Peekable<std::str::CharIndices<'a>>,
    metadata: &'a SourceMetadata<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    Expected {
        wanted: error::WantedSpec<char>,
        found: char,
    },
    UnexpectedEOF {
        wanted: error::WantedSpec<char>,
    },
    UnexpectedChar(char),
}

impl<'source> Lexer<'source> {
    pub fn new(input: &'source SourceMetadata<'source>) -> Self {
        Self {
            input: input.input().char_indices().peekable(),
            metadata: input,
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token<'source>>, LexError> {
        self.skip_whitespace();
        if let Some(pos) = self.eat_char('(') {
            self.advance();
            return Ok(Some(Token::open_paren(self.source_from_len(pos, 1))));
        }
        if let Some(pos) = self.eat_char(')') {
            self.advance();
            return Ok(Some(Token::close_paren(self.source_from_len(pos, 1))));
        }
        if let Some(src) = self.word() {
            return Ok(Some(Token::word(src)));
        }
        if let Some((start, kind)) = self.operator()? {
            return Ok(Some(Token::operator(kind, self.source_until_current(start))));
        }
        if let Some(src) = self.number().map_err(|e| e.add_context("number"))? {
            return Ok(Some(Token::number(src)));
        }
        match self.input.peek().copied() {
            None => Ok(None),
            Some((pos, ch)) => {
                tracing::debug!(target: "lexer", "rejecting {ch:?} at {pos}");
                Err(self.error(pos, LexErrorKind::UnexpectedChar(ch)))
            }
        }
    }

    fn operator(&mut self) -> Result<Option<(usize, Operator)>, LexError> {
        let start = self.current_offset();
        let op = match self.input.peek().map(|(_, ch)| *ch) {
            Some('=') => {
                self.advance();
                if self.eat_char('=').is_some() {
                    self.advance();
                    Operator::DoubleEquals
                } else {
                    Operator::Equals
                }
            }
            Some('&') => {
                self.advance();
                if self.eat_char('&').is_some() {
                    self.advance();
                    Operator::DoubleAnd
                } else {
                    return Err(self.expected_char('&'));
                }
            }
            Some('>') => {
                self.advance();
                Operator::AngleRight
            }
            Some('<') => {
                self.advance();
                Operator::AngleLeft
            }
            Some('+') => {
                self.advance();
                Operator::Plus
            }
            Some('-') => {
                self.advance();
                Operator::Minus
            }
            Some('/') => {
                self.advance();
                Operator::Slash
            }
            Some('*') => {
                self.advance();
                Operator::Star
            }
            _ => return Ok(None),
        };
        Ok(Some((start, op)))
    }

    fn word(&mut self) -> Option<Source<'source>> {
        let (start, _) = self.skip_if(|c| c.is_ascii_alphabetic() || c == '_')?;
        self.skip_while(|c| c.is_ascii_alphanumeric() || c == '_');
        Some(self.source_until_current(start))
    }

    fn number(&mut self) -> Result<Option<Source<'source>>, LexError> {
        let start = match self.skip_if(|c| c.is_ascii_digit()) {
            Some((pos, _)) => pos,
            None => return Ok(None),
        };
        self.skip_while(|c| c.is_ascii_digit());
        if self.skip_if(|c| c == '.').is_some() {
            self.skip_while(|c| c.is_ascii_digit());
        }
        if let Some((pos, ch)) = self
            .input
            .peek()
            .filter(|(_, ch)| !is_delimeter(*ch))
            .copied()
        {
            return Err(self.error(
                pos,
                LexErrorKind::Expected {
                    wanted: WantedSpec::Description("delimeter or space after number"),
                    found: ch,
                },
            ));
        }
        Ok(Some(self.source_until_current(start)))
    }

    fn skip_while<F>(&mut self, filter: F) -> Source<'source>
    where
        F: Fn(char) -> bool,
    {
        let current = self.current_offset();
        while self.input.peek().filter(|(_, ch)| filter(*ch)).is_some() {
            self.input.next();
        }
        self.source_until_current(current)
    }

    fn skip_if<F>(&mut self, filter: F) -> Option<(usize, char)>
    where
        F: Fn(char) -> bool,
    {
        let (pos, ch) = *self.input.peek()?;
        if filter(ch) {
            self.advance();
            Some((pos, ch))
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .input
            .peek()
            .filter(|(_, ch)| ch.is_whitespace())
            .is_some()
        {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.input.next();
    }

    fn source_until_current(&mut self, start: usize) -> Source<'source> {
        let current = self.current_offset();
        self.source_from(start, current)
    }

    fn source_from(&self, start: usize, end: usize) -> Source<'source> {
        Source {
            span: Span {
                offset: start,
                len: end - start,
            },
            source: &self.metadata.input()[start..end],
        }
    }

    fn source_from_len(&self, start: usize, len: usize) -> Source<'source> {
        self.source_from(start, start + len)
    }

    fn eat_char(&mut self, ch: char) -> Option<usize> {
        self.input
            .peek()
            .filter(|(_, x)| *x == ch)
            .map(|(pos, _)| *pos)
    }

    fn expected_char(&mut self, wanted: char) -> LexError {
        match self.input.peek().copied() {
            Some((pos, found)) => self.error(
                pos,
                LexErrorKind::Expected {
                    wanted: WantedSpec::Specific(wanted),
                    found,
                },
            ),
            None => LexError::new(LexErrorKind::UnexpectedEOF {
                wanted: WantedSpec::Specific(wanted),
            })
            .with_source(self.metadata.end_span(), self.metadata),
        }
    }

    fn error(&self, position: usize, kind: LexErrorKind) -> LexError {
        LexError::new(kind).with_source(Span::new(position), self.metadata)
    }

    fn current_offset(&mut self) -> usize {
        self.input
            .peek()
            .map(|(x, _)| *x)
            .unwrap_or_else(|| self.metadata.input().len())
    }
}

#[inline]
fn is_delimeter(ch: char) -> bool {
    ch.is_whitespace() || (ch.is_ascii_punctuation() && ch != '_')
}
