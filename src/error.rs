use std::error;
use std::fmt;

/// A diagnostic anchored in the source text. `T` is the stage specific kind.
#[derive(Debug, Clone)]
pub struct Error<T> {
    pub kind: T,
    file: Option<std::path::PathBuf>,
    snippet: Option<Snippet>,
    contexts: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub const fn new(offset: usize) -> Self {
        Self { offset, len: 1 }
    }
    pub fn snippet_from_source(&self, source: &SourceMetadata) -> Option<Snippet> {
        let mut offset = 0;
        let mut last = None;
        for (i, line) in source.input().split_terminator('\n').enumerate() {
            let next_offset = offset + line.len() + 1;
            if next_offset > self.offset {
                return Some(Snippet {
                    position: Position {
                        line: i,
                        col: self.offset - offset,
                    },
                    line: line.trim_end_matches('\r').to_string(),
                });
            }
            last = Some((i, offset, line));
            offset = next_offset;
        }
        // past the last newline: point after the end of the last line
        last.map(|(i, line_offset, line)| Snippet {
            position: Position {
                line: i,
                col: (self.offset - line_offset).min(line.len()),
            },
            line: line.trim_end_matches('\r').to_string(),
        })
    }
}

#[derive(Debug)]
pub struct SourceMetadata<'a> {
    file: Option<std::path::PathBuf>,
    source: &'a str,
}

impl<'a> SourceMetadata<'a> {
    pub const fn input(&self) -> &'a str {
        self.source
    }
    pub const fn new(source: &'a str) -> Self {
        Self { file: None, source }
    }
    #[must_use]
    pub fn with_file(mut self, file: std::path::PathBuf) -> Self {
        self.file = Some(file);
        self
    }
    /// Zero width span right after the last character.
    pub const fn end_span(&self) -> Span {
        Span {
            offset: self.source.len(),
            len: 0,
        }
    }
}

impl<T> Error<T> {
    pub const fn new(kind: T) -> Self {
        Self {
            kind,
            snippet: None,
            file: None,
            contexts: Vec::new(),
        }
    }
    #[must_use]
    pub fn with_source(mut self, span: Span, source: &SourceMetadata) -> Self {
        self.file = source.file.clone();
        self.snippet = span.snippet_from_source(source);
        self
    }
    #[must_use]
    pub fn add_context(mut self, ctx: &'static str) -> Self {
        self.contexts.push(ctx);
        self
    }
    pub fn position(&self) -> Option<Position> {
        self.snippet.as_ref().map(|s| s.position)
    }
    pub fn contexts(&self) -> &[&'static str] {
        &self.contexts
    }
}

#[derive(Debug, Clone)]
pub struct Snippet {
    position: Position,
    line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WantedSpec<T> {
    Specific(T),
    Description(&'static str),
}

impl<T: fmt::Display> fmt::Display for WantedSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Description(desc) => f.write_str(desc),
            Self::Specific(t) => write!(f, "{}", t),
        }
    }
}

/// Zero based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub col: usize,
    pub line: usize,
}

impl<T: error::Error + 'static> error::Error for Error<T> {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<T: fmt::Display> fmt::Display for Error<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let whiles = self
            .contexts
            .iter()
            .copied()
            .fold(String::new(), |acc, next| acc + "\nwhile " + next);
        let snippet = if let Some(snip) = &self.snippet {
            snip
        } else {
            return write!(f, "{}(no location info){}", self.kind, whiles);
        };
        let file = self
            .file
            .as_ref()
            .and_then(|x| x.to_str())
            .unwrap_or("<unknown source>");

        write!(
            f,
            "\
{kind}
   --> {file}:{line}:{col}
    |
{line:3} | {snippet}
    | {marker:>0$}{whiles}",
            snippet.position.col + 1,
            marker = '^',
            line = snippet.position.line + 1,
            col = snippet.position.col + 1,
            file = file,
            kind = self.kind,
            snippet = snippet.line,
            whiles = whiles,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_points_into_second_line() {
        let meta = SourceMetadata::new("print 1\nprint @");
        let snippet = Span::new(14).snippet_from_source(&meta).unwrap();
        assert_eq!(snippet.position, Position { line: 1, col: 6 });
        assert_eq!(snippet.line, "print @");
    }

    #[test]
    fn end_of_input_lands_after_last_character() {
        let meta = SourceMetadata::new("var x =\n");
        let snippet = meta.end_span().snippet_from_source(&meta).unwrap();
        assert_eq!(snippet.position, Position { line: 0, col: 7 });
    }

    #[test]
    fn display_includes_caret_and_contexts() {
        let meta = SourceMetadata::new("print @").with_file("demo.chasm".into());
        let err = Error::new("unexpected '@'")
            .with_source(Span::new(6), &meta)
            .add_context("parsing print statement");
        let rendered = err.to_string();
        assert!(rendered.contains("--> demo.chasm:1:7"));
        assert!(rendered.contains("  1 | print @"));
        assert!(rendered.ends_with("^\nwhile parsing print statement"));
    }
}
