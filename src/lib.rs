//! Compiler from the chasm scripting language to WebAssembly.
//!
//! The pipeline is `source -> tokens -> ast -> module bytes`:
//! - [`grammar::lexer`] splits the source into tokens,
//! - [`grammar`] parses them into an [`ast::Program`],
//! - [`codegen`] lowers the program into a module that imports `env.print` and
//!   exports `run`.
pub mod ast;
pub mod codegen;
pub mod error;
pub mod grammar;
pub mod hexdump;

use thiserror::Error;

use codegen::{EmitError, EmitOptions};
use error::SourceMetadata;
use grammar::lexer::LexError;
use grammar::ParseError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl CompileError {
    /// `false` when the program itself is at fault.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Emit(e) if e.is_internal())
    }
}

/// Compiles source text into the bytes of a WebAssembly module.
pub fn compile(source: &str) -> Result<Vec<u8>, CompileError> {
    compile_with(&SourceMetadata::new(source), EmitOptions::default())
}

pub fn compile_with(
    source: &SourceMetadata,
    options: EmitOptions,
) -> Result<Vec<u8>, CompileError> {
    let tokens = grammar::lexer::tokenize(source)?;
    let program = grammar::parse(tokens, source)?;
    tracing::trace!(target: "parser", "program: {program:?}");
    Ok(codegen::emit_with(&program, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grammar::lexer::LexErrorKind;
    use grammar::ParseErrorKind;

    #[test]
    fn compiles_to_a_valid_module() {
        let module = compile("var x = 3 while (x > 0) print x x = (x - 1) endwhile").unwrap();
        assert_eq!(&module[..4], b"\0asm");
        wasmparser::Validator::new()
            .validate_all(&module)
            .expect("module should validate");
    }

    #[test]
    fn lexing_errors_stop_the_pipeline() {
        let err = compile("print @").unwrap_err();
        assert!(matches!(
            &err,
            CompileError::Lex(e) if e.kind == LexErrorKind::UnexpectedChar('@')
        ));
        assert!(!err.is_internal());
    }

    #[test]
    fn parse_errors_stop_the_pipeline() {
        let err = compile("print").unwrap_err();
        assert!(matches!(
            &err,
            CompileError::Parse(e) if matches!(e.kind, ParseErrorKind::UnexpectedEOF { .. })
        ));
        assert!(!err.is_internal());
    }

    #[test]
    fn strict_mode_is_a_program_error() {
        let meta = SourceMetadata::new("print x");
        let err = compile_with(
            &meta,
            EmitOptions {
                strict_variables: true,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Emit(EmitError::UndeclaredVariable(_))));
        assert!(!err.is_internal());
    }

    #[test]
    fn diagnostics_name_the_file() {
        let meta = SourceMetadata::new("var x = 1\nx = (x ? 2)").with_file("loop.chasm".into());
        let rendered = compile_with(&meta, EmitOptions::default())
            .unwrap_err()
            .to_string();
        assert!(rendered.starts_with("unexpected '?'"), "{rendered}");
        assert!(rendered.contains("--> loop.chasm:2:8"), "{rendered}");
    }
}
