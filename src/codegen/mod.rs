//! Lowers a [`Program`] into a WebAssembly module with a single exported `run`
//! function that calls the imported `env.print` for every print statement.
use thiserror::Error;

use crate::ast::{BinaryOp, Expr, Program, Statement};

pub mod encoding;
pub mod module;
pub mod output;
pub mod symbols;
pub mod visit;

use encoding::{ieee754_f32, signed_leb128, unsigned_leb128};
use module::{Opcode, EMPTY_BLOCK_TYPE, PRINT_FUNCTION_INDEX};
use output::Bytecode;
use symbols::SymbolTable;
use visit::{walk_expr, ExprVisitor};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    #[error("unknown variable: {0:?}")]
    UndeclaredVariable(String),
    #[error("too many local variables: {0}")]
    TooManyLocals(usize),
    #[error("cannot encode name {0:?}: only ASCII names are supported")]
    NonAsciiName(String),
}

impl EmitError {
    /// Whether the failure comes from a limit of the code generator rather than from
    /// the compiled program.
    pub const fn is_internal(&self) -> bool {
        !matches!(self, Self::UndeclaredVariable(_))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Reject reads and assignments of names that no earlier `var` introduced,
    /// instead of giving them a fresh zeroed local.
    pub strict_variables: bool,
}

/// Compiles the program into a complete module with the default options.
pub fn emit(program: &Program) -> Result<Vec<u8>, EmitError> {
    emit_with(program, EmitOptions::default())
}

pub fn emit_with(program: &Program, options: EmitOptions) -> Result<Vec<u8>, EmitError> {
    let (code, symbols) = generate_code(program, SymbolTable::new(), options)?;
    tracing::debug!(
        target: "codegen",
        "generated {} bytes of code, locals: {:?}",
        code.len(),
        symbols.names().collect::<Vec<_>>()
    );
    module::assemble(code.as_bytes(), symbols.local_count())
}

/// Emits the instruction stream of the entry point, without the trailing `end`.
/// Returns the code together with the final symbol table.
pub fn generate_code<'source>(
    Program(statements): &Program<'source>,
    mut symbols: SymbolTable<'source>,
    options: EmitOptions,
) -> Result<(Bytecode, SymbolTable<'source>), EmitError> {
    let mut generator = CodeGen {
        code: Bytecode::new(),
        symbols: &mut symbols,
        options,
    };
    generator.statements(statements)?;
    let code = generator.code;
    Ok((code, symbols))
}

struct CodeGen<'table, 'source> {
    code: Bytecode,
    symbols: &'table mut SymbolTable<'source>,
    options: EmitOptions,
}

impl<'table, 'source> CodeGen<'table, 'source> {
    fn statements(&mut self, statements: &[Statement<'source>]) -> Result<(), EmitError> {
        statements
            .iter()
            .try_for_each(|statement| self.statement(statement))
    }

    fn statement(&mut self, statement: &Statement<'source>) -> Result<(), EmitError> {
        match statement {
            Statement::Print(expr) => {
                self.expression(expr)?;
                self.code
                    .op_with(Opcode::Call, unsigned_leb128(PRINT_FUNCTION_INDEX.into()));
            }
            Statement::VariableDeclaration { name, initializer } => {
                self.expression(initializer)?;
                let slot = self.symbols.slot_for(name)?;
                self.code.op_with(Opcode::LocalSet, unsigned_leb128(slot.into()));
            }
            Statement::VariableAssignment { name, value } => {
                self.expression(value)?;
                let slot = self.used_slot(name)?;
                self.code.op_with(Opcode::LocalSet, unsigned_leb128(slot.into()));
            }
            Statement::While { condition, body } => {
                // block $exit (loop $continue ...))
                self.code
                    .op(Opcode::Block)
                    .byte(EMPTY_BLOCK_TYPE)
                    .op(Opcode::Loop)
                    .byte(EMPTY_BLOCK_TYPE);
                self.expression(condition)?;
                // leave the outer block once the condition is false
                self.code
                    .op(Opcode::I32Eqz)
                    .op_with(Opcode::BrIf, signed_leb128(1));
                self.statements(body)?;
                self.code
                    .op_with(Opcode::Br, signed_leb128(0))
                    .op(Opcode::End)
                    .op(Opcode::End);
            }
        }
        Ok(())
    }

    fn expression(&mut self, expr: &Expr<'source>) -> Result<(), EmitError> {
        walk_expr(expr, self)
    }

    /// Slot of a variable that is read or assigned.
    fn used_slot(&mut self, name: &'source str) -> Result<u32, EmitError> {
        if self.options.strict_variables {
            self.symbols
                .get(name)
                .ok_or_else(|| EmitError::UndeclaredVariable(name.to_string()))
        } else {
            self.symbols.slot_for(name)
        }
    }
}

impl<'table, 'source> ExprVisitor<'source> for CodeGen<'table, 'source> {
    type Error = EmitError;

    fn visit_number(&mut self, value: f32) -> Result<(), EmitError> {
        self.code.op_with(Opcode::F32Const, ieee754_f32(value));
        Ok(())
    }

    fn visit_identifier(&mut self, name: &'source str) -> Result<(), EmitError> {
        let slot = self.used_slot(name)?;
        self.code.op_with(Opcode::LocalGet, unsigned_leb128(slot.into()));
        Ok(())
    }

    fn visit_binary(&mut self, operator: BinaryOp) -> Result<(), EmitError> {
        self.code.op(binary_opcode(operator));
        Ok(())
    }
}

pub const fn binary_opcode(operator: BinaryOp) -> Opcode {
    match operator {
        BinaryOp::Add => Opcode::F32Add,
        BinaryOp::Subtract => Opcode::F32Sub,
        BinaryOp::Multiply => Opcode::F32Mul,
        BinaryOp::Divide => Opcode::F32Div,
        BinaryOp::Equal => Opcode::F32Eq,
        BinaryOp::GreaterThan => Opcode::F32Gt,
        BinaryOp::LessThan => Opcode::F32Lt,
        // comparisons leave i32 booleans on the stack
        BinaryOp::LogicAnd => Opcode::I32And,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceMetadata;
    use crate::grammar::{lexer::tokenize, parse};

    fn code_of(input: &str, options: EmitOptions) -> Result<(Vec<u8>, Vec<String>), EmitError> {
        let meta = SourceMetadata::new(input);
        let program = parse(tokenize(&meta).unwrap(), &meta).unwrap();
        let (code, symbols) = generate_code(&program, SymbolTable::new(), options)?;
        Ok((
            code.into_bytes(),
            symbols.names().map(str::to_string).collect(),
        ))
    }

    fn module_of(input: &str) -> Vec<u8> {
        let meta = SourceMetadata::new(input);
        let program = parse(tokenize(&meta).unwrap(), &meta).unwrap();
        emit(&program).unwrap()
    }

    fn validate(module: &[u8]) {
        if let Err(e) = wasmparser::Validator::new().validate_all(module) {
            panic!("invalid module: {e}");
        }
    }

    #[test]
    fn print_literal_module() {
        let module = module_of("print 323");
        #[rustfmt::skip]
        let expected = vec![
            0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00,
            // types
            0x01, 0x08, 0x02, 0x60, 0x00, 0x00, 0x60, 0x01, 0x7d, 0x00,
            // imports
            0x02, 0x0d, 0x01, 0x03, b'e', b'n', b'v', 0x05, b'p', b'r', b'i', b'n', b't', 0x00, 0x01,
            // functions
            0x03, 0x02, 0x01, 0x00,
            // exports
            0x07, 0x07, 0x01, 0x03, b'r', b'u', b'n', 0x00, 0x01,
            // code
            0x0a, 0x0b, 0x01, 0x09, 0x00,
            0x43, 0x00, 0x80, 0xa1, 0x43,
            0x10, 0x00,
            0x0b,
        ];
        assert_eq!(module, expected);
        validate(&module);
    }

    #[test]
    fn while_loop_code() {
        let (code, names) =
            code_of("var x = 1 while (x > 0) print x endwhile", EmitOptions::default()).unwrap();
        assert_eq!(names, vec!["x"]);
        #[rustfmt::skip]
        let expected = vec![
            // var x = 1
            0x43, 0x00, 0x00, 0x80, 0x3f, 0x21, 0x00,
            // block, loop
            0x02, 0x40, 0x03, 0x40,
            // (x > 0)
            0x20, 0x00, 0x43, 0x00, 0x00, 0x00, 0x00, 0x5e,
            // i32.eqz, br_if 1
            0x45, 0x0d, 0x01,
            // print x
            0x20, 0x00, 0x10, 0x00,
            // br 0, end, end
            0x0c, 0x00, 0x0b, 0x0b,
        ];
        assert_eq!(code, expected);
    }

    #[test]
    fn operator_table() {
        let cases = [
            ("+", 0x92),
            ("-", 0x93),
            ("*", 0x94),
            ("/", 0x95),
            ("==", 0x5b),
            (">", 0x5e),
            ("<", 0x5d),
        ];
        for (op, opcode) in cases {
            let (code, _) = code_of(&format!("print (2 {op} 3)"), EmitOptions::default()).unwrap();
            assert_eq!(code[10], opcode, "operator {op}");
        }
        let (code, _) = code_of("print ((1 < 2) && (3 > 2))", EmitOptions::default()).unwrap();
        assert_eq!(&code[22..24], &[0x71, 0x10]);
    }

    #[test]
    fn slots_follow_first_use() {
        let (code, names) =
            code_of("var b = 1 var a = b b = (a + b)", EmitOptions::default()).unwrap();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(
            &code[7..],
            &[0x20, 0x00, 0x21, 0x01, 0x20, 0x01, 0x20, 0x00, 0x92, 0x21, 0x00]
        );
    }

    #[test]
    fn print_only_programs_have_no_locals() {
        let (code, names) = code_of("print 1 print 2.5 print 0", EmitOptions::default()).unwrap();
        assert!(names.is_empty());
        let mut expected = Vec::new();
        for value in [1.0f32, 2.5, 0.0] {
            expected.push(0x43);
            expected.extend(value.to_le_bytes());
            expected.extend([0x10, 0x00]);
        }
        assert_eq!(code, expected);

        let module = module_of("print 1 print 2.5 print 0");
        // empty locals vector right after the body size
        let code_section = &module[module.len() - (expected.len() + 6)..];
        assert_eq!(code_section[0], 0x0a);
        assert_eq!(code_section[4], 0x00);
    }

    #[test]
    fn undeclared_variables_get_a_fresh_slot() {
        let (code, names) = code_of("print y", EmitOptions::default()).unwrap();
        assert_eq!(names, vec!["y"]);
        assert_eq!(code, vec![0x20, 0x00, 0x10, 0x00]);
        validate(&module_of("print y"));
    }

    #[test]
    fn strict_mode_rejects_undeclared_variables() {
        let strict = EmitOptions {
            strict_variables: true,
        };
        let err = code_of("var x = 1 print (x + y)", strict).unwrap_err();
        assert_eq!(err, EmitError::UndeclaredVariable("y".to_string()));
        assert!(!err.is_internal());
        assert_eq!(
            code_of("z = 1", strict).unwrap_err(),
            EmitError::UndeclaredVariable("z".to_string())
        );
        assert!(code_of("var x = 1 x = 2 print x", strict).is_ok());
    }

    #[test]
    fn slot_allocation_can_start_from_a_table() {
        let meta = SourceMetadata::new("print (a + b)");
        let program = parse(tokenize(&meta).unwrap(), &meta).unwrap();
        let mut initial = SymbolTable::new();
        initial.slot_for("b").unwrap();
        let (code, symbols) = generate_code(&program, initial, EmitOptions::default()).unwrap();
        assert_eq!(symbols.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(code.as_bytes(), &[0x20, 0x01, 0x20, 0x00, 0x92, 0x10, 0x00]);
    }

    #[test]
    fn well_typed_programs_validate() {
        let programs = [
            "",
            "var i = 0 while (i < 10) print i i = (i + 1) endwhile",
            "var a = 3 var b = 4 print ((a * a) + (b * b))",
            "var n = 5 while ((n > 0) && (n < 10)) n = (n - 1) while (n == 2) n = 0 endwhile endwhile",
            "var x = (10 / 4) print x x = 1.5 print x",
        ];
        for source in programs {
            validate(&module_of(source));
        }
    }

    #[test]
    fn nested_loops_keep_their_own_labels() {
        let (code, _) = code_of(
            "while (1 > 0) while (2 > 0) endwhile endwhile",
            EmitOptions::default(),
        )
        .unwrap();
        let cond = |n: u8| {
            let mut bytes = vec![0x43];
            bytes.extend((n as f32).to_le_bytes());
            bytes.extend([0x43, 0x00, 0x00, 0x00, 0x00, 0x5e, 0x45, 0x0d, 0x01]);
            bytes
        };
        let mut expected = vec![0x02, 0x40, 0x03, 0x40];
        expected.extend(cond(1));
        expected.extend([0x02, 0x40, 0x03, 0x40]);
        expected.extend(cond(2));
        expected.extend([0x0c, 0x00, 0x0b, 0x0b]);
        expected.extend([0x0c, 0x00, 0x0b, 0x0b]);
        assert_eq!(code, expected);
    }
}
