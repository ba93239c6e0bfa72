//! Binary module layout: constants of the WebAssembly format and the fixed
//! section sequence every compiled program is wrapped in.
use super::encoding::{encode_name, unsigned_leb128};
use super::EmitError;

pub const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6d];
pub const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Marks a function signature in the type section.
pub const FUNCTION_TYPE: u8 = 0x60;
/// Block type of a `block` / `loop` that neither takes nor leaves values.
pub const EMPTY_BLOCK_TYPE: u8 = 0x40;

pub const PRINT_IMPORT_MODULE: &str = "env";
pub const PRINT_IMPORT_NAME: &str = "print";
pub const ENTRY_POINT: &str = "run";

/// `() -> ()`, the entry point.
pub const ENTRY_TYPE_INDEX: u32 = 0;
/// `(f32) -> ()`, the imported print.
pub const PRINT_TYPE_INDEX: u32 = 1;
/// Imports come first in the function index space.
pub const PRINT_FUNCTION_INDEX: u32 = 0;
pub const ENTRY_FUNCTION_INDEX: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SectionId {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValType {
    I32 = 0x7f,
    I64 = 0x7e,
    F32 = 0x7d,
    F64 = 0x7c,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExternalKind {
    Function = 0x00,
    Table = 0x01,
    Memory = 0x02,
    Global = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Block = 0x02,
    Loop = 0x03,
    End = 0x0b,
    Br = 0x0c,
    BrIf = 0x0d,
    Call = 0x10,
    LocalGet = 0x20,
    LocalSet = 0x21,
    F32Const = 0x43,
    I32Eqz = 0x45,
    F32Eq = 0x5b,
    F32Lt = 0x5d,
    F32Gt = 0x5e,
    I32And = 0x71,
    F32Add = 0x92,
    F32Sub = 0x93,
    F32Mul = 0x94,
    F32Div = 0x95,
}

/// `count` followed by the concatenated entries.
pub fn encode_vector<I>(entries: I) -> Vec<u8>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let entries: Vec<_> = entries.into_iter().collect();
    let mut bytes = unsigned_leb128(entries.len() as u64);
    bytes.extend(entries.into_iter().flatten());
    bytes
}

/// Section id, byte length of the body, body.
pub fn section(id: SectionId, body: Vec<u8>) -> Vec<u8> {
    let mut bytes = vec![id as u8];
    bytes.extend(unsigned_leb128(body.len() as u64));
    bytes.extend(body);
    bytes
}

pub fn function_type(params: &[ValType], results: &[ValType]) -> Vec<u8> {
    let types = |list: &[ValType]| encode_vector(list.iter().map(|t| vec![*t as u8]));
    let mut bytes = vec![FUNCTION_TYPE];
    bytes.extend(types(params));
    bytes.extend(types(results));
    bytes
}

pub fn type_section() -> Vec<u8> {
    section(
        SectionId::Type,
        encode_vector([function_type(&[], &[]), function_type(&[ValType::F32], &[])]),
    )
}

pub fn import_section() -> Result<Vec<u8>, EmitError> {
    let mut print = encode_name(PRINT_IMPORT_MODULE)?;
    print.extend(encode_name(PRINT_IMPORT_NAME)?);
    print.push(ExternalKind::Function as u8);
    print.extend(unsigned_leb128(PRINT_TYPE_INDEX.into()));
    Ok(section(SectionId::Import, encode_vector([print])))
}

pub fn function_section() -> Vec<u8> {
    section(
        SectionId::Function,
        encode_vector([unsigned_leb128(ENTRY_TYPE_INDEX.into())]),
    )
}

pub fn export_section() -> Result<Vec<u8>, EmitError> {
    let mut run = encode_name(ENTRY_POINT)?;
    run.push(ExternalKind::Function as u8);
    run.extend(unsigned_leb128(ENTRY_FUNCTION_INDEX.into()));
    Ok(section(SectionId::Export, encode_vector([run])))
}

/// The single function body: locals, instructions and the closing `end`.
pub fn code_section(code: &[u8], local_count: u32) -> Vec<u8> {
    let mut body = if local_count > 0 {
        let mut group = unsigned_leb128(local_count.into());
        group.push(ValType::F32 as u8);
        encode_vector([group])
    } else {
        encode_vector(Vec::<Vec<u8>>::new())
    };
    body.extend_from_slice(code);
    body.push(Opcode::End as u8);

    let mut function = unsigned_leb128(body.len() as u64);
    function.extend(body);
    section(SectionId::Code, encode_vector([function]))
}

/// Wraps a compiled instruction stream into a complete module.
pub fn assemble(code: &[u8], local_count: u32) -> Result<Vec<u8>, EmitError> {
    let sections = [
        type_section(),
        import_section()?,
        function_section(),
        export_section()?,
        code_section(code, local_count),
    ];
    let mut module = Vec::with_capacity(
        MAGIC.len() + VERSION.len() + sections.iter().map(Vec::len).sum::<usize>(),
    );
    module.extend_from_slice(&MAGIC);
    module.extend_from_slice(&VERSION);
    for section in sections {
        module.extend(section);
    }
    tracing::debug!(target: "module", "assembled module of {} bytes, {local_count} locals", module.len());
    Ok(module)
}
