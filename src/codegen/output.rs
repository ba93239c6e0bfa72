use super::module::Opcode;

/// Instruction stream of a single function body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bytecode(Vec<u8>);

impl Bytecode {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.0.push(opcode as u8);
        self
    }

    /// An opcode followed by its already encoded immediate.
    pub fn op_with(&mut self, opcode: Opcode, immediate: impl AsRef<[u8]>) -> &mut Self {
        self.op(opcode);
        self.0.extend_from_slice(immediate.as_ref());
        self
    }

    pub fn byte(&mut self, value: u8) -> &mut Self {
        self.0.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}
