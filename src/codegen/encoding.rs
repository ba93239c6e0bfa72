//! Low level encodings of the WebAssembly binary format.
use super::EmitError;

/// Minimal unsigned LEB128.
pub fn unsigned_leb128(mut n: u64) -> Vec<u8> {
    let mut buffer = Vec::new();
    loop {
        let mut byte = (n & 0x7f) as u8;
        n >>= 7;
        if n != 0 {
            byte |= 0x80;
        }
        buffer.push(byte);
        if n == 0 {
            return buffer;
        }
    }
}

/// Signed LEB128. Stops once the rest of the value is pure sign extension of the
/// last byte's sign bit.
pub fn signed_leb128(mut n: i64) -> Vec<u8> {
    let mut buffer = Vec::new();
    loop {
        let byte = (n & 0x7f) as u8;
        // arithmetic shift keeps the sign
        n >>= 7;
        let sign_bit_set = byte & 0x40 != 0;
        let done = (n == 0 && !sign_bit_set) || (n == -1 && sign_bit_set);
        if done {
            buffer.push(byte);
            return buffer;
        }
        buffer.push(byte | 0x80);
    }
}

pub fn ieee754_f32(n: f32) -> [u8; 4] {
    n.to_le_bytes()
}

/// Length prefixed name. Only ASCII names are accepted, one byte per character.
pub fn encode_name(name: &str) -> Result<Vec<u8>, EmitError> {
    if !name.is_ascii() {
        return Err(EmitError::NonAsciiName(name.to_string()));
    }
    let mut bytes = unsigned_leb128(name.len() as u64);
    bytes.extend_from_slice(name.as_bytes());
    Ok(bytes)
}
