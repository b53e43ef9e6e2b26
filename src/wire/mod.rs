//! Discovery Wire Format
//!
//! Byte-level encoding of node identities exchanged during discovery:
//! - Varint and length-prefixed string primitives
//! - Family-tagged transport addresses
//! - Node identities and node lists
//!
//! There is no framing or checksum at this layer; the transport owns both.

mod address;
mod node;

pub use node::{read_nodes, write_nodes};

use crate::error::DecodeError;

/// Values with a fixed wire representation.
pub trait Writeable {
    fn write_to(&self, out: &mut StreamOutput);
}

/// Values that can be read back in the order they were written.
pub trait Readable: Sized {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError>;
}

/// Encodes a single value into a fresh buffer.
pub fn encode<T: Writeable + ?Sized>(value: &T) -> Vec<u8> {
    let mut out = StreamOutput::new();
    value.write_to(&mut out);
    out.into_inner()
}

/// Decodes a single value that must span the whole of `bytes`.
pub fn decode<T: Readable>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut input = StreamInput::new(bytes);
    let value = T::read_from(&mut input)?;
    if !input.is_empty() {
        return Err(DecodeError::TrailingBytes(input.remaining()));
    }
    Ok(value)
}

/// Growable output buffer.
#[derive(Debug, Default, Clone)]
pub struct StreamOutput {
    buffer: Vec<u8>,
}

impl StreamOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Seven bits per byte, least significant group first, high bit set on all
    /// but the last byte.
    pub fn write_vint(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buffer.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    /// Varint byte length followed by UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) {
        self.write_vint(value.len() as u32);
        self.buffer.extend_from_slice(value.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Cursor over a caller-supplied byte slice.
#[derive(Debug, Clone)]
pub struct StreamInput<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> StreamInput<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        if count > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.bytes[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(self.read_array::<2>()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.read_array::<4>()?))
    }

    pub fn read_vint(&mut self) -> Result<u32, DecodeError> {
        let mut value: u32 = 0;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            let group = u32::from(byte & 0x7f);
            // the fifth byte may only carry the top four bits
            if shift == 28 && group > 0x0f {
                return Err(DecodeError::VarIntOverflow);
            }
            value |= group << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::VarIntOverflow)
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_vint()?;
        if len as usize > self.remaining() {
            return Err(DecodeError::InvalidLength(len));
        }
        let bytes = self.read_bytes(len as usize)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vint_layout() {
        let cases: [(u32, &[u8]); 5] = [
            (0, &[0x00]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
            (u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
        ];
        for (value, expected) in cases {
            let mut out = StreamOutput::new();
            out.write_vint(value);
            assert_eq!(out.as_slice(), expected, "encoding {}", value);
            assert_eq!(StreamInput::new(expected).read_vint().unwrap(), value);
        }
    }

    #[test]
    fn test_vint_overflow() {
        let mut input = StreamInput::new(&[0xff, 0xff, 0xff, 0xff, 0x1f]);
        assert_eq!(input.read_vint(), Err(DecodeError::VarIntOverflow));

        let mut input = StreamInput::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(input.read_vint(), Err(DecodeError::VarIntOverflow));
    }

    #[test]
    fn test_short_reads() {
        let mut input = StreamInput::new(&[0x00, 0x01]);
        assert_eq!(
            input.read_i32(),
            Err(DecodeError::UnexpectedEof { needed: 4, remaining: 2 })
        );
        assert_eq!(StreamInput::new(&[0x80]).read_vint().unwrap_err(), DecodeError::UnexpectedEof { needed: 1, remaining: 0 });
    }

    #[test]
    fn test_string() {
        let mut out = StreamOutput::new();
        out.write_string("");
        out.write_string("zürich");
        let bytes = out.into_inner();
        assert_eq!(bytes[1], 7);

        let mut input = StreamInput::new(&bytes);
        assert_eq!(input.read_string().unwrap(), "");
        assert_eq!(input.read_string().unwrap(), "zürich");
        assert!(input.is_empty());
    }

    #[test]
    fn test_string_length_beyond_input() {
        let mut input = StreamInput::new(&[0x05, b'a', b'b']);
        assert_eq!(input.read_string(), Err(DecodeError::InvalidLength(5)));
    }

    #[test]
    fn test_string_invalid_utf8() {
        let mut input = StreamInput::new(&[0x02, 0xc3, 0x28]);
        assert_eq!(input.read_string(), Err(DecodeError::InvalidUtf8));
    }
}
