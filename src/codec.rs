//! BCS primitive encoding and decoding.
//!
//! Single source of truth for the canonical binary format this crate reads
//! and writes: ULEB128 length prefixes for variable-length data, fixed-width
//! little-endian integers, and a one-byte tag for optional values.
//!
//! Decoding consumes exactly the bytes each type requires and fails with
//! [`CodecError::MalformedEncoding`] instead of panicking or reading out of
//! bounds. Declared lengths are bounded against the remaining input before
//! any allocation happens, so a corrupted length prefix cannot trigger a
//! huge allocation.

use crate::error::CodecError;

/// ULEB128 values in BCS are capped at 32 bits.
const MAX_SEQUENCE_LEN: u64 = u32::MAX as u64;

// =============================================================================
// Encoder
// =============================================================================

/// Append-only BCS writer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u128(&mut self, v: u128) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Minimal (canonical) ULEB128 encoding.
    pub fn write_uleb128(&mut self, mut value: u64) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                break;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// Raw bytes with no length prefix (fixed-width fields like addresses).
    pub fn write_fixed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// ULEB128 length prefix followed by the bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_uleb128(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    /// UTF-8 string, encoded identically to a byte string.
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Option presence tag: 0 for none, 1 followed by the value for some.
    pub fn write_option_tag(&mut self, present: bool) {
        self.buf.push(present as u8);
    }

    /// Homogeneous sequence: ULEB128 element count, then each element.
    pub fn write_seq<T>(&mut self, items: &[T], mut write_item: impl FnMut(&mut Self, &T)) {
        self.write_uleb128(items.len() as u64);
        for item in items {
            write_item(self, item);
        }
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Cursor over a BCS byte buffer.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Bytes consumed between `start` and the current position.
    ///
    /// Used to capture an already-parsed span verbatim (e.g. opaque
    /// extension payloads that must be preserved byte-for-byte).
    pub fn span_from(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::at(
                self.pos,
                format!("need {n} bytes for {what}, {} remain", self.remaining()),
            ));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        let offset = self.pos;
        match self.take(1, "bool")?[0] {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(CodecError::at(offset, format!("invalid bool byte {b:#04x}"))),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1, "u8")?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_fixed("u16")?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_fixed("u32")?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.read_fixed("u64")?))
    }

    pub fn read_u128(&mut self) -> Result<u128, CodecError> {
        Ok(u128::from_le_bytes(self.read_fixed("u128")?))
    }

    /// Fixed-width field with no length prefix.
    pub fn read_fixed<const N: usize>(&mut self, what: &str) -> Result<[u8; N], CodecError> {
        let bytes = self.take(N, what)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// ULEB128 value, capped at 32 bits per the BCS rules.
    pub fn read_uleb128(&mut self) -> Result<u64, CodecError> {
        let start = self.pos;
        let mut value: u64 = 0;
        for shift in (0..).step_by(7) {
            let byte = self.take(1, "uleb128 continuation")?[0];
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                if value > MAX_SEQUENCE_LEN {
                    return Err(CodecError::at(start, "uleb128 value exceeds u32 range"));
                }
                return Ok(value);
            }
            if shift >= 28 {
                return Err(CodecError::at(start, "uleb128 encoding longer than 5 bytes"));
            }
        }
        unreachable!("loop always returns")
    }

    /// Length prefix for a byte string or sequence, bounded against the
    /// remaining input (every element is at least one byte).
    fn read_len(&mut self, what: &str) -> Result<usize, CodecError> {
        let offset = self.pos;
        let len = self.read_uleb128()? as usize;
        if len > self.remaining() {
            return Err(CodecError::at(
                offset,
                format!(
                    "{what} length {len} exceeds {} remaining bytes",
                    self.remaining()
                ),
            ));
        }
        Ok(len)
    }

    /// Length-prefixed byte string, borrowed from the input.
    pub fn read_bytes_raw(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_len("byte string")?;
        self.take(len, "byte string payload")
    }

    /// Length-prefixed byte string, owned.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        Ok(self.read_bytes_raw()?.to_vec())
    }

    /// Length-prefixed UTF-8 string.
    pub fn read_str(&mut self) -> Result<String, CodecError> {
        let offset = self.pos;
        let bytes = self.read_bytes_raw()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| CodecError::at(offset, format!("invalid utf-8 string: {e}")))
    }

    /// Option presence tag. Anything other than 0 or 1 is malformed.
    pub fn read_option_tag(&mut self) -> Result<bool, CodecError> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(CodecError::at(offset, format!("invalid option tag {b:#04x}"))),
        }
    }

    /// Homogeneous sequence: ULEB128 element count, then each element.
    pub fn read_seq<T>(
        &mut self,
        mut read_item: impl FnMut(&mut Self) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        let len = self.read_len("sequence")?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(read_item(self)?);
        }
        Ok(items)
    }

    /// Fails unless the entire buffer has been consumed.
    pub fn finish(&self, what: &str) -> Result<(), CodecError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CodecError::at(
                self.pos,
                format!("{} trailing bytes after {what}", self.remaining()),
            ))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
