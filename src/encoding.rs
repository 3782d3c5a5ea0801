//! Versioned byte encoding for public values.
//!
//! Format: `[version (1 byte)]` followed by one `[len (4 bytes, BE)][big-endian integer]`
//! field per component. Private keys have no byte encoding.

use num_bigint::BigUint;

use crate::{Error, Result};

/// Encoding version for serialization compatibility.
pub const ENCODING_VERSION: u8 = 1;

/// Largest accepted length for a single field.
const MAX_FIELD_SIZE: usize = 8192;

/// Builds an encoded value field by field.
pub(crate) struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub(crate) fn new() -> Self {
        Self {
            buf: vec![ENCODING_VERSION],
        }
    }

    pub(crate) fn put(&mut self, value: &BigUint) {
        let bytes = value.to_bytes_be();
        self.buf
            .extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(&bytes);
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads an encoded value field by field.
pub(crate) struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Result<Self> {
        let version = *bytes
            .first()
            .ok_or_else(|| Error::Encoding("empty input".to_string()))?;
        if version != ENCODING_VERSION {
            return Err(Error::Encoding(format!(
                "unsupported encoding version: {version}"
            )));
        }
        Ok(Self { bytes, pos: 1 })
    }

    pub(crate) fn take(&mut self) -> Result<BigUint> {
        let len_bytes: [u8; 4] = self
            .bytes
            .get(self.pos..self.pos + 4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::Encoding("truncated input: missing length".to_string()))?;
        let len = u32::from_be_bytes(len_bytes) as usize;
        self.pos += 4;

        if len == 0 || len > MAX_FIELD_SIZE {
            return Err(Error::Encoding(format!("invalid field length: {len}")));
        }

        let field = self
            .bytes
            .get(self.pos..self.pos + len)
            .ok_or_else(|| Error::Encoding(format!("truncated input: expected {len} bytes")))?;
        self.pos += len;

        Ok(BigUint::from_bytes_be(field))
    }

    pub(crate) fn finish(self) -> Result<()> {
        if self.pos != self.bytes.len() {
            return Err(Error::Encoding(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}
