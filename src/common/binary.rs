//! Binary data helpers shared by the record codec.
//!
//! XLSB stores every string as UTF-16LE code units behind a 32-bit count.
//! These helpers convert between that representation and Rust strings
//! without going through the record stream, so payload lengths can be
//! computed before anything is written.

use encoding_rs::UTF_16LE;
use thiserror::Error;

/// Binary parsing error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    #[error("Insufficient data: expected {expected}, got {available}")]
    InsufficientData { expected: usize, available: usize },

    /// The byte sequence is not well-formed UTF-16LE
    #[error("Malformed UTF-16LE string ({0} bytes)")]
    MalformedUtf16(usize),
}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Decode a UTF-16LE byte sequence into a `String`.
///
/// Unpaired surrogates are rejected rather than replaced, so that a decoded
/// string always encodes back to the exact same bytes.
///
/// # Examples
///
/// ```
/// use xlsb_stream::common::binary::decode_utf16le;
/// assert_eq!(decode_utf16le(&[0x41, 0x00, 0x42, 0x00]).unwrap(), "AB");
/// ```
pub fn decode_utf16le(data: &[u8]) -> BinaryResult<String> {
    if data.len() % 2 != 0 {
        return Err(BinaryError::InsufficientData {
            expected: data.len() + 1,
            available: data.len(),
        });
    }
    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|s| s.into_owned())
        .ok_or(BinaryError::MalformedUtf16(data.len()))
}

/// Encode a string as UTF-16LE bytes (no length prefix).
pub fn encode_utf16le(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Number of UTF-16 code units needed to store `s`.
#[inline]
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}
