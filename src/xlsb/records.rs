//! XLSB record descriptors and their variable-length encoding.
//!
//! Every record starts with a type code (1-2 bytes) and a payload size
//! (1-4 bytes), both using the high bit of each byte as a continuation
//! flag:
//!
//! ```text
//! type:  0xxxxxxx                      codes 0x00..=0x7F
//!        1xxxxxxx ?yyyyyyy             code = y << 7 | x
//! size:  cxxxxxxx [cxxxxxxx ...]       7 bits per byte, little endian, <= 4 bytes
//! ```

use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::RecordProcessor;
use crate::xlsb::record_types::{BinaryRecordType, RecordType};
use smallvec::SmallVec;
use std::fmt;
use std::io::{Read, Write};

/// Largest type code the two-byte encoding can carry.
pub const MAX_RECORD_TYPE_CODE: u16 = 0x3FFF;

/// Largest payload size the four-byte encoding can carry.
pub const MAX_RECORD_SIZE: u32 = 0x0FFF_FFFF;

const MAX_SIZE_BYTES: usize = 4;

/// Header of one record: its resolved type and payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordDescriptor {
    pub record_type: RecordType,
    pub size: u32,
}

impl RecordDescriptor {
    /// Create a descriptor for a record about to be written.
    pub fn new<T: Into<RecordType>>(record_type: T, size: u32) -> Self {
        RecordDescriptor {
            record_type: record_type.into(),
            size,
        }
    }

    /// Descriptor for a record with no payload (most Begin/End markers).
    pub fn empty<T: Into<RecordType>>(record_type: T) -> Self {
        Self::new(record_type, 0)
    }

    /// Whether this descriptor is the given primary type.
    #[inline]
    pub fn is(&self, t: BinaryRecordType) -> bool {
        self.record_type.is(t)
    }

    /// Whether this descriptor is any of the given primary types.
    #[inline]
    pub fn is_any(&self, types: &[BinaryRecordType]) -> bool {
        self.record_type.is_any(types)
    }

    /// Fail with [`XlsbError::UnexpectedRecord`] unless this is `t`.
    pub fn expect(&self, t: BinaryRecordType) -> XlsbResult<()> {
        if self.is(t) {
            Ok(())
        } else {
            Err(XlsbError::unexpected(self.record_type, [t]))
        }
    }

    /// Fail with [`XlsbError::UnexpectedRecordSize`] unless the payload is
    /// exactly `size` bytes.
    pub fn expect_size(&self, size: u32) -> XlsbResult<()> {
        if self.size == size {
            Ok(())
        } else {
            Err(XlsbError::UnexpectedRecordSize {
                record: self.record_type,
                expected: size as u64,
                found: self.size as u64,
            })
        }
    }

    /// Encode the header bytes (type code followed by size).
    pub fn encode(&self) -> XlsbResult<SmallVec<[u8; 6]>> {
        let mut out = SmallVec::new();
        out.extend_from_slice(&encode_type_code(self.record_type.code())?);
        out.extend_from_slice(&encode_size(self.size)?);
        Ok(out)
    }

    /// Write the encoded header to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> XlsbResult<()> {
        writer.write_all(&self.encode()?)?;
        Ok(())
    }
}

impl fmt::Display for RecordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.record_type, self.size)
    }
}

/// Encode a record type code (1 or 2 bytes).
pub fn encode_type_code(code: u16) -> XlsbResult<SmallVec<[u8; 2]>> {
    if code > MAX_RECORD_TYPE_CODE {
        return Err(XlsbError::ValueOutOfRange {
            field: "record type",
            value: code as i64,
            constraint: "type codes must be <= 0x3FFF",
        });
    }
    let mut out = SmallVec::new();
    if code <= 0x7F {
        out.push(code as u8);
    } else {
        out.push(0x80 | (code & 0x7F) as u8);
        out.push((code >> 7) as u8);
    }
    Ok(out)
}

/// Decode a record type code whose first byte has already been read.
pub fn decode_type_code<R: Read>(first: u8, reader: &mut R) -> XlsbResult<u16> {
    if first & 0x80 == 0 {
        return Ok((first & 0x7F) as u16);
    }
    let second = read_one(reader, "record type")?;
    Ok((((second & 0x7F) as u16) << 7) | (first & 0x7F) as u16)
}

/// Encode a payload size with the minimal number of bytes (1-4).
pub fn encode_size(size: u32) -> XlsbResult<SmallVec<[u8; 4]>> {
    if size > MAX_RECORD_SIZE {
        return Err(XlsbError::ValueOutOfRange {
            field: "record size",
            value: size as i64,
            constraint: "record payloads must be <= 0x0FFFFFFF bytes",
        });
    }
    let mut out = SmallVec::new();
    let mut value = size;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            return Ok(out);
        }
    }
}

/// Decode a payload size. Non-minimal encodings are accepted.
pub fn decode_size<R: Read>(reader: &mut R) -> XlsbResult<u32> {
    let mut size = 0u32;
    for i in 0..MAX_SIZE_BYTES {
        let byte = read_one(reader, "record size")?;
        size |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(size);
        }
    }
    Err(XlsbError::MalformedDescriptor(
        "record size did not terminate within 4 bytes",
    ))
}

fn read_one<R: Read>(reader: &mut R, what: &'static str) -> XlsbResult<u8> {
    let mut b = [0u8; 1];
    reader
        .read_exact(&mut b)
        .map_err(|e| XlsbError::from_read(e, what))?;
    Ok(b[0])
}

/// A record structure that can be marshaled through a [`RecordProcessor`].
///
/// `payload_len` must be known before writing because the size precedes
/// the payload in the stream.
pub trait BinaryRecord: Sized {
    /// Record type used when writing this value.
    fn record_type(&self) -> BinaryRecordType;

    /// Exact number of payload bytes `write_payload` emits.
    fn payload_len(&self) -> u32;

    /// Read the payload that follows `descriptor`.
    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self>;

    /// Write the payload only.
    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()>;

    /// Write descriptor and payload.
    fn write<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        processor.write_descriptor(&RecordDescriptor::new(self.record_type(), self.payload_len()))?;
        self.write_payload(processor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode(bytes: &[u8]) -> XlsbResult<(u16, u32)> {
        let mut cursor = Cursor::new(bytes);
        let first = read_one(&mut cursor, "test")?;
        let code = decode_type_code(first, &mut cursor)?;
        let size = decode_size(&mut cursor)?;
        assert_eq!(cursor.position() as usize, bytes.len());
        Ok((code, size))
    }

    #[test]
    fn test_type_code_vectors() {
        let vectors: &[(u16, &[u8])] = &[
            (0x00, &[0x00]),
            (0x7F, &[0x7F]),
            (0x80, &[0x80, 0x01]),
            (0x81, &[0x81, 0x01]),
            (0x94, &[0x94, 0x01]),
            (0x0C00, &[0x80, 0x18]),
            (0x3FFF, &[0xFF, 0x7F]),
        ];
        for (code, expected) in vectors {
            assert_eq!(encode_type_code(*code).unwrap().as_slice(), *expected, "code={code:#x}");
        }
    }

    #[test]
    fn test_type_code_out_of_range() {
        assert!(matches!(
            encode_type_code(0x4000),
            Err(XlsbError::ValueOutOfRange { field: "record type", .. })
        ));
    }

    #[test]
    fn test_size_boundaries_roundtrip() {
        let cases: &[(u32, usize)] = &[
            (0, 1),
            (1, 1),
            (127, 1),
            (128, 2),
            (16383, 2),
            (16384, 3),
            ((1 << 21) - 1, 3),
            (1 << 21, 4),
            ((1 << 28) - 1, 4),
        ];
        for (size, len) in cases {
            let encoded = encode_size(*size).unwrap();
            assert_eq!(encoded.len(), *len, "size={size}");
            assert_ne!(*encoded.last().unwrap() & 0x80, 0x80);
            let mut bytes = vec![0x05];
            bytes.extend_from_slice(&encoded);
            assert_eq!(decode(&bytes).unwrap(), (5, *size));
        }
    }

    #[test]
    fn test_size_beyond_four_bytes_rejected() {
        assert!(matches!(
            encode_size(1 << 28),
            Err(XlsbError::ValueOutOfRange { field: "record size", .. })
        ));
    }

    #[test]
    fn test_minimal_size_encoding() {
        assert_eq!(encode_size(0).unwrap().as_slice(), &[0x00]);
        assert_eq!(encode_size(16).unwrap().as_slice(), &[0x10]);
        assert_eq!(encode_size(300).unwrap().as_slice(), &[0xAC, 0x02]);
    }

    #[test]
    fn test_non_minimal_size_accepted() {
        // 16 encoded with four bytes
        assert_eq!(decode(&[0x01, 0x90, 0x80, 0x80, 0x00]).unwrap(), (1, 16));
    }

    #[test]
    fn test_unterminated_size_rejected() {
        assert!(matches!(
            decode(&[0x01, 0x80, 0x80, 0x80, 0x80]),
            Err(XlsbError::MalformedDescriptor(_))
        ));
    }

    #[test]
    fn test_truncated_header_is_end_of_stream() {
        assert!(matches!(decode(&[0x81]), Err(XlsbError::UnexpectedEndOfStream(_))));
        assert!(matches!(decode(&[0x01, 0x80]), Err(XlsbError::UnexpectedEndOfStream(_))));
    }

    #[test]
    fn test_descriptor_encode() {
        let d = RecordDescriptor::new(BinaryRecordType::WsDim, 16);
        assert_eq!(d.encode().unwrap().as_slice(), &[0x94, 0x01, 0x10]);
        assert_eq!(d.to_string(), "BrtWsDim (16 bytes)");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(512))]

            #[test]
            fn prop_header_roundtrip(code in 0u16..=MAX_RECORD_TYPE_CODE, size in 0u32..=MAX_RECORD_SIZE) {
                let mut bytes = encode_type_code(code).unwrap().to_vec();
                bytes.extend_from_slice(&encode_size(size).unwrap());
                prop_assert_eq!(decode(&bytes).unwrap(), (code, size));
            }
        }
    }
}
