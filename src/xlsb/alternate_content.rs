//! Alternate-content block records.
//!
//! A `BrtACBegin` record lists the product versions that understand the
//! block; the records up to the matching `BrtACEnd` are then resolved in
//! the alternate-content namespace. [`AcUid`] is the one block shape the
//! styles part decodes: a unique identifier attached to a style.

use crate::xlsb::error::XlsbResult;
use crate::xlsb::processor::RecordProcessor;
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use bytes::Bytes;
use std::io::{Read, Write};

const FORWARD_COMPATIBLE: u16 = 0x8000;

/// Product and version that can read an alternate-content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcProductVersion {
    pub version: u16,
    /// 15-bit product identifier
    pub product: u16,
    pub forward_compatible: bool,
}

/// Payload of `BrtACBegin`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlternateContent {
    pub versions: Vec<AcProductVersion>,
}

impl BinaryRecord for AlternateContent {
    fn record_type(&self) -> Brt {
        Brt::ACBegin
    }

    fn payload_len(&self) -> u32 {
        2 + 4 * self.versions.len() as u32
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        _descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let count = processor.read_u16()?;
        let versions = (0..count)
            .map(|_| {
                let version = processor.read_u16()?;
                let flags = processor.read_u16()?;
                Ok(AcProductVersion {
                    version,
                    product: flags & !FORWARD_COMPATIBLE,
                    forward_compatible: flags & FORWARD_COMPATIBLE != 0,
                })
            })
            .collect::<XlsbResult<Vec<_>>>()?;
        Ok(AlternateContent { versions })
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        processor.write_u16(self.versions.len() as u16)?;
        for v in &self.versions {
            let mut flags = v.product & !FORWARD_COMPATIBLE;
            if v.forward_compatible {
                flags |= FORWARD_COMPATIBLE;
            }
            processor.write_u16(v.version)?;
            processor.write_u16(flags)?;
        }
        Ok(())
    }
}

/// `BrtACBegin`, `BrtUid`, `BrtACEnd`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcUid {
    pub content: AlternateContent,
    /// Raw `BrtUid` payload
    pub uid: Bytes,
}

impl AcUid {
    /// Read the rest of the block after its `BrtACBegin` header.
    pub fn read_after<S: Read>(
        processor: &mut RecordProcessor<S>,
        begin: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        begin.expect(Brt::ACBegin)?;
        let content = processor.read_record(begin)?;
        let d = processor.expect_descriptor(Brt::Uid)?;
        let uid = processor.read_payload(&d)?;
        processor.expect_descriptor(Brt::ACEnd)?;
        Ok(AcUid { content, uid })
    }

    /// Encoded size of the whole block, headers included.
    pub fn encoded_len(&self) -> XlsbResult<u32> {
        let begin = RecordDescriptor::new(Brt::ACBegin, self.content.payload_len()).encode()?;
        let uid = RecordDescriptor::new(Brt::Uid, self.uid.len() as u32).encode()?;
        let end = RecordDescriptor::empty(Brt::ACEnd).encode()?;
        Ok((begin.len() + uid.len() + end.len()) as u32 + self.content.payload_len() + self.uid.len() as u32)
    }

    pub fn write<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.content.write(processor)?;
        processor.write_record(Brt::Uid, &self.uid)?;
        processor.write_empty(Brt::ACEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> AcUid {
        AcUid {
            content: AlternateContent {
                versions: vec![AcProductVersion {
                    version: 0x0E,
                    product: 0x0001,
                    forward_compatible: true,
                }],
            },
            uid: Bytes::from_static(&[0xAB; 16]),
        }
    }

    #[test]
    fn test_ac_uid_roundtrip() {
        let block = sample();
        let mut w = RecordProcessor::new(Vec::new());
        block.write(&mut w).unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len() as u32, block.encoded_len().unwrap());
        // forward-compatible bit set on the product word
        assert_eq!(&bytes[2..8], &[0x01, 0x00, 0x0E, 0x00, 0x01, 0x80]);

        let mut p = RecordProcessor::new(Cursor::new(bytes));
        let begin = p.read_descriptor().unwrap();
        assert_eq!(p.context().depth(), 1);
        let read = AcUid::read_after(&mut p, &begin).unwrap();
        assert_eq!(read, block);
        assert!(p.context().is_empty());
    }

    #[test]
    fn test_ac_uid_requires_uid_record() {
        let mut w = RecordProcessor::new(Vec::new());
        sample().content.write(&mut w).unwrap();
        w.write_empty(Brt::ACEnd).unwrap();
        let mut p = RecordProcessor::new(Cursor::new(w.into_inner()));
        let begin = p.read_descriptor().unwrap();
        assert!(AcUid::read_after(&mut p, &begin).is_err());
    }
}
