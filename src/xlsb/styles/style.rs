//! Named cell style record (`BrtStyle`).

use crate::xlsb::alternate_content::AcUid;
use crate::xlsb::error::XlsbResult;
use crate::xlsb::processor::{RecordProcessor, nullable_wide_string_len};
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use bitflags::bitflags;
use std::io::{Read, Write};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u16 {
        /// One of the built-in styles
        const BUILT_IN = 0x0001;
        /// Not shown in the style gallery
        const HIDDEN = 0x0002;
        /// Built-in style modified by the user
        const CUSTOM_BUILT_IN = 0x0004;
    }
}

/// Built-in style id of the "Normal" style.
pub const BUILTIN_NORMAL: u8 = 0;

/// Named cell style pointing at a style XF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleInfo {
    /// Alternate-content uid block written just before the style
    pub uid: Option<AcUid>,
    /// Index into the cell style XFs
    pub xf_index: u32,
    pub flags: StyleFlags,
    pub builtin_id: u8,
    /// Outline level of the row/column level built-in styles
    pub level: u8,
    pub name: Option<String>,
    pub(crate) replay: bool,
}

impl StyleInfo {
    pub fn new(xf_index: u32, name: impl Into<String>) -> Self {
        StyleInfo {
            uid: None,
            xf_index,
            flags: StyleFlags::empty(),
            builtin_id: 0,
            level: 0,
            name: Some(name.into()),
            replay: false,
        }
    }

    /// The built-in "Normal" style on style XF 0.
    pub fn normal() -> Self {
        StyleInfo {
            flags: StyleFlags::BUILT_IN,
            builtin_id: BUILTIN_NORMAL,
            level: 0xFF,
            ..StyleInfo::new(0, "Normal")
        }
    }

    #[inline]
    pub fn is_builtin(&self) -> bool {
        self.flags.contains(StyleFlags::BUILT_IN)
    }

    /// Whether this style was read from a stream, and so owns a replay point.
    #[inline]
    pub fn is_from_stream(&self) -> bool {
        self.replay
    }

    /// Write the uid block, if any, then the style record.
    pub fn write_with_uid<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        if let Some(uid) = &self.uid {
            uid.write(processor)?;
        }
        self.write(processor)
    }
}

impl BinaryRecord for StyleInfo {
    fn record_type(&self) -> Brt {
        Brt::Style
    }

    fn payload_len(&self) -> u32 {
        8 + nullable_wide_string_len(self.name.as_deref())
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        _descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let xf_index = processor.read_u32()?;
        let flags = StyleFlags::from_bits_truncate(processor.read_u16()?);
        let builtin_id = processor.read_u8()?;
        let level = processor.read_u8()?;
        let name = processor.read_nullable_string()?;
        Ok(StyleInfo {
            uid: None,
            xf_index,
            flags,
            builtin_id,
            level,
            name,
            replay: true,
        })
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        processor.write_u32(self.xf_index)?;
        processor.write_u16(self.flags.bits())?;
        processor.write_u8(self.builtin_id)?;
        processor.write_u8(self.level)?;
        processor.write_nullable_string(self.name.as_deref())
    }
}
