//! Font record (`BrtFont`).

use super::color::{COLOR_LEN, Color};
use super::enums::{Charset, FontFamily, FontScheme, Subscript, ThemeColor, Underline};
use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::{RecordProcessor, wide_string_len};
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use bitflags::bitflags;
use std::io::{Read, Write};

/// Font height bounds, in twentieths of a point.
pub const MIN_FONT_HEIGHT: u16 = 20;
pub const MAX_FONT_HEIGHT: u16 = 8191;

/// Font weight bounds.
pub const MIN_FONT_WEIGHT: u16 = 100;
pub const MAX_FONT_WEIGHT: u16 = 1000;

pub const WEIGHT_NORMAL: u16 = 400;
pub const WEIGHT_BOLD: u16 = 700;

const LONGEST_FONT_NAME: usize = 31;

bitflags! {
    /// Font style bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FontFlags: u16 {
        const ITALIC = 0x0002;
        const STRIKEOUT = 0x0008;
        const OUTLINE = 0x0010;
        const SHADOW = 0x0020;
        const CONDENSE = 0x0040;
        const EXTEND = 0x0080;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    /// Height in twentieths of a point
    pub height: u16,
    pub flags: FontFlags,
    pub weight: u16,
    pub subscript: Subscript,
    pub underline: Underline,
    pub family: FontFamily,
    pub charset: Charset,
    pub color: Color,
    pub scheme: FontScheme,
    pub name: String,
}

impl Font {
    /// A regular font of the given face and point size.
    pub fn new(name: impl Into<String>, points: u16) -> XlsbResult<Self> {
        let font = Font {
            height: points.saturating_mul(20),
            flags: FontFlags::empty(),
            weight: WEIGHT_NORMAL,
            subscript: Subscript::None,
            underline: Underline::None,
            family: FontFamily::Swiss,
            charset: Charset::Ansi,
            color: Color::theme(ThemeColor::Dark1, 0),
            scheme: FontScheme::None,
            name: name.into(),
        };
        font.validate()?;
        Ok(font)
    }

    #[inline]
    pub fn is_bold(&self) -> bool {
        self.weight >= WEIGHT_BOLD
    }

    pub fn validate(&self) -> XlsbResult<()> {
        if !(MIN_FONT_HEIGHT..=MAX_FONT_HEIGHT).contains(&self.height) {
            return Err(XlsbError::ValueOutOfRange {
                field: "font height",
                value: self.height as i64,
                constraint: "must be between 20 and 8191 twentieths of a point",
            });
        }
        if !(MIN_FONT_WEIGHT..=MAX_FONT_WEIGHT).contains(&self.weight) {
            return Err(XlsbError::ValueOutOfRange {
                field: "font weight",
                value: self.weight as i64,
                constraint: "must be between 100 and 1000",
            });
        }
        let len = self.name.encode_utf16().count();
        if len == 0 || len > LONGEST_FONT_NAME {
            return Err(XlsbError::ValueOutOfRange {
                field: "font name length",
                value: len as i64,
                constraint: "must be between 1 and 31 characters",
            });
        }
        self.color.validate()
    }
}

impl BinaryRecord for Font {
    fn record_type(&self) -> Brt {
        Brt::Font
    }

    fn payload_len(&self) -> u32 {
        13 + COLOR_LEN + wide_string_len(&self.name)
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        _descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let height = processor.read_u16()?;
        let flags = FontFlags::from_bits_truncate(processor.read_u16()?);
        let weight = processor.read_u16()?;
        let subscript = Subscript::from_u8(u8::try_from(processor.read_u16()?).unwrap_or(u8::MAX))?;
        let underline = Underline::from_u8(processor.read_u8()?)?;
        let family = FontFamily::from_u8(processor.read_u8()?)?;
        let charset = Charset::from_u8(processor.read_u8()?)?;
        processor.read_u8()?;
        let color = Color::read(processor)?;
        let scheme = FontScheme::from_u8(processor.read_u8()?)?;
        let name = processor.read_string("font name")?;
        let font = Font {
            height,
            flags,
            weight,
            subscript,
            underline,
            family,
            charset,
            color,
            scheme,
            name,
        };
        font.validate()?;
        Ok(font)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        processor.write_u16(self.height)?;
        processor.write_u16(self.flags.bits())?;
        processor.write_u16(self.weight)?;
        processor.write_u16(self.subscript.as_u8() as u16)?;
        processor.write_bytes(&[
            self.underline.as_u8(),
            self.family.as_u8(),
            self.charset.as_u8(),
            0,
        ])?;
        self.color.write(processor)?;
        processor.write_u8(self.scheme.as_u8())?;
        processor.write_string(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn calibri() -> Font {
        let mut font = Font::new("Calibri", 11).unwrap();
        font.scheme = FontScheme::Minor;
        font
    }

    #[test]
    fn test_font_layout() {
        let font = calibri();
        let mut w = RecordProcessor::new(Vec::new());
        font.write(&mut w).unwrap();
        let bytes = w.into_inner();
        // 2-byte header, 21 fixed bytes, 4-byte length and 7 UTF-16 units
        assert_eq!(bytes.len(), 2 + 21 + 4 + 14);
        assert_eq!(&bytes[..2], &[0x2B, 0x27]);
        assert_eq!(&bytes[2..4], &220u16.to_le_bytes());

        let mut p = RecordProcessor::new(Cursor::new(bytes));
        let d = p.read_descriptor().unwrap();
        let read: Font = p.read_record(&d).unwrap();
        assert_eq!(read, font);
        assert!(!read.is_bold());
    }

    #[test]
    fn test_font_flags_drop_reserved_bits() {
        let mut font = calibri();
        font.flags = FontFlags::ITALIC | FontFlags::STRIKEOUT;
        let mut w = RecordProcessor::new(Vec::new());
        font.write(&mut w).unwrap();
        let mut bytes = w.into_inner();
        // set the reserved bold bit
        bytes[4] |= 0x01;
        let mut p = RecordProcessor::new(Cursor::new(bytes));
        let d = p.read_descriptor().unwrap();
        let read: Font = p.read_record(&d).unwrap();
        assert_eq!(read.flags, FontFlags::ITALIC | FontFlags::STRIKEOUT);
    }

    #[test]
    fn test_font_constraints() {
        assert!(Font::new("Arial", 0).is_err());
        assert!(Font::new("", 10).is_err());
        assert!(Font::new("A font name that is far too long!", 10).is_err());
        let mut font = calibri();
        font.weight = 50;
        assert!(font.validate().is_err());
    }
}
