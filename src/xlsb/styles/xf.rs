//! Cell formatting record (`BrtXF`), used both for cell style XFs and for
//! the XFs cells point at.

use super::enums::{HorizontalAlignment, ReadingOrder, VerticalAlignment};
use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::RecordProcessor;
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use bitflags::bitflags;
use std::io::{Read, Write};

/// Parent index marking a cell style XF.
pub const STYLE_XF_PARENT: u16 = 0xFFFF;

/// Indent levels above this are rejected.
pub const MAX_INDENT: u8 = 250;

const XF_LEN: u32 = 16;

const WRAP_TEXT: u8 = 0x40;
const JUSTIFY_LAST_LINE: u8 = 0x80;
const SHRINK_TO_FIT: u8 = 0x01;
const MERGE_CELL: u8 = 0x02;
const LOCKED: u8 = 0x10;
const HIDDEN: u8 = 0x20;
const PIVOT_BUTTON: u8 = 0x40;
const QUOTE_PREFIX: u8 = 0x80;

bitflags! {
    /// Property groups of an XF.
    ///
    /// On a cell XF a set bit means the group is applied from this XF
    /// rather than from its parent style. On a style XF a set bit means the
    /// group is ignored by the style.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct XfProperty: u16 {
        const NUMBER_FORMAT = 0x0001;
        const FONT = 0x0002;
        const ALIGNMENT = 0x0004;
        const BORDER = 0x0008;
        const FILL = 0x0010;
        const PROTECTION = 0x0020;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellXf {
    /// Index of the parent style XF, [`STYLE_XF_PARENT`] on style XFs
    pub parent: u16,
    pub number_format: u16,
    pub font: u16,
    pub fill: u16,
    pub border: u16,
    /// Text rotation: 0-90 counter-clockwise, 91-180 clockwise, 255 vertical
    pub rotation: u8,
    pub indent: u8,
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub wrap_text: bool,
    pub justify_last_line: bool,
    pub shrink_to_fit: bool,
    pub merge_cell: bool,
    pub reading_order: ReadingOrder,
    pub locked: bool,
    pub hidden: bool,
    pub pivot_button: bool,
    pub quote_prefix: bool,
    /// Raw property mask; bits above the defined groups are kept as read
    pub properties: XfProperty,
    pub(crate) replay: bool,
}

impl Default for CellXf {
    fn default() -> Self {
        CellXf {
            parent: 0,
            number_format: 0,
            font: 0,
            fill: 0,
            border: 0,
            rotation: 0,
            indent: 0,
            horizontal: HorizontalAlignment::General,
            vertical: VerticalAlignment::Bottom,
            wrap_text: false,
            justify_last_line: false,
            shrink_to_fit: false,
            merge_cell: false,
            reading_order: ReadingOrder::ContextDependent,
            locked: true,
            hidden: false,
            pivot_button: false,
            quote_prefix: false,
            properties: XfProperty::empty(),
            replay: false,
        }
    }
}

impl CellXf {
    /// A cell XF inheriting everything from style XF `parent`.
    pub fn cell(parent: u16) -> Self {
        CellXf {
            parent,
            ..CellXf::default()
        }
    }

    /// A style XF applying every property group.
    pub fn style() -> Self {
        CellXf {
            parent: STYLE_XF_PARENT,
            ..CellXf::default()
        }
    }

    #[inline]
    pub fn is_style(&self) -> bool {
        self.parent == STYLE_XF_PARENT
    }

    /// Whether this XF sets property group `property` itself.
    pub fn applies(&self, property: XfProperty) -> bool {
        self.properties.contains(property) != self.is_style()
    }

    pub fn set_applies(&mut self, property: XfProperty, apply: bool) {
        let set = apply != self.is_style();
        self.properties.set(property, set);
    }

    /// Whether this XF was read from a stream, and so owns a replay point.
    #[inline]
    pub fn is_from_stream(&self) -> bool {
        self.replay
    }

    pub fn validate(&self) -> XlsbResult<()> {
        if self.rotation > 180 && self.rotation != 255 {
            return Err(XlsbError::ValueOutOfRange {
                field: "text rotation",
                value: self.rotation as i64,
                constraint: "must be 0 to 180, or 255 for vertical text",
            });
        }
        if self.indent > MAX_INDENT {
            return Err(XlsbError::ValueOutOfRange {
                field: "indent",
                value: self.indent as i64,
                constraint: "must be at most 250",
            });
        }
        Ok(())
    }

    fn alignment_byte(&self) -> u8 {
        let mut b = self.horizontal.as_u8() | (self.vertical.as_u8() << 3);
        if self.wrap_text {
            b |= WRAP_TEXT;
        }
        if self.justify_last_line {
            b |= JUSTIFY_LAST_LINE;
        }
        b
    }

    fn protection_byte(&self) -> u8 {
        let mut b = self.reading_order.as_u8() << 2;
        for (set, bit) in [
            (self.shrink_to_fit, SHRINK_TO_FIT),
            (self.merge_cell, MERGE_CELL),
            (self.locked, LOCKED),
            (self.hidden, HIDDEN),
            (self.pivot_button, PIVOT_BUTTON),
            (self.quote_prefix, QUOTE_PREFIX),
        ] {
            if set {
                b |= bit;
            }
        }
        b
    }
}

impl BinaryRecord for CellXf {
    fn record_type(&self) -> Brt {
        Brt::XF
    }

    fn payload_len(&self) -> u32 {
        XF_LEN
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        descriptor.expect_size(XF_LEN)?;
        let parent = processor.read_u16()?;
        let number_format = processor.read_u16()?;
        let font = processor.read_u16()?;
        let fill = processor.read_u16()?;
        let border = processor.read_u16()?;
        let rotation = processor.read_u8()?;
        let indent = processor.read_u8()?;
        let alignment = processor.read_u8()?;
        let protection = processor.read_u8()?;
        let properties = XfProperty::from_bits_retain(processor.read_u16()?);

        let xf = CellXf {
            parent,
            number_format,
            font,
            fill,
            border,
            rotation,
            indent,
            horizontal: HorizontalAlignment::from_u8(alignment & 0x07)?,
            vertical: VerticalAlignment::from_u8((alignment >> 3) & 0x07)?,
            wrap_text: alignment & WRAP_TEXT != 0,
            justify_last_line: alignment & JUSTIFY_LAST_LINE != 0,
            shrink_to_fit: protection & SHRINK_TO_FIT != 0,
            merge_cell: protection & MERGE_CELL != 0,
            reading_order: ReadingOrder::from_u8((protection >> 2) & 0x03)?,
            locked: protection & LOCKED != 0,
            hidden: protection & HIDDEN != 0,
            pivot_button: protection & PIVOT_BUTTON != 0,
            quote_prefix: protection & QUOTE_PREFIX != 0,
            properties,
            replay: true,
        };
        xf.validate()?;
        Ok(xf)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        for index in [self.parent, self.number_format, self.font, self.fill, self.border] {
            processor.write_u16(index)?;
        }
        processor.write_bytes(&[
            self.rotation,
            self.indent,
            self.alignment_byte(),
            self.protection_byte(),
        ])?;
        processor.write_u16(self.properties.bits())
    }
}
