//! Cell records of the sheet data block.
//!
//! Every cell record starts with the same 8-byte header (column, 24-bit
//! style index, phonetic flag) followed by a value whose layout depends on
//! the record type.

use crate::common::binary::utf16_len;
use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::{RecordProcessor, wide_string_len};
use crate::xlsb::record_types::BinaryRecordType;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use crate::xlsb::utils::{f64_to_rk, rk_to_f64, validate_col, validate_max};
use std::fmt;
use std::io::{Read, Write};

/// Longest inline string a cell may hold, in UTF-16 code units.
pub const MAX_INLINE_STRING_LEN: usize = 32767;

const CELL_HEADER_LEN: u32 = 8;

/// Cell record types this codec decodes.
pub const CELL_RECORD_TYPES: [BinaryRecordType; 7] = [
    BinaryRecordType::CellBlank,
    BinaryRecordType::CellRk,
    BinaryRecordType::CellError,
    BinaryRecordType::CellBool,
    BinaryRecordType::CellReal,
    BinaryRecordType::CellIsst,
    BinaryRecordType::CellSt,
];

/// Formula-bearing cell records, recognised but not decoded.
pub const FORMULA_RECORD_TYPES: [BinaryRecordType; 7] = [
    BinaryRecordType::FmlaString,
    BinaryRecordType::FmlaNum,
    BinaryRecordType::FmlaBool,
    BinaryRecordType::FmlaError,
    BinaryRecordType::ShrFmla,
    BinaryRecordType::ArrFmla,
    BinaryRecordType::Table,
];

/// Error value stored in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CellError {
    Null = 0x00,
    Div0 = 0x07,
    Value = 0x0F,
    Ref = 0x17,
    Name = 0x1D,
    Num = 0x24,
    NotAvailable = 0x2A,
    GettingData = 0x2B,
}

impl CellError {
    const ALL: [CellError; 8] = [
        CellError::Null,
        CellError::Div0,
        CellError::Value,
        CellError::Ref,
        CellError::Name,
        CellError::Num,
        CellError::NotAvailable,
        CellError::GettingData,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> XlsbResult<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.code() == code)
            .ok_or(XlsbError::ValueOutOfRange {
                field: "cell error",
                value: code as i64,
                constraint: "unknown error code",
            })
    }

    /// The literal shown in the cell, e.g. `#DIV/0!`.
    pub fn literal(self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::NotAvailable => "#N/A",
            CellError::GettingData => "#GETTING_DATA",
        }
    }

    pub fn from_literal(literal: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.literal() == literal)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// Fields shared by every cell record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellHeader {
    /// Zero-based column
    pub column: u32,
    /// Index into the cell XF table (24 bits)
    pub style: u32,
    /// Whether phonetic information is displayed
    pub show_phonetic: bool,
}

impl CellHeader {
    pub fn new(column: u32, style: u32) -> XlsbResult<Self> {
        validate_col(column)?;
        validate_max("cell style", style as u64, 0x00FF_FFFF, "style index must fit in 24 bits")?;
        Ok(CellHeader {
            column,
            style,
            show_phonetic: false,
        })
    }

    pub fn read<S: Read>(processor: &mut RecordProcessor<S>) -> XlsbResult<Self> {
        let column = validate_col(processor.read_u32()?)?;
        let style = processor.read_u24()?;
        let flags = processor.read_u8()?;
        Ok(CellHeader {
            column,
            style,
            show_phonetic: flags & 0x01 != 0,
        })
    }

    pub fn write<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        processor.write_u32(validate_col(self.column)?)?;
        processor.write_u24(self.style)?;
        processor.write_u8(self.show_phonetic as u8)
    }
}

/// Value part of a cell record.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    /// Number stored in the 4-byte RK form
    Rk(f64),
    Error(CellError),
    Bool(bool),
    /// Number stored as a full double; must be finite
    Real(f64),
    /// Index into the shared string table
    SharedString(u32),
    InlineString(String),
}

impl CellValue {
    /// Record type that carries this value.
    pub fn record_type(&self) -> BinaryRecordType {
        match self {
            CellValue::Blank => BinaryRecordType::CellBlank,
            CellValue::Rk(_) => BinaryRecordType::CellRk,
            CellValue::Error(_) => BinaryRecordType::CellError,
            CellValue::Bool(_) => BinaryRecordType::CellBool,
            CellValue::Real(_) => BinaryRecordType::CellReal,
            CellValue::SharedString(_) => BinaryRecordType::CellIsst,
            CellValue::InlineString(_) => BinaryRecordType::CellSt,
        }
    }

    fn len(&self) -> u32 {
        match self {
            CellValue::Blank => 0,
            CellValue::Error(_) | CellValue::Bool(_) => 1,
            CellValue::Rk(_) | CellValue::SharedString(_) => 4,
            CellValue::Real(_) => 8,
            CellValue::InlineString(s) => wide_string_len(s),
        }
    }

    /// Check the constraints a value must satisfy before it is written.
    pub fn validate(&self) -> XlsbResult<()> {
        match self {
            CellValue::Real(v) if !v.is_finite() => Err(XlsbError::ValueOutOfRange {
                field: "real cell",
                value: 0,
                constraint: "real numbers cannot be infinite or NaN",
            }),
            CellValue::Rk(v) => f64_to_rk(*v).map(|_| ()),
            CellValue::InlineString(s) => validate_max(
                "inline string length",
                utf16_len(s) as u64,
                MAX_INLINE_STRING_LEN as u64,
                "inline strings are limited to 32767 characters",
            ),
            _ => Ok(()),
        }
    }

    fn read<S: Read>(processor: &mut RecordProcessor<S>, t: BinaryRecordType) -> XlsbResult<Self> {
        let value = match t {
            BinaryRecordType::CellBlank => CellValue::Blank,
            BinaryRecordType::CellRk => CellValue::Rk(rk_to_f64(processor.read_u32()?)),
            BinaryRecordType::CellError => CellValue::Error(CellError::from_code(processor.read_u8()?)?),
            BinaryRecordType::CellBool => CellValue::Bool(processor.read_u8()? != 0),
            BinaryRecordType::CellReal => CellValue::Real(processor.read_f64()?),
            BinaryRecordType::CellIsst => CellValue::SharedString(processor.read_u32()?),
            BinaryRecordType::CellSt => CellValue::InlineString(processor.read_string("inline string")?),
            other => return Err(XlsbError::unexpected(other.into(), CELL_RECORD_TYPES)),
        };
        // a decoded RK is valid by construction
        if !matches!(value, CellValue::Rk(_)) {
            value.validate()?;
        }
        Ok(value)
    }

    fn write<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        match self {
            CellValue::Blank => Ok(()),
            CellValue::Rk(v) => processor.write_u32(f64_to_rk(*v)?),
            CellValue::Error(e) => processor.write_u8(e.code()),
            CellValue::Bool(b) => processor.write_u8(*b as u8),
            CellValue::Real(v) => processor.write_f64(*v),
            CellValue::SharedString(i) => processor.write_u32(*i),
            CellValue::InlineString(s) => processor.write_string(s),
        }
    }
}

/// One cell record: header plus value.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub header: CellHeader,
    pub value: CellValue,
    pub(crate) replay: bool,
}

impl Cell {
    pub fn new(header: CellHeader, value: CellValue) -> XlsbResult<Self> {
        value.validate()?;
        Ok(Cell {
            header,
            value,
            replay: false,
        })
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.header.column
    }

    /// Whether this cell was read from a stream, and so owns a replay point.
    #[inline]
    pub fn is_from_stream(&self) -> bool {
        self.replay
    }
}

impl BinaryRecord for Cell {
    fn record_type(&self) -> BinaryRecordType {
        self.value.record_type()
    }

    fn payload_len(&self) -> u32 {
        CELL_HEADER_LEN + self.value.len()
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let Some(t) = descriptor.record_type.primary() else {
            return Err(XlsbError::unexpected(descriptor.record_type, CELL_RECORD_TYPES));
        };
        if FORMULA_RECORD_TYPES.contains(&t) {
            return Err(XlsbError::UnsupportedRecord(descriptor.record_type));
        }
        if !CELL_RECORD_TYPES.contains(&t) {
            return Err(XlsbError::unexpected(descriptor.record_type, CELL_RECORD_TYPES));
        }
        let header = CellHeader::read(processor)?;
        let value = CellValue::read(processor, t)?;
        Ok(Cell {
            header,
            value,
            replay: true,
        })
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.value.validate()?;
        self.header.write(processor)?;
        self.value.write(processor)
    }
}
