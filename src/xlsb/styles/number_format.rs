//! Number format record (`BrtFmt`).

use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::{RecordProcessor, wide_string_len};
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use std::io::{Read, Write};

/// Identifier ranges a stored number format may use. The others are
/// built in and never written to the part.
const FORMAT_ID_RANGES: [(u16, u16); 5] = [
    (5, 8),
    (23, 26),
    (41, 44),
    (63, 66),
    (FIRST_CUSTOM_FORMAT_ID, LAST_CUSTOM_FORMAT_ID),
];

const MAX_FORMAT_CODE_LEN: usize = 255;

/// First identifier available to custom formats.
pub const FIRST_CUSTOM_FORMAT_ID: u16 = 164;

/// Last identifier available to custom formats.
pub const LAST_CUSTOM_FORMAT_ID: u16 = 382;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub id: u16,
    /// Format code, e.g. `0.00%`
    pub code: String,
    pub(crate) replay: bool,
}

impl NumberFormat {
    pub fn new(id: u16, code: impl Into<String>) -> XlsbResult<Self> {
        let format = NumberFormat {
            id,
            code: code.into(),
            replay: false,
        };
        format.validate()?;
        Ok(format)
    }

    pub fn validate(&self) -> XlsbResult<()> {
        if !FORMAT_ID_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&self.id)) {
            return Err(XlsbError::ValueOutOfRange {
                field: "number format id",
                value: self.id as i64,
                constraint: "must be in [5, 8], [23, 26], [41, 44], [63, 66] or [164, 382]",
            });
        }
        let len = self.code.encode_utf16().count();
        if len == 0 || len > MAX_FORMAT_CODE_LEN {
            return Err(XlsbError::ValueOutOfRange {
                field: "number format code length",
                value: len as i64,
                constraint: "must be between 1 and 255 characters",
            });
        }
        Ok(())
    }

    /// Whether this format was read from a stream, and so owns a replay point.
    #[inline]
    pub fn is_from_stream(&self) -> bool {
        self.replay
    }
}

impl BinaryRecord for NumberFormat {
    fn record_type(&self) -> Brt {
        Brt::Fmt
    }

    fn payload_len(&self) -> u32 {
        2 + wide_string_len(&self.code)
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        _descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let id = processor.read_u16()?;
        let code = processor.read_string("number format code")?;
        let format = NumberFormat {
            id,
            code,
            replay: true,
        };
        format.validate()?;
        Ok(format)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        processor.write_u16(self.id)?;
        processor.write_string(&self.code)
    }
}
