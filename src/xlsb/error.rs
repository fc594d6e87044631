//! Error types for XLSB record stream processing

use crate::common::binary::BinaryError;
use crate::xlsb::record_types::RecordType;
use smallvec::SmallVec;
use thiserror::Error;

/// Result type alias for XLSB operations
pub type XlsbResult<T> = Result<T, XlsbError>;

/// Record types a structural reader was prepared to accept.
pub type ExpectedRecords = SmallVec<[RecordType; 4]>;

/// Errors that can occur while reading or writing an XLSB record stream.
///
/// Every variant is fatal for the part being processed: continuing after a
/// structural error would leave the byte cursor out of step with the
/// record boundaries.
#[derive(Error, Debug)]
pub enum XlsbError {
    /// A read of at least one required byte found the stream exhausted
    #[error("Unexpected end of stream while reading {0}")]
    UnexpectedEndOfStream(&'static str),

    /// The decoded record is not one the structure allows here
    #[error("Unexpected record {found}; expected {}", join_types(.expected))]
    UnexpectedRecord {
        /// Record that was read
        found: RecordType,
        /// Records that would have been accepted
        expected: ExpectedRecords,
    },

    /// The record payload length disagrees with its fixed layout
    #[error("Unexpected size for {record}: expected {expected} bytes, found {found}")]
    UnexpectedRecordSize {
        /// Record whose size is wrong
        record: RecordType,
        /// Size the layout requires
        expected: u64,
        /// Size declared or consumed
        found: u64,
    },

    /// A decoded or supplied field violates a documented numeric constraint
    #[error("{field} out of range ({value}): {constraint}")]
    ValueOutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: i64,
        /// Human readable constraint
        constraint: &'static str,
    },

    /// Type code unknown to the primary namespace outside any FRT/AC block
    #[error("Unknown record type code 0x{0:04X}")]
    UnknownRecordType(u16),

    /// Size field did not terminate within four bytes
    #[error("Malformed record descriptor: {0}")]
    MalformedDescriptor(&'static str),

    /// The null marker was found where a string is required, or `None`
    /// was supplied for a non-nullable field
    #[error("Null string in non-nullable field {0}")]
    NullString(&'static str),

    /// String or binary decoding failure
    #[error("Encoding error: {0}")]
    Encoding(#[from] BinaryError),

    /// Record category recognised but not supported by this codec
    #[error("Unsupported record: {0}")]
    UnsupportedRecord(RecordType),

    /// `write_poll` was called with no captured batch left to replay
    #[error("Record repository exhausted: no captured batch left to replay")]
    RepositoryExhausted,

    /// The repository was closed before every captured batch was replayed
    #[error("Record repository closed with {remaining} unreplayed batch(es)")]
    UnreplayedBatches {
        /// Batches still queued
        remaining: usize,
    },

    /// A repository operation was called in the wrong phase
    #[error("Record repository misuse: {0}")]
    RepositoryState(&'static str),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl XlsbError {
    /// Build an [`XlsbError::UnexpectedRecord`] from anything convertible
    /// into record types.
    pub fn unexpected<I, T>(found: RecordType, expected: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RecordType>,
    {
        XlsbError::UnexpectedRecord {
            found,
            expected: expected.into_iter().map(Into::into).collect(),
        }
    }

    /// Map an I/O error raised during a required read, turning a short read
    /// into [`XlsbError::UnexpectedEndOfStream`].
    pub(crate) fn from_read(err: std::io::Error, what: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            XlsbError::UnexpectedEndOfStream(what)
        } else {
            XlsbError::Io(err)
        }
    }
}

fn join_types(types: &[RecordType]) -> String {
    if types.is_empty() {
        return "nothing".to_string();
    }
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsb::record_types::BinaryRecordType;

    #[test]
    fn test_unexpected_record_message_lists_expected() {
        let err = XlsbError::unexpected(
            RecordType::Primary(BinaryRecordType::RowHdr),
            [BinaryRecordType::BeginSheetData, BinaryRecordType::BeginColInfos],
        );
        let msg = err.to_string();
        assert!(msg.contains("BrtRowHdr"), "{msg}");
        assert!(msg.contains("BrtBeginSheetData, BrtBeginColInfos"), "{msg}");
    }

    #[test]
    fn test_short_read_maps_to_end_of_stream() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(
            XlsbError::from_read(io, "u32"),
            XlsbError::UnexpectedEndOfStream("u32")
        ));
    }
}
