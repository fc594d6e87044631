//! Excel XLSB record stream codec
//!
//! Every binary part of an `.xlsb` package (workbook, worksheets, shared
//! strings, styles) is a flat sequence of records. Each record starts with
//! a variable-length descriptor (type code, payload size) followed by the
//! payload. This module provides the descriptor codec, the primitive
//! readers and writers, a context stack that resolves type codes inside
//! future-record and alternate-content blocks, and structural readers and
//! writers for the parts.
//!
//! # Lossless editing
//!
//! The part readers decode only the records they model. Opened with
//! [`OpenMode::ForUpdate`], everything they skip is captured by a
//! [`RecordRepository`] and replayed at the matching position when the
//! part is written back, so unmodelled records survive an edit byte for
//! byte.
//!
//! ```rust
//! use std::io::Cursor;
//! use xlsb_stream::xlsb::{
//!     OpenMode, RecordProcessor, RepositoryOptions, RichStr, SharedStringsPart,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut fresh = SharedStringsPart::new(2, vec![RichStr::plain("hello")]);
//! let mut writer = RecordProcessor::new(Vec::new());
//! fresh.write(&mut writer)?;
//!
//! let mut reader = RecordProcessor::new(Cursor::new(writer.into_inner()));
//! let options = RepositoryOptions::new().with_mode(OpenMode::ForUpdate);
//! let mut part = SharedStringsPart::read(&mut reader, &options)?;
//! part.items.push(RichStr::plain("world"));
//!
//! let mut writer = RecordProcessor::new(Vec::new());
//! part.write(&mut writer)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Reference
//!
//! - [MS-XLSB]: Excel Binary File Format (.xlsb) Structure Specification
//!   https://docs.microsoft.com/en-us/openspecs/office_file_formats/ms-xlsb/

/// Error types for record stream processing
pub mod error;

/// Record type vocabularies
pub mod record_types;

/// Namespace resolution inside FRT/AC blocks
pub mod context;

/// Record descriptors and the `BinaryRecord` trait
pub mod records;

/// Stream processor
pub mod processor;

/// Skip-and-recapture repository
pub mod repository;

/// Shared validation and RK helpers
pub mod utils;

pub mod alternate_content;
pub mod cell;
pub mod shared_strings;
pub mod styles;
pub mod workbook;
pub mod worksheet;

pub use cell::{Cell, CellError, CellHeader, CellValue};
pub use context::{ContextStack, RecordContext};
pub use error::{XlsbError, XlsbResult};
pub use processor::{RecordProcessor, Records};
pub use record_types::{BinaryRecordType, RecordType};
pub use records::{BinaryRecord, RecordDescriptor};
pub use repository::{OpenMode, RecordRepository, RepositoryOptions};
pub use shared_strings::{RichStr, SharedStringsPart};
pub use styles::StylesheetPart;
pub use workbook::{BundledSheet, HiddenState, WorkbookPart};
pub use worksheet::{ColInfo, Row, RowHeader, SheetDimension, WorksheetPart};
