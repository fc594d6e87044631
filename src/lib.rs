//! xlsb-stream - binary record stream codec for Excel Binary Workbook parts
//!
//! The binary parts of an `.xlsb` package (workbook, worksheets, shared
//! strings, styles) are sequences of variable-length records. This crate
//! reads and writes those records and the structures built from them,
//! without touching the surrounding ZIP/OPC container.
//!
//! # Features
//!
//! - **Descriptor codec**: 1-2 byte type codes and 1-4 byte sizes
//! - **Context resolution**: type codes inside `BrtFRTBegin`/`BrtACBegin`
//!   blocks resolve in their own namespaces
//! - **Lossless editing**: records a part reader does not model are
//!   captured when opened for update and replayed on write
//! - **Part readers/writers**: workbook sheet list, worksheet rows and
//!   cells, shared strings, styles
//!
//! # Example - Walking the records of a part
//!
//! ```rust
//! use std::io::Cursor;
//! use xlsb_stream::xlsb::{BinaryRecordType, RecordProcessor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = RecordProcessor::new(Vec::new());
//! writer.write_empty(BinaryRecordType::BeginSheet)?;
//! writer.write_empty(BinaryRecordType::EndSheet)?;
//!
//! let mut reader = RecordProcessor::new(Cursor::new(writer.into_inner()));
//! for record in reader.records() {
//!     let (descriptor, payload) = record?;
//!     println!("{} ({} bytes)", descriptor, payload.len());
//! }
//! # Ok(())
//! # }
//! ```

/// Shared binary helpers
pub mod common;

/// XLSB record stream codec and part readers/writers
pub mod xlsb;
