//! Worksheet part reader and writer.
//!
//! The structural reader decodes the sheet dimension, column information,
//! row headers and cells. Everything else (sheet properties, views,
//! formatting info, alternate-content blocks, cell metadata, the records
//! after the cell table) is handed to the [`RecordRepository`] and written
//! back verbatim at the same position.
//!
//! Replay points, in stream order:
//!
//! ```text
//! BrtBeginSheet
//!   [sheet properties]                      one batch
//!   BrtWsDim
//!   [views, AC, format info ...]            one batch
//!   column infos
//!   BrtBeginSheetData
//!     per row:  [AC blocks, metadata]       one batch (read rows only)
//!       BrtRowHdr
//!       per cell: [AC blocks, metadata]     one batch (read cells only)
//!     [records before the end of data]      one batch
//!   BrtEndSheetData
//!   [everything else]                       one batch
//! BrtEndSheet
//! ```

use crate::xlsb::cell::Cell;
use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::RecordProcessor;
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use crate::xlsb::repository::{RecordRepository, RepositoryOptions};
use crate::xlsb::utils::{validate_col, validate_max, validate_row};
use std::io::{Read, Write};

/// Tallest row height, in twips.
pub const MAX_ROW_HEIGHT: u16 = 0x2000;

/// Most column spans a row header may list.
pub const MAX_COL_SPANS: usize = 16;

/// Deepest outline level of a row or column.
pub const MAX_OUTLINE_LEVEL: u8 = 7;

/// Widest column, in 1/256 of a character width.
pub const MAX_COL_WIDTH: u32 = 65535;

// Records that end the cells of a row.
const ROW_BOUNDARY: [Brt; 2] = [Brt::RowHdr, Brt::EndSheetData];

// Records captured in front of a cell.
const CELL_METADATA: [Brt; 2] = [Brt::CellMeta, Brt::ValueMeta];

/// Used range of a sheet (`BrtWsDim`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetDimension {
    pub row_first: u32,
    pub row_last: u32,
    pub col_first: u32,
    pub col_last: u32,
}

impl SheetDimension {
    pub fn new(row_first: u32, row_last: u32, col_first: u32, col_last: u32) -> XlsbResult<Self> {
        let dimension = SheetDimension {
            row_first,
            row_last,
            col_first,
            col_last,
        };
        dimension.validate()?;
        Ok(dimension)
    }

    pub fn validate(&self) -> XlsbResult<()> {
        validate_row(self.row_first)?;
        validate_row(self.row_last)?;
        validate_col(self.col_first)?;
        validate_col(self.col_last)?;
        if self.row_last < self.row_first {
            return Err(XlsbError::ValueOutOfRange {
                field: "last row",
                value: self.row_last as i64,
                constraint: "last row cannot precede the first",
            });
        }
        if self.col_last < self.col_first {
            return Err(XlsbError::ValueOutOfRange {
                field: "last column",
                value: self.col_last as i64,
                constraint: "last column cannot precede the first",
            });
        }
        Ok(())
    }

    /// Recompute the range from row indices and cell columns.
    ///
    /// Leaves the dimension untouched when `rows` is empty. Rows without
    /// any cell contribute a column range of `0..=0`.
    pub fn refresh_from(&mut self, rows: &[Row]) {
        let Some(first) = rows.first() else {
            return;
        };
        let mut row_first = first.header.row;
        let mut row_last = first.header.row;
        let mut cols: Option<(u32, u32)> = None;
        for row in rows {
            row_first = row_first.min(row.header.row);
            row_last = row_last.max(row.header.row);
            for cell in &row.cells {
                let c = cell.column();
                cols = Some(cols.map_or((c, c), |(lo, hi)| (lo.min(c), hi.max(c))));
            }
        }
        let (col_first, col_last) = cols.unwrap_or((0, 0));
        *self = SheetDimension {
            row_first,
            row_last,
            col_first,
            col_last,
        };
    }
}

impl BinaryRecord for SheetDimension {
    fn record_type(&self) -> Brt {
        Brt::WsDim
    }

    fn payload_len(&self) -> u32 {
        16
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        descriptor.expect_size(16)?;
        let dimension = SheetDimension {
            row_first: processor.read_u32()?,
            row_last: processor.read_u32()?,
            col_first: processor.read_u32()?,
            col_last: processor.read_u32()?,
        };
        dimension.validate()?;
        Ok(dimension)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        processor.write_u32(self.row_first)?;
        processor.write_u32(self.row_last)?;
        processor.write_u32(self.col_first)?;
        processor.write_u32(self.col_last)
    }
}

/// Column formatting for a range of columns (`BrtColInfo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColInfo {
    pub col_first: u32,
    pub col_last: u32,
    /// Width in 1/256 of a character
    pub width: u32,
    /// Index into the cell XF table
    pub style: u32,
    pub hidden: bool,
    pub custom_width: bool,
    pub best_fit: bool,
    pub phonetic: bool,
    pub outline_level: u8,
    pub collapsed: bool,
}

impl ColInfo {
    pub fn validate(&self) -> XlsbResult<()> {
        validate_col(self.col_first)?;
        validate_col(self.col_last)?;
        if self.col_last < self.col_first {
            return Err(XlsbError::ValueOutOfRange {
                field: "last column",
                value: self.col_last as i64,
                constraint: "last column cannot precede the first",
            });
        }
        validate_max(
            "column width",
            self.width as u64,
            MAX_COL_WIDTH as u64,
            "column width must be <= 65535",
        )?;
        validate_max(
            "outline level",
            self.outline_level as u64,
            MAX_OUTLINE_LEVEL as u64,
            "outline level must be <= 7",
        )
    }
}

impl BinaryRecord for ColInfo {
    fn record_type(&self) -> Brt {
        Brt::ColInfo
    }

    fn payload_len(&self) -> u32 {
        18
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        descriptor.expect_size(18)?;
        let col_first = processor.read_u32()?;
        let col_last = processor.read_u32()?;
        let width = processor.read_u32()?;
        let style = processor.read_u32()?;
        let flags1 = processor.read_u8()?;
        let flags2 = processor.read_u8()?;
        let info = ColInfo {
            col_first,
            col_last,
            width,
            style,
            hidden: flags1 & 0x01 != 0,
            custom_width: flags1 & 0x02 != 0,
            best_fit: flags1 & 0x04 != 0,
            phonetic: flags1 & 0x08 != 0,
            outline_level: flags2 & 0x07,
            collapsed: flags2 & 0x10 != 0,
        };
        info.validate()?;
        Ok(info)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        processor.write_u32(self.col_first)?;
        processor.write_u32(self.col_last)?;
        processor.write_u32(self.width)?;
        processor.write_u32(self.style)?;
        let mut flags1 = 0u8;
        if self.hidden {
            flags1 |= 0x01;
        }
        if self.custom_width {
            flags1 |= 0x02;
        }
        if self.best_fit {
            flags1 |= 0x04;
        }
        if self.phonetic {
            flags1 |= 0x08;
        }
        processor.write_u8(flags1)?;
        let mut flags2 = self.outline_level;
        if self.collapsed {
            flags2 |= 0x10;
        }
        processor.write_u8(flags2)
    }
}

/// Inclusive column range listed in a row header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan {
    pub first: u32,
    pub last: u32,
}

impl ColumnSpan {
    pub fn new(first: u32, last: u32) -> XlsbResult<Self> {
        Ok(ColumnSpan {
            first: validate_col(first)?,
            last: validate_col(last)?,
        })
    }
}

/// Row record (`BrtRowHdr`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowHeader {
    /// Zero-based row index
    pub row: u32,
    /// Index into the cell XF table
    pub style: u32,
    /// Height in twips
    pub height: u16,
    pub extra_ascent: bool,
    pub extra_descent: bool,
    pub outline_level: u8,
    pub collapsed: bool,
    pub hidden: bool,
    pub custom_height: bool,
    pub ghost_dirty: bool,
    pub phonetic: bool,
    pub spans: Vec<ColumnSpan>,
}

impl RowHeader {
    pub fn new(row: u32) -> XlsbResult<Self> {
        Ok(RowHeader {
            row: validate_row(row)?,
            height: 0x012C,
            ..Default::default()
        })
    }

    pub fn validate(&self) -> XlsbResult<()> {
        validate_row(self.row)?;
        validate_max(
            "row height",
            self.height as u64,
            MAX_ROW_HEIGHT as u64,
            "row height must be <= 0x2000",
        )?;
        validate_max(
            "outline level",
            self.outline_level as u64,
            MAX_OUTLINE_LEVEL as u64,
            "outline level must be <= 7",
        )?;
        validate_max(
            "column spans",
            self.spans.len() as u64,
            MAX_COL_SPANS as u64,
            "a row lists at most 16 column spans",
        )
    }
}

impl BinaryRecord for RowHeader {
    fn record_type(&self) -> Brt {
        Brt::RowHdr
    }

    fn payload_len(&self) -> u32 {
        17 + 8 * self.spans.len() as u32
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        _descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let row = processor.read_u32()?;
        let style = processor.read_u32()?;
        let height = processor.read_u16()?;
        let flags1 = processor.read_u8()?;
        let flags2 = processor.read_u8()?;
        let flags3 = processor.read_u8()?;
        let count = processor.read_u32()?;
        validate_max(
            "column spans",
            count as u64,
            MAX_COL_SPANS as u64,
            "a row lists at most 16 column spans",
        )?;
        let spans = (0..count)
            .map(|_| ColumnSpan::new(processor.read_u32()?, processor.read_u32()?))
            .collect::<XlsbResult<Vec<_>>>()?;
        let header = RowHeader {
            row,
            style,
            height,
            extra_ascent: flags1 & 0x01 != 0,
            extra_descent: flags1 & 0x02 != 0,
            outline_level: flags2 & 0x07,
            collapsed: flags2 & 0x08 != 0,
            hidden: flags2 & 0x10 != 0,
            custom_height: flags2 & 0x20 != 0,
            ghost_dirty: flags2 & 0x40 != 0,
            phonetic: flags3 & 0x01 != 0,
            spans,
        };
        header.validate()?;
        Ok(header)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        processor.write_u32(self.row)?;
        processor.write_u32(self.style)?;
        processor.write_u16(self.height)?;

        let mut flags1 = 0u8;
        if self.extra_ascent {
            flags1 |= 0x01;
        }
        if self.extra_descent {
            flags1 |= 0x02;
        }
        processor.write_u8(flags1)?;

        let mut flags2 = self.outline_level;
        if self.collapsed {
            flags2 |= 0x08;
        }
        if self.hidden {
            flags2 |= 0x10;
        }
        if self.custom_height {
            flags2 |= 0x20;
        }
        if self.ghost_dirty {
            flags2 |= 0x40;
        }
        processor.write_u8(flags2)?;
        processor.write_u8(self.phonetic as u8)?;

        processor.write_u32(self.spans.len() as u32)?;
        for span in &self.spans {
            processor.write_u32(span.first)?;
            processor.write_u32(span.last)?;
        }
        Ok(())
    }
}

/// A row header and the cells that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub header: RowHeader,
    pub cells: Vec<Cell>,
    replay: bool,
}

impl Row {
    pub fn new(header: RowHeader, cells: Vec<Cell>) -> Self {
        Row {
            header,
            cells,
            replay: false,
        }
    }

    /// Smallest and largest column covered by the header's spans.
    pub fn col_range(&self) -> Option<(u32, u32)> {
        let first = self.header.spans.iter().map(|s| s.first).min()?;
        let last = self.header.spans.iter().map(|s| s.last).max()?;
        Some((first, last))
    }

    /// Whether this row was read from a stream, and so owns a replay point.
    #[inline]
    pub fn is_from_stream(&self) -> bool {
        self.replay
    }
}

/// Decoded worksheet part.
#[derive(Debug)]
pub struct WorksheetPart {
    pub dimension: SheetDimension,
    pub col_infos: Vec<ColInfo>,
    pub rows: Vec<Row>,
    repository: RecordRepository,
}

impl Default for WorksheetPart {
    fn default() -> Self {
        WorksheetPart::new(SheetDimension::default(), Vec::new(), Vec::new())
    }
}

impl WorksheetPart {
    /// A fresh worksheet with nothing to replay.
    pub fn new(dimension: SheetDimension, col_infos: Vec<ColInfo>, rows: Vec<Row>) -> Self {
        WorksheetPart {
            dimension,
            col_infos,
            rows,
            repository: RecordRepository::passthrough(),
        }
    }

    pub fn read<S: Read>(
        processor: &mut RecordProcessor<S>,
        options: &RepositoryOptions,
    ) -> XlsbResult<Self> {
        let mut repository = RecordRepository::new(options);

        processor.expect_descriptor(Brt::BeginSheet)?.expect_size(0)?;

        let mut d = processor.read_descriptor()?;
        if d.is(Brt::WsProp) {
            processor.skip(&d, &mut repository)?;
            d = processor.read_descriptor()?;
        }
        repository.push_current()?;

        let mut dimension = SheetDimension::default();
        if d.is(Brt::WsDim) {
            dimension = processor.read_record(&d)?;
            d = processor.read_descriptor()?;
        }

        d = processor.skip_to(d, &[Brt::BeginColInfos, Brt::BeginSheetData], &mut repository)?;
        repository.push_current()?;

        let mut col_infos = Vec::new();
        if d.is(Brt::BeginColInfos) {
            d = processor.read_descriptor()?;
            while d.is(Brt::ColInfo) {
                col_infos.push(processor.read_record(&d)?);
                d = processor.read_descriptor()?;
            }
            d.expect(Brt::EndColInfos)?;
            d = processor.read_descriptor()?;
        }
        d.expect(Brt::BeginSheetData)?;

        let rows = read_rows(processor, &mut repository)?;

        processor.skip_until(&[Brt::EndSheet], &mut repository)?;
        repository.push_current()?;

        log::debug!(
            "read worksheet: {} row(s), {} column info(s), {} captured batch(es)",
            rows.len(),
            col_infos.len(),
            repository.pending_batches()
        );
        Ok(WorksheetPart {
            dimension,
            col_infos,
            rows,
            repository,
        })
    }

    /// Write the part, replaying captured records at their positions.
    ///
    /// A part read for update can be written once.
    pub fn write<S: Write>(&mut self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        let repository = &mut self.repository;
        repository.begin_write()?;

        processor.write_empty(Brt::BeginSheet)?;
        repository.write_poll(processor)?;

        self.dimension.refresh_from(&self.rows);
        self.dimension.write(processor)?;
        repository.write_poll(processor)?;

        if !self.col_infos.is_empty() {
            processor.write_empty(Brt::BeginColInfos)?;
            for info in &self.col_infos {
                info.write(processor)?;
            }
            processor.write_empty(Brt::EndColInfos)?;
        }

        processor.write_empty(Brt::BeginSheetData)?;
        for row in &self.rows {
            if row.replay {
                repository.write_poll(processor)?;
            }
            row.header.write(processor)?;
            for cell in &row.cells {
                if cell.replay {
                    repository.write_poll(processor)?;
                }
                cell.write(processor)?;
            }
        }
        repository.write_poll(processor)?;
        processor.write_empty(Brt::EndSheetData)?;

        repository.write_poll(processor)?;
        processor.write_empty(Brt::EndSheet)?;
        repository.close()
    }
}

fn read_rows<S: Read>(
    processor: &mut RecordProcessor<S>,
    repository: &mut RecordRepository,
) -> XlsbResult<Vec<Row>> {
    let mut rows = Vec::new();
    let first = processor.read_descriptor()?;
    let mut d = skip_ac_blocks(processor, first, repository)?;
    loop {
        if !d.is_any(&ROW_BOUNDARY) {
            return Err(XlsbError::unexpected(d.record_type, ROW_BOUNDARY));
        }
        repository.push_current()?;
        if d.is(Brt::EndSheetData) {
            return Ok(rows);
        }

        let header: RowHeader = processor.read_record(&d)?;
        let mut cells = Vec::new();
        loop {
            d = processor.read_descriptor()?;
            loop {
                d = skip_ac_blocks(processor, d, repository)?;
                if !d.is_any(&CELL_METADATA) {
                    break;
                }
                d = processor.skip_while(d, &CELL_METADATA, repository)?;
            }
            // Trailing metadata and AC blocks stay in the current batch and
            // are replayed before the next row.
            if d.is_any(&ROW_BOUNDARY) {
                break;
            }
            repository.push_current()?;
            cells.push(processor.read_record::<Cell>(&d)?);
        }
        rows.push(Row {
            header,
            cells,
            replay: true,
        });
    }
}

fn skip_ac_blocks<S: Read>(
    processor: &mut RecordProcessor<S>,
    mut d: RecordDescriptor,
    repository: &mut RecordRepository,
) -> XlsbResult<RecordDescriptor> {
    while d.is(Brt::ACBegin) {
        processor.skip_ac_block(&d, repository)?;
        d = processor.read_descriptor()?;
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsb::cell::{CellHeader, CellValue};
    use crate::xlsb::record_types::RecordType;
    use crate::xlsb::repository::OpenMode;
    use std::io::Cursor;

    const MINIMAL_SHEET: [u8; 31] = [
        0x81, 0x01, 0x00, // BrtBeginSheet
        0x94, 0x01, 0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // BrtWsDim
        0x91, 0x01, 0x00, // BrtBeginSheetData
        0x92, 0x01, 0x00, // BrtEndSheetData
        0x82, 0x01, 0x00, // BrtEndSheet
    ];

    fn read(bytes: Vec<u8>, mode: OpenMode) -> XlsbResult<WorksheetPart> {
        let mut p = RecordProcessor::new(Cursor::new(bytes));
        WorksheetPart::read(&mut p, &RepositoryOptions::new().with_mode(mode))
    }

    fn write(part: &mut WorksheetPart) -> Vec<u8> {
        let mut w = RecordProcessor::new(Vec::new());
        part.write(&mut w).unwrap();
        w.into_inner()
    }

    fn build(f: impl FnOnce(&mut RecordProcessor<Vec<u8>>) -> XlsbResult<()>) -> Vec<u8> {
        let mut w = RecordProcessor::new(Vec::new());
        f(&mut w).unwrap();
        w.into_inner()
    }

    #[test]
    fn test_minimal_sheet_roundtrip() {
        for mode in [OpenMode::ReadOnly, OpenMode::ForUpdate] {
            let mut part = read(MINIMAL_SHEET.to_vec(), mode).unwrap();
            assert!(part.rows.is_empty());
            assert!(part.col_infos.is_empty());
            assert_eq!(part.dimension, SheetDimension::new(0, 0, 0, 0).unwrap());
            assert_eq!(write(&mut part), MINIMAL_SHEET.to_vec());
        }
    }

    fn rich_sheet() -> Vec<u8> {
        build(|w| {
            w.write_empty(Brt::BeginSheet)?;
            w.write_record(Brt::WsProp, &[0xC9, 0x04, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF])?;
            SheetDimension::new(0, 2, 1, 3)?.write(w)?;
            w.write_empty(Brt::BeginWsViews)?;
            w.write_record(Brt::WsFmtInfo, &[0xFF; 12])?;
            w.write_empty(Brt::EndWsViews)?;
            w.write_empty(Brt::BeginColInfos)?;
            ColInfo {
                col_first: 1,
                col_last: 2,
                width: 2560,
                custom_width: true,
                ..Default::default()
            }
            .write(w)?;
            w.write_empty(Brt::EndColInfos)?;
            w.write_empty(Brt::BeginSheetData)?;

            RowHeader {
                spans: vec![ColumnSpan::new(1, 3)?],
                ..RowHeader::new(0)?
            }
            .write(w)?;
            Cell::new(CellHeader::new(1, 0)?, CellValue::Rk(1.0))?.write(w)?;
            w.write_record(Brt::CellMeta, &[1, 0, 0, 0])?;
            Cell::new(CellHeader::new(3, 2)?, CellValue::SharedString(0))?.write(w)?;

            w.write_empty(Brt::ACBegin)?;
            w.write_record(RecordType::AlternateContent(3000), &[9, 9])?;
            w.write_empty(Brt::ACEnd)?;
            RowHeader::new(2)?.write(w)?;
            Cell::new(CellHeader::new(2, 0)?, CellValue::InlineString("x".into()))?.write(w)?;
            w.write_record(Brt::ValueMeta, &[0, 0, 0, 0])?;

            w.write_empty(Brt::EndSheetData)?;
            w.write_record(Brt::SheetProtection, &[0u8; 66])?;
            w.write_empty(Brt::EndSheet)
        })
    }

    #[test]
    fn test_update_roundtrip_preserves_unknown_records() {
        let original = rich_sheet();
        let mut part = read(original.clone(), OpenMode::ForUpdate).unwrap();
        assert_eq!(part.rows.len(), 2);
        assert_eq!(part.rows[0].cells.len(), 2);
        assert_eq!(part.rows[0].col_range(), Some((1, 3)));
        assert_eq!(part.rows[1].cells[0].value, CellValue::InlineString("x".into()));
        assert_eq!(part.col_infos[0].width, 2560);
        assert_eq!(write(&mut part), original);
    }

    #[test]
    fn test_update_with_edited_values() {
        let mut part = read(rich_sheet(), OpenMode::ForUpdate).unwrap();
        part.rows[0].cells[0].value = CellValue::Real(2.5);
        part.rows[1]
            .cells
            .push(Cell::new(CellHeader::new(4, 0).unwrap(), CellValue::Bool(true)).unwrap());
        let bytes = write(&mut part);

        let reread = read(bytes, OpenMode::ReadOnly).unwrap();
        assert_eq!(reread.rows[0].cells[0].value, CellValue::Real(2.5));
        assert_eq!(reread.rows[1].cells[1].value, CellValue::Bool(true));
        assert_eq!(reread.dimension, SheetDimension::new(0, 2, 1, 4).unwrap());
    }

    fn ac_block(w: &mut RecordProcessor<Vec<u8>>, payload: &[u8]) -> XlsbResult<()> {
        w.write_empty(Brt::ACBegin)?;
        w.write_record(RecordType::AlternateContent(3000), payload)?;
        w.write_empty(Brt::ACEnd)
    }

    fn sheet_with_data(data: impl FnOnce(&mut RecordProcessor<Vec<u8>>) -> XlsbResult<()>) -> Vec<u8> {
        build(|w| {
            w.write_empty(Brt::BeginSheet)?;
            SheetDimension::new(0, 0, 0, 5)?.write(w)?;
            w.write_empty(Brt::BeginSheetData)?;
            data(w)?;
            w.write_empty(Brt::EndSheetData)?;
            w.write_empty(Brt::EndSheet)
        })
    }

    fn ac_inside_row() -> Vec<u8> {
        sheet_with_data(|w| {
            ac_block(w, &[1])?;
            RowHeader::new(0)?.write(w)?;
            Cell::new(CellHeader::new(0, 0)?, CellValue::Bool(true))?.write(w)?;
            ac_block(w, &[2, 2])?;
            Cell::new(CellHeader::new(5, 0)?, CellValue::Real(42.0))?.write(w)
        })
    }

    #[test]
    fn test_ac_block_inside_row_keeps_following_cells() {
        let mut part = read(ac_inside_row(), OpenMode::ReadOnly).unwrap();
        assert_eq!(part.rows.len(), 1);
        assert_eq!(part.rows[0].cells.len(), 2);
        assert_eq!(part.rows[0].cells[1].value, CellValue::Real(42.0));

        let reread = read(write(&mut part), OpenMode::ReadOnly).unwrap();
        assert_eq!(reread.rows[0].cells.len(), 2);
        assert_eq!(reread.dimension, SheetDimension::new(0, 0, 0, 5).unwrap());
    }

    #[test]
    fn test_ac_blocks_in_sheet_data_roundtrip() {
        let original = ac_inside_row();
        let mut part = read(original.clone(), OpenMode::ForUpdate).unwrap();
        assert_eq!(part.rows[0].cells.len(), 2);
        assert_eq!(write(&mut part), original);
    }

    #[test]
    fn test_stray_record_between_rows() {
        let before_first_row = sheet_with_data(|w| {
            w.write_record(Brt::WsFmtInfo, &[0xFF; 12])?;
            RowHeader::new(0)?.write(w)
        });
        let after_cells = sheet_with_data(|w| {
            RowHeader::new(0)?.write(w)?;
            Cell::new(CellHeader::new(0, 0)?, CellValue::Blank)?.write(w)?;
            w.write_record(Brt::WsFmtInfo, &[0xFF; 12])
        });
        for bytes in [before_first_row, after_cells] {
            match read(bytes, OpenMode::ForUpdate) {
                Err(XlsbError::UnexpectedRecord { found, .. }) => {
                    assert_eq!(found, Brt::WsFmtInfo);
                },
                other => panic!("expected UnexpectedRecord, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_removed_row_is_detected() {
        let mut part = read(rich_sheet(), OpenMode::ForUpdate).unwrap();
        part.rows.pop();
        let mut w = RecordProcessor::new(Vec::new());
        assert!(matches!(
            part.write(&mut w),
            Err(XlsbError::UnreplayedBatches { .. })
        ));
    }

    #[test]
    fn test_read_only_drops_captured_records() {
        let mut part = read(rich_sheet(), OpenMode::ReadOnly).unwrap();
        let bytes = write(&mut part);
        assert!(bytes.len() < rich_sheet().len());
        let reread = read(bytes, OpenMode::ForUpdate).unwrap();
        assert_eq!(reread.rows, part.rows);
    }

    #[test]
    fn test_fresh_sheet_writes_structure_only() {
        let rows = vec![Row::new(
            RowHeader::new(4).unwrap(),
            vec![Cell::new(CellHeader::new(7, 0).unwrap(), CellValue::Blank).unwrap()],
        )];
        let mut part = WorksheetPart::new(SheetDimension::default(), Vec::new(), rows);
        let bytes = write(&mut part);
        let reread = read(bytes, OpenMode::ReadOnly).unwrap();
        assert_eq!(reread.dimension, SheetDimension::new(4, 4, 7, 7).unwrap());
        assert_eq!(reread.rows[0].header.row, 4);
    }

    #[test]
    fn test_formula_cell_is_unsupported() {
        let bytes = build(|w| {
            w.write_empty(Brt::BeginSheet)?;
            w.write_empty(Brt::BeginSheetData)?;
            RowHeader::new(0)?.write(w)?;
            w.write_record(Brt::FmlaNum, &[0u8; 18])
        });
        assert!(matches!(
            read(bytes, OpenMode::ReadOnly),
            Err(XlsbError::UnsupportedRecord(_))
        ));
    }

    #[test]
    fn test_missing_begin_sheet() {
        let bytes = build(|w| w.write_empty(Brt::BeginSheetData));
        match read(bytes, OpenMode::ReadOnly) {
            Err(XlsbError::UnexpectedRecord { found, expected }) => {
                assert_eq!(found, Brt::BeginSheetData);
                assert_eq!(expected.as_slice(), &[RecordType::from(Brt::BeginSheet)]);
            },
            other => panic!("expected UnexpectedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_sheet() {
        let bytes = MINIMAL_SHEET[..MINIMAL_SHEET.len() - 3].to_vec();
        assert!(matches!(
            read(bytes, OpenMode::ForUpdate),
            Err(XlsbError::UnexpectedEndOfStream(_))
        ));
    }

    #[test]
    fn test_row_header_constraints() {
        let mut header = RowHeader::new(0).unwrap();
        header.height = MAX_ROW_HEIGHT + 1;
        assert!(header.validate().is_err());
        header.height = MAX_ROW_HEIGHT;
        header.outline_level = 8;
        assert!(header.validate().is_err());
        header.outline_level = 7;
        header.spans = vec![ColumnSpan::new(0, 0).unwrap(); 17];
        assert!(header.validate().is_err());
        header.spans.truncate(16);
        assert!(header.validate().is_ok());
        assert_eq!(header.payload_len(), 17 + 8 * 16);
    }

    #[test]
    fn test_dimension_constraints() {
        assert!(SheetDimension::new(5, 4, 0, 0).is_err());
        assert!(SheetDimension::new(0, 0, 3, 2).is_err());
        assert!(SheetDimension::new(0, 1_048_576, 0, 0).is_err());
        let info = ColInfo {
            width: 65536,
            ..Default::default()
        };
        assert!(info.validate().is_err());
    }
}
