//! Workbook part: the sheet list (`BrtBundleSh`) between book-level records.

use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::{RecordProcessor, nullable_wide_string_len, wide_string_len};
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use crate::xlsb::repository::{RecordRepository, RepositoryOptions};
use std::io::{Read, Write};

const RESERVED_NAME_CHARS: [char; 9] = ['\0', '\u{3}', ':', '\\', '*', '?', '/', '[', ']'];

/// Visibility of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum HiddenState {
    #[default]
    Visible = 0,
    Hidden = 1,
    /// Hidden and not listed in the unhide dialog
    VeryHidden = 2,
}

impl HiddenState {
    pub fn from_u32(value: u32) -> XlsbResult<Self> {
        match value {
            0 => Ok(HiddenState::Visible),
            1 => Ok(HiddenState::Hidden),
            2 => Ok(HiddenState::VeryHidden),
            _ => Err(XlsbError::ValueOutOfRange {
                field: "sheet hidden state",
                value: value as i64,
                constraint: "must be 0, 1 or 2",
            }),
        }
    }
}

/// Check a sheet name against the characters Excel reserves.
pub fn validate_sheet_name(name: &str) -> XlsbResult<()> {
    if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(XlsbError::ValueOutOfRange {
            field: "sheet name",
            value: c as i64,
            constraint: "sheet names cannot contain \\0, \\x03, :, \\, *, ?, /, [ or ]",
        });
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(XlsbError::ValueOutOfRange {
            field: "sheet name",
            value: '\'' as i64,
            constraint: "sheet names cannot start or end with an apostrophe",
        });
    }
    Ok(())
}

/// Sheet entry of the workbook (`BrtBundleSh`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledSheet {
    pub state: HiddenState,
    /// Sheet tab id, unique within the workbook
    pub tab_id: u32,
    /// Relationship id of the sheet part
    pub rel_id: Option<String>,
    name: String,
}

impl BundledSheet {
    pub fn new(
        state: HiddenState,
        tab_id: u32,
        rel_id: Option<String>,
        name: impl Into<String>,
    ) -> XlsbResult<Self> {
        let name = name.into();
        validate_sheet_name(&name)?;
        Ok(BundledSheet {
            state,
            tab_id,
            rel_id,
            name,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> XlsbResult<()> {
        let name = name.into();
        validate_sheet_name(&name)?;
        self.name = name;
        Ok(())
    }
}

impl BinaryRecord for BundledSheet {
    fn record_type(&self) -> Brt {
        Brt::BundleSh
    }

    fn payload_len(&self) -> u32 {
        8 + nullable_wide_string_len(self.rel_id.as_deref()) + wide_string_len(&self.name)
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        _descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let state = HiddenState::from_u32(processor.read_u32()?)?;
        let tab_id = processor.read_u32()?;
        let rel_id = processor.read_nullable_string()?;
        let name = processor.read_string("sheet name")?;
        BundledSheet::new(state, tab_id, rel_id, name)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        processor.write_u32(self.state as u32)?;
        processor.write_u32(self.tab_id)?;
        processor.write_nullable_string(self.rel_id.as_deref())?;
        processor.write_string(&self.name)
    }
}

/// Decoded workbook part.
#[derive(Debug, Default)]
pub struct WorkbookPart {
    pub sheets: Vec<BundledSheet>,
    repository: RecordRepository,
}

impl WorkbookPart {
    pub fn new(sheets: Vec<BundledSheet>) -> Self {
        WorkbookPart {
            sheets,
            repository: RecordRepository::passthrough(),
        }
    }

    /// Find a sheet by name, ignoring ASCII case as Excel does.
    pub fn sheet(&self, name: &str) -> Option<&BundledSheet> {
        self.sheets.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn read<S: Read>(
        processor: &mut RecordProcessor<S>,
        options: &RepositoryOptions,
    ) -> XlsbResult<Self> {
        let mut repository = RecordRepository::new(options);

        processor.expect_descriptor(Brt::BeginBook)?;
        processor.skip_until(&[Brt::BeginBundleShs], &mut repository)?;
        repository.push_current()?;

        let mut sheets = Vec::new();
        let mut d = processor.read_descriptor()?;
        while d.is(Brt::BundleSh) {
            sheets.push(processor.read_record(&d)?);
            d = processor.read_descriptor()?;
        }
        d.expect(Brt::EndBundleShs)?;

        processor.skip_until(&[Brt::EndBook], &mut repository)?;
        repository.push_current()?;

        log::debug!("read workbook: {} sheet(s)", sheets.len());
        Ok(WorkbookPart { sheets, repository })
    }

    pub fn write<S: Write>(&mut self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.repository.begin_write()?;
        processor.write_empty(Brt::BeginBook)?;
        self.repository.write_poll(processor)?;

        processor.write_empty(Brt::BeginBundleShs)?;
        for sheet in &self.sheets {
            sheet.write(processor)?;
        }
        processor.write_empty(Brt::EndBundleShs)?;

        self.repository.write_poll(processor)?;
        processor.write_empty(Brt::EndBook)?;
        self.repository.close()
    }
}
