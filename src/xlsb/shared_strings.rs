//! Shared string table part (`BrtBeginSst` .. `BrtEndSst`).

use crate::common::binary::utf16_len;
use crate::xlsb::error::{XlsbError, XlsbResult};
use crate::xlsb::processor::{RecordProcessor, wide_string_len};
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use crate::xlsb::repository::{RecordRepository, RepositoryOptions};
use crate::xlsb::utils::validate_max;
use std::io::{Read, Write};

/// Largest reference or unique-string count.
pub const MAX_STRING_COUNT: u32 = 0x7FFF_FFFF;

/// Most formatting or phonetic runs a string may carry.
pub const MAX_RUNS: u32 = 0x7FFF;

const FLAG_RICH: u8 = 0x01;
const FLAG_EXTENDED: u8 = 0x02;

/// Formatting run: characters from `start` on use font `font`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrRun {
    pub start: u16,
    pub font: u16,
}

/// Character set a phonetic run is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PhoneticType {
    #[default]
    HalfWidthKatakana = 0,
    FullWidthKatakana = 1,
    Hiragana = 2,
    AsEntered = 3,
}

impl PhoneticType {
    fn from_bits(bits: u16) -> Self {
        match bits & 0x03 {
            0 => PhoneticType::HalfWidthKatakana,
            1 => PhoneticType::FullWidthKatakana,
            2 => PhoneticType::Hiragana,
            _ => PhoneticType::AsEntered,
        }
    }
}

/// Horizontal alignment of phonetic text over its base text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PhoneticAlignment {
    #[default]
    NoControl = 0,
    Left = 1,
    Center = 2,
    Distributed = 3,
}

impl PhoneticAlignment {
    fn from_bits(bits: u16) -> Self {
        match bits & 0x03 {
            0 => PhoneticAlignment::NoControl,
            1 => PhoneticAlignment::Left,
            2 => PhoneticAlignment::Center,
            _ => PhoneticAlignment::Distributed,
        }
    }
}

/// Phonetic run mapping part of the phonetic string onto the base string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneticRun {
    /// First character in the phonetic string
    pub phonetic_start: u16,
    /// First character in the base string
    pub base_start: u16,
    /// Number of base characters covered
    pub base_count: u16,
    pub font: u16,
    pub kind: PhoneticType,
    pub alignment: PhoneticAlignment,
}

/// Phonetic text attached to a string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhoneticString {
    pub text: String,
    pub runs: Vec<PhoneticRun>,
}

/// One shared string (`BrtSSTItem`), optionally with formatting and
/// phonetic runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RichStr {
    pub text: String,
    pub runs: Option<Vec<StrRun>>,
    pub phonetic: Option<PhoneticString>,
}

impl RichStr {
    pub fn plain(text: impl Into<String>) -> Self {
        RichStr {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Check run counts and that run offsets increase within bounds.
    pub fn validate(&self) -> XlsbResult<()> {
        if let Some(runs) = &self.runs {
            validate_max("string runs", runs.len() as u64, MAX_RUNS as u64, "at most 0x7FFF runs")?;
            let len = utf16_len(&self.text);
            let mut previous: Option<u16> = None;
            for run in runs {
                if run.start as usize >= len {
                    return Err(XlsbError::ValueOutOfRange {
                        field: "string run start",
                        value: run.start as i64,
                        constraint: "run must start inside the string",
                    });
                }
                if previous.is_some_and(|p| run.start <= p) {
                    return Err(XlsbError::ValueOutOfRange {
                        field: "string run start",
                        value: run.start as i64,
                        constraint: "runs must start after the previous run",
                    });
                }
                previous = Some(run.start);
            }
        }
        if let Some(phonetic) = &self.phonetic {
            validate_max(
                "phonetic runs",
                phonetic.runs.len() as u64,
                MAX_RUNS as u64,
                "at most 0x7FFF runs",
            )?;
            let len = utf16_len(&phonetic.text);
            let mut previous: Option<u16> = None;
            for run in &phonetic.runs {
                if run.phonetic_start as usize > len {
                    return Err(XlsbError::ValueOutOfRange {
                        field: "phonetic run start",
                        value: run.phonetic_start as i64,
                        constraint: "run must start inside the phonetic string",
                    });
                }
                if previous.is_some_and(|p| run.phonetic_start <= p) {
                    return Err(XlsbError::ValueOutOfRange {
                        field: "phonetic run start",
                        value: run.phonetic_start as i64,
                        constraint: "runs must start after the previous run",
                    });
                }
                previous = Some(run.phonetic_start);
            }
        }
        Ok(())
    }
}

impl BinaryRecord for RichStr {
    fn record_type(&self) -> Brt {
        Brt::SSTItem
    }

    fn payload_len(&self) -> u32 {
        let mut len = 1 + wide_string_len(&self.text);
        if let Some(runs) = &self.runs {
            len += 4 + 4 * runs.len() as u32;
        }
        if let Some(phonetic) = &self.phonetic {
            len += wide_string_len(&phonetic.text) + 4 + 10 * phonetic.runs.len() as u32;
        }
        len
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        _descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        let flags = processor.read_u8()?;
        let text = processor.read_string("shared string")?;

        let runs = if flags & FLAG_RICH != 0 {
            let count = processor.read_u32()?;
            validate_max("string runs", count as u64, MAX_RUNS as u64, "at most 0x7FFF runs")?;
            let runs = (0..count)
                .map(|_| {
                    Ok(StrRun {
                        start: processor.read_u16()?,
                        font: processor.read_u16()?,
                    })
                })
                .collect::<XlsbResult<Vec<_>>>()?;
            Some(runs)
        } else {
            None
        };

        let phonetic = if flags & FLAG_EXTENDED != 0 {
            let text = processor.read_string("phonetic string")?;
            let count = processor.read_u32()?;
            validate_max("phonetic runs", count as u64, MAX_RUNS as u64, "at most 0x7FFF runs")?;
            let runs = (0..count)
                .map(|_| {
                    let phonetic_start = processor.read_u16()?;
                    let base_start = processor.read_u16()?;
                    let base_count = processor.read_u16()?;
                    let font = processor.read_u16()?;
                    let bits = processor.read_u16()?;
                    Ok(PhoneticRun {
                        phonetic_start,
                        base_start,
                        base_count,
                        font,
                        kind: PhoneticType::from_bits(bits),
                        alignment: PhoneticAlignment::from_bits(bits >> 2),
                    })
                })
                .collect::<XlsbResult<Vec<_>>>()?;
            Some(PhoneticString { text, runs })
        } else {
            None
        };

        let item = RichStr {
            text,
            runs,
            phonetic,
        };
        item.validate()?;
        Ok(item)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        let mut flags = 0u8;
        if self.runs.is_some() {
            flags |= FLAG_RICH;
        }
        if self.phonetic.is_some() {
            flags |= FLAG_EXTENDED;
        }
        processor.write_u8(flags)?;
        processor.write_string(&self.text)?;
        if let Some(runs) = &self.runs {
            processor.write_u32(runs.len() as u32)?;
            for run in runs {
                processor.write_u16(run.start)?;
                processor.write_u16(run.font)?;
            }
        }
        if let Some(phonetic) = &self.phonetic {
            processor.write_string(&phonetic.text)?;
            processor.write_u32(phonetic.runs.len() as u32)?;
            for run in &phonetic.runs {
                processor.write_u16(run.phonetic_start)?;
                processor.write_u16(run.base_start)?;
                processor.write_u16(run.base_count)?;
                processor.write_u16(run.font)?;
                processor.write_u16(run.kind as u16 | (run.alignment as u16) << 2)?;
            }
        }
        Ok(())
    }
}

/// `BrtBeginSst` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SstHeader {
    total: u32,
    unique: u32,
}

impl BinaryRecord for SstHeader {
    fn record_type(&self) -> Brt {
        Brt::BeginSst
    }

    fn payload_len(&self) -> u32 {
        8
    }

    fn read_payload<S: Read>(
        processor: &mut RecordProcessor<S>,
        descriptor: &RecordDescriptor,
    ) -> XlsbResult<Self> {
        descriptor.expect_size(8)?;
        let header = SstHeader {
            total: processor.read_u32()?,
            unique: processor.read_u32()?,
        };
        header.validate()?;
        Ok(header)
    }

    fn write_payload<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        processor.write_u32(self.total)?;
        processor.write_u32(self.unique)
    }
}

impl SstHeader {
    fn validate(&self) -> XlsbResult<()> {
        validate_max(
            "total string count",
            self.total as u64,
            MAX_STRING_COUNT as u64,
            "string counts must be <= 0x7FFFFFFF",
        )?;
        validate_max(
            "unique string count",
            self.unique as u64,
            MAX_STRING_COUNT as u64,
            "string counts must be <= 0x7FFFFFFF",
        )
    }
}

/// Decoded shared strings part.
#[derive(Debug, Default)]
pub struct SharedStringsPart {
    /// Number of cell references to shared strings in the workbook
    pub total_count: u32,
    pub items: Vec<RichStr>,
    repository: RecordRepository,
}

impl SharedStringsPart {
    pub fn new(total_count: u32, items: Vec<RichStr>) -> Self {
        SharedStringsPart {
            total_count,
            items,
            repository: RecordRepository::passthrough(),
        }
    }

    /// Plain text of item `index`.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.items.get(index as usize).map(|item| item.text.as_str())
    }

    pub fn read<S: Read>(
        processor: &mut RecordProcessor<S>,
        options: &RepositoryOptions,
    ) -> XlsbResult<Self> {
        let mut repository = RecordRepository::new(options);

        let d = processor.expect_descriptor(Brt::BeginSst)?;
        let header: SstHeader = processor.read_record(&d)?;

        let mut items = Vec::with_capacity((header.unique as usize).min(4096));
        for _ in 0..header.unique {
            let d = processor.expect_descriptor(Brt::SSTItem)?;
            items.push(processor.read_record(&d)?);
        }

        processor.skip_until(&[Brt::EndSst], &mut repository)?;
        repository.push_current()?;

        log::debug!("read shared strings: {} unique of {} total", items.len(), header.total);
        Ok(SharedStringsPart {
            total_count: header.total,
            items,
            repository,
        })
    }

    /// Write the part; the unique count is taken from `items`.
    pub fn write<S: Write>(&mut self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        let unique = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        let header = SstHeader {
            total: self.total_count,
            unique,
        };
        header.validate()?;

        self.repository.begin_write()?;
        header.write(processor)?;
        for item in &self.items {
            item.write(processor)?;
        }
        self.repository.write_poll(processor)?;
        processor.write_empty(Brt::EndSst)?;
        self.repository.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsb::repository::OpenMode;
    use std::io::Cursor;

    fn read(bytes: Vec<u8>, mode: OpenMode) -> XlsbResult<SharedStringsPart> {
        let mut p = RecordProcessor::new(Cursor::new(bytes));
        SharedStringsPart::read(&mut p, &RepositoryOptions::new().with_mode(mode))
    }

    fn write(part: &mut SharedStringsPart) -> Vec<u8> {
        let mut w = RecordProcessor::new(Vec::new());
        part.write(&mut w).unwrap();
        w.into_inner()
    }

    fn rich_item() -> RichStr {
        RichStr {
            text: "\u{6771}\u{4eac} Tokyo".to_string(),
            runs: Some(vec![StrRun { start: 0, font: 1 }, StrRun { start: 3, font: 2 }]),
            phonetic: Some(PhoneticString {
                text: "\u{30c8}\u{30a6}\u{30ad}\u{30e7}\u{30a6}".to_string(),
                runs: vec![PhoneticRun {
                    phonetic_start: 0,
                    base_start: 0,
                    base_count: 2,
                    font: 1,
                    kind: PhoneticType::FullWidthKatakana,
                    alignment: PhoneticAlignment::Center,
                }],
            }),
        }
    }

    #[test]
    fn test_plain_item_layout() {
        let mut w = RecordProcessor::new(Vec::new());
        RichStr::plain("Hi").write(&mut w).unwrap();
        assert_eq!(
            w.into_inner(),
            vec![0x13, 0x09, 0x00, 0x02, 0x00, 0x00, 0x00, b'H', 0x00, b'i', 0x00]
        );
    }

    #[test]
    fn test_part_roundtrip() {
        let mut part = SharedStringsPart::new(5, vec![RichStr::plain("a"), rich_item(), RichStr::plain("")]);
        let bytes = write(&mut part);
        let mut reread = read(bytes.clone(), OpenMode::ForUpdate).unwrap();
        assert_eq!(reread.total_count, 5);
        assert_eq!(reread.items, part.items);
        assert_eq!(reread.get(0), Some("a"));
        assert_eq!(reread.get(3), None);
        assert_eq!(write(&mut reread), bytes);
    }

    #[test]
    fn test_trailing_records_replayed() {
        let mut w = RecordProcessor::new(Vec::new());
        SstHeader { total: 1, unique: 1 }.write(&mut w).unwrap();
        RichStr::plain("x").write(&mut w).unwrap();
        w.write_empty(Brt::FRTBegin).unwrap();
        w.write_record(crate::xlsb::record_types::RecordType::FutureRecord(3000), &[1, 2, 3])
            .unwrap();
        w.write_empty(Brt::FRTEnd).unwrap();
        w.write_empty(Brt::EndSst).unwrap();
        let original = w.into_inner();

        let mut part = read(original.clone(), OpenMode::ForUpdate).unwrap();
        assert_eq!(write(&mut part), original);
    }

    #[test]
    fn test_run_ordering_enforced() {
        let mut item = rich_item();
        item.runs = Some(vec![StrRun { start: 3, font: 0 }, StrRun { start: 3, font: 1 }]);
        assert!(matches!(
            item.validate(),
            Err(XlsbError::ValueOutOfRange { field: "string run start", .. })
        ));
        item.runs = Some(vec![StrRun { start: 8, font: 0 }]);
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_count_limit() {
        let header = SstHeader {
            total: 0x8000_0000,
            unique: 0,
        };
        assert!(header.validate().is_err());
    }

    #[test]
    fn test_item_count_mismatch() {
        let mut w = RecordProcessor::new(Vec::new());
        SstHeader { total: 2, unique: 2 }.write(&mut w).unwrap();
        RichStr::plain("x").write(&mut w).unwrap();
        w.write_empty(Brt::EndSst).unwrap();
        assert!(matches!(
            read(w.into_inner(), OpenMode::ReadOnly),
            Err(XlsbError::UnexpectedRecord { .. })
        ));
    }
}
