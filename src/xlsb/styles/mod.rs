//! Styles part (`BrtBeginStyleSheet` .. `BrtEndStyleSheet`).
//!
//! Number formats, fonts, cell style XFs, cell XFs and named styles are
//! decoded. Fills, borders, differential formats, table styles and the
//! color palette are carried through the record repository untouched.

pub mod color;
pub mod enums;
pub mod font;
pub mod number_format;
pub mod style;
pub mod xf;

pub use color::Color;
pub use enums::{
    Charset, ColorType, FontFamily, FontScheme, HorizontalAlignment, ReadingOrder, Subscript,
    ThemeColor, Underline, VerticalAlignment,
};
pub use font::{Font, FontFlags};
pub use number_format::NumberFormat;
pub use style::{StyleFlags, StyleInfo};
pub use xf::{CellXf, XfProperty};

use crate::xlsb::alternate_content::AcUid;
use crate::xlsb::error::XlsbResult;
use crate::xlsb::processor::RecordProcessor;
use crate::xlsb::record_types::BinaryRecordType as Brt;
use crate::xlsb::records::{BinaryRecord, RecordDescriptor};
use crate::xlsb::repository::{RecordRepository, RepositoryOptions};
use number_format::{FIRST_CUSTOM_FORMAT_ID, LAST_CUSTOM_FORMAT_ID};
use std::io::{Read, Write};

/// Decoded styles part.
#[derive(Debug, Default)]
pub struct StylesheetPart {
    pub formats: Vec<NumberFormat>,
    pub fonts: Vec<Font>,
    pub style_xfs: Vec<CellXf>,
    pub cell_xfs: Vec<CellXf>,
    pub styles: Vec<StyleInfo>,
    /// The number format list was read, and is written back even when empty
    formats_block: bool,
    /// The font list was read, and owns the batch of its trailing records
    fonts_replay: bool,
    repository: RecordRepository,
}

impl StylesheetPart {
    /// A fresh styles part with nothing to replay.
    pub fn new(
        formats: Vec<NumberFormat>,
        fonts: Vec<Font>,
        style_xfs: Vec<CellXf>,
        cell_xfs: Vec<CellXf>,
        styles: Vec<StyleInfo>,
    ) -> Self {
        StylesheetPart {
            formats,
            fonts,
            style_xfs,
            cell_xfs,
            styles,
            formats_block: false,
            fonts_replay: false,
            repository: RecordRepository::passthrough(),
        }
    }

    pub fn number_format(&self, id: u16) -> Option<&NumberFormat> {
        self.formats.iter().find(|f| f.id == id)
    }

    /// Lowest custom format id not in use, `None` once all are taken.
    pub fn next_format_id(&self) -> Option<u16> {
        (FIRST_CUSTOM_FORMAT_ID..=LAST_CUSTOM_FORMAT_ID).find(|&id| self.number_format(id).is_none())
    }

    /// Font applied by cell XF `xf_index`.
    pub fn cell_font(&self, xf_index: usize) -> Option<&Font> {
        let xf = self.cell_xfs.get(xf_index)?;
        self.fonts.get(xf.font as usize)
    }

    /// Style name of cell XF `xf_index`, through its parent style XF.
    pub fn cell_style_name(&self, xf_index: usize) -> Option<&str> {
        let parent = self.cell_xfs.get(xf_index)?.parent as u32;
        self.styles
            .iter()
            .find(|s| s.xf_index == parent)
            .and_then(|s| s.name.as_deref())
    }

    pub fn read<S: Read>(
        processor: &mut RecordProcessor<S>,
        options: &RepositoryOptions,
    ) -> XlsbResult<Self> {
        let mut repository = RecordRepository::new(options);

        processor.expect_descriptor(Brt::BeginStyleSheet)?;
        let mut d = processor.read_descriptor()?;

        let mut formats = Vec::new();
        let formats_block = d.is(Brt::BeginFmts);
        if formats_block {
            let count = read_count(processor, &d)?;
            d = processor.read_descriptor()?;
            while d.is_any(&[Brt::ACBegin, Brt::Fmt]) {
                if d.is(Brt::ACBegin) {
                    processor.skip(&d, &mut repository)?;
                    d = processor.read_descriptor()?;
                }
                repository.push_current()?;
                d.expect(Brt::Fmt)?;
                formats.push(processor.read_record::<NumberFormat>(&d)?);

                d = processor.read_descriptor()?;
                if d.is(Brt::ACEnd) {
                    processor.skip(&d, &mut repository)?;
                    d = processor.read_descriptor()?;
                }
                repository.push_current()?;
            }
            d.expect(Brt::EndFmts)?;
            check_count("number formats", count, formats.len());
            d = processor.read_descriptor()?;
        }

        let mut fonts = Vec::new();
        let fonts_replay = d.is(Brt::BeginFonts);
        if fonts_replay {
            let count = read_count(processor, &d)?;
            d = processor.read_descriptor()?;
            while d.is(Brt::Font) {
                fonts.push(processor.read_record::<Font>(&d)?);
                d = processor.read_descriptor()?;
            }
            while d.is(Brt::ACBegin) {
                processor.skip_ac_block(&d, &mut repository)?;
                d = processor.read_descriptor()?;
            }
            repository.push_current()?;
            d.expect(Brt::EndFonts)?;
            check_count("fonts", count, fonts.len());
            d = processor.read_descriptor()?;
        }

        d = processor.skip_to(d, &[Brt::BeginCellStyleXFs], &mut repository)?;
        repository.push_current()?;

        let style_xfs = read_xfs(processor, &d, Brt::EndCellStyleXFs, &mut repository)?;
        d = processor.expect_descriptor(Brt::BeginCellXFs)?;
        let cell_xfs = read_xfs(processor, &d, Brt::EndCellXFs, &mut repository)?;

        d = processor.expect_descriptor(Brt::BeginStyles)?;
        let count = read_count(processor, &d)?;
        let mut styles = Vec::new();
        d = processor.read_descriptor()?;
        while d.is_any(&[Brt::ACBegin, Brt::Style]) {
            let uid = if d.is(Brt::ACBegin) {
                let uid = AcUid::read_after(processor, &d)?;
                d = processor.read_descriptor()?;
                Some(uid)
            } else {
                None
            };
            d.expect(Brt::Style)?;
            let mut style: StyleInfo = processor.read_record(&d)?;
            style.uid = uid;
            styles.push(style);

            d = processor.skip_until(&[Brt::Style, Brt::ACBegin, Brt::EndStyles], &mut repository)?;
            repository.push_current()?;
        }
        d.expect(Brt::EndStyles)?;
        check_count("styles", count, styles.len());

        processor.skip_until(&[Brt::EndStyleSheet], &mut repository)?;
        repository.push_current()?;

        log::debug!(
            "read stylesheet: {} format(s), {} font(s), {} style xf(s), {} cell xf(s), {} style(s), {} captured batch(es)",
            formats.len(),
            fonts.len(),
            style_xfs.len(),
            cell_xfs.len(),
            styles.len(),
            repository.pending_batches()
        );
        Ok(StylesheetPart {
            formats,
            fonts,
            style_xfs,
            cell_xfs,
            styles,
            formats_block,
            fonts_replay,
            repository,
        })
    }

    /// Write the part, replaying captured records at their positions.
    pub fn write<S: Write>(&mut self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        let repository = &mut self.repository;
        repository.begin_write()?;

        processor.write_empty(Brt::BeginStyleSheet)?;

        if !self.formats.is_empty() || self.formats_block {
            write_count(processor, Brt::BeginFmts, self.formats.len())?;
            for format in &self.formats {
                if format.replay {
                    repository.write_poll(processor)?;
                }
                format.write(processor)?;
                if format.replay {
                    repository.write_poll(processor)?;
                }
            }
            processor.write_empty(Brt::EndFmts)?;
        }

        if !self.fonts.is_empty() || self.fonts_replay {
            write_count(processor, Brt::BeginFonts, self.fonts.len())?;
            for font in &self.fonts {
                font.write(processor)?;
            }
            if self.fonts_replay {
                repository.write_poll(processor)?;
            }
            processor.write_empty(Brt::EndFonts)?;
        }

        // fills, borders and whatever else precedes the style XFs
        repository.write_poll(processor)?;

        write_xfs(processor, &self.style_xfs, Brt::BeginCellStyleXFs, Brt::EndCellStyleXFs, repository)?;
        write_xfs(processor, &self.cell_xfs, Brt::BeginCellXFs, Brt::EndCellXFs, repository)?;

        write_count(processor, Brt::BeginStyles, self.styles.len())?;
        for style in &self.styles {
            style.write_with_uid(processor)?;
            if style.replay {
                repository.write_poll(processor)?;
            }
        }
        processor.write_empty(Brt::EndStyles)?;

        repository.write_poll(processor)?;
        processor.write_empty(Brt::EndStyleSheet)?;
        repository.close()
    }
}

fn read_count<S: Read>(processor: &mut RecordProcessor<S>, begin: &RecordDescriptor) -> XlsbResult<u32> {
    begin.expect_size(4)?;
    processor.read_u32()
}

fn write_count<S: Write>(processor: &mut RecordProcessor<S>, begin: Brt, count: usize) -> XlsbResult<()> {
    processor.write_descriptor(&RecordDescriptor::new(begin, 4))?;
    processor.write_u32(count as u32)
}

fn check_count(what: &str, declared: u32, found: usize) {
    if declared as usize != found {
        log::warn!("stylesheet declares {} {} but holds {}", declared, what, found);
    }
}

fn read_xfs<S: Read>(
    processor: &mut RecordProcessor<S>,
    begin: &RecordDescriptor,
    end: Brt,
    repository: &mut RecordRepository,
) -> XlsbResult<Vec<CellXf>> {
    let count = read_count(processor, begin)?;
    let mut xfs = Vec::new();
    let mut d = processor.read_descriptor()?;
    while d.is(Brt::XF) {
        xfs.push(processor.read_record::<CellXf>(&d)?);
        d = processor.skip_until(&[Brt::XF, end], repository)?;
        repository.push_current()?;
    }
    d.expect(end)?;
    check_count("xfs", count, xfs.len());
    Ok(xfs)
}

fn write_xfs<S: Write>(
    processor: &mut RecordProcessor<S>,
    xfs: &[CellXf],
    begin: Brt,
    end: Brt,
    repository: &mut RecordRepository,
) -> XlsbResult<()> {
    write_count(processor, begin, xfs.len())?;
    for xf in xfs {
        xf.write(processor)?;
        if xf.replay {
            repository.write_poll(processor)?;
        }
    }
    processor.write_empty(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsb::alternate_content::{AcProductVersion, AlternateContent};
    use crate::xlsb::error::XlsbError;
    use crate::xlsb::repository::OpenMode;
    use bytes::Bytes;
    use std::io::Cursor;

    fn ac() -> AlternateContent {
        AlternateContent {
            versions: vec![AcProductVersion {
                version: 0x10,
                product: 1,
                forward_compatible: false,
            }],
        }
    }

    fn count(w: &mut RecordProcessor<Vec<u8>>, t: Brt, n: u32) {
        w.write_record(t, &n.to_le_bytes()).unwrap();
    }

    fn stylesheet() -> Vec<u8> {
        let mut w = RecordProcessor::new(Vec::new());
        w.write_empty(Brt::BeginStyleSheet).unwrap();

        count(&mut w, Brt::BeginFmts, 2);
        NumberFormat::new(164, "0.0%").unwrap().write(&mut w).unwrap();
        ac().write(&mut w).unwrap();
        NumberFormat::new(165, "[$-409]mmm yy").unwrap().write(&mut w).unwrap();
        w.write_empty(Brt::ACEnd).unwrap();
        w.write_empty(Brt::EndFmts).unwrap();

        count(&mut w, Brt::BeginFonts, 2);
        let mut calibri = Font::new("Calibri", 11).unwrap();
        calibri.scheme = FontScheme::Minor;
        calibri.write(&mut w).unwrap();
        let mut bold = calibri.clone();
        bold.weight = font::WEIGHT_BOLD;
        bold.color = Color::rgb(0xC0, 0, 0);
        bold.write(&mut w).unwrap();
        ac().write(&mut w).unwrap();
        w.write_record(Brt::Uid, &[1; 16]).unwrap();
        w.write_empty(Brt::ACEnd).unwrap();
        w.write_empty(Brt::EndFonts).unwrap();

        count(&mut w, Brt::BeginFills, 1);
        w.write_record(Brt::Fill, &[0u8; 68]).unwrap();
        w.write_empty(Brt::EndFills).unwrap();
        count(&mut w, Brt::BeginBorders, 1);
        w.write_record(Brt::Border, &[0u8; 51]).unwrap();
        w.write_empty(Brt::EndBorders).unwrap();

        count(&mut w, Brt::BeginCellStyleXFs, 1);
        CellXf::style().write(&mut w).unwrap();
        w.write_empty(Brt::EndCellStyleXFs).unwrap();

        count(&mut w, Brt::BeginCellXFs, 2);
        CellXf::cell(0).write(&mut w).unwrap();
        let mut percent = CellXf::cell(0);
        percent.number_format = 164;
        percent.font = 1;
        percent.set_applies(XfProperty::NUMBER_FORMAT | XfProperty::FONT, true);
        percent.write(&mut w).unwrap();
        w.write_record(Brt::Uid, &[2; 16]).unwrap();
        w.write_empty(Brt::EndCellXFs).unwrap();

        count(&mut w, Brt::BeginStyles, 1);
        AcUid {
            content: ac(),
            uid: Bytes::from_static(&[3; 16]),
        }
        .write(&mut w)
        .unwrap();
        StyleInfo::normal().write(&mut w).unwrap();
        w.write_empty(Brt::EndStyles).unwrap();

        count(&mut w, Brt::BeginDXFs, 0);
        w.write_empty(Brt::EndDXFs).unwrap();
        w.write_record(Brt::BeginTableStyles, &[0u8; 8]).unwrap();
        w.write_empty(Brt::EndTableStyles).unwrap();
        w.write_empty(Brt::EndStyleSheet).unwrap();
        w.into_inner()
    }

    fn read(bytes: Vec<u8>, mode: OpenMode) -> XlsbResult<StylesheetPart> {
        let mut p = RecordProcessor::new(Cursor::new(bytes));
        StylesheetPart::read(&mut p, &RepositoryOptions::new().with_mode(mode))
    }

    fn write(part: &mut StylesheetPart) -> Vec<u8> {
        let mut w = RecordProcessor::new(Vec::new());
        part.write(&mut w).unwrap();
        w.into_inner()
    }

    #[test]
    fn test_stylesheet_decodes() {
        let part = read(stylesheet(), OpenMode::ReadOnly).unwrap();
        assert_eq!(part.formats.len(), 2);
        assert_eq!(part.number_format(165).unwrap().code, "[$-409]mmm yy");
        assert_eq!(part.next_format_id(), Some(166));
        assert_eq!(part.fonts.len(), 2);
        assert!(part.cell_font(1).unwrap().is_bold());
        assert_eq!(part.style_xfs.len(), 1);
        assert!(part.style_xfs[0].is_style());
        assert_eq!(part.cell_xfs.len(), 2);
        assert!(part.cell_xfs[1].applies(XfProperty::FONT));
        assert_eq!(part.styles.len(), 1);
        assert!(part.styles[0].uid.is_some());
        assert_eq!(part.cell_style_name(1), Some("Normal"));
    }

    #[test]
    fn test_stylesheet_roundtrip_is_byte_exact() {
        let original = stylesheet();
        let mut part = read(original.clone(), OpenMode::ForUpdate).unwrap();
        assert_eq!(write(&mut part), original);
    }

    #[test]
    fn test_stylesheet_edit_keeps_captured_records() {
        let mut part = read(stylesheet(), OpenMode::ForUpdate).unwrap();
        part.fonts[0].flags |= FontFlags::ITALIC;
        let id = part.next_format_id().unwrap();
        part.formats.push(NumberFormat::new(id, "0.000").unwrap());
        let mut xf = CellXf::cell(0);
        xf.number_format = id;
        part.cell_xfs.push(xf);
        let bytes = write(&mut part);

        let reread = read(bytes.clone(), OpenMode::ForUpdate).unwrap();
        assert_eq!(reread.formats.len(), 3);
        assert!(reread.fonts[0].flags.contains(FontFlags::ITALIC));
        assert_eq!(reread.cell_xfs[2].number_format, 166);

        // the fills survive the edit
        let mut p = RecordProcessor::new(Cursor::new(bytes));
        let fills = p
            .records()
            .filter_map(Result::ok)
            .filter(|(d, _)| d.is(Brt::Fill))
            .count();
        assert_eq!(fills, 1);
    }

    #[test]
    fn test_removed_style_xf_is_reported() {
        let mut part = read(stylesheet(), OpenMode::ForUpdate).unwrap();
        part.cell_xfs.truncate(1);
        let mut w = RecordProcessor::new(Vec::new());
        assert!(matches!(
            part.write(&mut w),
            Err(XlsbError::UnreplayedBatches { .. })
        ));
    }

    #[test]
    fn test_fresh_stylesheet() {
        let mut part = StylesheetPart::new(
            Vec::new(),
            vec![Font::new("Arial", 10).unwrap()],
            vec![CellXf::style()],
            vec![CellXf::cell(0)],
            vec![StyleInfo::normal()],
        );
        let bytes = write(&mut part);
        let reread = read(bytes, OpenMode::ReadOnly).unwrap();
        assert!(reread.formats.is_empty());
        assert_eq!(reread.fonts[0].name, "Arial");
        assert_eq!(reread.styles[0].name.as_deref(), Some("Normal"));
    }

    #[test]
    fn test_missing_cell_xfs() {
        let mut w = RecordProcessor::new(Vec::new());
        w.write_empty(Brt::BeginStyleSheet).unwrap();
        count(&mut w, Brt::BeginCellStyleXFs, 0);
        w.write_empty(Brt::EndCellStyleXFs).unwrap();
        count(&mut w, Brt::BeginStyles, 0);
        w.write_empty(Brt::EndStyles).unwrap();
        w.write_empty(Brt::EndStyleSheet).unwrap();
        assert!(matches!(
            read(w.into_inner(), OpenMode::ReadOnly),
            Err(XlsbError::UnexpectedRecord { .. })
        ));
    }

    fn empty_lists() -> Vec<u8> {
        let mut w = RecordProcessor::new(Vec::new());
        w.write_empty(Brt::BeginStyleSheet).unwrap();
        count(&mut w, Brt::BeginFmts, 0);
        w.write_empty(Brt::EndFmts).unwrap();
        count(&mut w, Brt::BeginCellStyleXFs, 0);
        w.write_empty(Brt::EndCellStyleXFs).unwrap();
        count(&mut w, Brt::BeginCellXFs, 0);
        w.write_empty(Brt::EndCellXFs).unwrap();
        count(&mut w, Brt::BeginStyles, 0);
        w.write_empty(Brt::EndStyles).unwrap();
        w.write_empty(Brt::EndStyleSheet).unwrap();
        w.into_inner()
    }

    #[test]
    fn test_empty_format_list_is_kept() {
        let original = empty_lists();
        let mut part = read(original.clone(), OpenMode::ForUpdate).unwrap();
        assert!(part.formats.is_empty());
        assert_eq!(write(&mut part), original);

        let mut fresh = StylesheetPart::new(Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new());
        let bytes = write(&mut fresh);
        assert!(bytes.len() < original.len());
    }

    #[test]
    fn test_next_format_id_fills_gaps() {
        let mut part = StylesheetPart::default();
        assert_eq!(part.next_format_id(), Some(FIRST_CUSTOM_FORMAT_ID));
        for id in [164, 166, 382] {
            part.formats.push(NumberFormat::new(id, "0").unwrap());
        }
        assert_eq!(part.next_format_id(), Some(165));

        // unvalidated ids outside the custom range are ignored
        part.formats.push(NumberFormat {
            id: u16::MAX,
            code: "0".into(),
            replay: false,
        });
        part.formats.push(NumberFormat::new(165, "0").unwrap());
        assert_eq!(part.next_format_id(), Some(167));

        part.formats = (FIRST_CUSTOM_FORMAT_ID..=LAST_CUSTOM_FORMAT_ID)
            .map(|id| NumberFormat::new(id, "0").unwrap())
            .collect();
        assert_eq!(part.next_format_id(), None);
    }

    #[test]
    fn test_begin_fmts_needs_count() {
        let mut w = RecordProcessor::new(Vec::new());
        w.write_empty(Brt::BeginStyleSheet).unwrap();
        w.write_empty(Brt::BeginFmts).unwrap();
        assert!(matches!(
            read(w.into_inner(), OpenMode::ReadOnly),
            Err(XlsbError::UnexpectedRecordSize { .. })
        ));
    }
}
