//! 8-byte color structure shared by fonts, fills and borders.

use super::enums::{ColorType, ThemeColor};
use crate::xlsb::error::XlsbResult;
use crate::xlsb::processor::RecordProcessor;
use crate::xlsb::utils::validate_max;
use std::io::{Read, Write};

/// Encoded size of a color.
pub const COLOR_LEN: u32 = 8;

/// Highest palette index, system colors included.
pub const MAX_PALETTE_INDEX: u8 = 0x51;

const VALID_RGB: u8 = 0x01;

/// Default RGBA values of the 64 palette entries.
const DEFAULT_PALETTE: [u32; 64] = [
    0x000000FF, 0xFFFFFFFF, 0xFF0000FF, 0x00FF00FF, 0x0000FFFF, 0xFFFF00FF, 0xFF00FFFF, 0x00FFFFFF,
    0x000000FF, 0xFFFFFFFF, 0xFF0000FF, 0x00FF00FF, 0x0000FFFF, 0xFFFF00FF, 0xFF00FFFF, 0x00FFFFFF,
    0x800000FF, 0x008000FF, 0x000080FF, 0x808000FF, 0x800080FF, 0x008080FF, 0xC0C0C0FF, 0x808080FF,
    0x9999FFFF, 0x993366FF, 0xFFFFCCFF, 0xCCFFFFFF, 0x660066FF, 0xFF8080FF, 0x0066CCFF, 0xCCCCFFFF,
    0x000080FF, 0xFF00FFFF, 0xFFFF00FF, 0x00FFFFFF, 0x800080FF, 0x800000FF, 0x008080FF, 0x0000FFFF,
    0x00CCFFFF, 0xCCFFFFFF, 0xCCFFCCFF, 0xFFFF99FF, 0x99CCFFFF, 0xFF99CCFF, 0xCC99FFFF, 0xFFCC99FF,
    0x3366FFFF, 0x33CCCCFF, 0x99CC00FF, 0xFFCC00FF, 0xFF9900FF, 0xFF6600FF, 0x666699FF, 0x969696FF,
    0x003366FF, 0x339966FF, 0x003300FF, 0x333300FF, 0x993300FF, 0x993366FF, 0x333399FF, 0x333333FF,
];

/// Palette index with a fixed color outside the 64 defaults.
const PALETTE_NEUTRAL: u8 = 0x4F;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub color_type: ColorType,
    /// Palette or theme index, meaningless for the other types
    pub index: u8,
    /// Tint or shade in 1/32767ths, negative darkens
    pub tint: i16,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    /// The RGB components are meaningful even if the type is not `Rgb`
    pub valid_rgb: bool,
}

impl Color {
    pub fn auto() -> Self {
        Color::default()
    }

    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Color {
            color_type: ColorType::Rgb,
            red,
            green,
            blue,
            alpha: 0xFF,
            valid_rgb: true,
            ..Color::default()
        }
    }

    pub fn indexed(index: u8) -> XlsbResult<Self> {
        let color = Color {
            color_type: ColorType::Indexed,
            index,
            ..Color::default()
        };
        color.validate()?;
        Ok(color)
    }

    pub fn theme(theme: ThemeColor, tint: i16) -> Self {
        Color {
            color_type: ColorType::Theme,
            index: theme.as_u8(),
            tint,
            ..Color::default()
        }
    }

    pub fn validate(&self) -> XlsbResult<()> {
        match self.color_type {
            ColorType::Indexed => validate_max(
                "palette index",
                self.index as u64,
                MAX_PALETTE_INDEX as u64,
                "palette colors go up to 0x51",
            ),
            ColorType::Theme => ThemeColor::from_u8(self.index).map(|_| ()),
            ColorType::Auto | ColorType::Rgb => Ok(()),
        }
    }

    /// Resolve to packed `0xRRGGBBAA` where the color is fixed by the file
    /// format: explicit RGB and the default palette entries.
    pub fn to_rgba(&self) -> Option<u32> {
        match self.color_type {
            ColorType::Rgb => Some(u32::from_be_bytes([self.red, self.green, self.blue, self.alpha])),
            ColorType::Indexed if self.index == PALETTE_NEUTRAL => Some(0x000000FF),
            ColorType::Indexed => DEFAULT_PALETTE.get(self.index as usize).copied(),
            _ if self.valid_rgb => Some(u32::from_be_bytes([self.red, self.green, self.blue, self.alpha])),
            _ => None,
        }
    }

    pub fn read<S: Read>(processor: &mut RecordProcessor<S>) -> XlsbResult<Self> {
        let flags = processor.read_u8()?;
        let index = processor.read_u8()?;
        let tint = processor.read_i16()?;
        let [red, green, blue, alpha]: [u8; 4] = [
            processor.read_u8()?,
            processor.read_u8()?,
            processor.read_u8()?,
            processor.read_u8()?,
        ];
        let color = Color {
            color_type: ColorType::from_u8(flags >> 1)?,
            index,
            tint,
            red,
            green,
            blue,
            alpha,
            valid_rgb: flags & VALID_RGB != 0,
        };
        color.validate()?;
        Ok(color)
    }

    pub fn write<S: Write>(&self, processor: &mut RecordProcessor<S>) -> XlsbResult<()> {
        self.validate()?;
        let mut flags = self.color_type.as_u8() << 1;
        // Excel always marks explicit RGB colors valid
        if self.valid_rgb || self.color_type == ColorType::Rgb {
            flags |= VALID_RGB;
        }
        processor.write_u8(flags)?;
        processor.write_u8(self.index)?;
        processor.write_i16(self.tint)?;
        processor.write_bytes(&[self.red, self.green, self.blue, self.alpha])
    }
}
