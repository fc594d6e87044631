//! Single-byte enumerations used by the style records.

use crate::xlsb::error::{XlsbError, XlsbResult};

macro_rules! style_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(u8)]
        pub enum $name {
            #[default]
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Decode from the stored byte.
            pub fn from_u8(value: u8) -> XlsbResult<Self> {
                match value {
                    $(v if v == $value => Ok($name::$variant),)+
                    _ => Err(XlsbError::ValueOutOfRange {
                        field: $field,
                        value: value as i64,
                        constraint: concat!("not a defined ", $field),
                    }),
                }
            }

            #[inline]
            pub fn as_u8(self) -> u8 {
                self as u8
            }
        }
    };
}

style_enum! {
    /// Horizontal alignment of cell content.
    HorizontalAlignment, "horizontal alignment" {
        General = 0,
        Left = 1,
        Center = 2,
        Right = 3,
        Fill = 4,
        Justify = 5,
        CenterAcrossSelection = 6,
        Distributed = 7,
    }
}

style_enum! {
    /// Vertical alignment of cell content.
    VerticalAlignment, "vertical alignment" {
        Top = 0,
        Center = 1,
        Bottom = 2,
        Justify = 3,
        Distributed = 4,
    }
}

style_enum! {
    ReadingOrder, "reading order" {
        ContextDependent = 0,
        LeftToRight = 1,
        RightToLeft = 2,
    }
}

style_enum! {
    /// How the index byte of a color is interpreted.
    ColorType, "color type" {
        Auto = 0x00,
        /// Index into the palette
        Indexed = 0x01,
        /// Explicit RGBA components
        Rgb = 0x02,
        /// Index into the theme colors
        Theme = 0x03,
    }
}

style_enum! {
    ThemeColor, "theme color" {
        Dark1 = 0x00,
        Light1 = 0x01,
        Dark2 = 0x02,
        Light2 = 0x03,
        Accent1 = 0x04,
        Accent2 = 0x05,
        Accent3 = 0x06,
        Accent4 = 0x07,
        Accent5 = 0x08,
        Accent6 = 0x09,
        Hyperlink = 0x0A,
        FollowedHyperlink = 0x0B,
    }
}

style_enum! {
    Subscript, "subscript type" {
        None = 0x00,
        Superscript = 0x01,
        Subscript = 0x02,
    }
}

style_enum! {
    Underline, "underline type" {
        None = 0x00,
        Single = 0x01,
        Double = 0x02,
        SingleAccounting = 0x21,
        DoubleAccounting = 0x22,
    }
}

style_enum! {
    FontFamily, "font family" {
        NotApplicable = 0x00,
        Roman = 0x01,
        Swiss = 0x02,
        Modern = 0x03,
        Script = 0x04,
        Decorative = 0x05,
    }
}

style_enum! {
    /// Character set of a font, as in the Windows `LOGFONT` structure.
    Charset, "character set" {
        Ansi = 0x00,
        Default = 0x01,
        Symbol = 0x02,
        Mac = 0x4D,
        ShiftJis = 0x80,
        Hangul = 0x81,
        Johab = 0x82,
        Gb2312 = 0x86,
        ChineseBig5 = 0x88,
        Greek = 0xA1,
        Turkish = 0xA2,
        Vietnamese = 0xA3,
        Hebrew = 0xB1,
        Arabic = 0xB2,
        Baltic = 0xBA,
        Russian = 0xCC,
        Thai = 0xDE,
        EastEurope = 0xEE,
        Oem = 0xFF,
    }
}

style_enum! {
    /// Theme font slot a font belongs to.
    FontScheme, "font scheme" {
        None = 0x00,
        Major = 0x01,
        Minor = 0x02,
    }
}
