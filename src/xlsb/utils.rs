//! Shared field validation and RK number conversion.

use crate::xlsb::error::{XlsbError, XlsbResult};

/// Largest zero-based row index in a sheet.
pub const MAX_ROW: u32 = 1_048_575;

/// Largest zero-based column index in a sheet.
pub const MAX_COL: u32 = 16_383;

/// Check a zero-based row index.
pub fn validate_row(row: u32) -> XlsbResult<u32> {
    if row > MAX_ROW {
        return Err(XlsbError::ValueOutOfRange {
            field: "row",
            value: row as i64,
            constraint: "row index must be between 0 and 1048575",
        });
    }
    Ok(row)
}

/// Check a zero-based column index.
pub fn validate_col(col: u32) -> XlsbResult<u32> {
    if col > MAX_COL {
        return Err(XlsbError::ValueOutOfRange {
            field: "column",
            value: col as i64,
            constraint: "column index must be between 0 and 16383",
        });
    }
    Ok(col)
}

/// Check a value against an inclusive upper bound.
pub(crate) fn validate_max(
    field: &'static str,
    value: u64,
    max: u64,
    constraint: &'static str,
) -> XlsbResult<()> {
    if value > max {
        return Err(XlsbError::ValueOutOfRange {
            field,
            value: i64::try_from(value).unwrap_or(i64::MAX),
            constraint,
        });
    }
    Ok(())
}

const RK_X100: u32 = 0x01;
const RK_INT: u32 = 0x02;
const RK_INT_MIN: f64 = -(1 << 29) as f64;
const RK_INT_MAX: f64 = ((1 << 29) - 1) as f64;

/// Decode an RK number.
///
/// Bit 0 divides the value by 100, bit 1 selects a 30-bit signed integer
/// instead of the high 30 bits of an IEEE double.
pub fn rk_to_f64(rk: u32) -> f64 {
    let value = if rk & RK_INT != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & !0x03) as u64) << 32)
    };
    if rk & RK_X100 != 0 { value / 100.0 } else { value }
}

/// Encode `value` as an RK number if it can be stored losslessly.
///
/// Forms are tried in order: truncated double, truncated double x100,
/// integer, integer x100.
pub fn f64_to_rk(value: f64) -> XlsbResult<u32> {
    if value.is_finite() {
        if let Some(rk) = truncated_float(value) {
            return Ok(rk);
        }
        if let Some(rk) = truncated_float(value * 100.0).filter(|rk| rk_to_f64(rk | RK_X100) == value) {
            return Ok(rk | RK_X100);
        }
        if let Some(rk) = small_int(value) {
            return Ok(rk | RK_INT);
        }
        if let Some(rk) = small_int((value * 100.0).round()).filter(|rk| rk_to_f64(rk | RK_INT | RK_X100) == value) {
            return Ok(rk | RK_INT | RK_X100);
        }
    }
    Err(XlsbError::ValueOutOfRange {
        field: "rk number",
        value: value as i64,
        constraint: "not representable as an RK number; store it as a real cell",
    })
}

fn truncated_float(value: f64) -> Option<u32> {
    let bits = value.to_bits();
    if bits & 0x0000_0003_FFFF_FFFF == 0 {
        Some((bits >> 32) as u32)
    } else {
        None
    }
}

fn small_int(value: f64) -> Option<u32> {
    if value.fract() == 0.0 && (RK_INT_MIN..=RK_INT_MAX).contains(&value) {
        Some(((value as i32) << 2) as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_col_bounds() {
        assert_eq!(validate_row(MAX_ROW).unwrap(), MAX_ROW);
        assert!(matches!(
            validate_row(MAX_ROW + 1),
            Err(XlsbError::ValueOutOfRange { field: "row", .. })
        ));
        assert_eq!(validate_col(0).unwrap(), 0);
        assert!(validate_col(MAX_COL + 1).is_err());
    }

    #[test]
    fn test_rk_decode_known_values() {
        // 1.0 as truncated double
        assert_eq!(rk_to_f64(0x3FF0_0000), 1.0);
        // 1.0 / 100
        assert_eq!(rk_to_f64(0x3FF0_0001), 0.01);
        // integer 1234
        assert_eq!(rk_to_f64((1234 << 2) | 0x02), 1234.0);
        // integer -5
        assert_eq!(rk_to_f64(((-5i32 << 2) as u32) | 0x02), -5.0);
        // integer 12345 / 100
        assert_eq!(rk_to_f64((12345 << 2) | 0x03), 123.45);
    }

    #[test]
    fn test_rk_encode_prefers_float() {
        assert_eq!(f64_to_rk(1.0).unwrap(), 0x3FF0_0000);
        assert_eq!(f64_to_rk(0.0).unwrap(), 0);
    }

    #[test]
    fn test_rk_encode_forms() {
        for value in [0.5, -2.0, 123_456_789.0, 123.45, -0.07, 3.14, 42.0] {
            let rk = f64_to_rk(value).unwrap();
            assert_eq!(rk_to_f64(rk), value, "value={value} rk={rk:#x}");
        }
        assert_eq!(f64_to_rk(123_456_789.0).unwrap() & 0x03, 0x02);
    }

    #[test]
    fn test_rk_rejects_unrepresentable() {
        for value in [std::f64::consts::PI, f64::NAN, f64::INFINITY, 1e10 + 0.5] {
            assert!(matches!(
                f64_to_rk(value),
                Err(XlsbError::ValueOutOfRange { field: "rk number", .. })
            ));
        }
    }
}
