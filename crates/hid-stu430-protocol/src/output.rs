//! Command encoders (host → device feature reports).
//!
//! # Payload layouts
//! | Command            | ID     | Payload                                  |
//! |--------------------|--------|------------------------------------------|
//! | writing area       | `0x2A` | x1, y1, x2, y2 as LE u16                 |
//! | pen color & width  | `0x2D` | `00 00 00` width (ink is always black)   |
//! | background color   | `0x2E` | r g b                                    |
//! | brightness         | `0x2B` | intensity, `00`                          |
//! | writing mode       | `0x0E` | mode                                     |
//! | ink mode           | `0x21` | `01` on / `00` off                       |
//! | clear screen       | `0x20` | `00`                                     |

use crate::ids::CommandTable;
use crate::types::{FeatureReport, WritingArea};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorFormatError {
    #[error("invalid color {input:?}: expected six hex digits, optionally prefixed with '#'")]
    InvalidColorFormat { input: String },
}

pub fn encode_writing_area(area: &WritingArea) -> [u8; 8] {
    let [x1_lo, x1_hi] = area.x1.to_le_bytes();
    let [y1_lo, y1_hi] = area.y1.to_le_bytes();
    let [x2_lo, x2_hi] = area.x2.to_le_bytes();
    let [y2_lo, y2_hi] = area.y2.to_le_bytes();
    [x1_lo, x1_hi, y1_lo, y1_hi, x2_lo, x2_hi, y2_lo, y2_hi]
}

/// The STU-430 only renders black ink, so there is no color argument.
pub fn encode_pen_color_and_width(width: u8) -> [u8; 4] {
    [0, 0, 0, width]
}

/// Parse `"#rrggbb"` or `"rrggbb"` into three bytes.
pub fn encode_background_color(hex: &str) -> Result<[u8; 3], ColorFormatError> {
    let invalid = || ColorFormatError::InvalidColorFormat {
        input: hex.to_owned(),
    };

    let digits = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
    if digits.len() != 6 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid());
    }

    let mut rgb = [0u8; 3];
    for (out, pair) in rgb.iter_mut().zip(digits.chunks_exact(2)) {
        let pair = std::str::from_utf8(pair).map_err(|_utf8| invalid())?;
        *out = u8::from_str_radix(pair, 16).map_err(|_radix| invalid())?;
    }
    Ok(rgb)
}

pub fn encode_brightness(intensity: u8) -> [u8; 2] {
    [intensity, 0]
}

pub fn encode_writing_mode(mode: u8) -> [u8; 1] {
    [mode]
}

pub fn encode_inking(enabled: bool) -> [u8; 1] {
    [u8::from(enabled)]
}

pub fn encode_clear_screen() -> [u8; 1] {
    [0]
}

/// Pairs each encoder with its report ID from a [`CommandTable`].
impl FeatureReport {
    pub fn writing_area(table: &CommandTable, area: &WritingArea) -> Self {
        Self::new(table.writing_area, encode_writing_area(area))
    }

    pub fn pen_color_and_width(table: &CommandTable, width: u8) -> Self {
        Self::new(table.pen_color_and_width, encode_pen_color_and_width(width))
    }

    pub fn background_color(table: &CommandTable, hex: &str) -> Result<Self, ColorFormatError> {
        Ok(Self::new(
            table.background_color,
            encode_background_color(hex)?,
        ))
    }

    pub fn brightness(table: &CommandTable, intensity: u8) -> Self {
        Self::new(table.brightness, encode_brightness(intensity))
    }

    pub fn writing_mode(table: &CommandTable, mode: u8) -> Self {
        Self::new(table.writing_mode, encode_writing_mode(mode))
    }

    pub fn inking(table: &CommandTable, enabled: bool) -> Self {
        Self::new(table.ink_mode, encode_inking(enabled))
    }

    pub fn clear_screen(table: &CommandTable) -> Self {
        Self::new(table.clear_screen, encode_clear_screen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_area_is_four_le_words() {
        let bytes = encode_writing_area(&WritingArea::new(0, 0, 319, 199));
        assert_eq!(bytes, [0x00, 0x00, 0x00, 0x00, 0x3F, 0x01, 0xC7, 0x00]);
    }

    #[test]
    fn pen_color_is_always_black() {
        assert_eq!(encode_pen_color_and_width(0), [0, 0, 0, 0]);
        assert_eq!(encode_pen_color_and_width(3), [0, 0, 0, 3]);
        assert_eq!(encode_pen_color_and_width(255), [0, 0, 0, 255]);
    }

    #[test]
    fn background_color_parses_with_and_without_hash() {
        assert_eq!(encode_background_color("#1a2b3c"), Ok([0x1A, 0x2B, 0x3C]));
        assert_eq!(encode_background_color("FFFFFF"), Ok([0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn background_color_rejects_malformed_input() {
        for bad in ["xyz", "", "#", "#12345", "#1234567", "#12 456", "+1+2+3", "#gg0000"] {
            assert!(
                matches!(
                    encode_background_color(bad),
                    Err(ColorFormatError::InvalidColorFormat { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn brightness_has_reserved_zero() {
        assert_eq!(encode_brightness(200), [200, 0]);
    }

    #[test]
    fn single_byte_commands() {
        assert_eq!(encode_writing_mode(1), [1]);
        assert_eq!(encode_inking(true), [1]);
        assert_eq!(encode_inking(false), [0]);
        assert_eq!(encode_clear_screen(), [0]);
    }

    #[test]
    fn feature_reports_carry_table_ids() {
        let table = CommandTable::STU_430;
        assert_eq!(FeatureReport::clear_screen(&table).report_id, 0x20);
        assert_eq!(FeatureReport::inking(&table, true).report_id, 0x21);
        assert_eq!(FeatureReport::writing_mode(&table, 0).report_id, 0x0E);
        assert_eq!(FeatureReport::brightness(&table, 1).report_id, 0x2B);
        assert_eq!(FeatureReport::pen_color_and_width(&table, 1).report_id, 0x2D);
        assert_eq!(
            FeatureReport::writing_area(&table, &WritingArea::new(0, 0, 1, 1)).report_id,
            0x2A
        );
        let bg = FeatureReport::background_color(&table, "#000000").expect("valid color");
        assert_eq!(bg.report_id, 0x2E);
        assert_eq!(bg.payload, vec![0, 0, 0]);
    }
}
