//! Pen report decoding (device → host input reports `0x01` and `0x34`).
//!
//! # Report layout
//! | Offset | Size | Field                                            |
//! |--------|------|--------------------------------------------------|
//! | 0      | u8   | status: bit 0 ready, bit 1 tip switch            |
//! | 0–1    | u16  | pressure word (LE); overlaps the status byte     |
//! | 2–3    | u16  | x (LE)                                           |
//! | 4–5    | u16  | y (LE)                                           |
//! | 6–7    | u16  | timestamp (LE), report `0x34` only               |
//! | 8–9    | u16  | sequence (LE), report `0x34` only                |
//!
//! The pressure word shares byte 0 with the status flags.

use crate::ids::CommandTable;
use crate::types::{DeviceConfig, PenSample};
use signpad_hid_common::{HidCommonError, ReportParser};
use thiserror::Error;

/// Minimum payload length of a plain pen report.
pub const PEN_REPORT_LEN: usize = 6;

/// Minimum payload length of a timed pen report.
pub const PEN_TIMING_REPORT_LEN: usize = 10;

const STATUS_READY: u8 = 0x01;
const STATUS_SWITCH: u8 = 0x02;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PenReportError {
    #[error("malformed pen report 0x{report_id:02X}: got {got} bytes, need {need}")]
    MalformedReport {
        report_id: u8,
        got: usize,
        need: usize,
    },
}

/// Decode one inbound report.
///
/// Returns `Ok(None)` for report IDs that are not pen data; those are expected
/// on the wire and are not errors.
pub fn decode_pen_report(
    report_id: u8,
    raw: &[u8],
    table: &CommandTable,
    config: &DeviceConfig,
) -> Result<Option<PenSample>, PenReportError> {
    if !table.is_pen_report(report_id) {
        return Ok(None);
    }

    let timed = report_id == table.pen_data_timing;
    let need = if timed {
        PEN_TIMING_REPORT_LEN
    } else {
        PEN_REPORT_LEN
    };
    let malformed = PenReportError::MalformedReport {
        report_id,
        got: raw.len(),
        need,
    };
    if raw.len() < need {
        return Err(malformed);
    }
    let malformed = |_short: HidCommonError| malformed.clone();

    let mut parser = ReportParser::new(raw);
    let status = parser.read_u8().map_err(malformed)?;
    let raw_pressure = parser.peek_u16_le_at(0).map_err(malformed)?;
    parser.skip(1);
    let x = parser.read_u16_le().map_err(malformed)?;
    let y = parser.read_u16_le().map_err(malformed)?;

    let (timestamp, sequence) = if timed {
        (
            Some(parser.read_u16_le().map_err(malformed)?),
            Some(parser.read_u16_le().map_err(malformed)?),
        )
    } else {
        (None, None)
    };

    let scale = config.scale_factor.get();
    Ok(Some(PenSample {
        ready: status & STATUS_READY != 0,
        switch_pressed: status & STATUS_SWITCH != 0,
        x,
        y,
        pressure: f32::from(raw_pressure) / f32::from(config.pressure_factor.get()),
        scaled_x: x / scale,
        scaled_y: y / scale,
        timestamp,
        sequence,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: CommandTable = CommandTable::STU_430;
    const CONFIG: DeviceConfig = DeviceConfig::STU_430;

    fn plain(status: u8, x: u16, y: u16) -> Vec<u8> {
        let mut data = vec![status, 0x00];
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data
    }

    #[test]
    fn decode_plain_report() {
        let sample = decode_pen_report(0x01, &plain(0b11, 100, 50), &TABLE, &CONFIG)
            .expect("decodes")
            .expect("plain report is pen data");
        assert!(sample.ready);
        assert!(sample.switch_pressed);
        assert_eq!(sample.x, 100);
        assert_eq!(sample.y, 50);
        assert_eq!(sample.scaled_x, 100);
        assert_eq!(sample.scaled_y, 50);
        assert!((sample.pressure - 3.0 / 1023.0).abs() < f32::EPSILON);
        assert_eq!(sample.timestamp, None);
        assert_eq!(sample.sequence, None);
    }

    #[test]
    fn decode_timed_report() {
        let mut data = plain(0b11, 100, 50);
        data.extend_from_slice(&500u16.to_le_bytes());
        data.extend_from_slice(&7u16.to_le_bytes());
        let sample = decode_pen_report(0x34, &data, &TABLE, &CONFIG)
            .expect("decodes")
            .expect("timed report is pen data");
        assert_eq!((sample.x, sample.y), (100, 50));
        assert_eq!(sample.timestamp, Some(500));
        assert_eq!(sample.sequence, Some(7));
    }

    #[test]
    fn timed_zero_values_are_present_not_absent() {
        let sample = decode_pen_report(0x34, &[0u8; 10], &TABLE, &CONFIG)
            .expect("decodes")
            .expect("timed report is pen data");
        assert_eq!(sample.timestamp, Some(0));
        assert_eq!(sample.sequence, Some(0));
    }

    #[test]
    fn pressure_word_overlaps_status_byte() {
        let data = [0x01, 0x02, 0, 0, 0, 0];
        let sample = decode_pen_report(0x01, &data, &TABLE, &CONFIG)
            .expect("decodes")
            .expect("pen data");
        assert!(sample.ready);
        assert!(!sample.switch_pressed);
        assert!((sample.pressure - 513.0 / 1023.0).abs() < f32::EPSILON);
    }

    #[test]
    fn other_report_ids_are_ignored() {
        assert_eq!(decode_pen_report(0x20, &[], &TABLE, &CONFIG), Ok(None));
        assert_eq!(decode_pen_report(0xFF, &[0u8; 64], &TABLE, &CONFIG), Ok(None));
    }

    #[test]
    fn short_reports_are_malformed() {
        assert_eq!(
            decode_pen_report(0x01, &[0u8; 5], &TABLE, &CONFIG),
            Err(PenReportError::MalformedReport {
                report_id: 0x01,
                got: 5,
                need: 6
            })
        );
        assert_eq!(
            decode_pen_report(0x34, &[0u8; 9], &TABLE, &CONFIG),
            Err(PenReportError::MalformedReport {
                report_id: 0x34,
                got: 9,
                need: 10
            })
        );
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut data = plain(0b01, 10, 20);
        data.resize(64, 0xEE);
        let sample = decode_pen_report(0x01, &data, &TABLE, &CONFIG)
            .expect("decodes")
            .expect("pen data");
        assert_eq!((sample.x, sample.y, sample.timestamp), (10, 20, None));
    }
}
