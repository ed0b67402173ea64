//! Snapshot tests for the STU-430 wire format.
//!
//! These lock in the exact bytes sent to the device so that an accidental
//! protocol change shows up as a snapshot diff.

use insta::assert_snapshot;
use signpad_hid_stu430_protocol as stu;
use stu::{CommandTable, DeviceConfig, FeatureReport, WritingArea};

const TABLE: CommandTable = CommandTable::STU_430;

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn report(r: &FeatureReport) -> String {
    format!("{:02X}: {}", r.report_id, hex(&r.payload))
}

#[test]
fn test_snapshot_full_writing_area() {
    let area = WritingArea::full(&DeviceConfig::STU_430);
    assert_snapshot!(report(&FeatureReport::writing_area(&TABLE, &area)), @"2A: 00 00 00 00 3F 01 C7 00");
}

#[test]
fn test_snapshot_inset_writing_area() {
    let area = WritingArea::new(16, 8, 300, 190);
    assert_snapshot!(report(&FeatureReport::writing_area(&TABLE, &area)), @"2A: 10 00 08 00 2C 01 BE 00");
}

#[test]
fn test_snapshot_pen_width() {
    assert_snapshot!(report(&FeatureReport::pen_color_and_width(&TABLE, 2)), @"2D: 00 00 00 02");
}

#[test]
fn test_snapshot_background_color() -> Result<(), stu::ColorFormatError> {
    let r = FeatureReport::background_color(&TABLE, "#1a2b3c")?;
    assert_snapshot!(report(&r), @"2E: 1A 2B 3C");
    Ok(())
}

#[test]
fn test_snapshot_brightness() {
    assert_snapshot!(report(&FeatureReport::brightness(&TABLE, 0xC8)), @"2B: C8 00");
}

#[test]
fn test_snapshot_single_byte_commands() {
    let lines = [
        FeatureReport::writing_mode(&TABLE, 1),
        FeatureReport::inking(&TABLE, true),
        FeatureReport::inking(&TABLE, false),
        FeatureReport::clear_screen(&TABLE),
    ]
    .iter()
    .map(report)
    .collect::<Vec<_>>()
    .join(" | ");
    assert_snapshot!(lines, @"0E: 01 | 21: 01 | 21: 00 | 20: 00");
}

#[test]
fn test_snapshot_small_image_transfer() -> Result<(), stu::BitmapError> {
    let job = stu::ImageTransferJob::new(vec![0xFF, 0x00, 0xAA], &DeviceConfig::STU_430);
    let lines = job
        .reports(&TABLE)?
        .iter()
        .map(report)
        .collect::<Vec<_>>()
        .join(" | ");
    assert_snapshot!(lines, @"25: 10 | 26: 03 00 FF 00 AA | 27: 00");
    Ok(())
}

#[test]
fn test_snapshot_decoded_pen_sample() -> Result<(), stu::PenReportError> {
    let raw = [0x03, 0x00, 0x64, 0x00, 0x32, 0x00, 0xF4, 0x01, 0x07, 0x00];
    let sample = stu::decode_pen_report(0x34, &raw, &TABLE, &DeviceConfig::STU_430)?;
    let text = match sample {
        Some(s) => format!(
            "ready={} switch={} x={} y={} pressure={:.5} ts={:?} seq={:?}",
            s.ready, s.switch_pressed, s.x, s.y, s.pressure, s.timestamp, s.sequence
        ),
        None => "ignored".to_string(),
    };
    assert_snapshot!(text, @"ready=true switch=true x=100 y=50 pressure=0.00293 ts=Some(500) seq=Some(7)");
    Ok(())
}
