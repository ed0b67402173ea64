//! Cross-reference tests for the STU-430 VID/PID and report ID constants.
//!
//! If any assertion fails, the device will no longer be found or will
//! misinterpret commands. Change `ids.rs` only against a fresh USB capture.

use signpad_hid_stu430_protocol::ids::report_ids;
use signpad_hid_stu430_protocol::{CommandTable, DeviceConfig, PRODUCT_STU_430, STU_430, VENDOR_ID};

#[test]
fn vendor_id_is_056a() {
    assert_eq!(VENDOR_ID, 0x056A, "Wacom VID changed");
    assert_eq!(VENDOR_ID, 1386);
}

#[test]
fn stu430_pid_is_00a4() {
    assert_eq!(PRODUCT_STU_430, 0x00A4);
    assert_eq!(PRODUCT_STU_430, 164);
}

#[test]
fn identity_matches_constants() {
    assert_eq!(STU_430.vendor_id, VENDOR_ID);
    assert_eq!(STU_430.product_id, PRODUCT_STU_430);
    assert_eq!(STU_430.to_string(), "056a:00a4");
}

// ── Report IDs ──────────────────────────────────────────────────────────────

#[test]
fn report_ids_match_wire_values() {
    let expected: [(&str, u8); 12] = [
        ("penData", 0x01),
        ("writingMode", 0x0E),
        ("clearScreen", 0x20),
        ("inkMode", 0x21),
        ("writeImageStart", 0x25),
        ("writeImageData", 0x26),
        ("writeImageEnd", 0x27),
        ("writingArea", 0x2A),
        ("brightness", 0x2B),
        ("penColorAndWidth", 0x2D),
        ("backgroundColor", 0x2E),
        ("penDataTiming", 0x34),
    ];
    assert_eq!(CommandTable::STU_430.entries(), expected);
}

#[test]
fn report_id_module_agrees_with_table() {
    let table = CommandTable::default();
    assert_eq!(table.pen_data, report_ids::PEN_DATA);
    assert_eq!(table.pen_data_timing, report_ids::PEN_DATA_TIMING);
    assert_eq!(table.write_image_data, report_ids::WRITE_IMAGE_DATA);
    assert!(table.has_distinct_ids());
}

#[test]
fn default_config_is_stu430() {
    assert_eq!(DeviceConfig::default(), DeviceConfig::STU_430);
    assert_eq!(DeviceConfig::default().bitmap_len(), 8000);
}
