//! Property tests for the STU-430 protocol.
//!
//! Verifies codec, decoder and framing invariants across a wide range of
//! inputs using `proptest`.

use proptest::prelude::*;
use signpad_hid_stu430_protocol as stu;
use stu::{CommandTable, DeviceConfig, ImageTransferJob, WritingArea};

const TABLE: CommandTable = CommandTable::STU_430;
const CONFIG: DeviceConfig = DeviceConfig::STU_430;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The writing-area payload reads back as the same four LE words.
    #[test]
    fn prop_writing_area_roundtrips(x1: u16, y1: u16, x2: u16, y2: u16) {
        let bytes = stu::encode_writing_area(&WritingArea::new(x1, y1, x2, y2));
        let words: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        prop_assert_eq!(words, vec![x1, y1, x2, y2]);
    }

    #[test]
    fn prop_pen_width_is_last_byte(width: u8) {
        prop_assert_eq!(stu::encode_pen_color_and_width(width), [0, 0, 0, width]);
    }

    /// Every 6-digit hex string parses, with or without '#'.
    #[test]
    fn prop_background_color_parses(r: u8, g: u8, b: u8, hash: bool) {
        let text = format!("{}{r:02x}{g:02X}{b:02x}", if hash { "#" } else { "" });
        prop_assert_eq!(stu::encode_background_color(&text), Ok([r, g, b]));
    }

    /// Arbitrary strings never panic the color parser.
    #[test]
    fn prop_background_color_never_panics(text in ".{0,12}") {
        let _outcome = stu::encode_background_color(&text);
    }

    /// Chunking preserves order and content, and only the last chunk is short.
    #[test]
    fn prop_chunks_concatenate(image in proptest::collection::vec(any::<u8>(), 0..3000)) {
        let chunks: Vec<&[u8]> = stu::split_into_chunks(&image, CONFIG.chunk_size).collect();
        prop_assert_eq!(chunks.len(), image.len().div_ceil(253));
        if let Some((last, full)) = chunks.split_last() {
            prop_assert!(full.iter().all(|c| c.len() == 253));
            prop_assert!(!last.is_empty() && last.len() <= 253);
        }
        prop_assert_eq!(chunks.concat(), image);
    }

    /// start, N data, end, and every data payload carries its own length.
    #[test]
    fn prop_transfer_shape(image in proptest::collection::vec(any::<u8>(), 0..3000)) {
        let job = ImageTransferJob::new(image.clone(), &CONFIG);
        let reports = job.reports(&TABLE).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(reports.len(), image.len().div_ceil(253) + 2);
        prop_assert_eq!(reports.first().map(|r| r.report_id), Some(0x25));
        prop_assert_eq!(reports.last().map(|r| r.report_id), Some(0x27));

        let mut rebuilt = Vec::new();
        for r in &reports[1..reports.len() - 1] {
            prop_assert_eq!(r.report_id, 0x26);
            let len = usize::from(u16::from_le_bytes([r.payload[0], r.payload[1]]));
            prop_assert_eq!(len, r.payload.len() - 2);
            rebuilt.extend_from_slice(&r.payload[2..]);
        }
        prop_assert_eq!(rebuilt, image);
    }

    /// The decoder never panics on arbitrary input.
    #[test]
    fn prop_decode_never_panics(
        report_id: u8,
        raw in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let _outcome = stu::decode_pen_report(report_id, &raw, &TABLE, &CONFIG);
    }

    /// Non-pen report IDs are always ignored, whatever their length.
    #[test]
    fn prop_non_pen_ids_ignored(
        report_id in any::<u8>().prop_filter("not pen data", |id| *id != 0x01 && *id != 0x34),
        raw in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assert_eq!(stu::decode_pen_report(report_id, &raw, &TABLE, &CONFIG), Ok(None));
    }

    /// Plain reports decode the documented fields and never carry timing.
    #[test]
    fn prop_plain_report_fields(status: u8, hi: u8, x: u16, y: u16) {
        let mut raw = vec![status, hi];
        raw.extend_from_slice(&x.to_le_bytes());
        raw.extend_from_slice(&y.to_le_bytes());
        let sample = stu::decode_pen_report(0x01, &raw, &TABLE, &CONFIG);
        let sample = sample.ok().flatten();
        prop_assert!(sample.is_some());
        if let Some(s) = sample {
            prop_assert_eq!(s.ready, status & 1 != 0);
            prop_assert_eq!(s.switch_pressed, status & 2 != 0);
            prop_assert_eq!((s.x, s.y), (x, y));
            prop_assert_eq!((s.scaled_x, s.scaled_y), (x, y));
            let word = f32::from(u16::from_le_bytes([status, hi]));
            prop_assert!((s.pressure - word / 1023.0).abs() < 1e-6);
            prop_assert_eq!((s.timestamp, s.sequence), (None, None));
        }
    }

    /// Timed reports always carry timestamp and sequence, including zero.
    #[test]
    fn prop_timed_report_fields(ts: u16, seq: u16) {
        let mut raw = vec![0u8; 6];
        raw.extend_from_slice(&ts.to_le_bytes());
        raw.extend_from_slice(&seq.to_le_bytes());
        let sample = stu::decode_pen_report(0x34, &raw, &TABLE, &CONFIG).ok().flatten();
        prop_assert_eq!(sample.map(|s| (s.timestamp, s.sequence)), Some((Some(ts), Some(seq))));
    }

    /// Short pen reports are rejected with the exact lengths.
    #[test]
    fn prop_short_pen_reports_rejected(len in 0usize..10, timed: bool) {
        let (id, need) = if timed { (0x34, 10) } else { (0x01, 6) };
        prop_assume!(len < need);
        let raw = vec![0u8; len];
        prop_assert_eq!(
            stu::decode_pen_report(id, &raw, &TABLE, &CONFIG),
            Err(stu::PenReportError::MalformedReport { report_id: id, got: len, need })
        );
    }

    /// Packed bitmaps have one padded row stride per scanline.
    #[test]
    fn prop_pack_monochrome_size(width in 0usize..64, height in 0usize..16, seed: u8) {
        let luma: Vec<u8> = (0..width * height).map(|i| (i as u8).wrapping_mul(seed)).collect();
        let packed = stu::pack_monochrome(&luma, width, height, 127);
        prop_assert_eq!(packed.map(|p| p.len()), Ok(width.div_ceil(8) * height));
    }
}
