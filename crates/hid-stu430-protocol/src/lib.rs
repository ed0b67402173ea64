//! Wacom STU-430 signature pad USB HID protocol.
//!
//! The STU-430 is a 320×200 monochrome LCD with an EMR pen digitizer. The
//! host drives it entirely with feature reports and receives pen samples as
//! input reports. This crate is I/O-free: it only turns commands into bytes
//! and bytes into samples. Transport lives in `signpad-hid-common`, and the
//! stateful session in `signpad-session`.
//!
//! # VID / PID
//! - Vendor ID: `0x056A` (Wacom Co., Ltd.)
//! - STU-430: `0x00A4`
//!
//! # Protocol overview
//! - **Commands** ([`output`]): one feature report each, fixed IDs in
//!   [`CommandTable`].
//! - **Pen data** ([`input`]): report `0x01` (6 bytes) or `0x34` (10 bytes,
//!   adds timestamp and sequence number).
//! - **Images** ([`image`]): start `0x25`, N × data `0x26`, end `0x27`, with
//!   253-byte chunks of a 1-bit 320×200 bitmap (8000 bytes).

#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod image;
pub mod input;
pub mod output;
pub mod types;

pub use ids::{CommandTable, PRODUCT_STU_430, STU_430, VENDOR_ID, is_stu430, product_name};
pub use image::{
    BitmapError, IMAGE_FORMAT_MONOCHROME_BULK, ImageTransferJob, begin_transfer, end_transfer,
    frame_chunk, pack_monochrome, split_into_chunks,
};
pub use input::{PEN_REPORT_LEN, PEN_TIMING_REPORT_LEN, PenReportError, decode_pen_report};
pub use output::{
    ColorFormatError, encode_background_color, encode_brightness, encode_clear_screen,
    encode_inking, encode_pen_color_and_width, encode_writing_area, encode_writing_mode,
};
pub use types::{DeviceConfig, FeatureReport, PenSample, WritingArea};
