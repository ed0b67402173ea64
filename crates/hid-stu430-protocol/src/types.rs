//! Device configuration and decoded value types.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU16;

const fn non_zero(value: u16) -> NonZeroU16 {
    match NonZeroU16::new(value) {
        Some(v) => v,
        None => NonZeroU16::MIN,
    }
}

/// Fixed device parameters. The STU-430 does not report its own
/// capabilities, so these are constants rather than discovered values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub name: &'static str,
    pub tablet_width: u16,
    pub tablet_height: u16,
    /// Divisor turning the raw pressure word into 0.0 … 1.0.
    pub pressure_factor: NonZeroU16,
    /// Divisor from raw digitizer units to screen pixels.
    pub scale_factor: NonZeroU16,
    /// Largest image-data chunk the device accepts, in bytes.
    pub chunk_size: u16,
    /// Luma cut-off when reducing grayscale artwork to 1-bit.
    pub luma_threshold: u8,
    /// Format code carried by the image-start report.
    pub image_format_code: u8,
}

impl DeviceConfig {
    pub const STU_430: Self = Self {
        name: "STU-430",
        tablet_width: 320,
        tablet_height: 200,
        pressure_factor: non_zero(1023),
        scale_factor: non_zero(1),
        chunk_size: 253,
        luma_threshold: 127,
        image_format_code: crate::image::IMAGE_FORMAT_MONOCHROME_BULK,
    };

    /// Size in bytes of a full-screen 1-bit bitmap.
    pub const fn bitmap_len(&self) -> usize {
        (self.tablet_width as usize).div_ceil(8) * self.tablet_height as usize
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::STU_430
    }
}

/// Inking rectangle in screen pixels, inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WritingArea {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl WritingArea {
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The whole screen of `config`.
    pub const fn full(config: &DeviceConfig) -> Self {
        Self::new(
            0,
            0,
            config.tablet_width.saturating_sub(1),
            config.tablet_height.saturating_sub(1),
        )
    }
}

/// One decoded digitizer reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenSample {
    /// Pen in proximity.
    pub ready: bool,
    /// Tip switch pressed.
    pub switch_pressed: bool,
    pub x: u16,
    pub y: u16,
    pub pressure: f32,
    pub scaled_x: u16,
    pub scaled_y: u16,
    /// Device timestamp, timed reports only.
    pub timestamp: Option<u16>,
    /// Device sequence number, timed reports only.
    pub sequence: Option<u16>,
}

/// One encoded outbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureReport {
    pub report_id: u8,
    pub payload: Vec<u8>,
}

impl FeatureReport {
    pub fn new(report_id: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            report_id,
            payload: payload.into(),
        }
    }
}
