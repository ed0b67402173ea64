//! Bulk image transfer framing.
//!
//! A bitmap upload is a fixed sequence of feature reports:
//!
//! 1. `0x25` write-image-start, payload `[format_code]`
//! 2. `0x26` write-image-data, once per chunk: `[len_lo, len_hi, chunk...]`
//! 3. `0x27` write-image-end, payload `[0x00]`
//!
//! Chunks are at most `chunk_size` bytes; the last one may be shorter. An
//! empty bitmap produces no data reports at all.

use crate::ids::CommandTable;
use crate::types::{DeviceConfig, FeatureReport};
use signpad_hid_common::ReportBuilder;
use thiserror::Error;

/// Format code for a monochrome bulk upload.
pub const IMAGE_FORMAT_MONOCHROME_BULK: u8 = 0x10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitmapError {
    #[error("luma buffer has {got} pixels, expected {width}x{height} = {expected}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },

    #[error("chunk of {len} bytes does not fit a u16 length prefix")]
    ChunkTooLarge { len: usize },
}

pub fn begin_transfer(format_code: u8) -> [u8; 1] {
    [format_code]
}

/// Split `image` into consecutive chunks of at most `chunk_size` bytes.
///
/// A `chunk_size` of zero is treated as one.
pub fn split_into_chunks(image: &[u8], chunk_size: u16) -> impl Iterator<Item = &[u8]> {
    image.chunks(usize::from(chunk_size.max(1)))
}

/// Prefix one chunk with its length as a little-endian u16.
///
/// # Errors
///
/// [`BitmapError::ChunkTooLarge`] if the chunk is longer than `u16::MAX`.
pub fn frame_chunk(chunk: &[u8]) -> Result<Vec<u8>, BitmapError> {
    let len = u16::try_from(chunk.len())
        .map_err(|_overflow| BitmapError::ChunkTooLarge { len: chunk.len() })?;
    let mut builder = ReportBuilder::with_capacity(chunk.len() + 2);
    builder.write_u16_le(len).write_bytes(chunk);
    Ok(builder.into_inner())
}

pub fn end_transfer() -> [u8; 1] {
    [0]
}

/// A bitmap retained for (re)upload, with its chunking parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTransferJob {
    image: Vec<u8>,
    chunk_size: u16,
    format_code: u8,
}

impl ImageTransferJob {
    pub fn new(image: impl Into<Vec<u8>>, config: &DeviceConfig) -> Self {
        Self {
            image: image.into(),
            chunk_size: config.chunk_size.max(1),
            format_code: config.image_format_code,
        }
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.image.len().div_ceil(usize::from(self.chunk_size))
    }

    /// The complete start / data… / end report sequence.
    ///
    /// # Errors
    ///
    /// Propagates [`frame_chunk`] failures; chunks are bounded by the u16
    /// chunk size, so this only fails if that bound is broken.
    pub fn reports(&self, table: &CommandTable) -> Result<Vec<FeatureReport>, BitmapError> {
        let mut reports = Vec::with_capacity(self.chunk_count() + 2);
        reports.push(FeatureReport::new(
            table.write_image_start,
            begin_transfer(self.format_code),
        ));
        for chunk in split_into_chunks(&self.image, self.chunk_size) {
            reports.push(FeatureReport::new(table.write_image_data, frame_chunk(chunk)?));
        }
        reports.push(FeatureReport::new(table.write_image_end, end_transfer()));
        Ok(reports)
    }
}

/// Pack an 8-bit luma buffer into the device's 1-bit format.
///
/// Rows are packed MSB-first and padded to a whole byte. A set bit is a
/// background (white) pixel; pixels at or below `threshold` become ink.
pub fn pack_monochrome(
    luma: &[u8],
    width: usize,
    height: usize,
    threshold: u8,
) -> Result<Vec<u8>, BitmapError> {
    let expected = width.saturating_mul(height);
    if luma.len() != expected {
        return Err(BitmapError::SizeMismatch {
            width,
            height,
            expected,
            got: luma.len(),
        });
    }
    if width == 0 {
        return Ok(Vec::new());
    }

    let stride = width.div_ceil(8);
    let mut packed = vec![0u8; stride * height];
    for (row_in, row_out) in luma.chunks_exact(width).zip(packed.chunks_exact_mut(stride)) {
        for (byte_out, pixels) in row_out.iter_mut().zip(row_in.chunks(8)) {
            *byte_out = pixels
                .iter()
                .enumerate()
                .filter(|&(_, &value)| value > threshold)
                .fold(0u8, |acc, (bit, _)| acc | (0x80 >> bit));
        }
    }
    Ok(packed)
}
