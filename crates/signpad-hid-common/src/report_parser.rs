//! Little-endian report field readers and writers

use crate::{HidCommonError, HidCommonResult};

/// Cursor over a borrowed report buffer.
pub struct ReportParser<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn take<const N: usize>(&mut self) -> HidCommonResult<[u8; N]> {
        let end = self.position.saturating_add(N);
        let bytes = self
            .buffer
            .get(self.position..end)
            .and_then(|s| <[u8; N]>::try_from(s).ok())
            .ok_or_else(|| {
                HidCommonError::InvalidReport(format!(
                    "need {N} byte(s) at offset {}, {} remaining",
                    self.position,
                    self.remaining()
                ))
            })?;
        self.position = end;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> HidCommonResult<u8> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    pub fn read_u16_le(&mut self) -> HidCommonResult<u16> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    /// Read a little-endian u16 at `offset` without moving the cursor.
    pub fn peek_u16_le_at(&self, offset: usize) -> HidCommonResult<u16> {
        let bytes = self
            .buffer
            .get(offset..offset.saturating_add(2))
            .and_then(|s| <[u8; 2]>::try_from(s).ok())
            .ok_or_else(|| {
                HidCommonError::InvalidReport(format!("no u16 at offset {offset}"))
            })?;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.buffer.len());
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.buffer
    }
}

/// Growable payload writer.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    buffer: Vec<u8>,
}

impl ReportBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
