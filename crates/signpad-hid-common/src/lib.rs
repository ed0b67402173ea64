//! Common HID plumbing for signature pad drivers
//!
//! This crate provides the narrow transport surface a device session talks to:
//! device identity and hot-plug events, the async [`HidPort`] / [`HidDevice`]
//! traits, byte-level report helpers, an in-memory mock transport, and (with
//! the `hidapi` feature) a real backend.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod hid_traits;
pub mod report_parser;

#[cfg(feature = "hidapi")]
pub mod hidapi_port;

pub use device_info::*;
pub use hid_traits::*;
pub use report_parser::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Invalid report format: {0}")]
    InvalidReport(String),

    #[error("Device not open")]
    Disconnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;
