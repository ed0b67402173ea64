//! Command implementations

pub mod capture;
pub mod device;
pub mod display;

use anyhow::{Context, Result};
use signpad_hid_common::DeviceIdentity;
use signpad_hid_common::hidapi_port::HidApiPort;
use signpad_session::{CommandOutcome, Session, SessionError};
use std::sync::Arc;
use tracing::debug;

use crate::error::CliError;

pub use capture::CaptureArgs;
pub use display::{ConfigureArgs, ImageArgs};

/// Open a session on the first device matching `identity`.
pub async fn open_session(identity: DeviceIdentity) -> Result<Session> {
    let port = HidApiPort::new().context("Failed to initialize HidApi")?;
    let mut session = Session::with_identity(Arc::new(port), identity);
    match session.connect().await {
        Ok(()) => {
            debug!(identity = %identity, "Session open");
            Ok(session)
        }
        Err(SessionError::NoDeviceGranted { identity }) => {
            Err(CliError::DeviceNotFound(identity.to_string()).into())
        }
        Err(err) => Err(err).context("Failed to connect to signature pad"),
    }
}

/// Treat a dropped command as a lost device.
pub fn require_sent(outcome: CommandOutcome, what: &'static str) -> Result<()> {
    match outcome {
        CommandOutcome::Sent | CommandOutcome::Skipped => Ok(()),
        CommandOutcome::NotConnected => Err(CliError::Disconnected(what).into()),
    }
}

/// Parse a hex VID/PID with or without a `0x` prefix.
pub fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let s = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(s, 16).map_err(|e| format!("invalid hex value '{s}': {e}"))
}
