//! Device enumeration

use anyhow::{Context, Result};
use signpad_hid_common::DeviceIdentity;
use signpad_hid_common::hidapi_port::HidApiPort;

use crate::output;

pub fn list(identity: DeviceIdentity, json: bool) -> Result<()> {
    let port = HidApiPort::new().context("Failed to initialize HidApi")?;
    let mut devices = port.list_devices().context("Failed to enumerate HID devices")?;
    devices.sort_by(|a, b| {
        b.matches(identity)
            .cmp(&a.matches(identity))
            .then_with(|| a.path.cmp(&b.path))
    });
    output::print_device_list(&devices, identity, json);
    Ok(())
}
