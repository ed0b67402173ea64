//! Device identity, enumeration info and hot-plug event types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vendor/product pair used to request a device and to filter hot-plug events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceIdentity {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub path: String,
}

impl HidDeviceInfo {
    pub fn new(identity: DeviceIdentity, path: impl Into<String>) -> Self {
        Self {
            vendor_id: identity.vendor_id,
            product_id: identity.product_id,
            serial_number: None,
            manufacturer: None,
            product_name: None,
            path: path.into(),
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.vendor_id, self.product_id)
    }

    pub fn matches(&self, identity: DeviceIdentity) -> bool {
        self.identity() == identity
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| self.identity().to_string())
    }
}

/// Attach/detach notification delivered by a [`crate::HidPort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Connected(HidDeviceInfo),
    Disconnected(HidDeviceInfo),
}

impl DeviceEvent {
    pub fn device(&self) -> &HidDeviceInfo {
        match self {
            DeviceEvent::Connected(info) | DeviceEvent::Disconnected(info) => info,
        }
    }
}
