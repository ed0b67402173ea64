//! `hidapi`-backed transport
//!
//! Feature reports are written on the blocking pool; inbound reports are read
//! by a dedicated thread per open handle; hot-plug is detected by re-enumerating
//! every [`DEFAULT_POLL_INTERVAL`].

use crate::{
    DeviceEvent, DeviceIdentity, HidCommonError, HidCommonResult, HidDevice, HidDeviceInfo,
    HidPort, InputReport,
};
use async_trait::async_trait;
use hidapi::HidApi;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::CString;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

const READ_TIMEOUT_MS: i32 = 50;
const READ_BUFFER_LEN: usize = 64;
const INPUT_QUEUE_DEPTH: usize = 256;
const EVENT_QUEUE_DEPTH: usize = 100;

fn to_device_info(dev: &hidapi::DeviceInfo) -> HidDeviceInfo {
    let mut info = HidDeviceInfo::new(
        DeviceIdentity::new(dev.vendor_id(), dev.product_id()),
        dev.path().to_string_lossy().into_owned(),
    );
    info.serial_number = dev.serial_number().map(str::to_owned);
    info.manufacturer = dev.manufacturer_string().map(str::to_owned);
    info.product_name = dev.product_string().map(str::to_owned);
    info
}

/// Enumerate matching devices keyed by path. Multiple interfaces of one
/// device collapse onto their distinct paths.
fn enumerate(
    api: &Mutex<HidApi>,
    identity: Option<DeviceIdentity>,
) -> HidCommonResult<HashMap<CString, HidDeviceInfo>> {
    let mut api = api.lock();
    api.refresh_devices()
        .map_err(|e| HidCommonError::ReadError(format!("enumeration failed: {e}")))?;
    Ok(api
        .device_list()
        .filter(|dev| {
            identity.is_none_or(|id| {
                dev.vendor_id() == id.vendor_id && dev.product_id() == id.product_id
            })
        })
        .map(|dev| (dev.path().to_owned(), to_device_info(dev)))
        .collect())
}

pub struct HidApiPort {
    api: Arc<Mutex<HidApi>>,
    poll_interval: Duration,
}

impl HidApiPort {
    pub fn new() -> HidCommonResult<Self> {
        let api = HidApi::new()
            .map_err(|e| HidCommonError::OpenError(format!("failed to initialise hidapi: {e}")))?;
        Ok(Self {
            api: Arc::new(Mutex::new(api)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Every HID device currently attached, regardless of identity.
    pub fn list_devices(&self) -> HidCommonResult<Vec<HidDeviceInfo>> {
        let mut devices: Vec<_> = enumerate(&self.api, None)?.into_values().collect();
        devices.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(devices)
    }
}

#[async_trait]
impl HidPort for HidApiPort {
    async fn request_device(
        &self,
        identity: DeviceIdentity,
    ) -> HidCommonResult<Vec<Box<dyn HidDevice>>> {
        let api = Arc::clone(&self.api);
        let found = tokio::task::spawn_blocking(move || enumerate(&api, Some(identity)))
            .await
            .map_err(|e| HidCommonError::ReadError(format!("enumeration task failed: {e}")))??;

        debug!(%identity, count = found.len(), "hidapi enumeration");
        let mut devices: Vec<(CString, HidDeviceInfo)> = found.into_iter().collect();
        devices.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(devices
            .into_iter()
            .map(|(path, info)| {
                Box::new(HidApiDevice::new(Arc::clone(&self.api), path, info)) as Box<dyn HidDevice>
            })
            .collect())
    }

    async fn monitor_devices(
        &self,
        identity: DeviceIdentity,
    ) -> HidCommonResult<mpsc::Receiver<DeviceEvent>> {
        let (sender, receiver) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let api = Arc::clone(&self.api);
        let interval = self.poll_interval;

        let seed_api = Arc::clone(&api);
        let mut last = tokio::task::spawn_blocking(move || enumerate(&seed_api, Some(identity)))
            .await
            .map_err(|e| HidCommonError::ReadError(format!("enumeration task failed: {e}")))??;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if sender.is_closed() {
                    break;
                }

                let poll_api = Arc::clone(&api);
                let current =
                    match tokio::task::spawn_blocking(move || enumerate(&poll_api, Some(identity)))
                        .await
                    {
                        Ok(Ok(current)) => current,
                        Ok(Err(e)) => {
                            warn!("hot-plug enumeration failed: {e}");
                            continue;
                        }
                        Err(e) => {
                            warn!("hot-plug enumeration task failed: {e}");
                            continue;
                        }
                    };

                let attached = current
                    .iter()
                    .filter(|(path, _)| !last.contains_key(*path))
                    .map(|(_, info)| DeviceEvent::Connected(info.clone()));
                let detached = last
                    .iter()
                    .filter(|(path, _)| !current.contains_key(*path))
                    .map(|(_, info)| DeviceEvent::Disconnected(info.clone()));
                let events: Vec<DeviceEvent> = attached.chain(detached).collect();

                for event in events {
                    match sender.try_send(event) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(event)) => {
                            warn!(
                                "hot-plug channel full, dropping event for {}",
                                event.device().path
                            );
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => return,
                    }
                }
                last = current;
            }
            debug!(%identity, "hot-plug monitor stopped");
        });

        Ok(receiver)
    }
}

/// Handle to one hidraw path. Opening is deferred until [`HidDevice::open`].
pub struct HidApiDevice {
    api: Arc<Mutex<HidApi>>,
    path: CString,
    info: HidDeviceInfo,
    handle: Option<Arc<Mutex<hidapi::HidDevice>>>,
    reader_stop: Arc<AtomicBool>,
    /// Set by the reader when the device stops answering (unplugged).
    lost: Arc<AtomicBool>,
}

impl HidApiDevice {
    fn new(api: Arc<Mutex<HidApi>>, path: CString, info: HidDeviceInfo) -> Self {
        Self {
            api,
            path,
            info,
            handle: None,
            reader_stop: Arc::new(AtomicBool::new(false)),
            lost: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl HidDevice for HidApiDevice {
    fn info(&self) -> &HidDeviceInfo {
        &self.info
    }

    fn is_open(&self) -> bool {
        self.handle.is_some() && !self.lost.load(Ordering::SeqCst)
    }

    async fn open(&mut self) -> HidCommonResult<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        let api = Arc::clone(&self.api);
        let path = self.path.clone();
        let device = tokio::task::spawn_blocking(move || api.lock().open_path(&path))
            .await
            .map_err(|e| HidCommonError::OpenError(format!("open task failed: {e}")))?
            .map_err(|e| HidCommonError::OpenError(format!("{}: {e}", self.info.path)))?;
        self.handle = Some(Arc::new(Mutex::new(device)));
        self.lost.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn send_feature_report(&mut self, report_id: u8, payload: &[u8]) -> HidCommonResult<()> {
        let handle = self.handle.clone().ok_or(HidCommonError::Disconnected)?;
        let mut buf = Vec::with_capacity(payload.len().saturating_add(1));
        buf.push(report_id);
        buf.extend_from_slice(payload);
        tokio::task::spawn_blocking(move || handle.lock().send_feature_report(&buf))
            .await
            .map_err(|e| HidCommonError::WriteError(format!("write task failed: {e}")))?
            .map_err(|e| HidCommonError::WriteError(format!("report 0x{report_id:02X}: {e}")))
    }

    fn input_reports(&mut self) -> HidCommonResult<mpsc::Receiver<InputReport>> {
        let handle = self.handle.clone().ok_or(HidCommonError::Disconnected)?;
        let (tx, rx) = mpsc::channel(INPUT_QUEUE_DEPTH);

        self.reader_stop.store(true, Ordering::SeqCst);
        let stop = Arc::new(AtomicBool::new(false));
        self.reader_stop = Arc::clone(&stop);
        let lost = Arc::clone(&self.lost);
        let path = self.info.path.clone();

        std::thread::Builder::new()
            .name("signpad-hid-reader".into())
            .spawn(move || {
                let mut buf = [0u8; READ_BUFFER_LEN];
                while !stop.load(Ordering::SeqCst) {
                    let read = handle.lock().read_timeout(&mut buf, READ_TIMEOUT_MS);
                    match read {
                        Ok(0) => continue,
                        Ok(n) => {
                            let Some(report) = buf.get(..n).and_then(InputReport::from_raw) else {
                                continue;
                            };
                            if tx.blocking_send(report).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("input read on {path} failed, stopping reader: {e}");
                            lost.store(true, Ordering::SeqCst);
                            break;
                        }
                    }
                }
                debug!("input reader for {path} exited");
            })?;

        Ok(rx)
    }
}

impl Drop for HidApiDevice {
    fn drop(&mut self) {
        self.reader_stop.store(true, Ordering::SeqCst);
    }
}
