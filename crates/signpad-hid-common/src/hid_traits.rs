//! HID transport traits

use crate::{DeviceEvent, DeviceIdentity, HidCommonResult, HidDeviceInfo};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Inbound report as delivered by the transport: the report ID and the bytes
/// that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputReport {
    pub report_id: u8,
    pub data: Vec<u8>,
}

impl InputReport {
    pub fn new(report_id: u8, data: impl Into<Vec<u8>>) -> Self {
        Self {
            report_id,
            data: data.into(),
        }
    }

    /// Split a raw read buffer whose first byte is the report ID.
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        let (&report_id, data) = raw.split_first()?;
        Some(Self::new(report_id, data))
    }
}

/// One device handle handed out by a [`HidPort`].
///
/// The handle is owned exclusively by whoever requested it; dropping it is the
/// transport's cue to close the underlying device.
#[async_trait]
pub trait HidDevice: Send + Sync {
    fn info(&self) -> &HidDeviceInfo;

    fn is_open(&self) -> bool;

    async fn open(&mut self) -> HidCommonResult<()>;

    /// Send a feature report. `payload` excludes the report ID byte.
    async fn send_feature_report(&mut self, report_id: u8, payload: &[u8]) -> HidCommonResult<()>;

    /// Start delivering inbound reports. Delivery stops when the receiver is
    /// dropped or the handle is torn down.
    fn input_reports(&mut self) -> HidCommonResult<mpsc::Receiver<InputReport>>;
}

#[async_trait]
pub trait HidPort: Send + Sync {
    /// Ask for devices matching `identity`. An empty list means nothing was
    /// granted or attached.
    async fn request_device(
        &self,
        identity: DeviceIdentity,
    ) -> HidCommonResult<Vec<Box<dyn HidDevice>>>;

    /// Subscribe to attach/detach notifications for `identity`. Implementations
    /// may deliver events for other devices too; subscribers filter.
    async fn monitor_devices(
        &self,
        identity: DeviceIdentity,
    ) -> HidCommonResult<mpsc::Receiver<DeviceEvent>>;
}

pub mod mock {
    use super::*;
    use crate::HidCommonError;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const INPUT_QUEUE_DEPTH: usize = 64;
    const EVENT_QUEUE_DEPTH: usize = 100;

    #[derive(Default)]
    struct MockDeviceState {
        open: AtomicBool,
        open_calls: AtomicUsize,
        fail_open: AtomicBool,
        fail_writes: AtomicBool,
        writes: Mutex<Vec<(u8, Vec<u8>)>>,
        input_tx: Mutex<Option<mpsc::Sender<InputReport>>>,
    }

    /// In-memory device. Clones share state, so a test can keep one clone for
    /// inspection while the session owns another.
    #[derive(Clone)]
    pub struct MockHidDevice {
        info: HidDeviceInfo,
        state: Arc<MockDeviceState>,
    }

    impl MockHidDevice {
        pub fn new(identity: DeviceIdentity, path: impl Into<String>) -> Self {
            Self {
                info: HidDeviceInfo::new(identity, path),
                state: Arc::new(MockDeviceState::default()),
            }
        }

        /// Push an inbound report to whoever subscribed via `input_reports`.
        /// Returns `false` if nobody is listening.
        pub fn inject_input(&self, report: InputReport) -> bool {
            let guard = self.state.input_tx.lock();
            match guard.as_ref() {
                Some(tx) => tx.try_send(report).is_ok(),
                None => false,
            }
        }

        pub fn write_history(&self) -> Vec<(u8, Vec<u8>)> {
            self.state.writes.lock().clone()
        }

        pub fn write_count(&self) -> usize {
            self.state.writes.lock().len()
        }

        pub fn open_count(&self) -> usize {
            self.state.open_calls.load(Ordering::SeqCst)
        }

        pub fn set_fail_open(&self, fail: bool) {
            self.state.fail_open.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.state.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Simulate the device going away underneath an open handle.
        pub fn close(&self) {
            self.state.open.store(false, Ordering::SeqCst);
            self.state.input_tx.lock().take();
        }
    }

    #[async_trait]
    impl HidDevice for MockHidDevice {
        fn info(&self) -> &HidDeviceInfo {
            &self.info
        }

        fn is_open(&self) -> bool {
            self.state.open.load(Ordering::SeqCst)
        }

        async fn open(&mut self) -> HidCommonResult<()> {
            self.state.open_calls.fetch_add(1, Ordering::SeqCst);
            if self.state.fail_open.load(Ordering::SeqCst) {
                return Err(HidCommonError::OpenError(self.info.path.clone()));
            }
            self.state.open.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn send_feature_report(
            &mut self,
            report_id: u8,
            payload: &[u8],
        ) -> HidCommonResult<()> {
            if !self.is_open() {
                return Err(HidCommonError::Disconnected);
            }
            if self.state.fail_writes.load(Ordering::SeqCst) {
                return Err(HidCommonError::WriteError(format!(
                    "report 0x{report_id:02X} rejected"
                )));
            }
            self.state.writes.lock().push((report_id, payload.to_vec()));
            Ok(())
        }

        fn input_reports(&mut self) -> HidCommonResult<mpsc::Receiver<InputReport>> {
            if !self.is_open() {
                return Err(HidCommonError::Disconnected);
            }
            let (tx, rx) = mpsc::channel(INPUT_QUEUE_DEPTH);
            *self.state.input_tx.lock() = Some(tx);
            Ok(rx)
        }
    }

    #[derive(Default)]
    pub struct MockHidPort {
        devices: Vec<MockHidDevice>,
        request_calls: AtomicUsize,
        monitors: Mutex<Vec<mpsc::Sender<DeviceEvent>>>,
    }

    impl MockHidPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_device(&mut self, device: MockHidDevice) {
            self.devices.push(device);
        }

        pub fn with_device(mut self, device: MockHidDevice) -> Self {
            self.add_device(device);
            self
        }

        pub fn device_count(&self) -> usize {
            self.devices.len()
        }

        pub fn request_count(&self) -> usize {
            self.request_calls.load(Ordering::SeqCst)
        }

        pub fn monitor_count(&self) -> usize {
            self.monitors.lock().len()
        }

        /// Broadcast a hot-plug event to every live subscriber. Returns how
        /// many subscribers accepted it.
        pub fn emit(&self, event: DeviceEvent) -> usize {
            let mut monitors = self.monitors.lock();
            monitors.retain(|tx| !tx.is_closed());
            monitors
                .iter()
                .filter(|tx| tx.try_send(event.clone()).is_ok())
                .count()
        }
    }

    #[async_trait]
    impl HidPort for MockHidPort {
        async fn request_device(
            &self,
            identity: DeviceIdentity,
        ) -> HidCommonResult<Vec<Box<dyn HidDevice>>> {
            self.request_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .devices
                .iter()
                .filter(|d| d.info.matches(identity))
                .map(|d| Box::new(d.clone()) as Box<dyn HidDevice>)
                .collect())
        }

        async fn monitor_devices(
            &self,
            _identity: DeviceIdentity,
        ) -> HidCommonResult<mpsc::Receiver<DeviceEvent>> {
            let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
            self.monitors.lock().push(tx);
            Ok(rx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockHidDevice, MockHidPort};
    use super::*;
    use crate::HidCommonError;

    const STU: DeviceIdentity = DeviceIdentity::new(0x056A, 0x00A4);

    #[test]
    fn test_input_report_from_raw() {
        let report = InputReport::from_raw(&[0x01, 0xAA, 0xBB]).expect("non-empty buffer");
        assert_eq!(report.report_id, 0x01);
        assert_eq!(report.data, vec![0xAA, 0xBB]);
        assert!(InputReport::from_raw(&[]).is_none());
    }

    #[tokio::test]
    async fn test_mock_device_write_requires_open() {
        let mut device = MockHidDevice::new(STU, "/dev/hidraw0");
        let result = device.send_feature_report(0x20, &[0]).await;
        assert!(matches!(result, Err(HidCommonError::Disconnected)));

        device.open().await.expect("open should succeed");
        device
            .send_feature_report(0x20, &[0])
            .await
            .expect("write should succeed");
        assert_eq!(device.write_history(), vec![(0x20, vec![0])]);
        assert_eq!(device.open_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_device_input_delivery() {
        let mut device = MockHidDevice::new(STU, "/dev/hidraw0");
        let pad = device.clone();
        assert!(!pad.inject_input(InputReport::new(0x01, vec![0u8; 6])));

        device.open().await.expect("open should succeed");
        let mut rx = device.input_reports().expect("subscribe");
        assert!(pad.inject_input(InputReport::new(0x01, vec![1u8; 6])));
        let report = rx.recv().await.expect("report delivered");
        assert_eq!(report.data, vec![1u8; 6]);
    }

    #[tokio::test]
    async fn test_mock_port_filters_by_identity() {
        let port = MockHidPort::new()
            .with_device(MockHidDevice::new(STU, "/dev/hidraw0"))
            .with_device(MockHidDevice::new(
                DeviceIdentity::new(0x1234, 0x5678),
                "/dev/hidraw1",
            ));
        assert_eq!(port.device_count(), 2);

        let granted = port.request_device(STU).await.expect("request");
        assert_eq!(granted.len(), 1);
        assert_eq!(port.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_port_emit_reaches_monitor() {
        let port = MockHidPort::new();
        let mut rx = port.monitor_devices(STU).await.expect("monitor");
        let info = HidDeviceInfo::new(STU, "/dev/hidraw0");
        assert_eq!(port.emit(DeviceEvent::Connected(info.clone())), 1);
        assert_eq!(rx.recv().await, Some(DeviceEvent::Connected(info)));

        drop(rx);
        let gone = HidDeviceInfo::new(STU, "/dev/hidraw0");
        assert_eq!(port.emit(DeviceEvent::Disconnected(gone)), 0);
        assert_eq!(port.monitor_count(), 0);
    }
}
