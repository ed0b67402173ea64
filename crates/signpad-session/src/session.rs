//! STU-430 device session.
//!
//! A [`Session`] owns at most one device handle. Commands are encoded with
//! `signpad-hid-stu430-protocol` and written through the [`HidDevice`] the
//! port granted. Inbound reports are decoded on a background task and handed
//! to the pen callback; hot-plug notifications are dispatched from a second
//! task once a hot-plug callback is registered.

use crate::error::{SessionError, SessionResult};
use parking_lot::RwLock;
use serde::Serialize;
use signpad_hid_common::{
    DeviceEvent, DeviceIdentity, HidDevice, HidDeviceInfo, HidPort, InputReport,
};
use signpad_hid_stu430_protocol::{
    CommandTable, DeviceConfig, FeatureReport, ImageTransferJob, PenSample, STU_430, WritingArea,
    decode_pen_report,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Result of a write command that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Every report was accepted by the transport.
    Sent,
    /// No device is connected; nothing was written.
    NotConnected,
    /// Nothing to send (image re-send with no retained image).
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HotplugKind {
    Connect,
    Disconnect,
}

impl HotplugKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HotplugKind::Connect => "connect",
            HotplugKind::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for HotplugKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotplugEvent {
    pub kind: HotplugKind,
    pub device: HidDeviceInfo,
}

impl From<DeviceEvent> for HotplugEvent {
    fn from(event: DeviceEvent) -> Self {
        match event {
            DeviceEvent::Connected(device) => Self {
                kind: HotplugKind::Connect,
                device,
            },
            DeviceEvent::Disconnected(device) => Self {
                kind: HotplugKind::Disconnect,
                device,
            },
        }
    }
}

pub type PenCallback = Arc<dyn Fn(PenSample) + Send + Sync>;
pub type HotplugCallback = Arc<dyn Fn(HotplugEvent) + Send + Sync>;

type CallbackSlot<T> = Arc<RwLock<Option<T>>>;

pub struct Session {
    port: Arc<dyn HidPort>,
    identity: DeviceIdentity,
    config: DeviceConfig,
    command_table: CommandTable,
    state: SessionState,
    device: Option<Box<dyn HidDevice>>,
    pen_callback: CallbackSlot<PenCallback>,
    hotplug_callback: CallbackSlot<HotplugCallback>,
    image_job: Option<ImageTransferJob>,
    writing_area: Option<WritingArea>,
    listener: Option<JoinHandle<()>>,
    hotplug_task: Option<JoinHandle<()>>,
}

impl Session {
    /// Session for the STU-430 on `port`.
    pub fn new(port: Arc<dyn HidPort>) -> Self {
        Self::with_identity(port, STU_430)
    }

    /// Session for a device answering to `identity` but speaking the STU-430
    /// protocol.
    pub fn with_identity(port: Arc<dyn HidPort>, identity: DeviceIdentity) -> Self {
        Self {
            port,
            identity,
            config: DeviceConfig::STU_430,
            command_table: CommandTable::STU_430,
            state: SessionState::Disconnected,
            device: None,
            pen_callback: Arc::new(RwLock::new(None)),
            hotplug_callback: Arc::new(RwLock::new(None)),
            image_job: None,
            writing_area: None,
            listener: None,
            hotplug_task: None,
        }
    }

    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn command_table(&self) -> &CommandTable {
        &self.command_table
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Last writing area sent, if any.
    pub fn writing_area(&self) -> Option<WritingArea> {
        self.writing_area
    }

    /// Info of the granted device while one is held.
    pub fn device_info(&self) -> Option<&HidDeviceInfo> {
        self.device.as_ref().map(|device| device.info())
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
            && self.device.as_ref().is_some_and(|device| device.is_open())
    }

    /// Request, open and start listening to the device.
    ///
    /// Already connected is a successful no-op that performs no transport
    /// calls.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoDeviceGranted`] if the port offers no matching device,
    /// [`SessionError::TransportFailure`] if requesting, opening or subscribing
    /// fails. The session is `Disconnected` afterwards in both cases.
    pub async fn connect(&mut self) -> SessionResult<()> {
        if self.is_connected() {
            debug!(identity = %self.identity, "Already connected");
            return Ok(());
        }

        // Device vanished under a previous connection: drop the stale handle.
        self.release_device();
        self.state = SessionState::Connecting;
        debug!(identity = %self.identity, "Requesting device");

        match self.open_first_device().await {
            Ok(()) => {
                self.state = SessionState::Connected;
                if let Some(info) = self.device_info() {
                    info!(
                        device = %info.display_name(),
                        path = %info.path,
                        "Signature pad connected"
                    );
                }
                Ok(())
            }
            Err(err) => {
                self.release_device();
                warn!(identity = %self.identity, error = %err, "Connect failed");
                Err(err)
            }
        }
    }

    async fn open_first_device(&mut self) -> SessionResult<()> {
        let granted = self
            .port
            .request_device(self.identity)
            .await
            .map_err(SessionError::transport)?;

        let Some(mut device) = granted.into_iter().next() else {
            return Err(SessionError::NoDeviceGranted {
                identity: self.identity,
            });
        };

        device.open().await.map_err(SessionError::transport)?;
        let reports = device.input_reports().map_err(SessionError::transport)?;

        self.listener = Some(tokio::spawn(listen_for_reports(
            reports,
            self.command_table,
            self.config,
            Arc::clone(&self.pen_callback),
        )));
        self.device = Some(device);
        Ok(())
    }

    /// Drop the device handle and stop the report listener.
    pub fn disconnect(&mut self) {
        if self.device.is_some() {
            debug!(identity = %self.identity, "Disconnecting");
        }
        self.release_device();
    }

    fn release_device(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        self.device = None;
        self.state = SessionState::Disconnected;
    }

    /// Register (or replace) the pen sample callback.
    pub fn on_pen_data<F>(&self, callback: F)
    where
        F: Fn(PenSample) + Send + Sync + 'static,
    {
        *self.pen_callback.write() = Some(Arc::new(callback));
    }

    /// Register (or replace) the hot-plug callback.
    ///
    /// The first registration subscribes to the port's hot-plug stream; the
    /// subscription lives as long as the session. Events for other devices
    /// are filtered out. Delivery does not depend on the connection state.
    ///
    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if the port cannot be monitored.
    pub async fn on_hotplug<F>(&mut self, callback: F) -> SessionResult<()>
    where
        F: Fn(HotplugEvent) + Send + Sync + 'static,
    {
        *self.hotplug_callback.write() = Some(Arc::new(callback));

        if self.hotplug_task.is_none() {
            let events = self
                .port
                .monitor_devices(self.identity)
                .await
                .map_err(SessionError::transport)?;
            self.hotplug_task = Some(tokio::spawn(dispatch_hotplug(
                events,
                self.identity,
                Arc::clone(&self.hotplug_callback),
            )));
            debug!(identity = %self.identity, "Hot-plug monitoring started");
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if the write fails.
    pub async fn set_writing_area(&mut self, area: WritingArea) -> SessionResult<CommandOutcome> {
        let report = FeatureReport::writing_area(&self.command_table, &area);
        let outcome = self.send(report).await?;
        if outcome == CommandOutcome::Sent {
            self.writing_area = Some(area);
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if the write fails.
    pub async fn set_writing_mode(&mut self, mode: u8) -> SessionResult<CommandOutcome> {
        let report = FeatureReport::writing_mode(&self.command_table, mode);
        self.send(report).await
    }

    /// Ink is always black on this device; only the width is configurable.
    ///
    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if the write fails.
    pub async fn set_pen_color_and_width(&mut self, width: u8) -> SessionResult<CommandOutcome> {
        let report = FeatureReport::pen_color_and_width(&self.command_table, width);
        self.send(report).await
    }

    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if the write fails.
    pub async fn set_inking(&mut self, enabled: bool) -> SessionResult<CommandOutcome> {
        let report = FeatureReport::inking(&self.command_table, enabled);
        self.send(report).await
    }

    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if the write fails.
    pub async fn clear_screen(&mut self) -> SessionResult<CommandOutcome> {
        let report = FeatureReport::clear_screen(&self.command_table);
        self.send(report).await
    }

    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if the write fails.
    pub async fn set_backlight(&mut self, intensity: u8) -> SessionResult<CommandOutcome> {
        let report = FeatureReport::brightness(&self.command_table, intensity);
        self.send(report).await
    }

    /// `hex` is `"#rrggbb"` or `"rrggbb"`.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidColorFormat`] for a malformed color (only
    /// checked while connected), [`SessionError::TransportFailure`] if the
    /// write fails.
    pub async fn set_background_color(&mut self, hex: &str) -> SessionResult<CommandOutcome> {
        if !self.is_connected() {
            return Ok(self.not_connected("backgroundColor"));
        }
        let report = FeatureReport::background_color(&self.command_table, hex)?;
        self.send(report).await
    }

    /// Upload a packed 1-bit bitmap.
    ///
    /// A non-empty `image` replaces the retained bitmap. `None` re-sends the
    /// retained bitmap, or does nothing if there is none. An empty slice
    /// writes nothing and leaves the retained bitmap alone.
    ///
    /// # Errors
    ///
    /// [`SessionError::TransportFailure`] if any report of the transfer fails;
    /// the remaining reports are not sent. [`SessionError::Bitmap`] if a chunk
    /// cannot be framed.
    pub async fn set_image(&mut self, image: Option<&[u8]>) -> SessionResult<CommandOutcome> {
        if !self.is_connected() {
            return Ok(self.not_connected("writeImage"));
        }
        match image {
            Some([]) => {
                debug!("Empty image, nothing to send");
                return Ok(CommandOutcome::Skipped);
            }
            Some(bitmap) => self.image_job = Some(ImageTransferJob::new(bitmap, &self.config)),
            None => {}
        }
        let Some(job) = self.image_job.as_ref() else {
            debug!("No image to send");
            return Ok(CommandOutcome::Skipped);
        };

        debug!(
            bytes = job.image().len(),
            chunks = job.chunk_count(),
            "Sending image"
        );
        let reports = job.reports(&self.command_table)?;
        self.send_all(reports).await
    }

    async fn send(&mut self, report: FeatureReport) -> SessionResult<CommandOutcome> {
        self.send_all(vec![report]).await
    }

    async fn send_all(&mut self, reports: Vec<FeatureReport>) -> SessionResult<CommandOutcome> {
        if !self.is_connected() {
            let command = reports
                .first()
                .and_then(|r| self.command_table.name_of(r.report_id))
                .unwrap_or("unknown");
            return Ok(self.not_connected(command));
        }
        let Some(device) = self.device.as_mut() else {
            return Ok(CommandOutcome::NotConnected);
        };

        for report in &reports {
            trace!(
                report_id = report.report_id,
                len = report.payload.len(),
                "Sending feature report"
            );
            device
                .send_feature_report(report.report_id, &report.payload)
                .await
                .map_err(SessionError::on_report(report.report_id))?;
        }
        Ok(CommandOutcome::Sent)
    }

    fn not_connected(&self, command: &str) -> CommandOutcome {
        debug!(command, state = ?self.state, "Device not connected, command dropped");
        CommandOutcome::NotConnected
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        if let Some(task) = self.hotplug_task.take() {
            task.abort();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .field("device", &self.device_info())
            .field("writing_area", &self.writing_area)
            .field("has_image", &self.image_job.is_some())
            .finish_non_exhaustive()
    }
}

async fn listen_for_reports(
    mut reports: mpsc::Receiver<InputReport>,
    table: CommandTable,
    config: DeviceConfig,
    callback: CallbackSlot<PenCallback>,
) {
    while let Some(report) = reports.recv().await {
        match decode_pen_report(report.report_id, &report.data, &table, &config) {
            Ok(Some(sample)) => {
                // Clone out of the lock so the callback may re-register.
                let handler = callback.read().clone();
                if let Some(handler) = handler {
                    handler(sample);
                }
            }
            Ok(None) => {
                trace!(report_id = report.report_id, "Ignoring non-pen report");
            }
            Err(err) => {
                warn!(error = %err, "Dropping malformed pen report");
            }
        }
    }
    debug!("Input report stream closed");
}

async fn dispatch_hotplug(
    mut events: mpsc::Receiver<DeviceEvent>,
    identity: DeviceIdentity,
    callback: CallbackSlot<HotplugCallback>,
) {
    while let Some(event) = events.recv().await {
        if !event.device().matches(identity) {
            trace!(device = %event.device().identity(), "Ignoring hot-plug event for other device");
            continue;
        }
        let event = HotplugEvent::from(event);
        debug!(kind = %event.kind, path = %event.device.path, "Hot-plug event");
        let handler = callback.read().clone();
        if let Some(handler) = handler {
            handler(event);
        }
    }
    warn!(identity = %identity, "Hot-plug stream closed");
}
