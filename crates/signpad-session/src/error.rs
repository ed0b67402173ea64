use signpad_hid_common::{DeviceIdentity, HidCommonError};
use signpad_hid_stu430_protocol::{BitmapError, ColorFormatError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no device matching {identity} was granted")]
    NoDeviceGranted { identity: DeviceIdentity },

    #[error("transport failure{}: {source}", on_report_suffix(.report_id))]
    TransportFailure {
        report_id: Option<u8>,
        #[source]
        source: HidCommonError,
    },

    #[error(transparent)]
    InvalidColorFormat(#[from] ColorFormatError),

    #[error(transparent)]
    Bitmap(#[from] BitmapError),
}

impl SessionError {
    pub(crate) fn transport(source: HidCommonError) -> Self {
        Self::TransportFailure {
            report_id: None,
            source,
        }
    }

    pub(crate) fn on_report(report_id: u8) -> impl FnOnce(HidCommonError) -> Self {
        move |source| Self::TransportFailure {
            report_id: Some(report_id),
            source,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

fn on_report_suffix(report_id: &Option<u8>) -> String {
    report_id
        .map(|id| format!(" on report 0x{id:02X}"))
        .unwrap_or_default()
}
