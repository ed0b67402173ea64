//! Device session for the Wacom STU-430 signature pad.
//!
//! ```no_run
//! # async fn demo(port: std::sync::Arc<dyn signpad_hid_common::HidPort>)
//! #     -> Result<(), signpad_session::SessionError> {
//! use signpad_session::Session;
//!
//! let mut session = Session::new(port);
//! session.on_pen_data(|sample| println!("{} {} {:.3}", sample.x, sample.y, sample.pressure));
//! session.connect().await?;
//! session.clear_screen().await?;
//! session.set_inking(true).await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::{
    CommandOutcome, HotplugCallback, HotplugEvent, HotplugKind, PenCallback, Session,
    SessionState,
};
