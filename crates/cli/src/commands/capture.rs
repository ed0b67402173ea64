//! Pen sample capture

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use signpad_hid_common::DeviceIdentity;
use signpad_hid_stu430_protocol::PenSample;
use signpad_session::Session;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::{open_session, require_sent};
use crate::error::CliError;
use crate::output;

/// How often the capture loop checks that the pad is still attached.
const LINK_CHECK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Capture duration in seconds
    #[arg(short, long, default_value_t = 10)]
    pub duration: u64,

    /// Write captured samples as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Clear the screen before capturing
    #[arg(long)]
    pub clear: bool,
}

#[derive(Debug, Serialize)]
struct CaptureFile {
    vendor_id: String,
    product_id: String,
    duration_s: u64,
    samples: Vec<PenSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureEnd {
    Elapsed,
    Interrupted,
    DeviceLost,
}

pub async fn execute(args: &CaptureArgs, identity: DeviceIdentity, json: bool) -> Result<()> {
    let mut session = open_session(identity).await?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    session.on_pen_data(move |sample| {
        let _queued = tx.send(sample);
    });

    if args.clear {
        require_sent(session.clear_screen().await?, "clear")?;
    }
    require_sent(session.set_inking(true).await?, "inking")?;

    info!(duration_s = args.duration, "Capturing pen samples");
    let print_live = args.output.is_none();
    let (samples, end) = collect_samples(
        &session,
        &mut rx,
        Duration::from_secs(args.duration),
        |sample| {
            if print_live {
                output::print_sample(sample, json);
            }
        },
    )
    .await;

    match end {
        CaptureEnd::Elapsed => {}
        CaptureEnd::Interrupted => warn!("Interrupted"),
        CaptureEnd::DeviceLost => warn!(samples = samples.len(), "Device lost during capture"),
    }
    if end != CaptureEnd::DeviceLost
        && let Err(err) = session.set_inking(false).await
    {
        warn!(error = %err, "Failed to disable inking");
    }

    let count = samples.len();
    if let Some(path) = &args.output {
        let file = CaptureFile {
            vendor_id: format!("{:04X}", identity.vendor_id),
            product_id: format!("{:04X}", identity.product_id),
            duration_s: args.duration,
            samples,
        };
        write_capture(path, &file)?;
        output::print_success(
            &format!("Captured {count} samples to {}", path.display()),
            json,
        );
    } else if !json {
        output::print_success(&format!("Captured {count} samples"), json);
    }

    if end == CaptureEnd::DeviceLost {
        return Err(CliError::Disconnected("capture").into());
    }
    Ok(())
}

/// Drain pen samples until the duration elapses, Ctrl-C, or the pad goes away.
async fn collect_samples(
    session: &Session,
    rx: &mut mpsc::UnboundedReceiver<PenSample>,
    duration: Duration,
    mut on_sample: impl FnMut(&PenSample),
) -> (Vec<PenSample>, CaptureEnd) {
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);
    let mut link_check = tokio::time::interval(LINK_CHECK_INTERVAL);
    link_check.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut samples = Vec::new();
    let end = loop {
        tokio::select! {
            () = &mut deadline => break CaptureEnd::Elapsed,
            _ = tokio::signal::ctrl_c() => break CaptureEnd::Interrupted,
            _ = link_check.tick() => {
                if !session.is_connected() {
                    break CaptureEnd::DeviceLost;
                }
            }
            Some(sample) = rx.recv() => {
                on_sample(&sample);
                samples.push(sample);
            }
        }
    };
    (samples, end)
}

fn write_capture(path: &Path, file: &CaptureFile) -> Result<()> {
    let body = serde_json::to_string_pretty(file).map_err(CliError::from)?;
    std::fs::write(path, body)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to write capture to {}", path.display()))
}
