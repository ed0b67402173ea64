//! Screen and pen configuration commands

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use image::imageops::FilterType;
use signpad_hid_common::DeviceIdentity;
use signpad_hid_stu430_protocol::{DeviceConfig, WritingArea, encode_background_color, pack_monochrome};
use std::path::PathBuf;
use tracing::debug;

use super::{open_session, require_sent};
use crate::error::CliError;
use crate::output;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Args, Debug, Default)]
pub struct ConfigureArgs {
    /// Writing area as x1,y1,x2,y2 in screen pixels
    #[arg(long, value_parser = parse_area)]
    pub area: Option<WritingArea>,

    /// Pen width
    #[arg(long)]
    pub pen_width: Option<u8>,

    /// Enable or disable inking
    #[arg(long, value_enum)]
    pub inking: Option<Toggle>,

    /// Writing mode
    #[arg(long)]
    pub mode: Option<u8>,

    /// Backlight intensity
    #[arg(long)]
    pub backlight: Option<u8>,

    /// Background color as #rrggbb
    #[arg(long, value_parser = parse_color)]
    pub background: Option<String>,
}

impl ConfigureArgs {
    fn is_empty(&self) -> bool {
        self.area.is_none()
            && self.pen_width.is_none()
            && self.inking.is_none()
            && self.mode.is_none()
            && self.backlight.is_none()
            && self.background.is_none()
    }
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Image file (PNG, JPEG, BMP or PNM)
    pub path: PathBuf,

    /// Luma cut-off: brighter pixels stay white, the rest become ink
    #[arg(long, default_value_t = DeviceConfig::STU_430.luma_threshold)]
    pub threshold: u8,
}

/// Parse `x1,y1,x2,y2`.
pub fn parse_area(s: &str) -> Result<WritingArea, String> {
    let parts = s
        .split(',')
        .map(|part| part.trim().parse::<u16>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid area '{s}': {e}"))?;
    match parts.as_slice() {
        &[x1, y1, x2, y2] => Ok(WritingArea::new(x1, y1, x2, y2)),
        _ => Err(format!(
            "invalid area '{s}': expected four values x1,y1,x2,y2"
        )),
    }
}

pub fn parse_color(s: &str) -> Result<String, String> {
    encode_background_color(s)
        .map(|_rgb| s.to_owned())
        .map_err(|e| e.to_string())
}

pub async fn clear(identity: DeviceIdentity, json: bool) -> Result<()> {
    let mut session = open_session(identity).await?;
    require_sent(session.clear_screen().await?, "clear")?;
    output::print_success("Screen cleared", json);
    Ok(())
}

pub async fn configure(args: &ConfigureArgs, identity: DeviceIdentity, json: bool) -> Result<()> {
    if args.is_empty() {
        return Err(CliError::ValidationError("nothing to configure".to_string()).into());
    }

    let mut session = open_session(identity).await?;
    let mut applied = Vec::new();

    if let Some(area) = args.area {
        require_sent(session.set_writing_area(area).await?, "writing area")?;
        applied.push("writing area");
    }
    if let Some(width) = args.pen_width {
        require_sent(session.set_pen_color_and_width(width).await?, "pen width")?;
        applied.push("pen width");
    }
    if let Some(mode) = args.mode {
        require_sent(session.set_writing_mode(mode).await?, "writing mode")?;
        applied.push("writing mode");
    }
    if let Some(intensity) = args.backlight {
        require_sent(session.set_backlight(intensity).await?, "backlight")?;
        applied.push("backlight");
    }
    if let Some(color) = &args.background {
        require_sent(session.set_background_color(color).await?, "background")?;
        applied.push("background");
    }
    if let Some(inking) = args.inking {
        require_sent(session.set_inking(inking.enabled()).await?, "inking")?;
        applied.push("inking");
    }

    output::print_success(&format!("Applied {}", applied.join(", ")), json);
    Ok(())
}

/// Load `path`, fit it to the screen and reduce it to the 1-bit format.
pub fn load_bitmap(path: &std::path::Path, config: &DeviceConfig, threshold: u8) -> Result<Vec<u8>> {
    let width = u32::from(config.tablet_width);
    let height = u32::from(config.tablet_height);
    let picture = image::open(path)
        .map_err(CliError::from)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    debug!(
        source_width = picture.width(),
        source_height = picture.height(),
        "Loaded image"
    );
    let luma = picture
        .resize_exact(width, height, FilterType::Triangle)
        .to_luma8();
    let packed = pack_monochrome(
        luma.as_raw(),
        usize::from(config.tablet_width),
        usize::from(config.tablet_height),
        threshold,
    )?;
    Ok(packed)
}

pub async fn send_image(args: &ImageArgs, identity: DeviceIdentity, json: bool) -> Result<()> {
    let config = DeviceConfig::STU_430;
    let bitmap = load_bitmap(&args.path, &config, args.threshold)?;

    let mut session = open_session(identity).await?;
    require_sent(session.set_image(Some(bitmap.as_slice())).await?, "image")?;
    output::print_success(
        &format!("Sent {} ({} bytes)", args.path.display(), bitmap.len()),
        json,
    );
    Ok(())
}
