//! signpadctl - Wacom STU-430 signature pad CLI
//!
//! Lists attached pads, pushes configuration and images to the display, and
//! captures pen samples.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use signpad_hid_common::DeviceIdentity;
use signpad_hid_stu430_protocol::{PRODUCT_STU_430, VENDOR_ID};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{CaptureArgs, ConfigureArgs, ImageArgs, parse_hex_u16};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "signpadctl")]
#[command(about = "Signature pad control CLI - configure and capture from Wacom STU-430 pads")]
#[command(version)]
#[command(long_about = "
signpadctl talks to a Wacom STU-430 signature pad over USB HID.
It can list attached devices, clear the screen, change pen and display
settings, upload a monochrome image, and capture pen samples.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// USB vendor ID (hex)
    #[arg(long, global = true, env = "SIGNPAD_VID", value_parser = parse_hex_u16, default_value = "056A")]
    vid: u16,

    /// USB product ID (hex)
    #[arg(long, global = true, env = "SIGNPAD_PID", value_parser = parse_hex_u16, default_value = "00A4")]
    pid: u16,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.vid, self.pid)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List HID devices, marking supported pads
    List,

    /// Enable inking and print pen samples
    Capture(CaptureArgs),

    /// Clear the screen
    Clear,

    /// Change pen, writing area and display settings
    Configure(ConfigureArgs),

    /// Upload an image to the screen
    Image(ImageArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_env| {
                format!("signpadctl={log_level},signpad_session={log_level},signpad_hid_common={log_level}")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let result = execute_command(&cli).await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = e
                .downcast_ref::<CliError>()
                .map_or(1, CliError::exit_code);
            std::process::exit(exit_code);
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    let identity = cli.identity();
    match &cli.command {
        Commands::List => commands::device::list(identity, cli.json),
        Commands::Capture(args) => commands::capture::execute(args, identity, cli.json).await,
        Commands::Clear => commands::display::clear(identity, cli.json).await,
        Commands::Configure(args) => {
            commands::display::configure(args, identity, cli.json).await
        }
        Commands::Image(args) => commands::display::send_image(args, identity, cli.json).await,
    }
}
