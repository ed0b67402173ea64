//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use serde::Serialize;
use serde_json::json;
use signpad_hid_common::{DeviceIdentity, HidDeviceInfo};
use signpad_hid_stu430_protocol::PenSample;

use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::DeviceNotFound(_)) => "device_not_found",
        Some(CliError::Disconnected(_)) => "disconnected",
        Some(CliError::ValidationError(_)) => "validation",
        Some(CliError::IoError(_)) => "io",
        Some(CliError::JsonError(_)) => "json",
        Some(CliError::ImageError(_)) => "image",
        None => "error",
    }
}

#[derive(Serialize)]
struct ListedDevice<'a> {
    #[serde(flatten)]
    info: &'a HidDeviceInfo,
    supported: bool,
}

/// Print enumerated HID devices, marking the ones matching `identity`.
pub fn print_device_list(devices: &[HidDeviceInfo], identity: DeviceIdentity, json: bool) {
    if json {
        let listed: Vec<ListedDevice<'_>> = devices
            .iter()
            .map(|info| ListedDevice {
                info,
                supported: info.matches(identity),
            })
            .collect();
        let output = json!({
            "success": true,
            "devices": listed
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format device list as JSON: {e}"),
        }
        return;
    }

    if devices.is_empty() {
        println!("{}", "No HID devices found".yellow());
        return;
    }

    println!("{}", "HID Devices:".bold());
    for device in devices {
        let marker = if device.matches(identity) {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "  {} {} ({}) {}",
            marker,
            device.display_name().bold(),
            device.identity(),
            device.path.dimmed()
        );
        if let Some(serial) = &device.serial_number {
            println!("      Serial: {serial}");
        }
    }
}

/// Print one pen sample. JSON mode emits one object per line.
pub fn print_sample(sample: &PenSample, json: bool) {
    if json {
        match serde_json::to_string(sample) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("Failed to format sample as JSON: {e}"),
        }
        return;
    }

    let flags = format!(
        "{}{}",
        if sample.ready { "R" } else { "-" },
        if sample.switch_pressed { "S" } else { "-" }
    );
    match (sample.timestamp, sample.sequence) {
        (Some(ts), Some(seq)) => println!(
            "{flags} x={:>4} y={:>4} p={:.3} t={ts} #{seq}",
            sample.scaled_x, sample.scaled_y, sample.pressure
        ),
        _ => println!(
            "{flags} x={:>4} y={:>4} p={:.3}",
            sample.scaled_x, sample.scaled_y, sample.pressure
        ),
    }
}

/// Print a success message or its JSON equivalent.
pub fn print_success(message: &str, json: bool) {
    if json {
        println!("{}", json!({ "success": true, "message": message }));
    } else {
        println!("{} {}", "✓".green(), message);
    }
}
