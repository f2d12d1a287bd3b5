// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! Device records and device-table snapshot parsing.
//!
//! The daemon reports devices as a tab/line-delimited table: one
//! `<serial>\t<state>` line per device. A table body is always a full
//! snapshot, replacing whatever was reported before.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state of a device as reported by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Connected and ready for commands.
    Device,
    /// Visible but not responding.
    Offline,
    /// Booted into the bootloader.
    Bootloader,
    /// Any state string this client does not recognize.
    Unknown,
}

impl DeviceState {
    /// Returns the string representation used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Device => "device",
            DeviceState::Offline => "offline",
            DeviceState::Bootloader => "bootloader",
            DeviceState::Unknown => "unknown",
        }
    }

    /// Parse a daemon state string.
    ///
    /// Unrecognized states map to [`DeviceState::Unknown`] rather than
    /// failing; daemon versions differ in the states they report.
    pub fn parse(s: &str) -> Self {
        match s {
            "device" => DeviceState::Device,
            "offline" => DeviceState::Offline,
            "bootloader" => DeviceState::Bootloader,
            _ => DeviceState::Unknown,
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One (serial, state) pair from a device-table snapshot.
///
/// The state is kept as the raw wire string so that snapshot diffing sees
/// every change the daemon reports, including states this client does not
/// model; [`Device::device_state`] gives the typed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Unique device identifier.
    pub serial: String,
    /// Raw state string as reported by the daemon.
    pub state: String,
}

impl Device {
    /// Create a device record.
    pub fn new(serial: impl Into<String>, state: impl Into<String>) -> Self {
        Device {
            serial: serial.into(),
            state: state.into(),
        }
    }

    /// The typed view of the raw state string.
    pub fn device_state(&self) -> DeviceState {
        DeviceState::parse(&self.state)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.serial, self.state)
    }
}

/// Parse a device-table body into records, preserving server order.
///
/// Lines with fewer than two tab-separated fields are skipped.
pub fn parse_devices(body: &str) -> Vec<Device> {
    body.lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            match (parts.next(), parts.next()) {
                (Some(serial), Some(state)) if !serial.is_empty() => {
                    Some(Device::new(serial, state))
                }
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
