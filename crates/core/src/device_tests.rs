// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! Tests for device records and snapshot parsing.

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    device = { "device", DeviceState::Device },
    offline = { "offline", DeviceState::Offline },
    bootloader = { "bootloader", DeviceState::Bootloader },
    unauthorized = { "unauthorized", DeviceState::Unknown },
    empty = { "", DeviceState::Unknown },
)]
fn device_state_parse(raw: &str, expected: DeviceState) {
    assert_eq!(DeviceState::parse(raw), expected);
}

#[parameterized(
    device = { DeviceState::Device, "device" },
    offline = { DeviceState::Offline, "offline" },
    bootloader = { DeviceState::Bootloader, "bootloader" },
    unknown = { DeviceState::Unknown, "unknown" },
)]
fn device_state_display(state: DeviceState, expected: &str) {
    assert_eq!(state.to_string(), expected);
}

#[test]
fn parse_devices_two_lines() {
    let devices = parse_devices("aaa\tdevice\nbbb\toffline\n");
    assert_eq!(
        devices,
        vec![Device::new("aaa", "device"), Device::new("bbb", "offline")]
    );
}

#[test]
fn parse_devices_preserves_server_order() {
    let devices = parse_devices("zzz\tdevice\naaa\toffline\nmmm\tdevice\n");
    let serials: Vec<&str> = devices.iter().map(|d| d.serial.as_str()).collect();
    assert_eq!(serials, vec!["zzz", "aaa", "mmm"]);
}

#[parameterized(
    empty = { "" },
    blank_line = { "\n" },
    serial_only = { "aaa\n" },
)]
fn parse_devices_skips_incomplete_input(body: &str) {
    assert!(parse_devices(body).is_empty());
}

#[test]
fn parse_devices_skips_short_lines_but_keeps_the_rest() {
    let devices = parse_devices("aaa\tdevice\nmalformed\nbbb\toffline\n");
    assert_eq!(
        devices,
        vec![Device::new("aaa", "device"), Device::new("bbb", "offline")]
    );
}

#[test]
fn parse_devices_keeps_extra_fields_out_of_state() {
    // Some daemon versions append columns after the state; only the
    // second field is the state.
    let devices = parse_devices("aaa\tdevice\tproduct:x\n");
    assert_eq!(devices, vec![Device::new("aaa", "device")]);
}

#[test]
fn device_state_typed_view() {
    let device = Device::new("aaa", "offline");
    assert_eq!(device.device_state(), DeviceState::Offline);
}

#[test]
fn device_display() {
    assert_eq!(Device::new("aaa", "device").to_string(), "aaa (device)");
}
