// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! radb-core: shared types for the radb daemon client.
//!
//! This crate provides the model types and errors used by the `radb`
//! protocol crate: device records and snapshot parsing, remote directory
//! entries, and the error taxonomy for daemon communication.

pub mod device;
pub mod error;
pub mod remote;

pub use device::{parse_devices, Device, DeviceState};
pub use error::{Error, Result};
pub use remote::RemoteFile;
