// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! radb - a client for the local device-management daemon's wire
//! protocol.
//!
//! # Main Components
//!
//! - [`Transport`] - command framing and response verification over one
//!   daemon connection
//! - [`SyncSession`] - the binary sync sub-protocol for listing remote
//!   directories and streaming files
//! - [`DeviceWatcher`] - a background loop turning device-table
//!   snapshots into discrete add/remove/change events
//! - [`HostConnection`] - the daemon endpoint, producing transports
//!
//! # Example
//!
//! ```rust,ignore
//! use std::io::Cursor;
//! use radb::HostConnection;
//!
//! let daemon = HostConnection::default();
//! println!("daemon version {}", daemon.host_version()?);
//!
//! let mut transport = daemon.transport()?;
//! transport.send("host:transport-any")?;
//! transport.verify_response()?;
//! let sync = transport.start_sync()?;
//! sync.push(&mut Cursor::new(b"hello"), 1_700_000_000, 0o664, "/data/local/tmp/hello")?;
//! ```

mod connection;
mod sync;
mod transport;
mod watcher;

pub use connection::{HostConnection, DEFAULT_HOST, DEFAULT_PORT};
pub use radb_core::{parse_devices, Device, DeviceState, Error, RemoteFile, Result};
pub use sync::{DirEntries, SyncSession, SYNC_DATA_MAX};
pub use transport::{CloseHandle, Transport};
pub use watcher::{DeviceWatcher, WatchListener, WatcherState};
