// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! The daemon endpoint: host, port, and connection setup.

use std::net::TcpStream;

use tracing::debug;

use radb_core::Result;

use crate::transport::Transport;
use crate::watcher::{DeviceWatcher, WatchListener};

/// Default daemon host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default daemon port.
pub const DEFAULT_PORT: u16 = 5037;

/// A daemon endpoint.
///
/// Cheap to construct and clone; every operation opens its own
/// connection, matching the daemon's one-session-per-connection model.
#[derive(Debug, Clone)]
pub struct HostConnection {
    host: String,
    port: u16,
}

impl Default for HostConnection {
    fn default() -> Self {
        HostConnection::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl HostConnection {
    /// An endpoint at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        HostConnection {
            host: host.into(),
            port,
        }
    }

    /// Open a fresh transport to the daemon.
    pub fn transport(&self) -> Result<Transport> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))?;
        debug!(host = %self.host, port = self.port, "connected to daemon");
        Ok(Transport::new(stream))
    }

    /// Query the daemon's protocol version string.
    pub fn host_version(&self) -> Result<String> {
        let mut transport = self.transport()?;
        transport.send("host:version")?;
        transport.verify_response()?;
        let version = transport.read_string()?;
        transport.close();
        Ok(version)
    }

    /// Start watching the device table.
    ///
    /// Negotiates change tracking on a fresh transport and hands it to
    /// [`DeviceWatcher::spawn`]. Stopping the watcher closes that
    /// transport; there is no other cancellation path.
    pub fn track_devices<L>(&self, listener: L) -> Result<DeviceWatcher>
    where
        L: WatchListener + 'static,
    {
        let mut transport = self.transport()?;
        transport.send("host:track-devices")?;
        transport.verify_response()?;
        DeviceWatcher::spawn(transport, listener)
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
