// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! Background device-table watching.
//!
//! The daemon pushes a complete device-table snapshot over a persistent
//! connection whenever anything changes. The watcher blocks on that
//! connection in a dedicated thread, diffs consecutive snapshots, and
//! reports discrete add/remove/change events to a listener.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use radb_core::{parse_devices, Device, Error, Result};

use crate::transport::{CloseHandle, Transport};

/// Callbacks for device-table changes.
///
/// One method is invoked per discrete change, in snapshot order. After a
/// terminal transition (stop or error) no further methods are called;
/// `on_error` is called at most once.
pub trait WatchListener: Send {
    /// A serial appeared that was absent from the previous snapshot.
    fn on_added(&mut self, serial: &str, state: &str);
    /// A serial from the previous snapshot is gone.
    fn on_removed(&mut self, serial: &str);
    /// A serial is still present but its state changed.
    fn on_changed(&mut self, serial: &str, state: &str);
    /// The watch loop died with `cause`. Terminal.
    fn on_error(&mut self, cause: Error);
}

/// Lifecycle of the background watch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WatcherState {
    /// The loop is blocked on the daemon, waiting for snapshots.
    Running = 0,
    /// The transport was closed; the loop exited cleanly.
    Stopped = 1,
    /// The loop died on a read or protocol failure.
    Error = 2,
}

impl WatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => WatcherState::Stopped,
            2 => WatcherState::Error,
            _ => WatcherState::Running,
        }
    }
}

/// Loop state shared between the owning handle and the loop thread.
struct SharedState(AtomicU8);

impl SharedState {
    fn new() -> Self {
        SharedState(AtomicU8::new(WatcherState::Running as u8))
    }

    fn get(&self) -> WatcherState {
        WatcherState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: WatcherState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Watches the daemon's device table on a dedicated thread.
///
/// Constructed from a transport on which the caller has already
/// negotiated change tracking (sent the track command and verified the
/// response). Closing that transport is the loop's only cancellation
/// mechanism; [`DeviceWatcher::stop`] closes it through the transport's
/// close handle and joins the thread.
pub struct DeviceWatcher {
    handle: CloseHandle,
    state: Arc<SharedState>,
    thread: Option<JoinHandle<()>>,
}

impl DeviceWatcher {
    /// Start the watch loop over `transport`.
    pub fn spawn<L>(mut transport: Transport, listener: L) -> Result<Self>
    where
        L: WatchListener + 'static,
    {
        let handle = transport.close_handle()?;
        let state = Arc::new(SharedState::new());
        let loop_state = Arc::clone(&state);
        let thread = thread::Builder::new()
            .name("device-watcher".to_string())
            .spawn(move || run_loop(&mut transport, listener, &loop_state))?;
        Ok(DeviceWatcher {
            handle,
            state,
            thread: Some(thread),
        })
    }

    /// Current loop state.
    pub fn state(&self) -> WatcherState {
        self.state.get()
    }

    /// Close the underlying transport and wait for the loop to finish.
    ///
    /// The blocked read unblocks with end-of-stream and the loop stops
    /// without further listener calls.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl fmt::Debug for DeviceWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceWatcher")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Drop for DeviceWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop<L: WatchListener>(transport: &mut Transport, mut listener: L, state: &SharedState) {
    let mut previous: Vec<Device> = Vec::new();
    loop {
        match transport.read_string() {
            Ok(body) => {
                let snapshot = parse_devices(&body);
                trace!(devices = snapshot.len(), "device snapshot received");
                diff_snapshots(&previous, &snapshot, &mut listener);
                previous = snapshot;
            }
            Err(e) if e.is_disconnect() => {
                debug!("device watch stopped: transport closed");
                state.set(WatcherState::Stopped);
                return;
            }
            Err(e) => {
                warn!(error = %e, "device watch failed");
                state.set(WatcherState::Error);
                listener.on_error(e);
                return;
            }
        }
    }
}

/// Emit the discrete events taking `previous` to `next`.
///
/// Each snapshot fully supersedes the one before it. Additions and
/// changes come in the new snapshot's server order, then removals in the
/// previous snapshot's order.
fn diff_snapshots<L: WatchListener>(previous: &[Device], next: &[Device], listener: &mut L) {
    for device in next {
        match previous.iter().find(|d| d.serial == device.serial) {
            None => listener.on_added(&device.serial, &device.state),
            Some(old) if old.state != device.state => {
                listener.on_changed(&device.serial, &device.state);
            }
            Some(_) => {}
        }
    }
    for device in previous {
        if !next.iter().any(|d| d.serial == device.serial) {
            listener.on_removed(&device.serial);
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
