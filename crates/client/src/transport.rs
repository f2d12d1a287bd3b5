// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! Command framing and response verification over one daemon connection.
//!
//! Commands are framed as 4 lowercase hex digits giving the payload byte
//! count, followed by the payload. Responses start with a 4-byte status
//! tag, `OKAY` or `FAIL`, with `FAIL` carrying a framed error message.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use radb_core::{Error, Result};

use crate::sync::SyncSession;

/// Framing primitives, generic over `Read`/`Write` so they are testable
/// without a socket.
pub(crate) mod framing {
    use super::*;

    /// Status tag for a successful command.
    const OKAY: &[u8; 4] = b"OKAY";
    /// Status tag for a failed command, followed by a framed message.
    const FAIL: &[u8; 4] = b"FAIL";

    /// Largest payload a 4-hex-digit length header can describe.
    const MAX_FRAME_LEN: usize = 0xffff;

    /// Write one framed command and flush.
    ///
    /// Commands longer than [`MAX_FRAME_LEN`] are rejected before any
    /// byte hits the wire; a wider header would desynchronize the peer.
    pub(crate) fn write_command<W: Write>(writer: &mut W, command: &str) -> Result<()> {
        if command.len() > MAX_FRAME_LEN {
            return Err(Error::PayloadTooLarge(command.len()));
        }
        let header = format!("{:04x}", command.len());
        writer.write_all(header.as_bytes())?;
        writer.write_all(command.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Read exactly `len` bytes and decode them as UTF-8.
    pub(crate) fn read_exact_string<R: Read>(reader: &mut R, len: usize) -> Result<String> {
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Read one length-prefixed string: 4 hex digits, then the payload.
    pub(crate) fn read_string<R: Read>(reader: &mut R) -> Result<String> {
        let header = read_exact_string(reader, 4)?;
        let len =
            usize::from_str_radix(&header, 16).map_err(|_| Error::InvalidLengthHeader(header))?;
        read_exact_string(reader, len)
    }

    /// Read a 4-byte status tag and resolve it.
    ///
    /// On any error other than [`Error::CommandFailed`] the stream is
    /// desynchronized and must be closed.
    pub(crate) fn verify_status<R: Read>(reader: &mut R) -> Result<()> {
        let mut tag = [0u8; 4];
        reader.read_exact(&mut tag)?;
        if &tag == OKAY {
            Ok(())
        } else if &tag == FAIL {
            Err(Error::CommandFailed(read_string(reader)?))
        } else {
            Err(Error::UnexpectedStatus(
                String::from_utf8_lossy(&tag).into_owned(),
            ))
        }
    }
}

/// Lock the closed flag.
///
/// A poisoned lock only means another thread panicked mid-close; the
/// boolean inside is still meaningful.
fn lock(flag: &Mutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(|e| e.into_inner())
}

/// Shut down both stream directions, once.
///
/// The guard serializes closes from the owner and any [`CloseHandle`];
/// shutdown, not drop, is what unblocks a reader parked on the socket.
fn close_shared(stream: &TcpStream, closed: &Mutex<bool>) {
    let mut closed = lock(closed);
    if !*closed {
        debug!("closing transport");
        let _ = stream.shutdown(Shutdown::Both);
        *closed = true;
    }
}

/// One duplex connection to the daemon.
///
/// The transport owns its socket exclusively: a command and its response
/// must run to completion before the connection is used for anything
/// else. Concurrent unrelated operations need separate transports on
/// separate connections.
pub struct Transport {
    stream: TcpStream,
    closed: Arc<Mutex<bool>>,
}

impl Transport {
    /// Wrap an established daemon connection.
    pub fn new(stream: TcpStream) -> Self {
        Transport {
            stream,
            closed: Arc::new(Mutex::new(false)),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if *lock(&self.closed) {
            return Err(Error::TransportClosed);
        }
        Ok(())
    }

    /// Send one framed command.
    pub fn send(&mut self, command: &str) -> Result<()> {
        self.ensure_open()?;
        trace!(command, "sending command");
        framing::write_command(&mut self.stream, command)
    }

    /// Read and check the 4-byte status for the last command.
    ///
    /// On any error other than [`Error::CommandFailed`] the stream is
    /// desynchronized and the transport must be closed.
    pub fn verify_response(&mut self) -> Result<()> {
        self.ensure_open()?;
        framing::verify_status(&mut self.stream)
    }

    /// Read one length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        self.ensure_open()?;
        framing::read_string(&mut self.stream)
    }

    /// Read exactly `len` bytes as UTF-8 text, blocking until filled.
    pub fn read_exact_string(&mut self, len: usize) -> Result<String> {
        self.ensure_open()?;
        framing::read_exact_string(&mut self.stream, len)
    }

    /// Enter the binary sync sub-protocol.
    ///
    /// The returned session borrows this transport mutably, so framed
    /// commands cannot be interleaved with sync traffic on the same
    /// connection and only one session exists at a time.
    pub fn start_sync(&mut self) -> Result<SyncSession<'_>> {
        self.send("sync:")?;
        self.verify_response()?;
        Ok(SyncSession::new(self))
    }

    /// A handle for closing this transport from another thread,
    /// unblocking any reader parked on the socket.
    pub fn close_handle(&self) -> Result<CloseHandle> {
        Ok(CloseHandle {
            stream: self.stream.try_clone()?,
            closed: Arc::clone(&self.closed),
        })
    }

    /// Close both stream directions. Idempotent.
    pub fn close(&mut self) {
        close_shared(&self.stream, &self.closed);
    }

    pub(crate) fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }
}

/// Raw access to the response stream, for callers that consume unframed
/// output after a verified command.
impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Closes a [`Transport`] from outside its owning thread.
///
/// Shares the closed guard with the transport, so closes from either
/// side stay idempotent and serialized.
pub struct CloseHandle {
    stream: TcpStream,
    closed: Arc<Mutex<bool>>,
}

impl CloseHandle {
    /// Close the shared connection. Idempotent.
    pub fn close(&self) {
        close_shared(&self.stream, &self.closed);
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
