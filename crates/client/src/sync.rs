// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! The binary sync sub-protocol: directory listing and file transfer.
//!
//! Every sync message starts with a fixed 8-byte header: a 4-byte ASCII
//! tag plus a little-endian u32 whose meaning depends on the tag (entry
//! mode for `DENT`, chunk length for `DATA`, mtime for `DONE`, message
//! length for `FAIL`).

use std::io::{Read, Write};

use tracing::{debug, trace};

use radb_core::{Error, RemoteFile, Result};

use crate::transport::Transport;

/// Maximum payload bytes in one `DATA` chunk.
pub const SYNC_DATA_MAX: usize = 65536;

/// 4-byte record tags of the sync sub-protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyncTag {
    List,
    Send,
    Recv,
    Data,
    Dent,
    Done,
    Okay,
    Fail,
}

impl SyncTag {
    /// Byte serialization of this tag.
    pub(crate) fn code(self) -> &'static [u8; 4] {
        match self {
            SyncTag::List => b"LIST",
            SyncTag::Send => b"SEND",
            SyncTag::Recv => b"RECV",
            SyncTag::Data => b"DATA",
            SyncTag::Dent => b"DENT",
            SyncTag::Done => b"DONE",
            SyncTag::Okay => b"OKAY",
            SyncTag::Fail => b"FAIL",
        }
    }

    pub(crate) fn from_bytes(bytes: &[u8; 4]) -> Option<Self> {
        match bytes {
            b"LIST" => Some(SyncTag::List),
            b"SEND" => Some(SyncTag::Send),
            b"RECV" => Some(SyncTag::Recv),
            b"DATA" => Some(SyncTag::Data),
            b"DENT" => Some(SyncTag::Dent),
            b"DONE" => Some(SyncTag::Done),
            b"OKAY" => Some(SyncTag::Okay),
            b"FAIL" => Some(SyncTag::Fail),
            _ => None,
        }
    }
}

fn unsupported(tag: &[u8; 4]) -> Error {
    Error::UnsupportedSyncTag(String::from_utf8_lossy(tag).into_owned())
}

/// Write one bare 8-byte record: tag plus little-endian trailer.
pub(crate) fn write_record<W: Write>(writer: &mut W, tag: SyncTag, value: u32) -> Result<()> {
    writer.write_all(tag.code())?;
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Write a tagged, length-prefixed string record (`LIST`/`SEND`/`RECV`
/// requests).
pub(crate) fn write_request<W: Write>(writer: &mut W, tag: SyncTag, payload: &str) -> Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge(payload.len()))?;
    writer.write_all(tag.code())?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(payload.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read one 8-byte sync header.
pub(crate) fn read_header<R: Read>(reader: &mut R) -> Result<(SyncTag, u32)> {
    let mut tag = [0u8; 4];
    reader.read_exact(&mut tag)?;
    let value = read_u32(reader)?;
    let tag = SyncTag::from_bytes(&tag).ok_or_else(|| unsupported(&tag))?;
    Ok((tag, value))
}

/// Read the status record that completes a write-type operation.
///
/// `OKAY` trailers are ignored; `FAIL` trailers give the length of the
/// daemon's message.
pub(crate) fn read_status<R: Read>(reader: &mut R) -> Result<()> {
    let mut tag = [0u8; 4];
    reader.read_exact(&mut tag)?;
    let trailer = read_u32(reader)?;
    match SyncTag::from_bytes(&tag) {
        Some(SyncTag::Okay) => Ok(()),
        Some(SyncTag::Fail) => {
            let mut message = vec![0u8; trailer as usize];
            reader.read_exact(&mut message)?;
            Err(Error::CommandFailed(String::from_utf8(message)?))
        }
        _ => Err(Error::UnexpectedStatus(
            String::from_utf8_lossy(&tag).into_owned(),
        )),
    }
}

/// One binary sync exchange on a negotiated transport.
///
/// A session runs a single operation and is consumed by it; start a
/// fresh session for the next operation. Obtained from
/// [`Transport::start_sync`].
pub struct SyncSession<'a> {
    transport: &'a mut Transport,
}

impl<'a> SyncSession<'a> {
    pub(crate) fn new(transport: &'a mut Transport) -> Self {
        SyncSession { transport }
    }

    /// List a remote directory.
    ///
    /// Entries arrive lazily in server order; the returned iterator ends
    /// at the server's `DONE` record and cannot be restarted. List again
    /// with a fresh session.
    pub fn list(self, remote_path: &str) -> Result<DirEntries<'a>> {
        debug!(remote_path, "sync list");
        write_request(self.transport.stream_mut(), SyncTag::List, remote_path)?;
        Ok(DirEntries {
            transport: self.transport,
            done: false,
        })
    }

    /// Stream `source` to `remote_path` on the device.
    ///
    /// `mtime_secs` is truncated to 32 bits on the wire; times beyond the
    /// 32-bit range wrap. The operation is not complete until the
    /// daemon's status record has been read; on failure the remote file
    /// is left in an undefined state.
    pub fn push<R: Read>(
        self,
        source: &mut R,
        mtime_secs: u64,
        mode: u32,
        remote_path: &str,
    ) -> Result<()> {
        debug!(remote_path, mode, "sync push");
        let dest = format!("{},{}", remote_path, mode);
        write_request(self.transport.stream_mut(), SyncTag::Send, &dest)?;

        let mut chunk = vec![0u8; SYNC_DATA_MAX];
        let mut sent: u64 = 0;
        loop {
            let n = source.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            let stream = self.transport.stream_mut();
            write_record(stream, SyncTag::Data, n as u32)?;
            stream.write_all(&chunk[..n])?;
            sent += n as u64;
        }

        let stream = self.transport.stream_mut();
        write_record(stream, SyncTag::Done, mtime_secs as u32)?;
        stream.flush()?;
        trace!(bytes = sent, "push data sent, awaiting status");
        read_status(stream)
    }

    /// Stream `remote_path` from the device into `sink`.
    ///
    /// On failure the sink may hold a partial prefix and must be
    /// discarded by the caller.
    pub fn pull<W: Write>(self, remote_path: &str, sink: &mut W) -> Result<()> {
        debug!(remote_path, "sync pull");
        write_request(self.transport.stream_mut(), SyncTag::Recv, remote_path)?;

        let stream = self.transport.stream_mut();
        let mut buf = vec![0u8; SYNC_DATA_MAX];
        loop {
            match read_header(stream)? {
                (SyncTag::Data, len) => {
                    let mut remaining = len as usize;
                    while remaining > 0 {
                        let want = remaining.min(buf.len());
                        stream.read_exact(&mut buf[..want])?;
                        sink.write_all(&buf[..want])?;
                        remaining -= want;
                    }
                }
                (SyncTag::Done, _) => {
                    sink.flush()?;
                    return Ok(());
                }
                (SyncTag::Fail, len) => {
                    let mut message = vec![0u8; len as usize];
                    stream.read_exact(&mut message)?;
                    return Err(Error::CommandFailed(String::from_utf8(message)?));
                }
                (tag, _) => return Err(unsupported(tag.code())),
            }
        }
    }
}

/// Lazy stream of directory entries from a `LIST` exchange.
///
/// Fused: after `DONE` or an error nothing further is yielded.
pub struct DirEntries<'a> {
    transport: &'a mut Transport,
    done: bool,
}

impl DirEntries<'_> {
    fn read_entry(&mut self) -> Result<Option<RemoteFile>> {
        let stream = self.transport.stream_mut();
        match read_header(stream)? {
            (SyncTag::Dent, mode) => {
                let size = read_u32(stream)?;
                let mtime = read_u32(stream)?;
                let name_len = read_u32(stream)?;
                let mut name = vec![0u8; name_len as usize];
                stream.read_exact(&mut name)?;
                Ok(Some(RemoteFile {
                    mode,
                    size,
                    mtime,
                    name: String::from_utf8(name)?,
                }))
            }
            (SyncTag::Done, _) => Ok(None),
            (SyncTag::Fail, len) => {
                let mut message = vec![0u8; len as usize];
                stream.read_exact(&mut message)?;
                Err(Error::CommandFailed(String::from_utf8(message)?))
            }
            (tag, _) => Err(unsupported(tag.code())),
        }
    }
}

impl Iterator for DirEntries<'_> {
    type Item = Result<RemoteFile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
