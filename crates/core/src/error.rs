// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! Error types for daemon communication.

use thiserror::Error;

/// All possible errors that can occur while speaking to the daemon.
#[derive(Debug, Error)]
pub enum Error {
    /// The socket could not be reached or maintained.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// The daemon answered FAIL, carrying its own message text.
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// A status frame carried neither OKAY nor FAIL. The stream is
    /// desynchronized and the transport must be closed.
    #[error("unexpected status tag: '{0}'")]
    UnexpectedStatus(String),

    /// A sync record carried a tag this client does not implement.
    #[error("unsupported sync tag: '{0}'")]
    UnsupportedSyncTag(String),

    /// A 4-digit length header was not valid hexadecimal.
    #[error("invalid length header: '{0}'")]
    InvalidLengthHeader(String),

    /// A command or sync payload too large for its length field.
    #[error("payload too large to frame: {0} bytes")]
    PayloadTooLarge(usize),

    /// A length-prefixed payload was not valid UTF-8.
    #[error("invalid utf-8 in payload: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Operation attempted on an already-closed transport.
    #[error("transport is closed")]
    TransportClosed,
}

impl Error {
    /// True when the failure is the stream ending, either because the
    /// peer went away or because the transport was closed locally.
    ///
    /// The device watcher uses this to tell a deliberate stop apart from
    /// a protocol failure.
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::TransportClosed => true,
            Error::Connection(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::NotConnected
            ),
            _ => false,
        }
    }
}

/// A specialized Result type for daemon operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
