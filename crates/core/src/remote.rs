// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! Remote directory entries from the sync sub-protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File-type mask in a Unix mode word.
const S_IFMT: u32 = 0o170_000;
/// Directory bit in a Unix mode word.
const S_IFDIR: u32 = 0o040_000;

/// One remote directory entry, as reported by a sync LIST exchange.
///
/// All numeric fields are truncated to 32 bits by the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Unix mode word (file type and permission bits).
    pub mode: u32,
    /// Size in bytes.
    pub size: u32,
    /// Modification time, seconds since the epoch.
    pub mtime: u32,
    /// Entry name, without any directory component.
    pub name: String,
}

impl RemoteFile {
    /// True when the mode word marks this entry as a directory.
    pub fn is_directory(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    /// Modification time as a UTC timestamp.
    pub fn modified_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(i64::from(self.mtime), 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
