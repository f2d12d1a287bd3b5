// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Radb Contributors

//! Tests for remote directory entries.

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn entry(mode: u32) -> RemoteFile {
    RemoteFile {
        mode,
        size: 0,
        mtime: 0,
        name: "x".to_string(),
    }
}

#[parameterized(
    directory = { 0o040_755, true },
    regular_file = { 0o100_644, false },
    symlink = { 0o120_777, false },
    bare_permissions = { 0o664, false },
)]
fn is_directory_checks_the_type_bits(mode: u32, expected: bool) {
    assert_eq!(entry(mode).is_directory(), expected);
}

#[test]
fn modified_at_converts_epoch_seconds() {
    let file = RemoteFile {
        mode: 0o100_644,
        size: 12,
        mtime: 1_700_000_000,
        name: "notes.txt".to_string(),
    };
    assert_eq!(file.modified_at().timestamp(), 1_700_000_000);
}

#[test]
fn modified_at_zero_is_the_epoch() {
    assert_eq!(entry(0o100_644).modified_at(), DateTime::UNIX_EPOCH);
}
