// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error taxonomy for upgrade preparation.

use std::path::PathBuf;

/// Errors raised while preparing a device for an upgrade.
///
/// Every variant except [`Error::TransferFailure`] raised for a single EFI or
/// firmware file is fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The device is not booted from its primary image, or the running
    /// version does not match the primary image version.
    #[error(
        "system not booted from primary image and/or version does not match \
         (running {running}, primary image {primary}, boot source {boot_source:?})"
    )]
    PreconditionFailure {
        running: String,
        primary: String,
        boot_source: String,
    },

    /// An expected pattern was missing from device output.
    #[error("no match for {what} in device output {text:?}")]
    NoMatch { what: &'static str, text: String },

    /// The device answered an interactive step with something unexpected.
    #[error("protocol out of sync while {step}: expected {expected:?}, got {received:?}")]
    ProtocolSyncFault {
        step: &'static str,
        expected: String,
        received: String,
    },

    /// Files were still present after the bulk delete.
    #[error("directory {path} not empty after cleanup ({count} file(s) left), aborting")]
    NonEmptyAfterCleanup { path: String, count: u32 },

    /// The local bundle is not a zip archive.
    #[error("{} is not a zip archive", path.display())]
    InvalidArchive { path: PathBuf },

    /// The extracted archive does not have the expected layout.
    #[error("invalid firmware bundle: {reason}")]
    InvalidBundle { reason: String },

    /// A single file transfer failed.
    #[error("transfer of {} to {remote} failed: {reason}", local.display())]
    TransferFailure {
        local: PathBuf,
        remote: String,
        reason: String,
    },

    /// The operator interrupted the run.
    #[error("interrupted")]
    Interrupted,

    /// The device session failed.
    #[error("session error: {0}")]
    Session(String),

    /// Reading an operator answer failed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
