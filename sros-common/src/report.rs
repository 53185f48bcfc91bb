// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Progress notices for the operator.
//!
//! The library never writes to the terminal; it hands notices to a
//! [`Reporter`] and the caller decides how to show them.

use std::path::Path;

use crate::bundle::TransferEntry;
use crate::cleanup::CleanupOutcome;
use crate::facts::DeviceFacts;
use crate::upload::{TransferOutcome, UploadReport};

/// Something worth telling the operator.
#[derive(Debug)]
pub enum Notice<'a> {
    /// `--dryrun` was given.
    DryRunReserved,
    /// Boot state read from the device.
    Facts(&'a DeviceFacts),
    /// The device refused to enter a directory.
    DirectoryMissing { path: &'a str, answer: &'a str },
    /// No secondary image is configured, cleanup skipped.
    NoSecondaryImage,
    DeletingFiles { path: &'a str, count: u32 },
    RemovingDirectory { path: &'a str },
    DirectoryNotEmpty { path: &'a str, count: u32 },
    CleanupFinished { path: &'a str, outcome: CleanupOutcome },
    /// Output returned by the device after a confirmation.
    DeviceOutput(&'a str),
    UploadStarted { archive: &'a Path },
    NotAnArchive { archive: &'a Path },
    DirectoryCreated { name: &'a str, output: &'a str },
    Transferring(&'a TransferEntry),
    Transferred(&'a TransferOutcome),
    UploadFinished(&'a UploadReport),
}

/// Receives notices as the run progresses.
pub trait Reporter {
    fn notice(&mut self, notice: Notice<'_>);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn notice(&mut self, notice: Notice<'_>) {
        (**self).notice(notice)
    }
}

/// Discards every notice.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quiet;

impl Reporter for Quiet {
    fn notice(&mut self, _notice: Notice<'_>) {}
}
