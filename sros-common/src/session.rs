// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Seams to the device session, the file transfer primitive and the operator.

use std::path::Path;

use crate::error::Result;

/// Interactive command session to one device.
pub trait Session {
    /// Run a command and return its output up to the next prompt.
    fn run(&mut self, command: &str) -> Result<String>;

    /// Run a command and return its output up to `expected`, leaving the
    /// device waiting for further input.
    fn run_interactive(&mut self, command: &str, expected: &str) -> Result<String>;

    /// Write text to the channel as-is.
    fn write_raw(&mut self, text: &str) -> Result<()>;

    /// Read until the session prompt reappears.
    fn read_until_prompt(&mut self) -> Result<String>;

    /// Close the session. Calling it again is a no-op.
    fn disconnect(&mut self) -> Result<()>;
}

/// Outcome of a single file transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferResult {
    pub bytes_sent: u64,
    pub verified: bool,
    /// The remote file existed and overwrite was off; nothing was sent.
    pub already_present: bool,
}

/// File upload primitive.
pub trait FileTransfer {
    fn transfer_file(
        &mut self,
        local: &Path,
        remote: &str,
        filesystem: &str,
        overwrite: bool,
    ) -> Result<TransferResult>;
}

/// Produces the reply to a device confirmation prompt.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> Result<String>;
}
