// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Interactive removal of the stale secondary image directory.
//!
//! The device asks for one confirmation per file when deleting a directory's
//! content and once more before removing the directory itself. The driver
//! walks these exchanges as an explicit state machine:
//!
//! ```text
//! Idle -> DirectoryCheck -> BulkFileDelete -> DirectoryCheck(recheck)
//!      -> DirectoryRemove | AbortNotEmpty -> Done
//! ```
//!
//! A prompt that does not look like the expected confirmation stops the run
//! before anything else is sent.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::facts::DirectoryState;
use crate::inspector::ConfirmPrompt;
use crate::protocol::{self, FILESYSTEM};
use crate::report::{Notice, Quiet, Reporter};
use crate::session::{Confirmer, Session};

/// How the cleanup ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The directory does not exist on the device.
    Absent,
    /// The directory exists but holds no files; it is left in place.
    AlreadyEmpty,
    /// Files (if any) were deleted and the directory removed.
    Removed { files_deleted: u32 },
}

/// Cleanup state machine states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanupState {
    Idle,
    DirectoryCheck { recheck: bool },
    BulkFileDelete { count: u32 },
    DirectoryRemove,
    AbortNotEmpty { count: u32 },
    Done(CleanupOutcome),
}

/// Drives the deletion of one directory over a device session.
pub struct CleanupDriver<'a, S: Session + ?Sized, C: Confirmer + ?Sized, R: Reporter = Quiet> {
    session: &'a mut S,
    confirmer: &'a mut C,
    reporter: R,
    path: String,
    state: CleanupState,
    files_deleted: u32,
}

impl<'a, S: Session + ?Sized, C: Confirmer + ?Sized> CleanupDriver<'a, S, C> {
    pub fn new(session: &'a mut S, confirmer: &'a mut C, path: impl Into<String>) -> Self {
        Self {
            session,
            confirmer,
            reporter: Quiet,
            path: path.into(),
            state: CleanupState::Idle,
            files_deleted: 0,
        }
    }
}

impl<'a, S: Session + ?Sized, C: Confirmer + ?Sized, R: Reporter> CleanupDriver<'a, S, C, R> {
    /// Send progress notices to `reporter`.
    pub fn with_reporter<R2: Reporter>(self, reporter: R2) -> CleanupDriver<'a, S, C, R2> {
        CleanupDriver {
            session: self.session,
            confirmer: self.confirmer,
            reporter,
            path: self.path,
            state: self.state,
            files_deleted: self.files_deleted,
        }
    }

    pub fn state(&self) -> CleanupState {
        self.state
    }

    /// Run the state machine to completion.
    ///
    /// On [`Error::NonEmptyAfterCleanup`], [`Error::ProtocolSyncFault`] and
    /// [`Error::NoMatch`] the session has already been disconnected.
    pub fn run(mut self) -> Result<CleanupOutcome> {
        loop {
            if let CleanupState::Done(outcome) = self.state {
                return Ok(outcome);
            }
            self.advance()?;
        }
    }

    /// Execute the current state and move to the next one.
    pub fn advance(&mut self) -> Result<CleanupState> {
        self.state = self.step()?;
        Ok(self.state)
    }

    fn step(&mut self) -> Result<CleanupState> {
        debug!("cleanup of {}: {:?}", self.path, self.state);
        match self.state {
            CleanupState::Idle => Ok(CleanupState::DirectoryCheck { recheck: false }),
            CleanupState::DirectoryCheck { recheck } => self.handle_directory_check(recheck),
            CleanupState::BulkFileDelete { count } => self.handle_bulk_delete(count),
            CleanupState::DirectoryRemove => self.handle_directory_remove(),
            CleanupState::AbortNotEmpty { count } => Err(self.abort_not_empty(count)),
            CleanupState::Done(outcome) => Ok(CleanupState::Done(outcome)),
        }
    }

    /// Count the directory's files and pick the next step.
    fn handle_directory_check(&mut self, recheck: bool) -> Result<CleanupState> {
        let dir = match DirectoryState::probe(&mut *self.session, &self.path) {
            Ok(dir) => dir,
            Err(e @ Error::NoMatch { .. }) => {
                self.disconnect_quietly();
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        if let Some(answer) = &dir.refusal {
            self.reporter.notice(Notice::DirectoryMissing {
                path: &self.path,
                answer,
            });
        }

        let next = match (recheck, dir.file_count) {
            (false, None) => CleanupState::Done(CleanupOutcome::Absent),
            (false, Some(0)) => CleanupState::Done(CleanupOutcome::AlreadyEmpty),
            (false, Some(count)) => CleanupState::BulkFileDelete { count },
            (true, Some(count)) if count > 0 => CleanupState::AbortNotEmpty { count },
            (true, _) => CleanupState::DirectoryRemove,
        };
        Ok(next)
    }

    /// Delete every file, forwarding one confirmation per file.
    fn handle_bulk_delete(&mut self, count: u32) -> Result<CleanupState> {
        self.reporter.notice(Notice::DeletingFiles {
            path: &self.path,
            count,
        });

        let command = protocol::remove_all_files(&self.path);
        let mut reply = self.confirm_step("deleting files", &command, ConfirmPrompt::DeleteFile)?;
        for _ in 1..count {
            reply = self.confirm_step("deleting files", &reply, ConfirmPrompt::DeleteFile)?;
        }

        self.session.write_raw(&format!("{}\n", reply))?;
        let output = self.session.read_until_prompt()?;
        self.reporter.notice(Notice::DeviceOutput(&output));

        self.files_deleted = count;
        Ok(CleanupState::DirectoryCheck { recheck: true })
    }

    /// Remove the now empty directory from the filesystem root.
    fn handle_directory_remove(&mut self) -> Result<CleanupState> {
        self.reporter
            .notice(Notice::RemovingDirectory { path: &self.path });
        self.session.run(&protocol::change_directory(FILESYSTEM))?;

        let command = protocol::remove_directory(&self.path);
        let reply =
            self.confirm_step("removing directory", &command, ConfirmPrompt::RemoveDirectory)?;
        self.session.write_raw(&format!("{}\n", reply))?;
        let output = self.session.read_until_prompt()?;
        self.reporter.notice(Notice::DeviceOutput(&output));

        Ok(CleanupState::Done(CleanupOutcome::Removed {
            files_deleted: self.files_deleted,
        }))
    }

    /// Send `input`, check the device answered with the `expected` question
    /// and obtain the reply to forward.
    fn confirm_step(
        &mut self,
        step: &'static str,
        input: &str,
        expected: ConfirmPrompt,
    ) -> Result<String> {
        let prompt = self.session.run_interactive(input, expected.keyword())?;
        if !expected.matches(&prompt) {
            return Err(self.out_of_sync(step, expected, prompt));
        }
        self.confirmer.confirm(prompt.trim())
    }

    fn out_of_sync(&mut self, step: &'static str, expected: ConfirmPrompt, received: String) -> Error {
        self.disconnect_quietly();
        Error::ProtocolSyncFault {
            step,
            expected: expected.keyword().to_string(),
            received,
        }
    }

    fn abort_not_empty(&mut self, count: u32) -> Error {
        self.reporter.notice(Notice::DirectoryNotEmpty {
            path: &self.path,
            count,
        });
        self.disconnect_quietly();
        Error::NonEmptyAfterCleanup {
            path: self.path.clone(),
            count,
        }
    }

    fn disconnect_quietly(&mut self) {
        if let Err(e) = self.session.disconnect() {
            warn!("disconnect failed: {}", e);
        }
    }
}
