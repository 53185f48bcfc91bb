// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Scripted stand-ins for the device and the operator.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use sros_common::{
    Confirmer, Error, FileTransfer, Notice, Reporter, Result, Session, TransferResult,
};

/// Everything the fake device was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Run(String),
    Interactive { command: String, expected: String },
    WriteRaw(String),
    ReadUntilPrompt,
    Disconnect,
    Transfer {
        local: PathBuf,
        remote: String,
        filesystem: String,
        overwrite: bool,
        local_existed: bool,
    },
}

/// Device answering from scripted responses.
///
/// `run` answers are queued per command; a command with an empty queue
/// answers with an empty string, which the device does for a successful
/// change-directory.
#[derive(Default)]
pub struct FakeDevice {
    pub events: Vec<Event>,
    responses: HashMap<String, VecDeque<String>>,
    interactive: VecDeque<String>,
    failing_transfers: HashSet<String>,
    unverified_transfers: HashSet<String>,
    interrupted_transfers: HashSet<String>,
    pub disconnected: bool,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for `command`.
    pub fn respond(mut self, command: &str, answer: &str) -> Self {
        self.responses
            .entry(command.to_string())
            .or_default()
            .push_back(answer.to_string());
        self
    }

    /// Queue the next answer to an interactive command.
    pub fn interactive(mut self, answer: &str) -> Self {
        self.interactive.push_back(answer.to_string());
        self
    }

    /// Make the transfer to `remote` fail.
    pub fn fail_transfer(mut self, remote: &str) -> Self {
        self.failing_transfers.insert(remote.to_string());
        self
    }

    /// Make the transfer to `remote` succeed without verification.
    pub fn unverified_transfer(mut self, remote: &str) -> Self {
        self.unverified_transfers.insert(remote.to_string());
        self
    }

    /// Make the transfer to `remote` stop as if the operator pressed Ctrl-C.
    pub fn interrupt_transfer(mut self, remote: &str) -> Self {
        self.interrupted_transfers.insert(remote.to_string());
        self
    }

    pub fn runs(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Run(command) => Some(command.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn interactive_commands(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Interactive { command, .. } => Some(command.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn raw_writes(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::WriteRaw(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Remote paths of every transfer, in order.
    pub fn transferred(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Transfer { remote, .. } => Some(remote.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }
}

impl Session for FakeDevice {
    fn run(&mut self, command: &str) -> Result<String> {
        self.events.push(Event::Run(command.to_string()));
        Ok(self
            .responses
            .get_mut(command)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_default())
    }

    fn run_interactive(&mut self, command: &str, expected: &str) -> Result<String> {
        self.events.push(Event::Interactive {
            command: command.to_string(),
            expected: expected.to_string(),
        });
        Ok(self.interactive.pop_front().unwrap_or_default())
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        self.events.push(Event::WriteRaw(text.to_string()));
        Ok(())
    }

    fn read_until_prompt(&mut self) -> Result<String> {
        self.events.push(Event::ReadUntilPrompt);
        Ok(String::new())
    }

    fn disconnect(&mut self) -> Result<()> {
        if !self.disconnected {
            self.events.push(Event::Disconnect);
            self.disconnected = true;
        }
        Ok(())
    }
}

impl FileTransfer for FakeDevice {
    fn transfer_file(
        &mut self,
        local: &Path,
        remote: &str,
        filesystem: &str,
        overwrite: bool,
    ) -> Result<TransferResult> {
        self.events.push(Event::Transfer {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            filesystem: filesystem.to_string(),
            overwrite,
            local_existed: local.is_file(),
        });

        if self.interrupted_transfers.contains(remote) {
            return Err(Error::Interrupted);
        }
        if self.failing_transfers.contains(remote) {
            return Err(Error::Session("link down".to_string()));
        }

        Ok(TransferResult {
            bytes_sent: fs::metadata(local).map(|m| m.len()).unwrap_or(0),
            verified: !self.unverified_transfers.contains(remote),
            already_present: false,
        })
    }
}

/// Operator answering from a script, `y` once the script runs out.
#[derive(Default)]
pub struct ScriptedConfirmer {
    replies: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirmer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, answer: &str) -> Self {
        self.replies.push_back(answer.to_string());
        self
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.replies.pop_front().unwrap_or_else(|| "y".to_string()))
    }
}

/// Reporter keeping a short label per notice.
#[derive(Default)]
pub struct RecordingReporter {
    pub notices: Vec<String>,
}

impl Reporter for RecordingReporter {
    fn notice(&mut self, notice: Notice<'_>) {
        let label = match notice {
            Notice::DryRunReserved => "dry-run".to_string(),
            Notice::Facts(_) => "facts".to_string(),
            Notice::DirectoryMissing { path, .. } => format!("missing {}", path),
            Notice::NoSecondaryImage => "no secondary image".to_string(),
            Notice::DeletingFiles { path, count } => format!("deleting {} in {}", count, path),
            Notice::RemovingDirectory { path } => format!("removing {}", path),
            Notice::DirectoryNotEmpty { path, count } => format!("not empty {} {}", path, count),
            Notice::CleanupFinished { outcome, .. } => format!("cleanup {:?}", outcome),
            Notice::DeviceOutput(_) => "output".to_string(),
            Notice::UploadStarted { .. } => "upload started".to_string(),
            Notice::NotAnArchive { .. } => "not an archive".to_string(),
            Notice::DirectoryCreated { name, .. } => format!("created {}", name),
            Notice::Transferring(entry) => format!("transferring {}", entry.remote),
            Notice::Transferred(outcome) => format!(
                "transferred {} {}",
                outcome.entry.remote,
                if outcome.is_success() { "ok" } else { "failed" }
            ),
            Notice::UploadFinished(report) => {
                format!("upload finished {} failed", report.failure_count())
            }
        };
        self.notices.push(label);
    }
}
