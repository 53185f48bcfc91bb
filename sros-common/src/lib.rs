// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Upgrade preparation for Nokia SROS routers.
//!
//! The logic here only talks to the device through the [`Session`] and
//! [`FileTransfer`] traits, so it can be driven by a real SSH connection or
//! by a scripted fake:
//! - [`inspector`]: facts out of free-text command output
//! - [`gate`]: boot state check run before anything else
//! - [`cleanup`]: interactive removal of the secondary image directory
//! - [`bundle`] and [`upload`]: ordered push of a firmware bundle
//! - [`workflow`]: the steps above in order, progress sent to a [`Reporter`]

pub mod bundle;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod facts;
pub mod gate;
pub mod inspector;
pub mod protocol;
pub mod report;
pub mod session;
pub mod upload;
pub mod workflow;

// Re-export commonly used types
pub use bundle::{FirmwareBundle, Phase, PlanStep, TransferEntry, TransferPlan};
pub use cleanup::{CleanupDriver, CleanupOutcome, CleanupState};
pub use config::UpgradeOptions;
pub use error::{Error, Result};
pub use facts::{DeviceFacts, DirectoryState};
pub use inspector::{ConfirmPrompt, VersionToken};
pub use report::{Notice, Quiet, Reporter};
pub use session::{Confirmer, FileTransfer, Session, TransferResult};
pub use upload::{
    ArchiveExtractor, TransferOutcome, UploadOrchestrator, UploadReport, ZipExtractor,
};
pub use workflow::{prepare, RunReport};
