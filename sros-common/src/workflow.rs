// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! One preparation run: facts, boot state check, cleanup, upload.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::info;

use crate::cleanup::{CleanupDriver, CleanupOutcome};
use crate::config::UpgradeOptions;
use crate::error::Result;
use crate::facts::DeviceFacts;
use crate::gate;
use crate::report::{Notice, Reporter};
use crate::session::{Confirmer, FileTransfer, Session};
use crate::upload::{ArchiveExtractor, UploadOrchestrator, UploadReport};

/// What a run did.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub facts: DeviceFacts,
    /// Set when `delete` was asked and a secondary image is configured.
    pub cleanup: Option<CleanupOutcome>,
    /// Set when `copy` was asked.
    pub upload: Option<UploadReport>,
}

/// Run every step requested in `options` against a connected device.
///
/// The boot state check runs right after the facts are read; nothing is
/// deleted or uploaded unless it passes.
pub fn prepare<D, C, A, R>(
    device: &mut D,
    options: &UpgradeOptions,
    confirmer: &mut C,
    extractor: A,
    reporter: &mut R,
    interrupted: Option<Arc<AtomicBool>>,
) -> Result<RunReport>
where
    D: Session + FileTransfer + ?Sized,
    C: Confirmer + ?Sized,
    A: ArchiveExtractor,
    R: Reporter + ?Sized,
{
    if options.dry_run {
        reporter.notice(Notice::DryRunReserved);
    }

    let facts = DeviceFacts::gather(device)?;
    if options.get_info {
        reporter.notice(Notice::Facts(&facts));
    }

    gate::ensure_safe_to_proceed(&facts)?;
    info!("boot state check passed");

    let mut cleanup = None;
    if options.delete {
        match facts.secondary_image_dir() {
            Some(path) => {
                let outcome =
                    CleanupDriver::new(&mut *device, &mut *confirmer, path.as_str())
                        .with_reporter(&mut *reporter)
                        .run()?;
                reporter.notice(Notice::CleanupFinished {
                    path: &path,
                    outcome,
                });
                cleanup = Some(outcome);
            }
            None => reporter.notice(Notice::NoSecondaryImage),
        }
    }

    let mut upload = None;
    if let Some(archive) = &options.copy {
        let mut orchestrator =
            UploadOrchestrator::new(&mut *device, extractor).with_reporter(&mut *reporter);
        if let Some(flag) = interrupted {
            orchestrator = orchestrator.with_interrupt_flag(flag);
        }
        upload = Some(orchestrator.upload(archive, options.efi)?);
    }

    Ok(RunReport {
        facts,
        cleanup,
        upload,
    })
}
