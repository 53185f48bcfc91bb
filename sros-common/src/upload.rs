// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Upload of an archived firmware bundle to the device.
//!
//! The archive is extracted into a private temporary directory that is
//! removed when the upload returns, whatever the outcome.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error};
use zip::ZipArchive;

use crate::bundle::{FirmwareBundle, Phase, PlanStep, TransferEntry, TransferPlan};
use crate::error::{Error, Result};
use crate::facts::change_into;
use crate::protocol::{self, BUNDLE_ROOT, FILESYSTEM};
use crate::report::{Notice, Quiet, Reporter};
use crate::session::{FileTransfer, Session, TransferResult};

/// Archive format of firmware bundles.
pub trait ArchiveExtractor {
    fn is_valid_archive(&self, path: &Path) -> bool;
    fn extract_all(&self, path: &Path, dest: &Path) -> Result<()>;
}

/// Zip bundles.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn is_valid_archive(&self, path: &Path) -> bool {
        File::open(path)
            .ok()
            .and_then(|file| ZipArchive::new(BufReader::new(file)).ok())
            .is_some()
    }

    fn extract_all(&self, path: &Path, dest: &Path) -> Result<()> {
        let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
        debug!(
            "archive entries: {:?}",
            archive.file_names().collect::<Vec<_>>()
        );
        // Entries escaping `dest` are rejected by the zip crate.
        archive.extract(dest)?;
        Ok(())
    }
}

/// Result of one planned transfer.
#[derive(Clone, Debug)]
pub struct TransferOutcome {
    pub entry: TransferEntry,
    pub result: std::result::Result<TransferResult, String>,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything an upload did.
#[derive(Clone, Debug, Default)]
pub struct UploadReport {
    pub outcomes: Vec<TransferOutcome>,
    pub directories_created: Vec<String>,
}

impl UploadReport {
    pub fn failures(&self) -> impl Iterator<Item = &TransferOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Pushes a firmware bundle through a device's transfer facade.
pub struct UploadOrchestrator<
    'a,
    D: Session + FileTransfer + ?Sized,
    A: ArchiveExtractor,
    R: Reporter = Quiet,
> {
    device: &'a mut D,
    extractor: A,
    reporter: R,
    temp_root: Option<PathBuf>,
    interrupted: Option<Arc<AtomicBool>>,
}

impl<'a, D: Session + FileTransfer + ?Sized, A: ArchiveExtractor> UploadOrchestrator<'a, D, A> {
    pub fn new(device: &'a mut D, extractor: A) -> Self {
        Self {
            device,
            extractor,
            reporter: Quiet,
            temp_root: None,
            interrupted: None,
        }
    }
}

impl<'a, D, A, R> UploadOrchestrator<'a, D, A, R>
where
    D: Session + FileTransfer + ?Sized,
    A: ArchiveExtractor,
    R: Reporter,
{
    /// Send progress notices to `reporter`.
    pub fn with_reporter<R2: Reporter>(self, reporter: R2) -> UploadOrchestrator<'a, D, A, R2> {
        UploadOrchestrator {
            device: self.device,
            extractor: self.extractor,
            reporter,
            temp_root: self.temp_root,
            interrupted: self.interrupted,
        }
    }

    /// Extract below `root` instead of the system temporary directory.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Stop before the next step once `flag` is set.
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    /// Upload the bundle in `archive`, EFI files included when `include_efi`.
    pub fn upload(&mut self, archive: &Path, include_efi: bool) -> Result<UploadReport> {
        self.reporter.notice(Notice::UploadStarted { archive });
        if !self.extractor.is_valid_archive(archive) {
            self.reporter.notice(Notice::NotAnArchive { archive });
            return Err(Error::InvalidArchive {
                path: archive.to_path_buf(),
            });
        }

        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("sros-upgrade-");
            b
        };
        let tmp = match &self.temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!("extracting into {}", tmp.path().display());

        self.extractor.extract_all(archive, tmp.path())?;
        let bundle = FirmwareBundle::open(&tmp.path().join(BUNDLE_ROOT))?;
        let plan = bundle.plan(include_efi);

        let report = self.execute(&plan)?;
        tmp.close()?;
        self.reporter.notice(Notice::UploadFinished(&report));
        Ok(report)
    }

    /// Run every step of `plan` in order.
    ///
    /// EFI and firmware file failures are recorded and the upload goes on; a
    /// failed bootloader transfer or an interrupt stops it.
    pub fn execute(&mut self, plan: &TransferPlan) -> Result<UploadReport> {
        let mut report = UploadReport::default();

        for step in plan.steps() {
            self.check_interrupted()?;
            match step {
                PlanStep::EnsureDirectory { name } => {
                    if self.ensure_directory(name)? {
                        report.directories_created.push(name.clone());
                    }
                }
                PlanStep::Transfer(entry) => {
                    let outcome = self.transfer(entry)?;
                    if let (Phase::Bootloader, Err(reason)) = (entry.phase, &outcome.result) {
                        return Err(Error::TransferFailure {
                            local: entry.local.clone(),
                            remote: entry.remote.clone(),
                            reason: reason.clone(),
                        });
                    }
                    self.reporter.notice(Notice::Transferred(&outcome));
                    report.outcomes.push(outcome);
                }
            }
        }

        Ok(report)
    }

    /// Create a firmware directory unless it exists. True if created.
    fn ensure_directory(&mut self, name: &str) -> Result<bool> {
        let path = protocol::cli_path(FILESYSTEM, name);
        if change_into(&mut *self.device, &path)?.is_none() {
            return Ok(false);
        }
        let output = self.device.run(&protocol::make_directory(&path))?;
        self.reporter.notice(Notice::DirectoryCreated {
            name,
            output: &output,
        });
        Ok(true)
    }

    /// Push one file. Only an interrupt is returned as an error; every other
    /// failure is kept in the outcome.
    fn transfer(&mut self, entry: &TransferEntry) -> Result<TransferOutcome> {
        self.reporter.notice(Notice::Transferring(entry));
        let result = match self.device.transfer_file(
            &entry.local,
            &entry.remote,
            &entry.filesystem,
            entry.overwrite,
        ) {
            Ok(result) if result.verified || result.already_present => Ok(result),
            Ok(_) => Err("transfer not verified".to_string()),
            Err(Error::Interrupted) => return Err(Error::Interrupted),
            Err(e) => Err(e.to_string()),
        };

        if let Err(reason) = &result {
            error!("{} -> {}: {}", entry.local.display(), entry.remote, reason);
        }

        Ok(TransferOutcome {
            entry: entry.clone(),
            result,
        })
    }

    fn check_interrupted(&self) -> Result<()> {
        match &self.interrupted {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Interrupted),
            _ => Ok(()),
        }
    }
}
