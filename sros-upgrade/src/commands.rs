// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Upgrade preparation steps and their console output.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};

use sros_common::{
    CleanupOutcome, Confirmer, DeviceFacts, FileTransfer, Notice, Reporter, Session,
    UpgradeOptions, UploadReport, ZipExtractor,
};

/// Run every step requested in `options` against a connected device.
pub fn prepare<D, C>(
    device: &mut D,
    options: &UpgradeOptions,
    confirmer: &mut C,
    interrupted: Arc<AtomicBool>,
) -> Result<()>
where
    D: Session + FileTransfer,
    C: Confirmer,
{
    sros_common::prepare(
        device,
        options,
        confirmer,
        ZipExtractor,
        &mut ConsoleReporter,
        Some(interrupted),
    )
    .context("Upgrade preparation stopped")?;
    Ok(())
}

/// Prints notices for the operator.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn notice(&mut self, notice: Notice<'_>) {
        match notice {
            Notice::DryRunReserved => println!("--dryrun is reserved and changes nothing yet"),
            Notice::Facts(facts) => info(facts),
            Notice::DirectoryMissing { path, answer } => {
                println!("{}: {}", path, answer);
            }
            Notice::NoSecondaryImage => {
                println!("No secondary image configured, nothing to clean up.")
            }
            Notice::DeletingFiles { path, count } => {
                println!("Deleting {} file(s) in {}", count, path)
            }
            Notice::RemovingDirectory { path } => println!("Removing {}", path),
            Notice::DirectoryNotEmpty { path, count } => {
                println!("{} still holds {} file(s), aborting", path, count)
            }
            Notice::CleanupFinished { path, outcome } => cleanup_result(path, outcome),
            Notice::DeviceOutput(output) => {
                if !output.trim().is_empty() {
                    println!("{}", output);
                }
            }
            Notice::UploadStarted { archive } => println!("Uploading {}", archive.display()),
            Notice::NotAnArchive { archive } => {
                println!("{} is not a zip archive", archive.display())
            }
            Notice::DirectoryCreated { name, output } => {
                println!("Created {}", name);
                if !output.trim().is_empty() {
                    println!("{}", output);
                }
            }
            Notice::Transferring(entry) => println!("{}", entry.remote),
            Notice::Transferred(outcome) => match &outcome.result {
                Ok(r) if r.already_present => println!("  already present"),
                Ok(r) => println!("  {} bytes sent, verified", r.bytes_sent),
                Err(reason) => println!("  FAILED: {}", reason),
            },
            Notice::UploadFinished(report) => summary(report),
        }
    }
}

/// Display the device boot state.
fn info(facts: &DeviceFacts) {
    println!("Device boot state:");
    println!("  Running version: {}", facts.running_version.trim());
    println!("  Boot source:     {}", facts.boot_source.trim());
    println!("  Primary image:   {}", facts.primary_image_path.trim());
    println!("  Secondary image: {}", facts.secondary_image_path.trim());
    println!("  Tertiary image:  {}", facts.tertiary_image_path.trim());
    println!();
}

fn cleanup_result(path: &str, outcome: CleanupOutcome) {
    match outcome {
        CleanupOutcome::Absent => println!("{} not present, nothing to clean up.", path),
        CleanupOutcome::AlreadyEmpty => println!("{} is already empty.", path),
        CleanupOutcome::Removed { files_deleted } => {
            println!("{} removed ({} file(s) deleted).", path, files_deleted)
        }
    }
    println!();
}

// Failures were already printed as they happened.
fn summary(report: &UploadReport) {
    println!();
    println!(
        "Upload finished: {} transfer(s), {} failed, {} director(ies) created.",
        report.outcomes.len(),
        report.failure_count(),
        report.directories_created.len()
    );
}
