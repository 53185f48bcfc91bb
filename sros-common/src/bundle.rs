// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Firmware bundle layout and the ordered transfer plan derived from it.
//!
//! An extracted bundle looks like:
//!
//! ```text
//! cflash/
//!   EFI/...          pushed as-is when EFI files are requested
//!   boot.ldr         bootloader
//!   TiMOS-<ver>/...  one or more firmware directories
//! ```
//!
//! The plan always orders EFI files first, then `boot.ldr`, then the
//! firmware directories, so the bootloader never lags behind the EFI tree
//! and never trails the firmware it loads.

use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::protocol::{BOOTLOADER, EFI_DIR, FILESYSTEM, FIRMWARE_DIR_PREFIX};

/// Stage of the upload a transfer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Efi,
    Bootloader,
    Firmware,
}

/// One file to push to the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferEntry {
    pub local: PathBuf,
    /// Path relative to the filesystem root, `/` separated.
    pub remote: String,
    pub filesystem: String,
    pub overwrite: bool,
    pub phase: Phase,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanStep {
    /// Create `name` under the filesystem root unless it already exists.
    EnsureDirectory { name: String },
    Transfer(TransferEntry),
}

/// Ordered steps of an upload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferPlan {
    steps: Vec<PlanStep>,
}

impl TransferPlan {
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// File transfers in execution order.
    pub fn transfers(&self) -> impl Iterator<Item = &TransferEntry> {
        self.steps.iter().filter_map(|step| match step {
            PlanStep::Transfer(entry) => Some(entry),
            PlanStep::EnsureDirectory { .. } => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Firmware directory at the bundle root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirmwareDir {
    pub name: String,
    pub files: Vec<PathBuf>,
}

/// Extracted firmware bundle.
#[derive(Clone, Debug)]
pub struct FirmwareBundle {
    root: PathBuf,
    efi_files: Vec<PathBuf>,
    bootloader: PathBuf,
    firmware_dirs: Vec<FirmwareDir>,
}

impl FirmwareBundle {
    /// Inspect the bundle rooted at `root` (the `cflash` directory).
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::InvalidBundle {
                reason: format!("{} is not a directory", root.display()),
            });
        }

        let bootloader = root.join(BOOTLOADER);
        if !bootloader.is_file() {
            return Err(Error::InvalidBundle {
                reason: format!("{} not found", bootloader.display()),
            });
        }

        let efi = root.join(EFI_DIR);
        let mut efi_files = Vec::new();
        if efi.is_dir() {
            for entry in WalkDir::new(&efi).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() {
                    efi_files.push(entry.into_path());
                }
            }
        }

        let mut firmware_dirs = Vec::new();
        for entry in children(root) {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(FIRMWARE_DIR_PREFIX) || !entry.file_type().is_dir() {
                continue;
            }

            let mut files = Vec::new();
            for child in children(entry.path()) {
                let child = child?;
                if child.file_type().is_dir() {
                    warn!("skipping nested directory {}", child.path().display());
                    continue;
                }
                files.push(child.into_path());
            }
            firmware_dirs.push(FirmwareDir { name, files });
        }

        if firmware_dirs.is_empty() {
            warn!("no {}* directory in {}", FIRMWARE_DIR_PREFIX, root.display());
        }

        Ok(Self {
            root: root.to_path_buf(),
            efi_files,
            bootloader,
            firmware_dirs,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn efi_files(&self) -> &[PathBuf] {
        &self.efi_files
    }

    pub fn firmware_dirs(&self) -> &[FirmwareDir] {
        &self.firmware_dirs
    }

    /// Build the transfer plan for this bundle.
    pub fn plan(&self, include_efi: bool) -> TransferPlan {
        let mut steps = Vec::new();

        if include_efi {
            for file in &self.efi_files {
                steps.push(PlanStep::Transfer(TransferEntry {
                    local: file.clone(),
                    remote: remote_suffix(&self.root, file),
                    filesystem: FILESYSTEM.to_string(),
                    overwrite: true,
                    phase: Phase::Efi,
                }));
            }
        }

        steps.push(PlanStep::Transfer(TransferEntry {
            local: self.bootloader.clone(),
            remote: BOOTLOADER.to_string(),
            filesystem: FILESYSTEM.to_string(),
            overwrite: true,
            phase: Phase::Bootloader,
        }));

        for dir in &self.firmware_dirs {
            steps.push(PlanStep::EnsureDirectory {
                name: dir.name.clone(),
            });
            for file in &dir.files {
                let file_name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                steps.push(PlanStep::Transfer(TransferEntry {
                    local: file.clone(),
                    remote: format!("{}/{}", dir.name, file_name),
                    filesystem: FILESYSTEM.to_string(),
                    overwrite: false,
                    phase: Phase::Firmware,
                }));
            }
        }

        TransferPlan { steps }
    }
}

/// Path of `file` below `root`, `/` separated.
fn remote_suffix(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Direct children of `dir`, sorted by name.
fn children(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
}
