// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Run options.

use std::path::PathBuf;

/// What a run is asked to do, built once from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeOptions {
    /// Print the gathered device facts. Always on.
    pub get_info: bool,
    /// Reserved; only announced.
    pub dry_run: bool,
    /// Remove the secondary image directory.
    pub delete: bool,
    /// Bundle archive to upload.
    pub copy: Option<PathBuf>,
    /// Push the bundle's EFI tree before the bootloader.
    pub efi: bool,
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            get_info: true,
            dry_run: false,
            delete: false,
            copy: None,
            efi: false,
        }
    }
}
