// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Device command vocabulary and fixed strings of the SROS MD-CLI.

// --- Storage layout ---

/// Filesystem receiving every transfer.
pub const FILESYSTEM: &str = "cf3:";
/// Root of the extracted bundle.
pub const BUNDLE_ROOT: &str = "cflash";
pub const EFI_DIR: &str = "EFI";
pub const BOOTLOADER: &str = "boot.ldr";
pub const FIRMWARE_DIR_PREFIX: &str = "TiMOS-";

// --- Expected answers ---

pub const BOOT_SOURCE_PRIMARY: &str = "image-source primary";
pub const DELETE_PROMPT: &str = "Delete";
pub const REMOVE_DIR_PROMPT: &str = "Are you sure";
/// Last characters of every confirmation prompt.
pub const CONFIRM_SUFFIX: &str = "(y/n)?";

// --- Fact queries ---

pub const SHOW_VERSION: &str = "state system version version-number";
pub const SHOW_BOOT_SOURCE: &str = "state system bootup image-source";
pub const SHOW_PRIMARY_IMAGE: &str = "admin show configuration bof flat bof image primary-location";
pub const SHOW_SECONDARY_IMAGE: &str =
    "admin show configuration bof flat bof image secondary-location";
pub const SHOW_TERTIARY_IMAGE: &str =
    "admin show configuration bof flat bof image tertiary-location";

/// Disables output paging for the session.
pub const DISABLE_PAGING: &str = "environment more false";

pub const LIST_FILES: &str = "file list";

/// Change the working directory.
pub fn change_directory(path: &str) -> String {
    format!("file change-directory {}", path)
}

/// List a path.
pub fn list_path(path: &str) -> String {
    format!("file list {}", path)
}

/// Delete every file in a directory, one confirmation per file.
pub fn remove_all_files(dir: &str) -> String {
    format!("file remove {}\\*", dir)
}

pub fn remove_directory(dir: &str) -> String {
    format!("file remove-directory {}", dir)
}

pub fn make_directory(dir: &str) -> String {
    format!("file make-directory {}", dir)
}

/// CLI form of a path on a filesystem, e.g. `cf3:\TiMOS-22.7.R3\both.tim`.
pub fn cli_path(filesystem: &str, path: &str) -> String {
    let path = path.trim_start_matches('/').replace('/', "\\");
    if path.is_empty() {
        filesystem.to_string()
    } else {
        format!("{}\\{}", filesystem, path)
    }
}

/// SCP target for a path on a filesystem, e.g. `cf3:/boot.ldr`.
pub fn scp_path(filesystem: &str, path: &str) -> String {
    format!(
        "{}/{}",
        filesystem,
        path.trim_start_matches('/').replace('\\', "/")
    )
}
