// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Boot state and directory facts gathered from the device.

use log::debug;

use crate::error::{Error, Result};
use crate::inspector;
use crate::protocol;
use crate::session::Session;

/// Boot state of the device, read once per run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceFacts {
    pub running_version: String,
    pub boot_source: String,
    pub primary_image_path: String,
    pub secondary_image_path: String,
    pub tertiary_image_path: String,
}

impl DeviceFacts {
    /// Query the device for its boot state.
    pub fn gather<S: Session + ?Sized>(session: &mut S) -> Result<Self> {
        let facts = Self {
            running_version: session.run(protocol::SHOW_VERSION)?,
            boot_source: session.run(protocol::SHOW_BOOT_SOURCE)?,
            primary_image_path: session.run(protocol::SHOW_PRIMARY_IMAGE)?,
            secondary_image_path: session.run(protocol::SHOW_SECONDARY_IMAGE)?,
            tertiary_image_path: session.run(protocol::SHOW_TERTIARY_IMAGE)?,
        };
        debug!("gathered {:?}", facts);
        Ok(facts)
    }

    /// Directory of the secondary image, if one is configured.
    pub fn secondary_image_dir(&self) -> Option<String> {
        inspector::extract_image_path(&self.secondary_image_path)
    }
}

/// File count of a device directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryState {
    pub path: String,
    /// `None` when the directory could not be entered.
    pub file_count: Option<u32>,
    /// Device answer to the refused change-directory.
    pub refusal: Option<String>,
}

impl DirectoryState {
    /// Probe `path` on the device.
    ///
    /// A refused change-directory means absent. A listing without a file
    /// count fails with [`Error::NoMatch`].
    pub fn probe<S: Session + ?Sized>(session: &mut S, path: &str) -> Result<Self> {
        if let Some(refusal) = change_into(session, path)? {
            return Ok(Self {
                path: path.to_string(),
                file_count: None,
                refusal: Some(refusal),
            });
        }

        let listing = session.run(protocol::LIST_FILES)?;
        let count = inspector::extract_file_count(&listing).ok_or(Error::NoMatch {
            what: "file count",
            text: listing,
        })?;
        Ok(Self {
            path: path.to_string(),
            file_count: Some(count),
            refusal: None,
        })
    }
}

/// Change into `path`. Any output from the device is a refusal and is
/// returned.
pub fn change_into<S: Session + ?Sized>(session: &mut S, path: &str) -> Result<Option<String>> {
    let answer = session.run(&protocol::change_directory(path))?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer.to_string()))
    }
}
