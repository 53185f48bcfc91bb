// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Safety gate run before any destructive or upload step.

use crate::error::{Error, Result};
use crate::facts::DeviceFacts;
use crate::inspector::extract_version_token;
use crate::protocol::BOOT_SOURCE_PRIMARY;

/// True when the device booted from its primary image and that image
/// carries the running version.
///
/// Fails with [`Error::NoMatch`] if either answer has no version token.
pub fn check_safe_to_proceed(facts: &DeviceFacts) -> Result<bool> {
    let running = extract_version_token(&facts.running_version)?;
    let primary = extract_version_token(&facts.primary_image_path)?;
    Ok(running == primary && facts.boot_source.trim() == BOOT_SOURCE_PRIMARY)
}

/// Like [`check_safe_to_proceed`], turning a refusal into
/// [`Error::PreconditionFailure`].
pub fn ensure_safe_to_proceed(facts: &DeviceFacts) -> Result<()> {
    if check_safe_to_proceed(facts)? {
        return Ok(());
    }

    Err(Error::PreconditionFailure {
        running: facts.running_version.trim().to_string(),
        primary: facts.primary_image_path.trim().to_string(),
        boot_source: facts.boot_source.trim().to_string(),
    })
}
