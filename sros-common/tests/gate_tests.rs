// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for fact gathering and the boot state gate.

mod common;

use common::FakeDevice;
use sros_common::gate::{check_safe_to_proceed, ensure_safe_to_proceed};
use sros_common::protocol::{
    SHOW_BOOT_SOURCE, SHOW_PRIMARY_IMAGE, SHOW_SECONDARY_IMAGE, SHOW_TERTIARY_IMAGE, SHOW_VERSION,
};
use sros_common::{DeviceFacts, Error};

fn make_facts(running: &str, primary: &str, boot_source: &str) -> DeviceFacts {
    DeviceFacts {
        running_version: running.to_string(),
        boot_source: boot_source.to_string(),
        primary_image_path: primary.to_string(),
        secondary_image_path: "secondary-location \"cf3:\\TiMOS-22.3.R1\"".to_string(),
        tertiary_image_path: String::new(),
    }
}

// =============================================================================
// check_safe_to_proceed tests
// =============================================================================

#[test]
fn test_matching_primary_boot_proceeds() {
    let facts = make_facts(
        "version-number \"TiMOS-C-22.7.R3 cpm/x86_64\"",
        "primary-location \"cf3:\\TiMOS-22.7.R3\"",
        "image-source primary",
    );
    assert!(check_safe_to_proceed(&facts).unwrap());
}

#[test]
fn test_surrounding_text_is_ignored() {
    let facts = make_facts("22.7.R3", "x 22.7.R3 y", "image-source primary");
    assert!(check_safe_to_proceed(&facts).unwrap());
}

#[test]
fn test_version_mismatch_refuses_with_primary_boot() {
    let facts = make_facts("22.7.R3", "cf3:\\TiMOS-22.3.R1", "image-source primary");
    assert!(!check_safe_to_proceed(&facts).unwrap());
}

#[test]
fn test_version_mismatch_refuses_with_secondary_boot() {
    let facts = make_facts("22.7.R3", "cf3:\\TiMOS-22.3.R1", "image-source secondary");
    assert!(!check_safe_to_proceed(&facts).unwrap());
}

#[test]
fn test_secondary_boot_refuses_with_matching_version() {
    let facts = make_facts("22.7.R3", "cf3:\\TiMOS-22.7.R3", "image-source secondary");
    assert!(!check_safe_to_proceed(&facts).unwrap());
}

#[test]
fn test_boot_source_trailing_whitespace_is_tolerated() {
    let facts = make_facts("22.7.R3", "cf3:\\TiMOS-22.7.R3", "  image-source primary\r\n");
    assert!(check_safe_to_proceed(&facts).unwrap());
}

#[test]
fn test_missing_version_token_is_no_match() {
    let facts = make_facts("garbage", "cf3:\\TiMOS-22.7.R3", "image-source primary");
    assert!(matches!(
        check_safe_to_proceed(&facts),
        Err(Error::NoMatch { .. })
    ));

    let facts = make_facts("22.7.R3", "", "image-source primary");
    assert!(matches!(
        check_safe_to_proceed(&facts),
        Err(Error::NoMatch { .. })
    ));
}

// =============================================================================
// ensure_safe_to_proceed tests
// =============================================================================

#[test]
fn test_ensure_passes_on_safe_device() {
    let facts = make_facts("22.7.R3", "cf3:\\TiMOS-22.7.R3", "image-source primary");
    assert!(ensure_safe_to_proceed(&facts).is_ok());
}

#[test]
fn test_ensure_refusal_is_precondition_failure() {
    let facts = make_facts("22.7.R3", "cf3:\\TiMOS-22.3.R1", "image-source primary");
    let err = ensure_safe_to_proceed(&facts).unwrap_err();
    assert!(matches!(err, Error::PreconditionFailure { .. }));
    assert!(err.to_string().contains("not booted from primary image"));
}

// =============================================================================
// DeviceFacts::gather tests
// =============================================================================

#[test]
fn test_gather_queries_each_fact_once() {
    let mut device = FakeDevice::new()
        .respond(SHOW_VERSION, "version-number \"TiMOS-C-22.7.R3\"")
        .respond(SHOW_BOOT_SOURCE, "image-source primary")
        .respond(SHOW_PRIMARY_IMAGE, "primary-location \"cf3:\\TiMOS-22.7.R3\"")
        .respond(SHOW_SECONDARY_IMAGE, "secondary-location \"cf3:\\TiMOS-22.3.R1\"")
        .respond(SHOW_TERTIARY_IMAGE, "");

    let facts = DeviceFacts::gather(&mut device).unwrap();

    assert_eq!(
        device.runs(),
        vec![
            SHOW_VERSION,
            SHOW_BOOT_SOURCE,
            SHOW_PRIMARY_IMAGE,
            SHOW_SECONDARY_IMAGE,
            SHOW_TERTIARY_IMAGE
        ]
    );
    assert_eq!(facts.boot_source, "image-source primary");
    assert_eq!(
        facts.secondary_image_dir().as_deref(),
        Some("cf3:\\TiMOS-22.3.R1")
    );
    assert!(check_safe_to_proceed(&facts).unwrap());
}

#[test]
fn test_no_secondary_image_configured() {
    let mut facts = make_facts("22.7.R3", "cf3:\\TiMOS-22.7.R3", "image-source primary");
    facts.secondary_image_path = String::new();
    assert_eq!(facts.secondary_image_dir(), None);
}
