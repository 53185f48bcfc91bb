// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Operator prompts.

use anyhow::{Context, Result};
use dialoguer::{Input, Password};

use sros_common::{Confirmer, Error};

/// Shows each device confirmation prompt and forwards the operator's answer.
#[derive(Debug, Default)]
pub struct OperatorConfirmer;

impl Confirmer for OperatorConfirmer {
    fn confirm(&mut self, prompt: &str) -> Result<String, Error> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}

/// Ask for the login password without echo.
pub fn read_password(username: &str, host: &str) -> Result<String> {
    Password::new()
        .with_prompt(format!("Password for {}@{}", username, host))
        .interact()
        .context("Failed to read password")
}
