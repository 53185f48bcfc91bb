// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Extraction of structured facts from free-text device output.
//!
//! Every assumption about the device's output format lives here. Patterns
//! return the first match only.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::protocol;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{2}\.(?:3|7|10)\.R[1-9])").expect("version pattern is valid")
});

static FILE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+) File\(s\)").expect("file count pattern is valid"));

/// MD-CLI context line printed above the prompt, e.g. `[/]` or `[ex:/configure]`.
static CONTEXT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]$").expect("context line pattern is valid"));

static DELETE_PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Delete .*\(y/n\)\?$").expect("delete prompt pattern is valid")
});

static REMOVE_DIR_PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Are you sure.*\(y/n\)\?$").expect("remove directory prompt pattern is valid")
});

/// Confirmation questions asked by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmPrompt {
    /// `Delete file "<path>" (y/n)?`
    DeleteFile,
    /// `Are you sure (y/n)?`
    RemoveDirectory,
}

impl ConfirmPrompt {
    /// Text that appears once the device starts asking.
    pub fn keyword(self) -> &'static str {
        match self {
            ConfirmPrompt::DeleteFile => protocol::DELETE_PROMPT,
            ConfirmPrompt::RemoveDirectory => protocol::REMOVE_DIR_PROMPT,
        }
    }

    /// True when the last non-empty line of `text` is this question.
    pub fn matches(self, text: &str) -> bool {
        let Some(last) = text.lines().map(str::trim).filter(|l| !l.is_empty()).last() else {
            return false;
        };
        match self {
            ConfirmPrompt::DeleteFile => DELETE_PROMPT_RE.is_match(last),
            ConfirmPrompt::RemoveDirectory => REMOVE_DIR_PROMPT_RE.is_match(last),
        }
    }
}

/// Release identifier such as `22.7.R3`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the first version token from `text`.
pub fn extract_version_token(text: &str) -> Result<VersionToken> {
    VERSION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| VersionToken(m.as_str().to_string()))
        .ok_or_else(|| Error::NoMatch {
            what: "version token",
            text: text.to_string(),
        })
}

/// Extract the file count from a `file list` output, if reported.
pub fn extract_file_count(listing: &str) -> Option<u32> {
    FILE_COUNT_RE
        .captures(listing)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract the size in bytes of `file_name` from a `file list` output.
///
/// Listing rows end with `<size> <name>`; the name is matched exactly.
pub fn extract_file_size(listing: &str, file_name: &str) -> Option<u64> {
    let pattern = format!(r"(?m)(?:^|\s)([0-9]+)\s+{}\s*$", regex::escape(file_name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(listing)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract an image path from a `bof image *-location` answer.
///
/// Takes the first double-quoted value, falling back to the second
/// whitespace-separated token. Returns `None` on an empty answer.
pub fn extract_image_path(response: &str) -> Option<String> {
    let response = response.trim();
    if response.is_empty() {
        return None;
    }

    if let Some(start) = response.find('"') {
        let rest = &response[start + 1..];
        if let Some(end) = rest.find('"') {
            let path = &rest[..end];
            return (!path.is_empty()).then(|| path.to_string());
        }
    }

    response
        .split_whitespace()
        .nth(1)
        .map(|token| token.trim_matches('"').to_string())
        .filter(|path| !path.is_empty())
}

/// Strip the command echo, the context line and the trailing prompt from a
/// raw command exchange.
pub fn clean_output(raw: &str, command: &str, prompt: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "");
    let mut lines: Vec<&str> = normalized.lines().collect();

    let command = command.trim();
    if !command.is_empty() {
        if let Some(pos) = lines
            .iter()
            .position(|line| line.trim_end().ends_with(command))
        {
            lines.drain(..=pos);
        }
    }

    let prompt = prompt.trim();
    while let Some(last) = lines.last() {
        let last = last.trim();
        let is_prompt = !prompt.is_empty() && last == prompt;
        if last.is_empty() || is_prompt || CONTEXT_LINE_RE.is_match(last) {
            lines.pop();
        } else {
            break;
        }
    }

    lines.join("\n").trim().to_string()
}
