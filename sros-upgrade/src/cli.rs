// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::warn;

use sros_common::{Session, UpgradeOptions};

use crate::commands;
use crate::prompt::{self, OperatorConfirmer};
use crate::transport::{
    default_key_file, Auth, ConnectionConfig, SshDevice, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS,
};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "sros-upgrade")]
#[command(about = "Prepares a Nokia SROS router for a firmware upgrade")]
pub struct Cli {
    /// Login user
    pub username: String,

    /// Device host name or address
    pub host: String,

    /// Print the device boot state (always on)
    #[arg(long = "get_info", default_value_t = true)]
    pub get_info: bool,

    /// Reserved, currently only announced
    #[arg(long)]
    pub dryrun: bool,

    /// Delete the secondary image directory
    #[arg(long)]
    pub delete: bool,

    /// Upload the firmware bundle in this zip archive
    #[arg(long, value_name = "ARCHIVE")]
    pub copy: Option<PathBuf>,

    /// Also push the bundle's EFI files
    #[arg(long)]
    pub efi: bool,

    /// Prompt for a password instead of using a key
    #[arg(long)]
    pub password: bool,

    /// SSH port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Private key for key authentication [default: ~/.ssh/id_rsa]
    #[arg(long = "key-file", value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// Timeout for a single device exchange, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl Cli {
    /// Steps requested for this run.
    pub fn options(&self) -> UpgradeOptions {
        UpgradeOptions {
            get_info: self.get_info,
            dry_run: self.dryrun,
            delete: self.delete,
            copy: self.copy.clone(),
            efi: self.efi,
        }
    }

    /// Connection settings, with `password` when password login was asked for.
    pub fn connection(&self, password: Option<String>) -> ConnectionConfig {
        let auth = match password {
            Some(password) => Auth::Password(password),
            None => Auth::KeyFile(self.key_file.clone().unwrap_or_else(default_key_file)),
        };
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            auth,
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

/// Connect and execute the requested steps.
pub fn run(cli: Cli, interrupted: Arc<AtomicBool>) -> Result<()> {
    let options = cli.options();
    let password = if cli.password {
        Some(prompt::read_password(&cli.username, &cli.host)?)
    } else {
        None
    };

    let mut device = SshDevice::connect(&cli.connection(password), Arc::clone(&interrupted))?;
    println!("{}", device.prompt());

    let result = commands::prepare(&mut device, &options, &mut OperatorConfirmer, interrupted);

    if let Err(e) = device.disconnect() {
        warn!("{}", e);
    }
    result
}
