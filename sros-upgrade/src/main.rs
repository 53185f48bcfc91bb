// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Prepares a Nokia SROS router for a firmware upgrade over SSH.
//!
//! Usage:
//!   sros-upgrade admin router1
//!   sros-upgrade --delete admin router1
//!   sros-upgrade --copy bundle.zip --efi --password admin router1

mod cli;
mod commands;
mod prompt;
mod transport;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use signal_hook::consts::SIGINT;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Ctrl-C stops the upload between chunks; the run then returns and
    // removes its temporary directory.
    let interrupted = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&interrupted))?;

    let args = cli::Cli::parse();
    cli::run(args, interrupted)
}
