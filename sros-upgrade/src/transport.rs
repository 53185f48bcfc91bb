// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! SSH transport: interactive MD-CLI shell plus SCP uploads.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, trace, warn};
use ssh2::{Channel, Session as SshSession};

use sros_common::inspector::{clean_output, extract_file_size};
use sros_common::protocol;
use sros_common::{Error, FileTransfer, Session, TransferResult};

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Default timeout for a single read or write in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// SCP chunk size.
const CHUNK_SIZE: usize = 32 * 1024;

/// How to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Password(String),
    KeyFile(PathBuf),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Password(_) => f.write_str("Password(..)"),
            Auth::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
        }
    }
}

/// Where and how to connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: Auth,
    pub timeout: Duration,
}

/// Default private key, `~/.ssh/id_rsa`.
pub fn default_key_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(".ssh")
        .join("id_rsa")
}

/// SSH connection to an SROS device.
pub struct SshDevice {
    session: SshSession,
    channel: Option<Channel>,
    prompt: String,
    interrupted: Arc<AtomicBool>,
}

impl SshDevice {
    /// Connect, authenticate and prepare the CLI session.
    ///
    /// Uploads stop between chunks once `interrupted` is set.
    pub fn connect(
        config: &ConnectionConfig,
        interrupted: Arc<AtomicBool>,
    ) -> anyhow::Result<Self> {
        let tcp = TcpStream::connect((config.host.as_str(), config.port))
            .with_context(|| format!("Failed to connect to {}:{}", config.host, config.port))?;

        let mut session = SshSession::new().context("Failed to create SSH session")?;
        session.set_tcp_stream(tcp);
        session.set_timeout(config.timeout.as_millis().min(u32::MAX as u128) as u32);
        session.handshake().context("SSH handshake failed")?;

        match &config.auth {
            Auth::Password(password) => session
                .userauth_password(&config.username, password)
                .context("Password authentication failed")?,
            Auth::KeyFile(key) => session
                .userauth_pubkey_file(&config.username, None, key, None)
                .with_context(|| format!("Key authentication with {} failed", key.display()))?,
        }
        if !session.authenticated() {
            bail!("SSH authentication failed for {}", config.username);
        }
        session.set_keepalive(true, 30);

        let mut channel = session.channel_session().context("Failed to open channel")?;
        channel
            .request_pty("vt100", None, Some((511, 24, 0, 0)))
            .context("Failed to request PTY")?;
        channel.shell().context("Failed to start shell")?;

        let mut device = Self {
            session,
            channel: Some(channel),
            prompt: String::new(),
            interrupted,
        };
        device.prompt = device.find_prompt()?;
        debug!("prompt is {:?}", device.prompt);
        device.run(protocol::DISABLE_PAGING)?;

        Ok(device)
    }

    /// The session prompt, e.g. `A:admin@router#`.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    fn channel(&mut self) -> Result<&mut Channel, Error> {
        self.channel
            .as_mut()
            .ok_or_else(|| Error::Session("not connected".to_string()))
    }

    /// Send a bare newline and take the last line of the answer.
    fn find_prompt(&mut self) -> Result<String, Error> {
        self.write_raw("\n")?;
        let raw = self.read_until(|text| {
            let text = text.trim_end();
            text.ends_with('#') || text.ends_with('>')
        })?;
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
            .ok_or_else(|| Error::Session("no prompt received".to_string()))
    }

    fn ends_with_prompt(&self, text: &str) -> bool {
        !self.prompt.is_empty() && text.trim_end().ends_with(self.prompt.as_str())
    }

    /// Read from the shell until `done` accepts everything read so far.
    fn read_until<F: Fn(&str) -> bool>(&mut self, done: F) -> Result<String, Error> {
        let mut text = String::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = self
                .channel()?
                .read(&mut buf)
                .map_err(|e| session_error("read failed", e))?;
            if n == 0 {
                return Err(Error::Session("channel closed by device".to_string()));
            }
            text.push_str(&String::from_utf8_lossy(&buf[..n]));
            if done(&text) {
                trace!("received {:?}", text);
                return Ok(text);
            }
        }
    }

    fn send_line(&mut self, command: &str) -> Result<(), Error> {
        debug!("sending {:?}", command);
        self.write_raw(&format!("{}\n", command))
    }

    /// Remote size of `remote` on `filesystem`, if it exists.
    fn remote_file_size(&mut self, remote: &str, filesystem: &str) -> Result<Option<u64>, Error> {
        let listing = self.run(&protocol::list_path(&protocol::cli_path(filesystem, remote)))?;
        let name = remote.rsplit('/').next().unwrap_or(remote);
        Ok(extract_file_size(&listing, name))
    }
}

impl Session for SshDevice {
    fn run(&mut self, command: &str) -> Result<String, Error> {
        self.send_line(command)?;
        let prompt = self.prompt.clone();
        let raw = self.read_until(|text| !prompt.is_empty() && text.trim_end().ends_with(&prompt))?;
        Ok(clean_output(&raw, command, &self.prompt))
    }

    fn run_interactive(&mut self, command: &str, expected: &str) -> Result<String, Error> {
        self.send_line(command)?;
        let prompt = self.prompt.clone();
        let raw = self.read_until(|text| interactive_answer_complete(text, expected, &prompt))?;
        if !raw.contains(expected) && self.ends_with_prompt(&raw) {
            warn!("expected {:?}, device returned to prompt", expected);
        }
        Ok(clean_output(&raw, command, &self.prompt))
    }

    fn write_raw(&mut self, text: &str) -> Result<(), Error> {
        let channel = self.channel()?;
        channel
            .write_all(text.as_bytes())
            .and_then(|_| channel.flush())
            .map_err(|e| session_error("write failed", e))
    }

    fn read_until_prompt(&mut self) -> Result<String, Error> {
        let prompt = self.prompt.clone();
        let raw = self.read_until(|text| !prompt.is_empty() && text.trim_end().ends_with(&prompt))?;
        Ok(clean_output(&raw, "", &self.prompt))
    }

    fn disconnect(&mut self) -> Result<(), Error> {
        let Some(mut channel) = self.channel.take() else {
            return Ok(());
        };
        debug!("disconnecting");
        let _ = channel.write_all(b"logout\n");
        let _ = channel.send_eof();
        let _ = channel.close();
        self.session
            .disconnect(None, "done", None)
            .map_err(|e| session_error("disconnect failed", e))
    }
}

impl FileTransfer for SshDevice {
    fn transfer_file(
        &mut self,
        local: &Path,
        remote: &str,
        filesystem: &str,
        overwrite: bool,
    ) -> Result<TransferResult, Error> {
        let size = fs::metadata(local)?.len();

        if !overwrite && self.remote_file_size(remote, filesystem)?.is_some() {
            debug!("{} already on {}, not overwriting", remote, filesystem);
            return Ok(TransferResult {
                bytes_sent: 0,
                verified: false,
                already_present: true,
            });
        }

        let target = protocol::scp_path(filesystem, remote);
        let mut file = File::open(local)?;
        let mut channel = self
            .session
            .scp_send(Path::new(&target), 0o644, size, None)
            .map_err(|e| session_error("SCP open failed", e))?;

        let pb = ProgressBar::new(size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut sent = 0u64;
        loop {
            if self.interrupted.load(Ordering::Relaxed) {
                pb.abandon();
                return Err(Error::Interrupted);
            }
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            if let Err(e) = channel.write_all(&buf[..n]) {
                pb.abandon();
                return Err(session_error("SCP write failed", e));
            }
            sent += n as u64;
            pb.set_position(sent);
        }
        pb.finish_and_clear();

        channel
            .send_eof()
            .and_then(|_| channel.wait_eof())
            .and_then(|_| channel.close())
            .and_then(|_| channel.wait_close())
            .map_err(|e| session_error("SCP close failed", e))?;

        let verified = self.remote_file_size(remote, filesystem)? == Some(size);
        Ok(TransferResult {
            bytes_sent: sent,
            verified,
            already_present: false,
        })
    }
}

/// True once `text` ends with the whole confirmation question, or with the
/// session prompt so an unexpected answer cannot hang.
fn interactive_answer_complete(text: &str, expected: &str, prompt: &str) -> bool {
    let tail = text.trim_end();
    (text.contains(expected) && tail.ends_with(protocol::CONFIRM_SUFFIX))
        || (!prompt.is_empty() && tail.ends_with(prompt))
}

fn session_error(what: &str, e: impl Display) -> Error {
    Error::Session(format!("{}: {}", what, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "A:admin@r1#";

    #[test]
    fn test_partial_question_keeps_reading() {
        assert!(!interactive_answer_complete("Delete file \"cf3:\\TiMOS-22", "Delete", PROMPT));
        assert!(!interactive_answer_complete("y\r\nDelete", "Delete", PROMPT));
    }

    #[test]
    fn test_whole_question_is_complete() {
        assert!(interactive_answer_complete(
            "y\r\nDelete file \"cf3:\\TiMOS-22.3.R1\\a.tim\" (y/n)? ",
            "Delete",
            PROMPT
        ));
        assert!(interactive_answer_complete("Are you sure (y/n)?", "Are you sure", PROMPT));
    }

    #[test]
    fn test_return_to_prompt_is_complete() {
        let text = "MINOR: CLI Delete operation not permitted on this file\r\n\r\n[/]\r\nA:admin@r1# ";
        assert!(interactive_answer_complete(text, "Delete", PROMPT));
        assert!(!interactive_answer_complete("MINOR: CLI Delete", "Delete", ""));
    }
}
