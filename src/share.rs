use std::io::Write;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::warn;

use crate::opener;

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("not supported on this device")]
    Unsupported,
    #[error("{0}")]
    Failed(String),
}

/// Where a finished bill can be sent.
pub trait ShareSurface {
    fn copy_text(&self, text: &str) -> Result<(), ShareError>;
    fn share(&self, title: &str, text: &str) -> Result<(), ShareError>;
}

pub fn copy_bill(surface: &dyn ShareSurface, text: &str) -> String {
    match surface.copy_text(text) {
        Ok(()) => "Bill copied to clipboard!".to_string(),
        Err(e) => {
            warn!("Clipboard write failed: {}", e);
            "Failed to copy bill.".to_string()
        }
    }
}

pub fn share_bill(surface: &dyn ShareSurface, title: &str, text: &str) -> String {
    match surface.share(title, text) {
        Ok(()) => "Bill shared.".to_string(),
        Err(ShareError::Unsupported) => "Sharing not supported on this device.".to_string(),
        Err(e) => {
            warn!("Share failed: {}", e);
            "Failed to share bill.".to_string()
        }
    }
}

// ==========================================
// System clipboard & mail client
// ==========================================

pub struct SystemShare;

#[cfg(target_os = "macos")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(target_os = "windows")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[("clip", &[])];
#[cfg(target_os = "linux")]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] =
    &[("wl-copy", &[]), ("xclip", &["-selection", "clipboard"]), ("xsel", &["--clipboard", "--input"])];
#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[];

fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<(), ShareError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ShareError::Failed(format!("{}: {}", program, e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            // reap the tool before bailing out
            drop(stdin);
            child.kill().ok();
            child.wait().ok();
            return Err(ShareError::Failed(format!("{}: {}", program, e)));
        }
    }

    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(ShareError::Failed(format!("{} exited with {}", program, status))),
        Err(e) => Err(ShareError::Failed(format!("{}: {}", program, e))),
    }
}

pub fn mailto_link(title: &str, text: &str) -> String {
    format!(
        "mailto:?subject={}&body={}",
        urlencoding::encode(title),
        urlencoding::encode(text)
    )
}

impl ShareSurface for SystemShare {
    fn copy_text(&self, text: &str) -> Result<(), ShareError> {
        let mut last_err = ShareError::Unsupported;
        for (program, args) in CLIPBOARD_TOOLS {
            match pipe_into(program, args, text) {
                Ok(()) => return Ok(()),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    fn share(&self, title: &str, text: &str) -> Result<(), ShareError> {
        opener::open(mailto_link(title, text))
    }
}
