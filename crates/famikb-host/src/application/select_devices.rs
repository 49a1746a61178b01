//! Picks the keyboard and mouse to bridge from the devices the host exposes.
//!
//! Classification is a capability heuristic: anything with both `BTN_LEFT`
//! and `BTN_RIGHT` is a mouse; otherwise anything with both `KEY_BACKSPACE`
//! and `KEY_ENTER` is a keyboard.  Everything else (power buttons, lid
//! switches, HDMI-CEC remotes, ...) is ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use famikb_core::keymap::linux_evdev::{BTN_LEFT, BTN_RIGHT, KEY_BACKSPACE, KEY_ENTER};
use thiserror::Error;
use tracing::{info, warn};

/// OS-neutral summary of one input device node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub path: PathBuf,
    pub name: String,
    /// `EV_KEY` codes the device reports as supported.
    pub key_codes: Vec<u16>,
}

impl DeviceDescriptor {
    pub fn supports_key(&self, code: u16) -> bool {
        self.key_codes.contains(&code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Keyboard,
    Mouse,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Keyboard => f.write_str("keyboard"),
            DeviceKind::Mouse => f.write_str("mouse"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("configured {kind} {path} is not an attached {kind}")]
    PreferredMissing { kind: DeviceKind, path: PathBuf },

    #[error("no {0} was selected")]
    NoSelection(DeviceKind),
}

/// Classifies a device by its key capabilities. The mouse test wins.
pub fn classify(device: &DeviceDescriptor) -> Option<DeviceKind> {
    if device.supports_key(BTN_LEFT) && device.supports_key(BTN_RIGHT) {
        Some(DeviceKind::Mouse)
    } else if device.supports_key(KEY_BACKSPACE) && device.supports_key(KEY_ENTER) {
        Some(DeviceKind::Keyboard)
    } else {
        None
    }
}

/// Splits `devices` into keyboard and mouse indices, preserving order.
pub fn partition(devices: &[DeviceDescriptor]) -> (Vec<usize>, Vec<usize>) {
    let mut keyboards = Vec::new();
    let mut mice = Vec::new();
    for (i, device) in devices.iter().enumerate() {
        match classify(device) {
            Some(DeviceKind::Keyboard) => keyboards.push(i),
            Some(DeviceKind::Mouse) => mice.push(i),
            None => {}
        }
    }
    (keyboards, mice)
}

/// Chooses one device of `kind` from `candidates`.
///
/// - A `preferred` path must match one of the candidates.
/// - No candidates yields `Ok(None)`.
/// - A single candidate is taken as-is.
/// - Several candidates are offered to `prompt`, which returns an index or
///   `None` to give up.  Out-of-range answers are asked again.
///
/// Returns the index into `candidates`.
///
/// # Errors
///
/// [`SelectError::PreferredMissing`] if the preferred path is not a candidate,
/// [`SelectError::NoSelection`] if the prompt gives up.
pub fn select_device<P>(
    kind: DeviceKind,
    candidates: &[&DeviceDescriptor],
    preferred: Option<&Path>,
    mut prompt: P,
) -> Result<Option<usize>, SelectError>
where
    P: FnMut(DeviceKind, &[&DeviceDescriptor]) -> Option<usize>,
{
    if let Some(path) = preferred {
        return match candidates.iter().position(|d| d.path == path) {
            Some(i) => {
                info!("using configured {kind} {}", path.display());
                Ok(Some(i))
            }
            None => Err(SelectError::PreferredMissing {
                kind,
                path: path.to_path_buf(),
            }),
        };
    }

    match candidates.len() {
        0 => {
            info!("no {kind} attached");
            Ok(None)
        }
        1 => Ok(Some(0)),
        n => {
            info!("multiple {kind}s detected");
            loop {
                match prompt(kind, candidates) {
                    Some(i) if i < n => return Ok(Some(i)),
                    Some(i) => warn!("{i} is not a listed {kind}"),
                    None => return Err(SelectError::NoSelection(kind)),
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
