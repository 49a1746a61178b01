//! Scancode translation table loaded from a keymap file.
//!
//! A keymap file has one entry per line:
//!
//! ```text
//! # symbolic name   adapter scancode (hex, 0x00-0x7F)
//! KEY_A             1C
//! KEY_ENTER         0x5A
//! ```
//!
//! Bit 7 of the scancode is reserved: the wire frame sets it to signal a key
//! release, so table values above `0x7F` are rejected at load time.

pub mod linux_evdev;

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

/// Highest scancode a keymap entry may carry.
pub const MAX_SCANCODE: u8 = 0x7F;

/// Errors produced while parsing a keymap file.
#[derive(Debug, Error, PartialEq)]
pub enum KeyMapError {
    /// The line is not of the form `<name> <hex-byte>`.
    #[error("line {line}: expected `<key-name> <hex-byte>`, got {content:?}")]
    Malformed { line: usize, content: String },

    /// The scancode does not parse as hexadecimal or exceeds [`MAX_SCANCODE`].
    #[error("line {line}: scancode {value:?} is not a hex byte in 0x00-0x7F")]
    InvalidScancode { line: usize, value: String },

    /// The symbolic name is not a known Linux key name.
    #[error("line {line}: unknown key name {name:?}")]
    UnknownKey { line: usize, name: String },
}

/// Immutable mapping from physical key to adapter scancode.
///
/// Entries are keyed by Linux key code; the symbolic names from the file are
/// resolved once in [`KeyMap::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    entries: HashMap<u16, u8>,
}

impl KeyMap {
    /// A keymap with no entries. Every key is unmapped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the text of a keymap file.
    ///
    /// Blank lines and lines starting with `#` are skipped. When a name
    /// appears twice the later entry wins.
    ///
    /// # Errors
    ///
    /// Returns the first [`KeyMapError`] encountered; nothing is partially loaded.
    pub fn parse(text: &str) -> Result<Self, KeyMapError> {
        let mut entries = HashMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let (name, value) = match (fields.next(), fields.next(), fields.next()) {
                (Some(name), Some(value), None) => (name, value),
                _ => {
                    return Err(KeyMapError::Malformed {
                        line,
                        content: trimmed.to_string(),
                    })
                }
            };

            let code = linux_evdev::name_to_code(name).ok_or_else(|| KeyMapError::UnknownKey {
                line,
                name: name.to_string(),
            })?;
            let scancode = parse_scancode(value).ok_or_else(|| KeyMapError::InvalidScancode {
                line,
                value: value.to_string(),
            })?;

            if let Some(previous) = entries.insert(code, scancode) {
                warn!("keymap line {line}: {name} redefined (0x{previous:02X} -> 0x{scancode:02X})");
            }
        }

        Ok(Self { entries })
    }

    /// Returns the scancode for a Linux key code, if the key is mapped.
    pub fn lookup_code(&self, code: u16) -> Option<u8> {
        self.entries.get(&code).copied()
    }

    /// Returns the scancode for a symbolic key name such as `"KEY_A"`.
    pub fn lookup_name(&self, name: &str) -> Option<u8> {
        linux_evdev::name_to_code(name).and_then(|code| self.lookup_code(code))
    }

    /// Number of mapped keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no key is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_scancode(value: &str) -> Option<u8> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() || digits.len() > 2 {
        return None;
    }
    u8::from_str_radix(digits, 16)
        .ok()
        .filter(|&byte| byte <= MAX_SCANCODE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
