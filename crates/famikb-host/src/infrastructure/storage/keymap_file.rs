//! Loads the keymap file that maps Linux key names to adapter scancodes.
//!
//! The file format is parsed by [`famikb_core::KeyMap::parse`]; this module
//! only deals with the file system and error context.

use std::path::{Path, PathBuf};

use famikb_core::{KeyMap, KeyMapError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum KeymapFileError {
    #[error("cannot read keymap {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid keymap {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: KeyMapError,
    },
}

/// Reads and parses the keymap at `path`.
///
/// # Errors
///
/// [`KeymapFileError::Io`] if the file cannot be read,
/// [`KeymapFileError::Parse`] on the first malformed line.
pub fn load_keymap(path: &Path) -> Result<KeyMap, KeymapFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| KeymapFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let keymap = KeyMap::parse(&text).map_err(|source| KeymapFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("loaded {} key mappings from {}", keymap.len(), path.display());
    Ok(keymap)
}

/// Loads the configured keymap, or an empty one when none is configured.
///
/// # Errors
///
/// Same as [`load_keymap`].
pub fn load_or_empty(path: Option<&Path>) -> Result<KeyMap, KeymapFileError> {
    match path {
        Some(path) => load_keymap(path),
        None => {
            warn!("no keymap configured; keyboard input will be ignored");
            Ok(KeyMap::empty())
        }
    }
}
