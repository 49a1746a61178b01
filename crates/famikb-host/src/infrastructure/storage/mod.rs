//! Storage infrastructure: the config file and the keymap file.
//!
//! - `config` reads the TOML configuration, falling back to defaults when
//!   the file does not exist yet (first run).
//! - `keymap_file` reads the key-name to scancode table handed to the
//!   translator.
//!
//! Both are read once at startup; nothing is ever written back.

pub mod config;
pub mod keymap_file;
