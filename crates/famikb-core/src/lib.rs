//! # famikb-core
//!
//! Shared library for the famikb USB host bridge: input state, event
//! translation, hotkey capture logic, the adapter wire frame, and keymap
//! tables.
//!
//! It has zero dependencies on OS APIs, device nodes, or the I2C bus.
//!
//! # Architecture overview (for beginners)
//!
//! famikb lets a USB keyboard and mouse plugged into a small Linux board
//! drive a Famicom keyboard/mouse adapter.  The board reads Linux input
//! events and pushes a tiny 5-byte report to the adapter over I2C every time
//! something changes.
//!
//! - **`domain`** – The running input picture (pointer, buttons, pending key,
//!   hotkey combo) and the rules that update it.
//!
//! - **`protocol`** – How that picture is squeezed into the 5-byte frame.
//!
//! - **`keymap`** – The Linux key-name table and the keymap file that maps
//!   each key to the adapter's scancode.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::capture::{CaptureController, CaptureError, DeviceCapture};
pub use domain::state::{
    ButtonState, CaptureState, ComboState, DisplayStandard, InputState, PendingKey, PointerMode,
    PointerState, ScreenBounds,
};
pub use domain::translate::{EventError, EventTranslator, RawEvent};
pub use keymap::{KeyMap, KeyMapError};
pub use protocol::frame::{encode_frame, handshake_frame, DevicePresence, Frame};
