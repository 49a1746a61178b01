//! ProtocolEncoder: builds the 5-byte frame sent to the adapter.
//!
//! Wire format (one SMBus block write per frame):
//! ```text
//! byte 0: [ release:1 | scancode:7 ]              0x00 = no key this batch
//! byte 1: [ L:1 | R:1 | mouse:1 | kbd:1 | rel:1 | tag:3 = 0b110 ]
//! byte 2: pointer x   (absolute position, or signed delta in relative mode)
//! byte 3: pointer y
//! byte 4: [ M:1 | wheel:4 | 0:3 ]
//! ```
//!
//! The frame is a pure function of [`InputState`] plus the device-presence
//! flags; nothing is cached between frames.

use std::fmt;

use crate::domain::state::{InputState, PointerMode};

/// Length of every frame on the wire.
pub const FRAME_LEN: usize = 5;

/// Fixed low bits of byte 1 identifying this frame layout.
pub const PROTOCOL_TAG: u8 = 0b110;

const LEFT_BUTTON: u8 = 1 << 7;
const RIGHT_BUTTON: u8 = 1 << 6;
const MOUSE_PRESENT: u8 = 1 << 5;
const KEYBOARD_PRESENT: u8 = 1 << 4;
const RELATIVE_MODE: u8 = 1 << 3;
const MIDDLE_BUTTON: u8 = 1 << 7;
const WHEEL_SHIFT: u8 = 3;

/// Which input devices were selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DevicePresence {
    pub keyboard: bool,
    pub mouse: bool,
}

impl DevicePresence {
    pub fn any(&self) -> bool {
        self.keyboard || self.mouse
    }
}

/// One encoded frame.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    pub fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Byte 0: key scancode with the release bit.
    pub fn key(&self) -> u8 {
        self.0[0]
    }

    /// Byte 1: buttons, presence flags, mode flag and tag.
    pub fn flags(&self) -> u8 {
        self.0[1]
    }

    pub fn x(&self) -> u8 {
        self.0[2]
    }

    pub fn y(&self) -> u8 {
        self.0[3]
    }

    /// Byte 4: middle button and wheel nibble.
    pub fn extra(&self) -> u8 {
        self.0[4]
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        write!(f, "]")
    }
}

/// Folds a signed wheel delta into a 4-bit two's-complement nibble.
///
/// Negative values map as `((-d - 1) ^ 0xF) & 0xF`, so `-1` becomes `0xF`
/// and `-8` becomes `0x8`.  Inputs are expected within `-8..=7`.
pub fn encode_wheel(delta: i8) -> u8 {
    if delta < 0 {
        // -(i8::MIN) would overflow; widen first.
        let magnitude = -i16::from(delta) - 1;
        ((magnitude as u8) ^ 0xF) & 0xF
    } else {
        (delta as u8) & 0xF
    }
}

/// Inverse of [`encode_wheel`]: sign-extends a 4-bit nibble.
pub fn decode_wheel(nibble: u8) -> i8 {
    let nibble = nibble & 0xF;
    if nibble & 0x8 != 0 {
        nibble as i8 - 16
    } else {
        nibble as i8
    }
}

/// Byte 1 without any button bits: presence, mode and tag.
fn base_flags(presence: DevicePresence, mode: PointerMode) -> u8 {
    let mut flags = PROTOCOL_TAG;
    if presence.mouse {
        flags |= MOUSE_PRESENT;
    }
    if presence.keyboard {
        flags |= KEYBOARD_PRESENT;
    }
    if mode == PointerMode::Relative {
        flags |= RELATIVE_MODE;
    }
    flags
}

/// Encodes the current state into a frame.
pub fn encode_frame(state: &InputState, presence: DevicePresence) -> Frame {
    let pointer = &state.pointer;
    let buttons = &state.buttons;

    let key = state.pending_key.map_or(0, |k| k.wire_byte());

    let mut flags = base_flags(presence, pointer.mode);
    if buttons.left {
        flags |= LEFT_BUTTON;
    }
    if buttons.right {
        flags |= RIGHT_BUTTON;
    }

    let mut extra = encode_wheel(pointer.wheel) << WHEEL_SHIFT;
    if buttons.middle {
        extra |= MIDDLE_BUTTON;
    }

    // Absolute positions are within 0..=255; relative deltas are within i8
    // and go out as their two's-complement byte.
    Frame([key, flags, pointer.x as u8, pointer.y as u8, extra])
}

/// The one-off frame announcing device presence before the first report.
pub fn handshake_frame(presence: DevicePresence, mode: PointerMode) -> Frame {
    Frame([0, base_flags(presence, mode), 0, 0, 0])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
