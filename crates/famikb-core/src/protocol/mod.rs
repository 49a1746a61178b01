//! Wire protocol between the host and the pico-ps2famikb adapter.
//!
//! The adapter is an I2C peripheral.  Every report is a single SMBus block
//! write of [`FRAME_LEN`] bytes to [`PERIPHERAL_ADDRESS`], register
//! [`FRAME_REGISTER`].  Nothing is ever read back.

pub mod frame;

pub use frame::{
    decode_wheel, encode_frame, encode_wheel, handshake_frame, DevicePresence, Frame, FRAME_LEN,
    PROTOCOL_TAG,
};

/// 7-bit I2C address of the adapter.
pub const PERIPHERAL_ADDRESS: u16 = 0x17;

/// Register (SMBus command byte) the frame is written to.
pub const FRAME_REGISTER: u8 = 0;
