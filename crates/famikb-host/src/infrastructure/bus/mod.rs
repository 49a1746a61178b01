//! Bus infrastructure: how frames reach the pico-ps2famikb adapter.
//!
//! On Linux the adapter sits on an I2C bus exposed as `/dev/i2c-<n>`; each
//! frame is one SMBus block write.  The bridge loop only sees the
//! `FrameSink` trait, so tests use [`mock::RecordingFrameSink`] instead.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod i2c;
