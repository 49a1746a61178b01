//! Infrastructure layer for the host bridge.
//!
//! Contains OS-facing adapters: evdev input devices, the I2C bus to the
//! adapter, and file-system storage for config and keymaps.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `famikb_core`, but MUST NOT be imported by the `application` layer
//! outside of its tests.

pub mod bus;
pub mod input_devices;
pub mod storage;
