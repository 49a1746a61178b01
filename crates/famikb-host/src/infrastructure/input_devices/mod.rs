//! Input device infrastructure.
//!
//! On Linux the keyboard and mouse are read straight from their
//! `/dev/input/event*` nodes.  Each node is switched to non-blocking mode and
//! registered with the Tokio reactor, so the bridge loop can sleep until
//! either device has data and then drain everything that is queued.
//!
//! # Testability
//!
//! The bridge loop only sees the `InputSources` and `DeviceCapture` traits;
//! [`mock::MockInputSources`] replays scripted batches without any devices.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod evdev;
