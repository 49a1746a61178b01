//! Domain logic for the famikb bridge.
//!
//! This module contains pure logic with no infrastructure dependencies.
//!
//! # What lives here? (for beginners)
//!
//! The bridge reads key presses and mouse motion from Linux, keeps a running
//! picture of "what the user is doing right now", and hands that picture to the
//! protocol encoder.  The running picture is [`state::InputState`]; the two
//! pieces of logic that change it are:
//!
//! - [`translate::EventTranslator`] – turns raw device events into state changes.
//! - [`capture::CaptureController`] – watches the LeftShift+LeftCtrl+Esc combo
//!   and grabs or releases the devices through the [`capture::DeviceCapture`]
//!   trait.
//!
//! Nothing in here touches a file descriptor, so every rule can be unit-tested
//! on any platform.

pub mod capture;
pub mod state;
pub mod translate;
