//! CaptureController: toggles exclusive device ownership on the hotkey combo.
//!
//! # State machine
//!
//! ```text
//!            combo fully held && !cooldown
//!   Released ─────────────────────────────▶ Captured
//!      ▲                                        │
//!      └────────────────────────────────────────┘
//!            combo fully held && !cooldown
//! ```
//!
//! Every toggle arms the cooldown, and the cooldown only disarms once at
//! least one of LeftShift / LeftCtrl / Esc is up again.  Holding the combo
//! across many readiness batches therefore toggles exactly once.

use thiserror::Error;
use tracing::info;

use super::state::{CaptureState, ComboState};

/// Failure reported by a [`DeviceCapture`] implementation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("failed to grab input devices: {0}")]
    Acquire(String),
    #[error("failed to release input devices: {0}")]
    Release(String),
}

/// Host-level exclusive ownership of the input devices.
///
/// While acquired, events no longer reach the host's normal input stack.
/// Only [`CaptureController`] calls these; it never issues two acquires or
/// two releases in a row.
pub trait DeviceCapture {
    fn acquire(&mut self) -> Result<(), CaptureError>;
    fn release(&mut self) -> Result<(), CaptureError>;
}

/// Drives [`ComboState::capture`] from the held combo keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureController;

impl CaptureController {
    pub fn new() -> Self {
        Self
    }

    /// Checks the combo after a batch and toggles capture on its rising edge.
    ///
    /// Returns the new state when a toggle happened, `Ok(None)` otherwise.
    ///
    /// # Errors
    ///
    /// If `devices` fails, the capture state is left as it was, but the
    /// cooldown is still armed so a held combo does not retry every batch.
    pub fn evaluate(
        &self,
        combo: &mut ComboState,
        devices: &mut dyn DeviceCapture,
    ) -> Result<Option<CaptureState>, CaptureError> {
        if !combo.all_held() {
            combo.cooldown = false;
            return Ok(None);
        }
        if combo.cooldown {
            return Ok(None);
        }

        combo.cooldown = true;
        let next = match combo.capture {
            CaptureState::Released => {
                devices.acquire()?;
                info!("input devices captured; press LeftShift+LeftCtrl+Esc to release");
                CaptureState::Captured
            }
            CaptureState::Captured => {
                devices.release()?;
                info!("input devices released to the host");
                CaptureState::Released
            }
        };
        combo.capture = next;
        Ok(Some(next))
    }

    /// Hands the devices back to the host before the process exits.
    ///
    /// Does nothing if they are not captured.
    pub fn release_on_exit(
        &self,
        combo: &mut ComboState,
        devices: &mut dyn DeviceCapture,
    ) -> Result<(), CaptureError> {
        if combo.is_captured() {
            devices.release()?;
            combo.capture = CaptureState::Released;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
