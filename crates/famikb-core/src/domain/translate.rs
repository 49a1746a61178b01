//! EventTranslator: folds raw device events into the shared [`InputState`].
//!
//! # Event classification
//!
//! | Raw event                    | Effect                                          |
//! |------------------------------|-------------------------------------------------|
//! | `EV_KEY` on BTN_LEFT/MIDDLE/RIGHT | sets the matching [`ButtonState`] field     |
//! | `EV_KEY` on a mapped key     | sets [`PendingKey`] (release = value 0)         |
//! | `EV_KEY` on a combo key      | updates [`ComboState`], mapped or not           |
//! | `EV_REL` on REL_X / REL_Y    | pointer motion (absolute or relative mode)      |
//! | `EV_REL` on REL_WHEEL        | wheel accumulator                               |
//! | anything else                | [`EventError`], logged and skipped              |
//!
//! [`ButtonState`]: super::state::ButtonState
//! [`PendingKey`]: super::state::PendingKey
//! [`ComboState`]: super::state::ComboState

use thiserror::Error;
use tracing::{debug, trace};

use super::state::{InputState, PendingKey};
use crate::keymap::{linux_evdev as codes, KeyMap};

/// An input event as read from a device, independent of the OS binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// `EV_KEY`: value 0 = release, 1 = press, 2 = autorepeat.
    Key { code: u16, value: i32 },
    /// `EV_REL`: signed delta on `axis`.
    Relative { axis: u16, value: i32 },
    /// Any other event type (sync reports, misc scancodes, LEDs...).
    Other { kind: u16, code: u16, value: i32 },
}

impl RawEvent {
    /// Builds a [`RawEvent`] from the `(type, code, value)` triple of a kernel `input_event`.
    pub fn from_parts(kind: u16, code: u16, value: i32) -> Self {
        match kind {
            codes::EV_KEY => RawEvent::Key { code, value },
            codes::EV_REL => RawEvent::Relative { axis: code, value },
            _ => RawEvent::Other { kind, code, value },
        }
    }
}

/// A single event that could not be applied. Never fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("key {name} (code {code}) has no keymap entry")]
    UnmappedKey { code: u16, name: &'static str },

    #[error("unhandled relative axis {0}")]
    UnknownAxis(u16),

    #[error("unhandled event type {kind} (code {code})")]
    Unsupported { kind: u16, code: u16 },
}

/// Stateless translator; all mutable state lives in [`InputState`].
#[derive(Debug, Clone, Default)]
pub struct EventTranslator {
    keymap: KeyMap,
}

impl EventTranslator {
    pub fn new(keymap: KeyMap) -> Self {
        Self { keymap }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Applies one event to `state`.
    ///
    /// # Errors
    ///
    /// Returns an [`EventError`] when the event carried nothing this bridge
    /// reports. `state` is left untouched in that case.
    pub fn translate(&self, state: &mut InputState, event: &RawEvent) -> Result<(), EventError> {
        match *event {
            RawEvent::Key { code, value } => self.translate_key(state, code, value),
            RawEvent::Relative { axis, value } => translate_motion(state, axis, value),
            RawEvent::Other { kind, code, .. } => Err(EventError::Unsupported { kind, code }),
        }
    }

    /// Applies every event drained from one source.
    ///
    /// Returns `true` if at least one event changed `state`.  Rejected events
    /// are logged and skipped.
    pub fn translate_batch(&self, state: &mut InputState, events: &[RawEvent]) -> bool {
        let mut updated = false;
        for event in events {
            match self.translate(state, event) {
                Ok(()) => updated = true,
                // Sync reports close every kernel packet; too noisy for debug.
                Err(EventError::Unsupported { kind: codes::EV_SYN, .. }) => {}
                Err(e @ EventError::Unsupported { .. }) => trace!("skipped event: {e}"),
                Err(e) => debug!("skipped event: {e}"),
            }
        }
        updated
    }

    fn translate_key(&self, state: &mut InputState, code: u16, value: i32) -> Result<(), EventError> {
        let pressed = value != 0;

        match code {
            codes::BTN_LEFT => state.buttons.left = pressed,
            codes::BTN_MIDDLE => state.buttons.middle = pressed,
            codes::BTN_RIGHT => state.buttons.right = pressed,
            _ => {
                let combo_key = track_combo(state, code, pressed);
                match self.keymap.lookup_code(code) {
                    Some(scancode) => {
                        state.pending_key = Some(PendingKey {
                            scancode,
                            released: !pressed,
                        });
                    }
                    None if combo_key => {}
                    None => {
                        return Err(EventError::UnmappedKey {
                            code,
                            name: codes::code_to_name(code).unwrap_or("<unnamed>"),
                        })
                    }
                }
            }
        }
        Ok(())
    }
}

/// Updates the combo tracker; returns `true` if `code` is one of the combo keys.
fn track_combo(state: &mut InputState, code: u16, pressed: bool) -> bool {
    let combo = &mut state.combo;
    match code {
        codes::KEY_LEFTSHIFT => combo.left_shift = pressed,
        codes::KEY_LEFTCTRL => combo.left_ctrl = pressed,
        codes::KEY_ESC => combo.escape = pressed,
        _ => return false,
    }
    true
}

fn translate_motion(state: &mut InputState, axis: u16, value: i32) -> Result<(), EventError> {
    match axis {
        codes::REL_X => state.pointer.move_x(value),
        codes::REL_Y => state.pointer.move_y(value),
        codes::REL_WHEEL => state.pointer.scroll(value),
        other => return Err(EventError::UnknownAxis(other)),
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::{DisplayStandard, PointerMode, ScreenBounds};

    const KEY_A: u16 = 30;
    const KEY_B: u16 = 48;
    const REL_HWHEEL: u16 = 0x06;

    fn translator() -> EventTranslator {
        EventTranslator::new(KeyMap::parse("KEY_A 1C\nKEY_ESC 76\n").unwrap())
    }

    fn key(code: u16, value: i32) -> RawEvent {
        RawEvent::Key { code, value }
    }

    fn rel(axis: u16, value: i32) -> RawEvent {
        RawEvent::Relative { axis, value }
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_mapped_key_press_sets_pending_key() {
        // Arrange
        let t = translator();
        let mut state = InputState::default();

        // Act
        t.translate(&mut state, &key(KEY_A, 1)).unwrap();

        // Assert
        assert_eq!(state.pending_key, Some(PendingKey { scancode: 0x1C, released: false }));
    }

    #[test]
    fn test_mapped_key_release_flags_pending_key() {
        let t = translator();
        let mut state = InputState::default();
        t.translate(&mut state, &key(KEY_A, 0)).unwrap();
        assert_eq!(state.pending_key, Some(PendingKey { scancode: 0x1C, released: true }));
    }

    #[test]
    fn test_autorepeat_counts_as_press() {
        let t = translator();
        let mut state = InputState::default();
        t.translate(&mut state, &key(KEY_A, 2)).unwrap();
        assert_eq!(state.pending_key.map(|k| k.released), Some(false));
    }

    #[test]
    fn test_unmapped_key_is_rejected_without_touching_state() {
        // Arrange
        let t = translator();
        let mut state = InputState::default();
        let before = state.clone();

        // Act
        let result = t.translate(&mut state, &key(KEY_B, 1));

        // Assert
        assert_eq!(result, Err(EventError::UnmappedKey { code: KEY_B, name: "KEY_B" }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_unnamed_key_code_is_rejected_gracefully() {
        let t = translator();
        let mut state = InputState::default();
        let result = t.translate(&mut state, &key(0x2FF, 1));
        assert!(matches!(result, Err(EventError::UnmappedKey { name: "<unnamed>", .. })));
        assert_eq!(state.pending_key, None);
    }

    #[test]
    fn test_last_mapped_key_in_batch_wins() {
        let t = EventTranslator::new(KeyMap::parse("KEY_A 1C\nKEY_B 32\n").unwrap());
        let mut state = InputState::default();
        t.translate_batch(&mut state, &[key(KEY_A, 1), key(KEY_B, 1), key(KEY_A, 0)]);
        assert_eq!(state.pending_key, Some(PendingKey { scancode: 0x1C, released: true }));
    }

    // ── Buttons ───────────────────────────────────────────────────────────────

    #[test]
    fn test_buttons_follow_press_and_release() {
        let t = translator();
        let mut state = InputState::default();

        t.translate(&mut state, &key(codes::BTN_LEFT, 1)).unwrap();
        t.translate(&mut state, &key(codes::BTN_MIDDLE, 1)).unwrap();
        t.translate(&mut state, &key(codes::BTN_RIGHT, 1)).unwrap();
        assert!(state.buttons.left && state.buttons.middle && state.buttons.right);

        t.translate(&mut state, &key(codes::BTN_MIDDLE, 0)).unwrap();
        assert!(state.buttons.left && !state.buttons.middle && state.buttons.right);
    }

    #[test]
    fn test_repeated_press_does_not_toggle_button() {
        let t = translator();
        let mut state = InputState::default();
        t.translate(&mut state, &key(codes::BTN_LEFT, 1)).unwrap();
        t.translate(&mut state, &key(codes::BTN_LEFT, 1)).unwrap();
        assert!(state.buttons.left);
    }

    #[test]
    fn test_button_never_sets_pending_key() {
        let t = translator();
        let mut state = InputState::default();
        t.translate(&mut state, &key(codes::BTN_LEFT, 1)).unwrap();
        assert_eq!(state.pending_key, None);
    }

    // ── Combo ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_unmapped_combo_keys_update_combo_state() {
        // Arrange – KEY_LEFTSHIFT and KEY_LEFTCTRL are not in the keymap
        let t = translator();
        let mut state = InputState::default();

        // Act
        let shift = t.translate(&mut state, &key(codes::KEY_LEFTSHIFT, 1));
        let ctrl = t.translate(&mut state, &key(codes::KEY_LEFTCTRL, 1));

        // Assert
        assert!(shift.is_ok() && ctrl.is_ok());
        assert!(state.combo.left_shift && state.combo.left_ctrl);
        assert_eq!(state.pending_key, None);
    }

    #[test]
    fn test_mapped_combo_key_updates_both_combo_and_pending_key() {
        let t = translator();
        let mut state = InputState::default();
        t.translate(&mut state, &key(codes::KEY_ESC, 1)).unwrap();
        assert!(state.combo.escape);
        assert_eq!(state.pending_key, Some(PendingKey { scancode: 0x76, released: false }));

        t.translate(&mut state, &key(codes::KEY_ESC, 0)).unwrap();
        assert!(!state.combo.escape);
    }

    // ── Motion ────────────────────────────────────────────────────────────────

    #[test]
    fn test_motion_in_absolute_mode_stays_in_bounds() {
        // Arrange
        let t = translator();
        let mut state = InputState::new(
            PointerMode::Absolute,
            ScreenBounds::new(256, DisplayStandard::Pal),
        );
        let deltas = [-40, 300, 17, -1_000, 999, 3, -2, 255, 256, -256];

        // Act / Assert – invariant holds after every single update
        for d in deltas {
            t.translate(&mut state, &rel(codes::REL_X, d)).unwrap();
            t.translate(&mut state, &rel(codes::REL_Y, -d)).unwrap();
            assert!((0..=255).contains(&state.pointer.x));
            assert!((0..=239).contains(&state.pointer.y));
        }
    }

    #[test]
    fn test_motion_in_relative_mode_stores_last_delta() {
        let t = translator();
        let mut state = InputState::new(PointerMode::Relative, ScreenBounds::default());
        t.translate_batch(&mut state, &[rel(codes::REL_X, 4), rel(codes::REL_X, -9), rel(codes::REL_Y, 200)]);
        assert_eq!((state.pointer.x, state.pointer.y), (-9, 127));
    }

    #[test]
    fn test_wheel_deltas_accumulate() {
        let t = translator();
        let mut state = InputState::default();
        t.translate_batch(&mut state, &[rel(codes::REL_WHEEL, -1), rel(codes::REL_WHEEL, -1)]);
        assert_eq!(state.pointer.wheel, -2);
    }

    #[test]
    fn test_unknown_axis_is_rejected() {
        let t = translator();
        let mut state = InputState::default();
        assert_eq!(
            t.translate(&mut state, &rel(REL_HWHEEL, 1)),
            Err(EventError::UnknownAxis(REL_HWHEEL))
        );
    }

    // ── Batches ───────────────────────────────────────────────────────────────

    #[test]
    fn test_batch_of_only_unrecognised_events_reports_no_update() {
        // Arrange
        let t = translator();
        let mut state = InputState::default();
        let batch = [
            RawEvent::from_parts(codes::EV_SYN, 0, 0),
            RawEvent::from_parts(0x04, 0x04, 0x7001e), // EV_MSC / MSC_SCAN
            key(KEY_B, 1),
            rel(REL_HWHEEL, 1),
        ];

        // Act
        let updated = t.translate_batch(&mut state, &batch);

        // Assert
        assert!(!updated);
        assert_eq!(state, InputState::default());
    }

    #[test]
    fn test_batch_with_one_recognised_event_reports_update() {
        let t = translator();
        let mut state = InputState::default();
        let batch = [
            RawEvent::from_parts(codes::EV_SYN, 0, 0),
            RawEvent::from_parts(codes::EV_REL, codes::REL_X, 3),
        ];
        assert!(t.translate_batch(&mut state, &batch));
        assert_eq!(state.pointer.x, 3);
    }

    #[test]
    fn test_from_parts_classifies_event_types() {
        assert_eq!(RawEvent::from_parts(codes::EV_KEY, 30, 1), key(30, 1));
        assert_eq!(RawEvent::from_parts(codes::EV_REL, codes::REL_Y, -2), rel(codes::REL_Y, -2));
        assert_eq!(
            RawEvent::from_parts(0x11, 0, 1),
            RawEvent::Other { kind: 0x11, code: 0, value: 1 }
        );
    }
}
