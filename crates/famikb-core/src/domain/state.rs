//! Accumulated input state shared by the translator, capture controller and encoder.
//!
//! One [`InputState`] value lives for the whole run.  It is owned by the bridge
//! loop and lent out by `&mut` to whichever stage is working on the current
//! readiness batch, so no stage ever sees a stale copy.

/// Horizontal resolution used when none is configured.
pub const DEFAULT_SCREEN_WIDTH: u16 = 256;

/// Lower bound of the wheel accumulator (4-bit two's complement).
pub const WHEEL_MIN: i8 = -8;
/// Upper bound of the wheel accumulator (4-bit two's complement).
pub const WHEEL_MAX: i8 = 7;

/// Video standard of the console; selects the vertical resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayStandard {
    #[default]
    Ntsc,
    Pal,
}

impl DisplayStandard {
    /// Visible scanlines: 224 for NTSC, 240 for PAL.
    pub fn height(self) -> u16 {
        match self {
            DisplayStandard::Ntsc => 224,
            DisplayStandard::Pal => 240,
        }
    }
}

/// How pointer motion is reported to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerMode {
    /// Motion is integrated into an on-screen position clamped to the bounds.
    #[default]
    Absolute,
    /// The last signed delta is forwarded as-is (clamped to `i8`).
    Relative,
}

/// Inclusive-exclusive pointer range: `x` in `0..width`, `y` in `0..height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub width: u16,
    pub height: u16,
}

impl ScreenBounds {
    /// Bounds for a `width`-pixel screen. Widths above 256 are clamped, since
    /// the wire carries the x position in a single byte.
    pub fn new(width: u16, standard: DisplayStandard) -> Self {
        Self {
            width: width.min(DEFAULT_SCREEN_WIDTH),
            height: standard.height(),
        }
    }

    pub fn max_x(&self) -> i32 {
        i32::from(self.width.clamp(1, DEFAULT_SCREEN_WIDTH)) - 1
    }

    pub fn max_y(&self) -> i32 {
        i32::from(self.height.max(1)) - 1
    }
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self::new(DEFAULT_SCREEN_WIDTH, DisplayStandard::default())
    }
}

/// Pointer position (absolute mode) or last delta (relative mode) plus wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    pub x: i32,
    pub y: i32,
    /// Signed wheel accumulator, always within [`WHEEL_MIN`]..=[`WHEEL_MAX`].
    pub wheel: i8,
    pub mode: PointerMode,
    pub bounds: ScreenBounds,
}

impl PointerState {
    pub fn new(mode: PointerMode, bounds: ScreenBounds) -> Self {
        Self {
            x: 0,
            y: 0,
            wheel: 0,
            mode,
            bounds,
        }
    }

    /// Applies a horizontal motion delta.
    pub fn move_x(&mut self, delta: i32) {
        self.x = match self.mode {
            PointerMode::Absolute => self.x.saturating_add(delta).clamp(0, self.bounds.max_x()),
            PointerMode::Relative => clamp_to_i8(delta),
        };
    }

    /// Applies a vertical motion delta.
    pub fn move_y(&mut self, delta: i32) {
        self.y = match self.mode {
            PointerMode::Absolute => self.y.saturating_add(delta).clamp(0, self.bounds.max_y()),
            PointerMode::Relative => clamp_to_i8(delta),
        };
    }

    /// Adds a wheel delta, saturating at the nibble range.
    pub fn scroll(&mut self, delta: i32) {
        let sum = i32::from(self.wheel).saturating_add(delta);
        // Clamped into i8 range just above, so the cast cannot truncate.
        self.wheel = sum.clamp(i32::from(WHEEL_MIN), i32::from(WHEEL_MAX)) as i8;
    }
}

fn clamp_to_i8(value: i32) -> i32 {
    value.clamp(i32::from(i8::MIN), i32::from(i8::MAX))
}

/// Mouse buttons, each mirroring the most recent press/release event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

/// The key event that will be reported in byte 0 of the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingKey {
    /// Adapter scancode, 0x00-0x7F.
    pub scancode: u8,
    pub released: bool,
}

impl PendingKey {
    /// The scancode as sent on the wire: bit 7 flags a release.
    pub fn wire_byte(&self) -> u8 {
        if self.released {
            self.scancode | 0x80
        } else {
            self.scancode
        }
    }
}

/// Whether the input devices are exclusively owned by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Released,
    Captured,
}

/// Hotkey tracking: the three combo keys plus capture bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboState {
    pub left_shift: bool,
    pub left_ctrl: bool,
    pub escape: bool,
    pub capture: CaptureState,
    /// Set after a toggle; cleared once the combo is no longer fully held.
    pub cooldown: bool,
}

impl ComboState {
    pub fn all_held(&self) -> bool {
        self.left_shift && self.left_ctrl && self.escape
    }

    pub fn is_captured(&self) -> bool {
        self.capture == CaptureState::Captured
    }
}

/// All state mutated by one readiness batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    pub pointer: PointerState,
    pub buttons: ButtonState,
    pub pending_key: Option<PendingKey>,
    pub combo: ComboState,
}

impl InputState {
    pub fn new(mode: PointerMode, bounds: ScreenBounds) -> Self {
        Self {
            pointer: PointerState::new(mode, bounds),
            buttons: ButtonState::default(),
            pending_key: None,
            combo: ComboState::default(),
        }
    }

    /// Clears the per-batch fields once the batch has been reported.
    ///
    /// The pending key and wheel are one-shot.  In relative mode the x/y
    /// deltas are one-shot too; in absolute mode the position persists.
    pub fn finish_batch(&mut self) {
        self.pending_key = None;
        self.pointer.wheel = 0;
        if self.pointer.mode == PointerMode::Relative {
            self.pointer.x = 0;
            self.pointer.y = 0;
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(PointerMode::default(), ScreenBounds::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
