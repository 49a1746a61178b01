//! BridgeInputUseCase: the readiness loop that feeds the adapter.
//!
//! One iteration is one *readiness batch*:
//!
//! ```text
//! InputSources::wait_ready ──▶ drain every ready source
//!                                 │
//!                                 ▼
//!                     EventTranslator::translate_batch
//!                                 │
//!              ┌──────────────────┴──────────────────┐
//!              ▼                                     ▼
//!   CaptureController::evaluate        encode_frame (only if updated)
//!                                                    │
//!                                                    ▼
//!                                        FrameSink::write_frame
//! ```
//!
//! # Error channels
//!
//! Per-event problems (unmapped key, unknown axis) are handled inside the
//! translator and never reach this layer.  A failed grab/ungrab is logged and
//! the loop carries on.  Device read failures and bus write failures are
//! fatal: [`BridgeInputUseCase::run`] hands the devices back to the host and
//! returns the error.
//!
//! This use case depends only on traits, so it is fully unit-testable with the
//! doubles in `infrastructure::*::mock`.

use std::fmt;
use std::future::Future;
use std::io;

use async_trait::async_trait;
use famikb_core::{
    encode_frame, handshake_frame, CaptureController, DeviceCapture, DevicePresence,
    EventTranslator, Frame, InputState, RawEvent,
};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

/// Identifies one of the (at most two) registered input devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Keyboard,
    Mouse,
}

impl SourceId {
    pub const ALL: [SourceId; 2] = [SourceId::Keyboard, SourceId::Mouse];
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Keyboard => f.write_str("keyboard"),
            SourceId::Mouse => f.write_str("mouse"),
        }
    }
}

/// Fatal failure of the input side.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read from {device} device: {error}")]
    Read {
        device: SourceId,
        #[source]
        error: io::Error,
    },

    #[error("no {0} device is registered")]
    Unregistered(SourceId),

    #[error("no input device registered")]
    NoSources,

    #[error("input event stream ended")]
    Closed,
}

/// Fatal failure of the bus side.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot open I2C bus {path}: {reason}")]
    BusUnavailable { path: String, reason: String },

    #[error("peripheral not found at I2C address 0x{address:02X}: {reason}")]
    PeripheralNotFound { address: u16, reason: String },
}

/// Any error that ends the bridge loop.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Readiness multiplexer over the registered input devices.
///
/// The loop is single-threaded, so the futures need not be `Send`.
#[async_trait(?Send)]
pub trait InputSources {
    /// Blocks until at least one source has pending events; returns the ready subset.
    ///
    /// No ordering is implied by the returned vector.
    async fn wait_ready(&mut self) -> Result<Vec<SourceId>, SourceError>;

    /// Reads every event currently pending on `source`.
    async fn drain(&mut self, source: SourceId) -> Result<Vec<RawEvent>, SourceError>;
}

/// Transmits encoded frames to the adapter. Fire-and-forget.
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), TransportError>;
}

/// What one batch produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// At least one event changed the state; this frame was written.
    Sent(Frame),
    /// Nothing reportable happened.
    Idle,
}

/// The bridge use case.
pub struct BridgeInputUseCase<S, W> {
    sources: S,
    sink: W,
    translator: EventTranslator,
    capture: CaptureController,
    state: InputState,
    presence: DevicePresence,
    frames_sent: u64,
}

impl<S, W> BridgeInputUseCase<S, W>
where
    S: InputSources + DeviceCapture,
    W: FrameSink,
{
    /// Creates the use case. `state` carries the pointer mode and screen bounds.
    pub fn new(
        sources: S,
        sink: W,
        translator: EventTranslator,
        state: InputState,
        presence: DevicePresence,
    ) -> Self {
        Self {
            sources,
            sink,
            translator,
            capture: CaptureController::new(),
            state,
            presence,
            frames_sent: 0,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn sources(&self) -> &S {
        &self.sources
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Number of report frames written so far (the handshake is not counted).
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Announces the device-presence flags to the adapter.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] if the adapter does not answer on the bus.
    pub fn send_handshake(&mut self) -> Result<(), BridgeError> {
        let frame = handshake_frame(self.presence, self.state.pointer.mode);
        debug!("handshake {frame:?}");
        self.sink.write_frame(&frame)?;
        info!("pico-ps2famikb connected");
        Ok(())
    }

    /// Runs one readiness batch.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] on a device read failure or a bus write
    /// failure.  Devices are not released here; see [`Self::run`].
    pub async fn process_batch(&mut self) -> Result<BatchOutcome, BridgeError> {
        let ready = self.sources.wait_ready().await?;

        let mut updated = false;
        for source in ready {
            let events = self.sources.drain(source).await?;
            trace!("{source}: drained {} events", events.len());
            updated |= self.translator.translate_batch(&mut self.state, &events);
        }

        if let Err(e) = self.capture.evaluate(&mut self.state.combo, &mut self.sources) {
            warn!("capture toggle failed: {e}");
        }

        let outcome = if updated {
            let frame = encode_frame(&self.state, self.presence);
            trace!("sending {frame:?}");
            self.sink.write_frame(&frame)?;
            self.frames_sent += 1;
            BatchOutcome::Sent(frame)
        } else {
            BatchOutcome::Idle
        };

        self.state.finish_batch();
        Ok(outcome)
    }

    /// Processes batches until `shutdown` resolves or a fatal error occurs.
    ///
    /// Either way the devices are released before returning.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`BridgeError`] that ended the loop.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), BridgeError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let step = tokio::select! {
                () = &mut shutdown => None,
                result = self.process_batch() => Some(result),
            };

            match step {
                None => {
                    info!("shutdown requested after {} frames", self.frames_sent);
                    self.release_devices();
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    self.release_devices();
                    match &e {
                        BridgeError::Transport(_) => {
                            error!("pico-ps2famikb not found, check config and wiring: {e}")
                        }
                        BridgeError::Source(_) => error!("input device failure: {e}"),
                    }
                    return Err(e);
                }
            }
        }
    }

    fn release_devices(&mut self) {
        if let Err(e) = self
            .capture
            .release_on_exit(&mut self.state.combo, &mut self.sources)
        {
            warn!("could not release input devices: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::bus::mock::RecordingFrameSink;
    use crate::infrastructure::input_devices::mock::MockInputSources;
    use famikb_core::keymap::linux_evdev::{
        BTN_LEFT, EV_KEY, EV_REL, EV_SYN, KEY_ESC, KEY_LEFTCTRL, KEY_LEFTSHIFT, REL_X,
    };
    use famikb_core::{CaptureState, KeyMap, PointerMode, ScreenBounds};

    const KEY_A: u16 = 30;
    const KEY_B: u16 = 48;
    const BOTH: DevicePresence = DevicePresence { keyboard: true, mouse: true };

    fn key(code: u16, value: i32) -> RawEvent {
        RawEvent::from_parts(EV_KEY, code, value)
    }

    fn rel(axis: u16, value: i32) -> RawEvent {
        RawEvent::from_parts(EV_REL, axis, value)
    }

    fn syn() -> RawEvent {
        RawEvent::from_parts(EV_SYN, 0, 0)
    }

    fn make_use_case(
        sources: MockInputSources,
    ) -> BridgeInputUseCase<MockInputSources, RecordingFrameSink> {
        BridgeInputUseCase::new(
            sources,
            RecordingFrameSink::default(),
            EventTranslator::new(KeyMap::parse("KEY_A 1C\n").unwrap()),
            InputState::default(),
            BOTH,
        )
    }

    // ── Handshake ─────────────────────────────────────────────────────────────

    #[test]
    fn test_handshake_writes_presence_frame() {
        // Arrange
        let mut uc = make_use_case(MockInputSources::new());

        // Act
        uc.send_handshake().unwrap();

        // Assert
        assert_eq!(uc.sink().frames().len(), 1);
        assert_eq!(uc.sink().frames()[0].as_bytes(), &[0, 0x36, 0, 0, 0]);
        assert_eq!(uc.frames_sent(), 0);
    }

    #[test]
    fn test_handshake_failure_is_transport_error() {
        let mut uc = make_use_case(MockInputSources::new());
        uc.sink.fail_after(0);
        assert!(matches!(uc.send_handshake(), Err(BridgeError::Transport(_))));
    }

    // ── Batches ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_key_press_batch_sends_one_frame() {
        // Arrange
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_A, 1), syn()])]);
        let mut uc = make_use_case(sources);

        // Act
        let outcome = uc.process_batch().await.unwrap();

        // Assert
        let frames = uc.sink().frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].key(), 0x1C);
        assert_eq!(outcome, BatchOutcome::Sent(frames[0]));
        assert_eq!(uc.state().pending_key, None, "pending key is cleared after the batch");
    }

    #[tokio::test]
    async fn test_unrecognised_batch_sends_nothing() {
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_B, 1), syn()])]);
        let mut uc = make_use_case(sources);

        let outcome = uc.process_batch().await.unwrap();

        assert_eq!(outcome, BatchOutcome::Idle);
        assert!(uc.sink().frames().is_empty());
    }

    #[tokio::test]
    async fn test_both_sources_ready_produce_a_single_frame() {
        // Arrange
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![
            (SourceId::Mouse, vec![key(BTN_LEFT, 1), rel(REL_X, 9), syn()]),
            (SourceId::Keyboard, vec![key(KEY_A, 0), syn()]),
        ]);
        let mut uc = make_use_case(sources);

        // Act
        uc.process_batch().await.unwrap();

        // Assert
        let frames = uc.sink().frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].key(), 0x9C);
        assert_eq!(frames[0].flags(), 0b1011_0110);
        assert_eq!(frames[0].x(), 9);
        assert_eq!(uc.sources().drained(), 2);
    }

    #[tokio::test]
    async fn test_relative_mode_flag_reaches_the_wire() {
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Mouse, vec![rel(REL_X, -4), syn()])]);
        let mut uc = BridgeInputUseCase::new(
            sources,
            RecordingFrameSink::default(),
            EventTranslator::default(),
            InputState::new(PointerMode::Relative, ScreenBounds::default()),
            BOTH,
        );

        uc.process_batch().await.unwrap();

        let frame = uc.sink().frames()[0];
        assert_eq!(frame.flags() & 0b1000, 0b1000);
        assert_eq!(frame.x(), 0xFC);
    }

    #[tokio::test]
    async fn test_combo_across_batches_grabs_once() {
        // Arrange – shift, ctrl, esc arrive in separate batches, then Esc repeats
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_LEFTSHIFT, 1)])]);
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_LEFTCTRL, 1)])]);
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_ESC, 1)])]);
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_ESC, 2)])]);
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_ESC, 2)])]);
        let mut uc = make_use_case(sources);

        // Act
        for _ in 0..5 {
            uc.process_batch().await.unwrap();
        }

        // Assert
        assert_eq!(uc.sources().grabs(), 1);
        assert_eq!(uc.sources().ungrabs(), 0);
        assert_eq!(uc.state().combo.capture, CaptureState::Captured);
    }

    #[tokio::test]
    async fn test_failed_grab_is_not_fatal() {
        let mut sources = MockInputSources::new();
        sources.fail_grabs();
        sources.push_batch(vec![(
            SourceId::Keyboard,
            vec![key(KEY_LEFTSHIFT, 1), key(KEY_LEFTCTRL, 1), key(KEY_ESC, 1)],
        )]);
        let mut uc = make_use_case(sources);

        let outcome = uc.process_batch().await;

        assert!(outcome.is_ok());
        assert_eq!(uc.state().combo.capture, CaptureState::Released);
    }

    // ── Fatal paths ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_run_releases_capture_when_bus_fails() {
        // Arrange – capture in batch 1, then the adapter disappears on batch 2
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(
            SourceId::Keyboard,
            vec![key(KEY_LEFTSHIFT, 1), key(KEY_LEFTCTRL, 1), key(KEY_ESC, 1)],
        )]);
        sources.push_batch(vec![(SourceId::Mouse, vec![rel(REL_X, 1)])]);
        let mut uc = make_use_case(sources);
        uc.sink.fail_after(1);

        // Act
        let result = uc.run(std::future::pending()).await;

        // Assert
        assert!(matches!(
            result,
            Err(BridgeError::Transport(TransportError::PeripheralNotFound { address: 0x17, .. }))
        ));
        assert_eq!(uc.sources().grabs(), 1);
        assert_eq!(uc.sources().ungrabs(), 1);
        assert_eq!(uc.state().combo.capture, CaptureState::Released);
    }

    #[tokio::test]
    async fn test_run_treats_device_read_failure_as_fatal() {
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Mouse, vec![rel(REL_X, 1)])]);
        sources.fail_reads_from(SourceId::Mouse);
        let mut uc = make_use_case(sources);

        let result = uc.run(std::future::pending()).await;

        assert!(matches!(
            result,
            Err(BridgeError::Source(SourceError::Read { device: SourceId::Mouse, .. }))
        ));
        assert!(uc.sink().frames().is_empty());
    }

    #[tokio::test]
    async fn test_run_without_capture_does_not_ungrab() {
        let mut uc = make_use_case(MockInputSources::new());

        let result = uc.run(std::future::pending()).await;

        assert!(matches!(result, Err(BridgeError::Source(SourceError::Closed))));
        assert_eq!(uc.sources().ungrabs(), 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_and_releases_capture() {
        // Arrange – capture, then an idle source that never becomes ready
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(
            SourceId::Keyboard,
            vec![key(KEY_LEFTSHIFT, 1), key(KEY_LEFTCTRL, 1), key(KEY_ESC, 1)],
        )]);
        sources.hang_when_exhausted();
        let mut uc = make_use_case(sources);
        uc.process_batch().await.unwrap();

        // Act
        let result = uc.run(async {}).await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(uc.sources().ungrabs(), 1);
    }

    #[tokio::test]
    async fn test_write_is_issued_with_encoded_frame() {
        // Arrange
        let mut sink = MockFrameSink::new();
        sink.expect_write_frame()
            .withf(|frame: &Frame| frame.as_bytes() == &[0x1C, 0x36, 0, 0, 0])
            .times(1)
            .returning(|_| Ok(()));
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Keyboard, vec![key(KEY_A, 1)])]);
        let mut uc = BridgeInputUseCase::new(
            sources,
            sink,
            EventTranslator::new(KeyMap::parse("KEY_A 1C").unwrap()),
            InputState::default(),
            BOTH,
        );

        // Act
        let outcome = uc.process_batch().await;

        // Assert – expectations are verified when the mock is dropped
        assert!(outcome.is_ok());
        assert_eq!(uc.frames_sent(), 1);
    }

    #[tokio::test]
    async fn test_write_error_propagates_from_sink() {
        let mut sink = MockFrameSink::new();
        sink.expect_write_frame().returning(|_| {
            Err(TransportError::PeripheralNotFound {
                address: 0x17,
                reason: "Remote I/O error".to_string(),
            })
        });
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Mouse, vec![key(BTN_LEFT, 1)])]);
        let mut uc = BridgeInputUseCase::new(
            sources,
            sink,
            EventTranslator::default(),
            InputState::default(),
            BOTH,
        );

        let outcome = uc.process_batch().await;

        assert!(matches!(outcome, Err(BridgeError::Transport(_))));
        assert_eq!(uc.frames_sent(), 0);
    }
}
