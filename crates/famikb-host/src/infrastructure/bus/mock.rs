//! Recording frame sink for unit and integration testing.

use famikb_core::protocol::PERIPHERAL_ADDRESS;
use famikb_core::Frame;

use crate::application::bridge_input::{FrameSink, TransportError};

/// A [`FrameSink`] that keeps every written frame in memory.
///
/// After [`RecordingFrameSink::fail_after`]`(n)`, the first `n` writes succeed
/// and every later write fails as if the adapter had been unplugged.
#[derive(Debug, Default)]
pub struct RecordingFrameSink {
    frames: Vec<Frame>,
    fail_after: Option<usize>,
}

impl RecordingFrameSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after(&mut self, successful_writes: usize) {
        self.fail_after = Some(successful_writes);
    }

    /// Frames written so far, oldest first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl FrameSink for RecordingFrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        if self.fail_after.is_some_and(|limit| self.frames.len() >= limit) {
            return Err(TransportError::PeripheralNotFound {
                address: PERIPHERAL_ADDRESS,
                reason: "Remote I/O error (os error 121)".to_string(),
            });
        }
        self.frames.push(*frame);
        Ok(())
    }
}
