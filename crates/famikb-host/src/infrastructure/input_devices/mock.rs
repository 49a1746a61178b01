//! Scripted input sources for unit and integration testing.
//!
//! Lets tests feed readiness batches into the bridge loop without any
//! `/dev/input` nodes, and counts grab/ungrab calls instead of issuing
//! `EVIOCGRAB`.

use std::collections::{HashMap, VecDeque};
use std::io;

use async_trait::async_trait;
use famikb_core::{CaptureError, DeviceCapture, RawEvent};

use crate::application::bridge_input::{InputSources, SourceError, SourceId};

/// One scripted readiness batch: the ready sources and what each one yields.
pub type ScriptedBatch = Vec<(SourceId, Vec<RawEvent>)>;

/// A mock implementation of [`InputSources`] driven by a script of batches.
///
/// When the script runs out, [`InputSources::wait_ready`] returns
/// [`SourceError::Closed`] unless [`MockInputSources::hang_when_exhausted`]
/// was called, in which case it never resolves.
#[derive(Debug, Default)]
pub struct MockInputSources {
    script: VecDeque<ScriptedBatch>,
    pending: HashMap<SourceId, Vec<RawEvent>>,
    failing: Option<SourceId>,
    hang: bool,
    fail_grabs: bool,
    grabs: u32,
    ungrabs: u32,
    drained: u32,
}

impl MockInputSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a readiness batch to the script.
    pub fn push_batch(&mut self, batch: ScriptedBatch) {
        self.script.push_back(batch);
    }

    /// Makes every subsequent drain of `source` fail, as if it were unplugged.
    pub fn fail_reads_from(&mut self, source: SourceId) {
        self.failing = Some(source);
    }

    /// Makes `acquire` fail, as if another process held the grab.
    pub fn fail_grabs(&mut self) {
        self.fail_grabs = true;
    }

    /// Keeps `wait_ready` pending forever once the script is exhausted.
    pub fn hang_when_exhausted(&mut self) {
        self.hang = true;
    }

    /// Number of successful `acquire` calls.
    pub fn grabs(&self) -> u32 {
        self.grabs
    }

    /// Number of successful `release` calls.
    pub fn ungrabs(&self) -> u32 {
        self.ungrabs
    }

    /// Number of `drain` calls that returned events.
    pub fn drained(&self) -> u32 {
        self.drained
    }
}

#[async_trait(?Send)]
impl InputSources for MockInputSources {
    async fn wait_ready(&mut self) -> Result<Vec<SourceId>, SourceError> {
        let Some(batch) = self.script.pop_front() else {
            if self.hang {
                std::future::pending::<()>().await;
            }
            return Err(SourceError::Closed);
        };

        let mut ready = Vec::with_capacity(batch.len());
        for (source, events) in batch {
            self.pending.entry(source).or_default().extend(events);
            ready.push(source);
        }
        Ok(ready)
    }

    async fn drain(&mut self, source: SourceId) -> Result<Vec<RawEvent>, SourceError> {
        if self.failing == Some(source) {
            return Err(SourceError::Read {
                device: source,
                error: io::Error::new(io::ErrorKind::Other, "No such device"),
            });
        }
        let events = self.pending.remove(&source).unwrap_or_default();
        self.drained += 1;
        Ok(events)
    }
}

impl DeviceCapture for MockInputSources {
    fn acquire(&mut self) -> Result<(), CaptureError> {
        if self.fail_grabs {
            return Err(CaptureError::Acquire("Device or resource busy".to_string()));
        }
        self.grabs += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), CaptureError> {
        self.ungrabs += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famikb_core::keymap::linux_evdev::{EV_REL, REL_X};

    fn motion(dx: i32) -> RawEvent {
        RawEvent::from_parts(EV_REL, REL_X, dx)
    }

    #[tokio::test]
    async fn test_batches_are_replayed_in_order() {
        // Arrange
        let mut sources = MockInputSources::new();
        sources.push_batch(vec![(SourceId::Mouse, vec![motion(1)])]);
        sources.push_batch(vec![(SourceId::Mouse, vec![motion(2)])]);

        // Act
        let first = sources.wait_ready().await.unwrap();
        let first_events = sources.drain(SourceId::Mouse).await.unwrap();
        sources.wait_ready().await.unwrap();
        let second_events = sources.drain(SourceId::Mouse).await.unwrap();

        // Assert
        assert_eq!(first, vec![SourceId::Mouse]);
        assert_eq!(first_events, vec![motion(1)]);
        assert_eq!(second_events, vec![motion(2)]);
    }

    #[tokio::test]
    async fn test_drain_of_idle_source_is_empty() {
        let mut sources = MockInputSources::new();
        let events = sources.drain(SourceId::Keyboard).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_script_reports_closed() {
        let mut sources = MockInputSources::new();
        assert!(matches!(sources.wait_ready().await, Err(SourceError::Closed)));
    }

    #[tokio::test]
    async fn test_failing_source_returns_read_error() {
        let mut sources = MockInputSources::new();
        sources.fail_reads_from(SourceId::Keyboard);

        let result = sources.drain(SourceId::Keyboard).await;

        assert!(matches!(result, Err(SourceError::Read { device: SourceId::Keyboard, .. })));
        assert!(sources.drain(SourceId::Mouse).await.is_ok());
    }

    #[test]
    fn test_grab_counters() {
        // Arrange
        let mut sources = MockInputSources::new();

        // Act
        sources.acquire().unwrap();
        sources.release().unwrap();
        sources.release().unwrap();

        // Assert
        assert_eq!((sources.grabs(), sources.ungrabs()), (1, 2));
    }

    #[test]
    fn test_failed_grab_is_not_counted() {
        let mut sources = MockInputSources::new();
        sources.fail_grabs();

        assert!(matches!(sources.acquire(), Err(CaptureError::Acquire(_))));
        assert_eq!(sources.grabs(), 0);
    }
}
