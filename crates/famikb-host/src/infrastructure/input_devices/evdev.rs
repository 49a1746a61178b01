//! Linux evdev input sources.
//!
//! Devices are opened through the `evdev` crate, set to `O_NONBLOCK`, and
//! wrapped in [`AsyncFd`] so the current-thread runtime can wait on both at
//! once.  A ready device is read until the kernel reports `EAGAIN`, which
//! empties its queue in one go.
//!
//! Capture uses `EVIOCGRAB`: while grabbed, the devices stop feeding the
//! host's own console or desktop.

use std::io;
use std::os::unix::io::AsRawFd;

use ::evdev::{Device, InputEvent};
use async_trait::async_trait;
use famikb_core::{CaptureError, DeviceCapture, DevicePresence, RawEvent};
use futures_util::FutureExt;
use tokio::io::unix::AsyncFd;
use tracing::{debug, info};

use crate::application::bridge_input::{InputSources, SourceError, SourceId};
use crate::application::select_devices::DeviceDescriptor;

/// A device found during enumeration, still open.
pub struct DiscoveredDevice {
    pub descriptor: DeviceDescriptor,
    pub device: Device,
}

/// Lists every `/dev/input/event*` node the process can open.
pub fn discover() -> Vec<DiscoveredDevice> {
    let mut found: Vec<DiscoveredDevice> = ::evdev::enumerate()
        .map(|(path, device)| {
            let key_codes = device
                .supported_keys()
                .map(|keys| keys.iter().map(|key| key.code()).collect())
                .unwrap_or_default();
            let descriptor = DeviceDescriptor {
                name: device.name().unwrap_or("unnamed device").to_string(),
                path,
                key_codes,
            };
            DiscoveredDevice { descriptor, device }
        })
        .collect();
    found.sort_by(|a, b| a.descriptor.path.cmp(&b.descriptor.path));
    debug!("enumerated {} input devices", found.len());
    found
}

/// Switches the device fd to non-blocking mode, preserving its other flags.
fn set_nonblocking(device: &Device) -> io::Result<()> {
    let raw_fd = device.as_raw_fd();

    // SAFETY: `raw_fd` is owned by `device`, which outlives both calls.
    let current = unsafe { libc::fcntl(raw_fd, libc::F_GETFL) };
    if current < 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: as above; only O_NONBLOCK is added.
    let rc = unsafe { libc::fcntl(raw_fd, libc::F_SETFL, current | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn register(device: Device) -> io::Result<AsyncFd<Device>> {
    set_nonblocking(&device)?;
    AsyncFd::new(device)
}

fn to_raw_event(event: InputEvent) -> RawEvent {
    RawEvent::from_parts(event.event_type().0, event.code(), event.value())
}

/// The selected keyboard and mouse, registered with the Tokio reactor.
///
/// Must be created from within a Tokio runtime.
pub struct EvdevSources {
    keyboard: Option<AsyncFd<Device>>,
    mouse: Option<AsyncFd<Device>>,
}

impl EvdevSources {
    /// Registers the given devices.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoSources`] if both are `None`, or
    /// [`SourceError::Read`] if a device cannot be made non-blocking.
    pub fn new(keyboard: Option<Device>, mouse: Option<Device>) -> Result<Self, SourceError> {
        if keyboard.is_none() && mouse.is_none() {
            return Err(SourceError::NoSources);
        }
        let keyboard = keyboard
            .map(register)
            .transpose()
            .map_err(|error| SourceError::Read { device: SourceId::Keyboard, error })?;
        let mouse = mouse
            .map(register)
            .transpose()
            .map_err(|error| SourceError::Read { device: SourceId::Mouse, error })?;
        Ok(Self { keyboard, mouse })
    }

    pub fn presence(&self) -> DevicePresence {
        DevicePresence {
            keyboard: self.keyboard.is_some(),
            mouse: self.mouse.is_some(),
        }
    }

    fn slot_mut(&mut self, source: SourceId) -> Option<&mut AsyncFd<Device>> {
        match source {
            SourceId::Keyboard => self.keyboard.as_mut(),
            SourceId::Mouse => self.mouse.as_mut(),
        }
    }

    fn registered_mut(&mut self) -> impl Iterator<Item = &mut AsyncFd<Device>> {
        self.keyboard.iter_mut().chain(self.mouse.iter_mut())
    }
}

/// Resolves when `fd` is readable; never resolves for an absent device.
async fn readable(fd: Option<&AsyncFd<Device>>) -> io::Result<()> {
    match fd {
        Some(fd) => fd.readable().await.map(drop),
        None => std::future::pending().await,
    }
}

#[async_trait(?Send)]
impl InputSources for EvdevSources {
    async fn wait_ready(&mut self) -> Result<Vec<SourceId>, SourceError> {
        let keyboard = self.keyboard.as_ref();
        let mouse = self.mouse.as_ref();
        let read_err = |device: SourceId| move |error: io::Error| SourceError::Read { device, error };

        let first = tokio::select! {
            r = readable(keyboard) => r.map(|()| SourceId::Keyboard).map_err(read_err(SourceId::Keyboard))?,
            r = readable(mouse) => r.map(|()| SourceId::Mouse).map_err(read_err(SourceId::Mouse))?,
        };

        // The other device may have become ready at the same time; probe it
        // once without waiting so both land in the same batch.
        let mut ready = vec![first];
        let (other, other_fd) = match first {
            SourceId::Keyboard => (SourceId::Mouse, mouse),
            SourceId::Mouse => (SourceId::Keyboard, keyboard),
        };
        if other_fd.is_some() {
            if let Some(result) = readable(other_fd).now_or_never() {
                result.map_err(read_err(other))?;
                ready.push(other);
            }
        }
        Ok(ready)
    }

    async fn drain(&mut self, source: SourceId) -> Result<Vec<RawEvent>, SourceError> {
        let read_err = |error: io::Error| SourceError::Read { device: source, error };
        let fd = self.slot_mut(source).ok_or(SourceError::Unregistered(source))?;

        let mut events = Vec::new();
        loop {
            let mut guard = fd.readable_mut().await.map_err(read_err)?;
            let fetched = guard.try_io(|inner| {
                inner
                    .get_mut()
                    .fetch_events()
                    .map(|batch| batch.map(to_raw_event).collect::<Vec<_>>())
            });
            match fetched {
                Ok(Ok(batch)) => events.extend(batch),
                Ok(Err(error)) => return Err(read_err(error)),
                // WouldBlock: the queue is empty and readiness was cleared.
                Err(_would_block) => break,
            }
        }
        Ok(events)
    }
}

impl DeviceCapture for EvdevSources {
    fn acquire(&mut self) -> Result<(), CaptureError> {
        let mut grabbed = 0;
        let mut failure = None;
        for fd in self.registered_mut() {
            match fd.get_mut().grab() {
                Ok(()) => grabbed += 1,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            // Undo partial grabs so the host keeps both devices.
            for fd in self.registered_mut().take(grabbed) {
                let _ = fd.get_mut().ungrab();
            }
            return Err(CaptureError::Acquire(e.to_string()));
        }
        info!("grabbed {grabbed} input devices");
        Ok(())
    }

    fn release(&mut self) -> Result<(), CaptureError> {
        let mut first_error = None;
        for fd in self.registered_mut() {
            if let Err(e) = fd.get_mut().ungrab() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(CaptureError::Release(e.to_string())),
            None => Ok(()),
        }
    }
}
