//! SMBus block writes to the adapter through `/dev/i2c-<n>`.

use famikb_core::protocol::{FRAME_REGISTER, PERIPHERAL_ADDRESS};
use famikb_core::Frame;
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use tracing::debug;

use crate::application::bridge_input::{FrameSink, TransportError};

/// The adapter, addressed on one Linux I2C bus.
pub struct I2cFrameWriter {
    device: LinuxI2CDevice,
}

impl I2cFrameWriter {
    /// Opens `/dev/i2c-<bus>` and binds it to the adapter's address.
    ///
    /// Opening does not touch the bus, so an absent adapter is only detected
    /// on the first write.
    ///
    /// # Errors
    ///
    /// [`TransportError::BusUnavailable`] if the bus node cannot be opened
    /// (missing `i2c-dev` module, wrong bus number, no permission).
    pub fn open(bus: u8) -> Result<Self, TransportError> {
        let path = format!("/dev/i2c-{bus}");
        let device = LinuxI2CDevice::new(&path, PERIPHERAL_ADDRESS).map_err(|e| {
            TransportError::BusUnavailable {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        debug!("opened {path} for address 0x{PERIPHERAL_ADDRESS:02X}");
        Ok(Self { device })
    }
}

impl FrameSink for I2cFrameWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), TransportError> {
        self.device
            .smbus_write_block_data(FRAME_REGISTER, frame.as_bytes())
            .map_err(|e| TransportError::PeripheralNotFound {
                address: PERIPHERAL_ADDRESS,
                reason: e.to_string(),
            })
    }
}
