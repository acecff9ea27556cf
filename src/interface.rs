//! Bus interface implementations
//!
//! Every driver in this crate talks to its hardware through
//! [`device_driver::RegisterInterface`] with 8-bit addresses. The cm36672p
//! proximity sensor, the sm5703 PMIC and the sm5703 fuel gauge sit on I2C and
//! use [`I2cInterface`].
//!
//! The ili9881c panel sits behind a MIPI-DSI host instead. The host implements
//! the same trait, treating `address` as the DCS command byte and the data
//! slice as the command parameters (a DCS short or long write depending on
//! the parameter count). Reads are never issued to the panel.

use device_driver::RegisterInterface;
use embedded_hal::i2c::{I2c, Operation};

/// I2C interface for register-addressed devices
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface for the device at `address`
    ///
    /// # Arguments
    /// * `i2c` - The I2C peripheral
    /// * `address` - The 7-bit device address, e.g. [`crate::CM36672P_I2C_ADDRESS`]
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::new(i2c, msm8916_periph::SM5703_I2C_ADDRESS);
    /// let mut pmic = Sm5703::new(interface, Some(reset))?;
    /// ```
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// The device address this interface talks to
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len() for I2C
        self.i2c.write_read(self.address, &[address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in write_data.len() for I2C
        // Adjacent writes go out back to back without a repeated start
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&[address]), Operation::Write(write_data)],
        )
    }
}
