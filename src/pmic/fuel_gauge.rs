//! sm5703 fuel gauge
//!
//! Separate I2C device with 16-bit little-endian registers. Every register is
//! a live measurement, so nothing is cached. Measurements are unsigned 8.8
//! fixed point and are reported in power-supply units.

use device_driver::RegisterInterface;

use crate::Error;
use crate::registers::sm5703_fg::Sm5703FgRegisters;
use crate::regmap::{CacheType, Endian, Regmap, RegmapConfig, ValueWidth};

/// Register map description
pub const REGMAP_CONFIG: RegmapConfig = RegmapConfig::new("sm5703_fg", ValueWidth::Bits16)
    .with_endian(Endian::Little)
    .with_cache_type(CacheType::None);

const EXTEND_MICRO: i32 = 1_000_000;
const EXTEND_MILLI: i32 = 1_000;
const EXTEND_DECI: i32 = 10;
const EXTEND_NONE: i32 = 1;

/// Reportable measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FuelGaugeProperty {
    /// Battery temperature in tenths of a degree Celsius
    Temperature,
    /// State of charge in percent
    Capacity,
    /// Battery voltage in microvolts
    VoltageNow,
    /// Open-circuit voltage in microvolts
    VoltageOcv,
    /// Battery current in microamps
    CurrentNow,
}

/// Scale an unsigned 8.8 fixed point value to an integer in units of `1/scale`
///
/// The fractional byte is truncated after scaling.
pub fn fixed_8_8(raw: u16, scale: i32) -> i32 {
    let [fraction, integer] = raw.to_le_bytes();
    i32::from(integer) * scale + i32::from(fraction) * scale / 256
}

/// Fuel gauge driver
pub struct FuelGauge<I> {
    device: Sm5703FgRegisters<Regmap<I>>,
}

impl<I> FuelGauge<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Create a fuel gauge driver; the device needs no setup
    pub fn new(interface: I) -> Self {
        Self {
            device: Sm5703FgRegisters::new(Regmap::new(interface, REGMAP_CONFIG)),
        }
    }

    /// Read one measurement
    ///
    /// # Errors
    ///
    /// Returns the bus error; no value is reported on failure.
    pub fn read_property(&mut self, property: FuelGaugeProperty) -> Result<i32, Error<I::Error>> {
        let value = match property {
            FuelGaugeProperty::Temperature => {
                fixed_8_8(self.device.temperature().read()?.value(), EXTEND_DECI)
            }
            FuelGaugeProperty::Capacity => fixed_8_8(self.device.soc().read()?.value(), EXTEND_NONE),
            FuelGaugeProperty::VoltageNow => {
                fixed_8_8(self.device.voltage().read()?.value(), EXTEND_MICRO)
            }
            FuelGaugeProperty::VoltageOcv => fixed_8_8(self.device.ocv().read()?.value(), EXTEND_MICRO),
            FuelGaugeProperty::CurrentNow => {
                let magnitude = self.device.current().read()?.magnitude();
                fixed_8_8(magnitude, EXTEND_MILLI) * 1000
            }
        };
        Ok(value)
    }

    /// Battery temperature in tenths of a degree Celsius
    ///
    /// # Errors
    ///
    /// Returns the bus error.
    pub fn temperature(&mut self) -> Result<i32, Error<I::Error>> {
        self.read_property(FuelGaugeProperty::Temperature)
    }

    /// State of charge in percent
    ///
    /// # Errors
    ///
    /// Returns the bus error.
    pub fn capacity(&mut self) -> Result<i32, Error<I::Error>> {
        self.read_property(FuelGaugeProperty::Capacity)
    }

    /// Consume the driver and return the transport
    pub fn release(self) -> I {
        self.device.interface.release()
    }
}
