#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod interface;
pub mod interrupt;
pub mod lifecycle;
pub mod panel;
pub mod pmic;
pub mod power;
pub mod registers;
pub mod regmap;
pub mod script;
pub mod sensors;

// Re-export main types
pub use interface::I2cInterface;
pub use interrupt::{Clock, Direction, EventSink, IrqOutcome, ProximityEvent};
pub use lifecycle::{LifecycleState, TeardownReport};
pub use panel::{DisplayMode, Ili9881c};
pub use pmic::{
    Sm5703,
    charger::{ChargeStatus, Charger, ChargerOptions, ChargerState, Health, Presence},
    flash::{FlashConfig, FlashLed},
    fuel_gauge::{FuelGauge, FuelGaugeProperty},
};
pub use power::{GpioSupply, PowerError, PowerResource, PowerSequencer, PowerState};
pub use regmap::{CacheType, Endian, Regmap, RegmapConfig, ValueWidth};
pub use script::{InvalidPixelFormat, PixelFormat, ScriptError, Step};
pub use sensors::proximity::{Cm36672p, ThresholdPair, Variant, VariantConfig};

/// cm36672p / cm36686 I2C address
pub const CM36672P_I2C_ADDRESS: u8 = 0x60;

/// sm5703 PMIC I2C address (charger, flash and regulator blocks)
pub const SM5703_I2C_ADDRESS: u8 = 0x49;

/// sm5703 fuel gauge I2C address
///
/// The fuel gauge answers on its own address and has its own 16-bit register map.
pub const SM5703_FG_I2C_ADDRESS: u8 = 0x71;

/// Driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// A supply or control line failed to switch
    Power(PowerError),
    /// Register address outside the device map (contains the address)
    InvalidAddress(u8),
    /// Value does not fit the register width or violates a parameter range
    InvalidValue,
    /// A power or GPIO resource the device needs was not provided
    ResourceMissing(&'static str),
    /// Identity register could not be read after reset
    DeviceNotFound,
    /// Operation is not valid in the current lifecycle state
    InvalidState(LifecycleState),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
