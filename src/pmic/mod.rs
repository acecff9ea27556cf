//! Silicon Mitus sm5703 PMIC
//!
//! The sm5703 core answers on one I2C address and carries the charger and the
//! flash LED driver; its fuel gauge sits on a second address with its own
//! register map ([`fuel_gauge`]).
//!
//! [`Sm5703`] owns the core register map and the reset line. The charger and
//! flash sub-drivers hold no bus handle of their own; each operation borrows
//! the parent explicitly:
//!
//! ```ignore
//! # use msm8916_periph::pmic::{Sm5703, charger::{Charger, ChargerOptions}, flash::{FlashConfig, FlashLed}};
//! let mut pmic = Sm5703::new(interface, Some(reset_pin))?;
//! pmic.init(&mut delay)?;
//!
//! let charger = Charger::probe(&mut pmic, ChargerOptions { autoset: false, autostop: true })?;
//! let mut flash = FlashLed::probe(&mut pmic, FlashConfig::new(160_000, 1_000_000))?;
//! flash.set_brightness(&mut pmic, flash.max_brightness())?;
//! let health = charger.health(&mut pmic)?;
//! ```

pub mod charger;
pub mod flash;
pub mod fuel_gauge;

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::Error;
use crate::lifecycle::{LifecycleState, TeardownReport};
use crate::power::PowerSequencer;
use crate::registers::sm5703::Sm5703Registers;
use crate::regmap::{CacheType, Regmap, RegmapConfig, ValueWidth};

pub use charger::Charger;
pub use flash::FlashLed;
pub use fuel_gauge::FuelGauge;

/// STATUS2 register address
pub const REG_STATUS2: u8 = 0x0B;
/// STATUS3 register address
pub const REG_STATUS3: u8 = 0x0C;
/// STATUS5 register address
pub const REG_STATUS5: u8 = 0x0E;
/// CNTL register address
pub const REG_CNTL: u8 = 0x0F;
/// VBUSCNTL register address
pub const REG_VBUSCNTL: u8 = 0x10;
/// CHGCNTL2 register address
pub const REG_CHGCNTL2: u8 = 0x12;
/// CHGCNTL4 register address
pub const REG_CHGCNTL4: u8 = 0x14;
/// FLEDCNTL1 register address
pub const REG_FLEDCNTL1: u8 = 0x17;
/// FLEDCNTL2 register address
pub const REG_FLEDCNTL2: u8 = 0x18;
/// FLEDCNTL3 register address
pub const REG_FLEDCNTL3: u8 = 0x19;
/// FLEDCNTL4 register address
pub const REG_FLEDCNTL4: u8 = 0x1A;
/// FLEDCNTL6 register address
pub const REG_FLEDCNTL6: u8 = 0x1C;
/// DEVICE_ID register address, last register of the map
pub const REG_DEVICE_ID: u8 = 0x1E;

/// CNTL operation mode field
pub const OPERATION_MODE_MASK: u16 = 0x07;
/// CNTL operation mode: charger running
pub const OPERATION_MODE_CHARGING_ON: u16 = 0x04;
/// CNTL operation mode: boost converter feeding the flash LED
pub const OPERATION_MODE_FLASH_BOOST: u16 = 0x06;

/// Register map description for the core
///
/// Interrupt and status registers change under the hardware and the mode
/// fields in CNTL follow the charger, so nothing is cached.
pub const REGMAP_CONFIG: RegmapConfig = RegmapConfig::new("sm5703", ValueWidth::Bits8)
    .with_max_register(REG_DEVICE_ID)
    .with_cache_type(CacheType::None);

/// Contents of DEVICE_ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId {
    /// Vendor code
    pub vendor_id: u8,
    /// Chip revision
    pub revision: u8,
}

/// sm5703 core driver
pub struct Sm5703<I, P> {
    device: Sm5703Registers<Regmap<I>>,
    reset: P,
    power: PowerSequencer,
    state: LifecycleState,
    device_id: Option<DeviceId>,
    report: TeardownReport,
}

impl<I, P> Sm5703<I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: OutputPin,
{
    /// Attach to the PMIC
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceMissing`] if the reset line is absent.
    pub fn new(interface: I, reset: Option<P>) -> Result<Self, Error<I::Error>> {
        let Some(reset) = reset else {
            #[cfg(feature = "defmt")]
            defmt::error!("sm5703: cannot get reset GPIO");
            return Err(Error::ResourceMissing("reset"));
        };

        Ok(Self {
            device: Sm5703Registers::new(Regmap::new(interface, REGMAP_CONFIG)),
            reset,
            power: PowerSequencer::new(),
            state: LifecycleState::Attached,
            device_id: None,
            report: TeardownReport::new(),
        })
    }

    /// Release reset and confirm the chip answers
    ///
    /// Does nothing if the chip is already prepared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Power`] if the reset line cannot be driven and
    /// [`Error::DeviceNotFound`] if DEVICE_ID cannot be read. In the latter
    /// case the chip is put back in reset before returning.
    pub fn prepare<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        if self.state.is_powered() {
            return Ok(());
        }

        self.power
            .release_reset(&mut self.reset, delay)
            .map_err(Error::Power)?;

        let Ok(id) = self.device.device_id().read() else {
            #[cfg(feature = "defmt")]
            defmt::error!("sm5703: device not found");
            self.report.clear();
            self.power.assert_reset(&mut self.reset, &mut self.report);
            self.state = LifecycleState::Attached;
            return Err(Error::DeviceNotFound);
        };
        self.power.finish();

        let id = DeviceId {
            vendor_id: id.vendor_id(),
            revision: id.revision(),
        };
        #[cfg(feature = "defmt")]
        defmt::info!("sm5703: vendor 0x{:x} revision {}", id.vendor_id, id.revision);

        self.device_id = Some(id);
        self.state = LifecycleState::Prepared;
        Ok(())
    }

    /// Open the core to the charger and flash sub-drivers
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the chip is prepared.
    pub fn enable(&mut self) -> Result<(), Error<I::Error>> {
        match self.state {
            LifecycleState::Active => Ok(()),
            LifecycleState::Prepared => {
                self.state = LifecycleState::Active;
                Ok(())
            }
            state => Err(Error::InvalidState(state)),
        }
    }

    /// Close the core to sub-drivers, leaving the chip running
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the chip is not prepared.
    pub fn disable(&mut self) -> Result<(), Error<I::Error>> {
        match self.state {
            LifecycleState::Prepared => Ok(()),
            LifecycleState::Active => {
                self.state = LifecycleState::Prepared;
                Ok(())
            }
            state => Err(Error::InvalidState(state)),
        }
    }

    /// [`prepare`](Self::prepare) then [`enable`](Self::enable)
    ///
    /// # Errors
    ///
    /// Same as [`prepare`](Self::prepare).
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.prepare(delay)?;
        self.enable()
    }

    /// Put the chip back in reset
    ///
    /// Charging stops until the next [`prepare`](Self::prepare). Always
    /// succeeds; a reset line failure is logged and kept in the report.
    pub fn unprepare(&mut self) -> &TeardownReport {
        self.report.clear();
        if !self.state.is_powered() {
            return &self.report;
        }

        self.power.assert_reset(&mut self.reset, &mut self.report);
        self.device_id = None;
        self.state = LifecycleState::Unprepared;
        &self.report
    }

    /// Identity read during [`prepare`](Self::prepare)
    pub const fn device_id(&self) -> Option<DeviceId> {
        self.device_id
    }

    /// Current lifecycle state
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Failures from the most recent teardown or rolled back prepare
    pub const fn last_report(&self) -> &TeardownReport {
        &self.report
    }

    /// Raw register map, for sub-drivers and diagnostics
    pub fn regmap(&mut self) -> &mut Regmap<I> {
        &mut self.device.interface
    }

    /// Unprepare the chip and hand back the transport and reset line
    pub fn release(mut self) -> (I, P, TeardownReport) {
        self.unprepare();
        self.state = LifecycleState::Detached;
        (self.device.interface.release(), self.reset, self.report)
    }

    pub(crate) fn registers(&mut self) -> Result<&mut Sm5703Registers<Regmap<I>>, Error<I::Error>> {
        match self.state {
            LifecycleState::Active => Ok(&mut self.device),
            state => Err(Error::InvalidState(state)),
        }
    }
}
