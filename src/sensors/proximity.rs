//! Capella cm36672p / cm36686 proximity sensor
//!
//! The sensor reports a 16-bit proximity count and raises an interrupt when
//! the count crosses its high (object approaching) or low (object receding)
//! threshold. It is powered by three supplies, enabled in order:
//! `vdd`, `vddio`, `vled`.
//!
//! All register access and state changes run under one lock, taken for the
//! duration of a closure so it is released on every return path. The host
//! picks the raw mutex: `CriticalSectionRawMutex` when the interrupt handler
//! runs on another core or in interrupt context, `NoopRawMutex` when
//! everything runs in one thread.
//!
//! # Example
//!
//! ```ignore
//! # use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! # use msm8916_periph::sensors::proximity::{Cm36672p, Variant};
//! let variant = Variant::from_compatible("capella,cm36672p").unwrap();
//! let sensor: Cm36672p<CriticalSectionRawMutex, _, _> =
//!     Cm36672p::new(interface, [Some(vdd), Some(vddio), Some(vled)], variant, false)?;
//! sensor.init(&mut delay)?;
//!
//! let count = sensor.read_raw()?;
//! // on the falling edge of the interrupt line:
//! sensor.handle_irq(&mut clock, &mut events)?;
//! ```

use core::cell::RefCell;

use device_driver::RegisterInterface;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use crate::Error;
use crate::interrupt::{Clock, Direction, EventSink, IrqOutcome, ProximityEvent, ProximityStatus};
use crate::lifecycle::{LifecycleState, TeardownReport};
use crate::power::{PowerResource, PowerSequencer};
use crate::registers::cm36672p::Cm36672pRegisters;
use crate::regmap::{CacheType, Endian, Regmap, RegmapConfig, ValueWidth};
use crate::script::{self, Step};

/// PS_CONF1 register address
pub const REG_PS_CONF1: u8 = 0x03;
/// PS_CONF3 register address
pub const REG_PS_CONF3: u8 = 0x04;
/// PS_CANC register address
pub const REG_PS_CANC: u8 = 0x05;
/// PS_THDL register address
pub const REG_PS_THD_LOW: u8 = 0x06;
/// PS_THDH register address
pub const REG_PS_THD_HIGH: u8 = 0x07;
/// PS_DATA register address
pub const REG_PS_DATA: u8 = 0x08;
/// INT_FLAG register address
pub const REG_INT_FLAG: u8 = 0x0C;
/// ID register address, last register of the map
pub const REG_DEV_ID: u8 = 0x0D;

/// PS_CONF3 value with smart persistence enabled
pub const DEFAULT_CONF3_SMART_PERS: u16 = 0x4010;

/// Supply names in enable order
pub const SUPPLY_NAMES: [&str; 3] = ["vdd", "vddio", "vled"];

const fn is_volatile_reg(reg: u8) -> bool {
    matches!(reg, REG_PS_DATA | REG_INT_FLAG)
}

/// Register map description
pub const REGMAP_CONFIG: RegmapConfig = RegmapConfig::new("cm36672p_regmap", ValueWidth::Bits16)
    .with_endian(Endian::Little)
    .with_max_register(REG_DEV_ID)
    .with_cache_type(CacheType::Flat)
    .with_volatile_reg(is_volatile_reg);

/// Hysteresis band for the proximity interrupt
///
/// `low` is always strictly below `high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThresholdPair {
    low: u16,
    high: u16,
}

impl ThresholdPair {
    /// Create a band; `None` unless `low < high`
    pub const fn new(low: u16, high: u16) -> Option<Self> {
        if low < high { Some(Self { low, high }) } else { None }
    }

    /// Receding threshold
    pub const fn low(&self) -> u16 {
        self.low
    }

    /// Approaching threshold
    pub const fn high(&self) -> u16 {
        self.high
    }

    /// Threshold crossed for events in `direction`
    pub const fn for_direction(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Receding => self.low,
            Direction::Approaching => self.high,
        }
    }

    /// Copy of the band with one side replaced; `None` if that breaks `low < high`
    pub const fn with_direction(&self, direction: Direction, value: u16) -> Option<Self> {
        match direction {
            Direction::Receding => Self::new(value, self.high),
            Direction::Approaching => Self::new(self.low, value),
        }
    }
}

/// Supported parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// Capella cm36672p
    Cm36672p,
    /// Capella cm36686
    Cm36686,
}

impl Variant {
    /// Look a part up by its devicetree compatible string
    pub fn from_compatible(compatible: &str) -> Option<Self> {
        match compatible {
            "capella,cm36672p" => Some(Self::Cm36672p),
            "capella,cm36686" => Some(Self::Cm36686),
            _ => None,
        }
    }

    /// Devicetree compatible string
    pub const fn compatible(self) -> &'static str {
        match self {
            Self::Cm36672p => "capella,cm36672p",
            Self::Cm36686 => "capella,cm36686",
        }
    }

    /// Calibration constants
    pub const fn config(self) -> &'static VariantConfig {
        variant_config(self)
    }
}

/// Per-part calibration constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VariantConfig {
    /// Thresholds programmed at prepare
    pub default_thresholds: ThresholdPair,
    /// Thresholds for crosstalk-cancelled operation
    pub cancel_thresholds: ThresholdPair,
    /// PS_CONF1 value
    pub conf1: u16,
    /// PS_CONF3 value without smart persistence
    pub conf3: u16,
    /// PS_CANC value
    pub trim: u16,
}

static CM36672P_CONFIG: VariantConfig = VariantConfig {
    default_thresholds: ThresholdPair { low: 0x000d, high: 0x0011 },
    cancel_thresholds: ThresholdPair { low: 0x0007, high: 0x000a },
    conf1: 0x0320,
    conf3: 0x4000,
    trim: 0x0000,
};

static CM36686_CONFIG: VariantConfig = VariantConfig {
    default_thresholds: ThresholdPair { low: 0x000f, high: 0x0015 },
    cancel_thresholds: ThresholdPair { low: 0x000a, high: 0x000f },
    conf1: 0x03A4,
    conf3: 0x4210,
    trim: 0x0005,
};

/// Calibration constants for `variant`
pub const fn variant_config(variant: Variant) -> &'static VariantConfig {
    match variant {
        Variant::Cm36672p => &CM36672P_CONFIG,
        Variant::Cm36686 => &CM36686_CONFIG,
    }
}

/// Register writes run at prepare, in order
pub fn setup_steps(config: &VariantConfig, smart_pers: bool) -> [Step; 5] {
    let conf3 = if smart_pers {
        DEFAULT_CONF3_SMART_PERS
    } else {
        config.conf3
    };

    [
        Step::write(REG_PS_CONF1, config.conf1),
        Step::write(REG_PS_CONF3, conf3),
        Step::write(REG_PS_THD_HIGH, config.default_thresholds.high()),
        Step::write(REG_PS_THD_LOW, config.default_thresholds.low()),
        Step::write(REG_PS_CANC, config.trim),
    ]
}

struct Inner<I, S> {
    device: Cm36672pRegisters<Regmap<I>>,
    supplies: [S; 3],
    power: PowerSequencer,
    state: LifecycleState,
    variant: Variant,
    smart_pers: bool,
    report: TeardownReport,
}

impl<I, S> Inner<I, S>
where
    I: RegisterInterface<AddressType = u8>,
    S: PowerResource,
{
    fn require_powered(&self) -> Result<(), Error<I::Error>> {
        if self.state.is_powered() {
            Ok(())
        } else {
            Err(Error::InvalidState(self.state))
        }
    }

    fn thresholds(&mut self) -> Result<ThresholdPair, Error<I::Error>> {
        let low = self.device.ps_thd_low().read()?.threshold();
        let high = self.device.ps_thd_high().read()?.threshold();
        ThresholdPair::new(low, high).ok_or(Error::InvalidValue)
    }

    fn power_down<D: DelayNs>(&mut self, delay: &mut D) {
        self.power
            .disable_resources(&mut self.supplies, delay, &mut self.report);
        self.device.interface.invalidate();
    }

    fn unprepare<D: DelayNs>(&mut self, delay: &mut D) {
        self.report.clear();
        if !self.state.is_powered() {
            return;
        }

        self.power_down(delay);
        #[cfg(feature = "defmt")]
        if !self.report.is_clean() {
            defmt::warn!("cm36672p: failed to disable regulators");
        }
        self.state = LifecycleState::Unprepared;
    }
}

/// cm36672p / cm36686 driver
pub struct Cm36672p<M, I, S> {
    inner: Mutex<M, RefCell<Inner<I, S>>>,
}

impl<M, I, S> Cm36672p<M, I, S>
where
    M: RawMutex,
    I: RegisterInterface<AddressType = u8>,
    S: PowerResource,
{
    /// Attach to the sensor and its supplies
    ///
    /// Supplies are given in `vdd`, `vddio`, `vled` order. Nothing is powered
    /// yet; call [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceMissing`] naming the first absent supply.
    pub fn new(
        interface: I,
        supplies: [Option<S>; 3],
        variant: Variant,
        smart_pers: bool,
    ) -> Result<Self, Error<I::Error>> {
        let [vdd, vddio, vled] = supplies;
        let supplies = [
            vdd.ok_or(Error::ResourceMissing(SUPPLY_NAMES[0]))?,
            vddio.ok_or(Error::ResourceMissing(SUPPLY_NAMES[1]))?,
            vled.ok_or(Error::ResourceMissing(SUPPLY_NAMES[2]))?,
        ];

        Ok(Self {
            inner: Mutex::new(RefCell::new(Inner {
                device: Cm36672pRegisters::new(Regmap::new(interface, REGMAP_CONFIG)),
                supplies,
                power: PowerSequencer::new(),
                state: LifecycleState::Attached,
                variant,
                smart_pers,
                report: TeardownReport::new(),
            })),
        })
    }

    /// Power the sensor and program its configuration
    ///
    /// Does nothing if the sensor is already powered.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Any supply enabled by this call is disabled
    /// again before returning and the sensor stays `Attached`.
    pub fn prepare<D: DelayNs>(&self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.with_inner(|inner| {
            if inner.state.is_powered() {
                return Ok(());
            }

            if let Err(error) = inner.power.enable_resources(&mut inner.supplies, delay) {
                #[cfg(feature = "defmt")]
                defmt::error!("cm36672p: failed to enable regulators: {}", error);
                inner.state = LifecycleState::Attached;
                return Err(Error::Power(error));
            }
            inner.power.finish();

            let steps = setup_steps(inner.variant.config(), inner.smart_pers);
            if let Err(error) = script::apply(&steps, &mut inner.device.interface) {
                #[cfg(feature = "defmt")]
                defmt::error!("cm36672p: register setup failed at 0x{:x}", error.address);

                inner.report.clear();
                inner.power_down(delay);
                inner.state = LifecycleState::Attached;
                return Err(error.into_error());
            }

            inner.state = LifecycleState::Prepared;
            Ok(())
        })
    }

    /// Start reporting proximity events
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the sensor is prepared.
    pub fn enable(&self) -> Result<(), Error<I::Error>> {
        self.with_inner(|inner| match inner.state {
            LifecycleState::Active => Ok(()),
            LifecycleState::Prepared => {
                inner.state = LifecycleState::Active;
                Ok(())
            }
            state => Err(Error::InvalidState(state)),
        })
    }

    /// Stop reporting proximity events, keeping the sensor powered
    ///
    /// Interrupts are still acknowledged but produce no event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the sensor is active or prepared.
    pub fn disable(&self) -> Result<(), Error<I::Error>> {
        self.with_inner(|inner| match inner.state {
            LifecycleState::Prepared => Ok(()),
            LifecycleState::Active => {
                inner.state = LifecycleState::Prepared;
                Ok(())
            }
            state => Err(Error::InvalidState(state)),
        })
    }

    /// [`prepare`](Self::prepare) then [`enable`](Self::enable)
    ///
    /// # Errors
    ///
    /// Same as [`prepare`](Self::prepare).
    pub fn init<D: DelayNs>(&self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.prepare(delay)?;
        self.enable()
    }

    /// Power the sensor down, keeping its resources
    ///
    /// Supplies are disabled in reverse order. Always succeeds; failures are
    /// logged and returned in the report. Does nothing when unpowered.
    pub fn unprepare<D: DelayNs>(&self, delay: &mut D) -> TeardownReport {
        self.with_inner(|inner| {
            inner.unprepare(delay);
            inner.report.clone()
        })
    }

    /// Failures from the most recent teardown or rolled back prepare
    pub fn last_report(&self) -> TeardownReport {
        self.with_inner(|inner| inner.report.clone())
    }

    /// Read the proximity count
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the sensor is unpowered, or the
    /// bus error.
    pub fn read_raw(&self) -> Result<u16, Error<I::Error>> {
        self.with_inner(|inner| {
            inner.require_powered()?;
            Ok(inner.device.ps_data().read()?.count())
        })
    }

    /// Read the identification register
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the sensor is unpowered, or the
    /// bus error.
    pub fn read_device_id(&self) -> Result<u16, Error<I::Error>> {
        self.with_inner(|inner| {
            inner.require_powered()?;
            Ok(inner.device.dev_id().read()?.id())
        })
    }

    /// Current threshold band
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the sensor is unpowered, or the
    /// bus error.
    pub fn thresholds(&self) -> Result<ThresholdPair, Error<I::Error>> {
        self.with_inner(|inner| {
            inner.require_powered()?;
            inner.thresholds()
        })
    }

    /// Threshold for events in `direction`
    ///
    /// # Errors
    ///
    /// Same as [`thresholds`](Self::thresholds).
    pub fn read_event_threshold(&self, direction: Direction) -> Result<u16, Error<I::Error>> {
        self.thresholds()
            .map(|band| band.for_direction(direction))
    }

    /// Replace the threshold for events in `direction`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the new value would not keep the low
    /// threshold strictly below the high one (nothing is written),
    /// [`Error::InvalidState`] if the sensor is unpowered, or the bus error.
    pub fn write_event_threshold(&self, direction: Direction, value: u16) -> Result<(), Error<I::Error>> {
        self.with_inner(|inner| {
            inner.require_powered()?;
            let band = inner
                .thresholds()?
                .with_direction(direction, value)
                .ok_or(Error::InvalidValue)?;

            match direction {
                Direction::Receding => inner
                    .device
                    .ps_thd_low()
                    .write(|w| w.set_threshold(band.low()))?,
                Direction::Approaching => inner
                    .device
                    .ps_thd_high()
                    .write(|w| w.set_threshold(band.high()))?,
            }
            Ok(())
        })
    }

    /// Whether smart persistence is selected
    pub fn smart_persistence(&self) -> bool {
        self.with_inner(|inner| inner.smart_pers)
    }

    /// Select or deselect smart persistence
    ///
    /// Applied to the hardware immediately when powered, otherwise at the
    /// next [`prepare`](Self::prepare).
    ///
    /// # Errors
    ///
    /// Returns the bus error if PS_CONF3 could not be written; the setting is
    /// left unchanged.
    pub fn set_smart_persistence(&self, enable: bool) -> Result<(), Error<I::Error>> {
        self.with_inner(|inner| {
            if inner.state.is_powered() {
                let conf3 = if enable {
                    DEFAULT_CONF3_SMART_PERS
                } else {
                    inner.variant.config().conf3
                };
                inner.device.interface.write(REG_PS_CONF3, conf3)?;
            }
            inner.smart_pers = enable;
            Ok(())
        })
    }

    /// Shut the proximity engine down, keeping supplies and configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the sensor is active or already
    /// suspended, or the bus error.
    pub fn suspend(&self) -> Result<(), Error<I::Error>> {
        self.with_inner(|inner| match inner.state {
            LifecycleState::Suspended => Ok(()),
            LifecycleState::Active => {
                inner.device.ps_conf_1().modify(|w| w.set_ps_sd(true))?;
                inner.state = LifecycleState::Suspended;
                Ok(())
            }
            state => Err(Error::InvalidState(state)),
        })
    }

    /// Restart the proximity engine after [`suspend`](Self::suspend)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the sensor is suspended or
    /// already active, or the bus error.
    pub fn resume(&self) -> Result<(), Error<I::Error>> {
        self.with_inner(|inner| match inner.state {
            LifecycleState::Active => Ok(()),
            LifecycleState::Suspended => {
                inner.device.ps_conf_1().modify(|w| w.set_ps_sd(false))?;
                inner.state = LifecycleState::Active;
                Ok(())
            }
            state => Err(Error::InvalidState(state)),
        })
    }

    /// Service the falling-edge proximity interrupt
    ///
    /// Reads INT_FLAG, which acknowledges the interrupt, and pushes at most
    /// one event to `sink`. A status with no known flag is logged and
    /// reported as [`IrqOutcome::Spurious`]; it is not an error. Outside
    /// `Active` the flag is still read but reported as [`IrqOutcome::Masked`].
    ///
    /// # Errors
    ///
    /// Returns the bus error if INT_FLAG could not be read; no event is
    /// pushed. Returns [`Error::InvalidState`] if the sensor is unpowered.
    pub fn handle_irq<C, K>(&self, clock: &mut C, sink: &mut K) -> Result<IrqOutcome, Error<I::Error>>
    where
        C: Clock,
        K: EventSink,
    {
        let (raw, state) = self.with_inner(|inner| {
            inner.require_powered()?;
            let raw = inner.device.interface.read(REG_INT_FLAG).inspect_err(|_| {
                #[cfg(feature = "defmt")]
                defmt::error!("cm36672p irq: failed to read interrupt flag");
            })?;
            Ok::<_, Error<I::Error>>((raw, inner.state))
        })?;

        if state != LifecycleState::Active {
            return Ok(IrqOutcome::Masked(raw));
        }

        let Some(direction) = ProximityStatus::from_raw(raw).direction() else {
            #[cfg(feature = "defmt")]
            defmt::error!("cm36672p irq: unknown interrupt reason; flags: 0x{:x}", raw);
            return Ok(IrqOutcome::Spurious(raw));
        };

        let event = ProximityEvent {
            direction,
            timestamp_ns: clock.now_ns(),
        };
        sink.push(event);
        Ok(IrqOutcome::Event(event))
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.with_inner(|inner| inner.state)
    }

    /// Part this instance drives
    pub fn variant(&self) -> Variant {
        self.with_inner(|inner| inner.variant)
    }

    /// Power the sensor down and hand its resources back
    ///
    /// Runs [`unprepare`](Self::unprepare) first; removal always completes.
    pub fn remove<D: DelayNs>(self, delay: &mut D) -> (I, [S; 3], TeardownReport) {
        let mut inner = self.inner.into_inner().into_inner();
        inner.unprepare(delay);
        inner.state = LifecycleState::Detached;

        let Inner {
            device,
            supplies,
            report,
            ..
        } = inner;
        (device.interface.release(), supplies, report)
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner<I, S>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
