//! Power resources and power-on sequencing
//!
//! Every driver in this crate needs its supplies up and its reset line in a
//! known state before the first register access, and needs them released in
//! the opposite order afterwards. [`PowerSequencer`] owns that ordering:
//!
//! ```text
//! Off -> ResourcesEnabling -> ResourcesEnabled -> ResetAsserting -> ResetReleased -> Ready
//! ```
//!
//! - If a resource fails to enable, every resource enabled before it is
//!   disabled again (newest first) and the sequencer returns to `Off`.
//! - Reset timing is a hardware contract. The delays below are minimums; the
//!   delay provider may sleep longer but never less.
//! - Power-down never fails. Problems are logged and recorded in a
//!   [`TeardownReport`] and the sequence carries on.
//!
//! # Example
//!
//! ```ignore
//! # use msm8916_periph::power::PowerSequencer;
//! let mut power = PowerSequencer::new();
//! power.enable_resources(&mut supplies, &mut delay)?;
//! power.reset_pulse(&mut reset_pin, &mut delay)?;
//! power.finish();
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::lifecycle::{TeardownFailure, TeardownReport};

/// Duration of each phase of the three-phase panel reset pulse
pub const RESET_PHASE_MS: u32 = 20;

/// Hold time after releasing a single-phase reset
pub const RESET_HOLD_MS: u32 = 20;

/// Power sequencing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    /// The named resource refused to switch on
    Enable(&'static str),
    /// The named resource refused to switch off
    Disable(&'static str),
    /// The reset line could not be driven
    ResetLine,
}

/// A switchable supply or enable line
///
/// Implemented by the host for its regulator handles. Any GPIO can be used
/// through [`GpioSupply`].
pub trait PowerResource {
    /// Error reported by the underlying framework
    type Error: core::fmt::Debug;

    /// Supply name as it appears in the board description (e.g. `"vdd"`)
    fn name(&self) -> &'static str;

    /// Switch the resource on
    ///
    /// # Errors
    ///
    /// Returns the framework error if the resource could not be enabled.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Switch the resource off
    ///
    /// # Errors
    ///
    /// Returns the framework error if the resource could not be disabled.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Minimum wait after each transition before the rail is usable
    fn settle_us(&self) -> u32 {
        0
    }
}

/// A GPIO driven enable line used as a power resource
pub struct GpioSupply<P> {
    pin: P,
    name: &'static str,
    active_low: bool,
    settle_us: u32,
}

impl<P> GpioSupply<P> {
    /// Create an active-high enable line
    pub const fn new(pin: P, name: &'static str) -> Self {
        Self {
            pin,
            name,
            active_low: false,
            settle_us: 0,
        }
    }

    /// Invert the line: enabled means driven low
    #[must_use]
    pub const fn active_low(mut self) -> Self {
        self.active_low = true;
        self
    }

    /// Settle delay after each transition
    #[must_use]
    pub const fn with_settle_us(mut self, settle_us: u32) -> Self {
        self.settle_us = settle_us;
        self
    }

    /// Consume the supply and return the pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> PowerResource for GpioSupply<P> {
    type Error = P::Error;

    fn name(&self) -> &'static str {
        self.name
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        if self.active_low {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        }
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        if self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }

    fn settle_us(&self) -> u32 {
        self.settle_us
    }
}

/// Power sequencer state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Nothing enabled
    #[default]
    Off,
    /// Supplies are being switched on
    ResourcesEnabling,
    /// All supplies on, reset not yet sequenced
    ResourcesEnabled,
    /// Reset pulse in progress
    ResetAsserting,
    /// Reset released, hold time elapsed
    ResetReleased,
    /// Device may be accessed
    Ready,
}

/// Ordered power-on / power-off state machine for one device
#[derive(Debug, Default)]
pub struct PowerSequencer {
    state: PowerState,
    enabled: usize,
}

impl PowerSequencer {
    /// Create a sequencer in the `Off` state
    pub const fn new() -> Self {
        Self {
            state: PowerState::Off,
            enabled: 0,
        }
    }

    /// Current state
    pub const fn state(&self) -> PowerState {
        self.state
    }

    /// Whether any resource is (or may be) switched on
    pub const fn is_powered(&self) -> bool {
        !matches!(self.state, PowerState::Off)
    }

    /// Number of resources currently held enabled
    pub const fn enabled_count(&self) -> usize {
        self.enabled
    }

    /// Enable `resources` in order
    ///
    /// On failure every resource enabled so far is disabled again in reverse
    /// order, leaving all of them as they were before the call.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError::Enable`] naming the resource that failed.
    pub fn enable_resources<S, D>(&mut self, resources: &mut [S], delay: &mut D) -> Result<(), PowerError>
    where
        S: PowerResource,
        D: DelayNs,
    {
        self.state = PowerState::ResourcesEnabling;
        self.enabled = 0;

        for index in 0..resources.len() {
            let resource = &mut resources[index];
            if resource.enable().is_err() {
                let name = resource.name();
                #[cfg(feature = "defmt")]
                defmt::error!("Failed to enable {}, rolling back {} supplies", name, index);

                for earlier in resources[..index].iter_mut().rev() {
                    if earlier.disable().is_err() {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Rollback: failed to disable {}", earlier.name());
                    }
                    settle(earlier, delay);
                }
                self.state = PowerState::Off;
                self.enabled = 0;
                return Err(PowerError::Enable(name));
            }
            settle(resource, delay);
            self.enabled = index + 1;
        }

        self.state = PowerState::ResourcesEnabled;
        Ok(())
    }

    /// Three-phase reset pulse: low, high, low with [`RESET_PHASE_MS`] after each edge
    ///
    /// # Errors
    ///
    /// Returns [`PowerError::ResetLine`] if any edge could not be driven. The
    /// caller is responsible for powering down.
    pub fn reset_pulse<P, D>(&mut self, reset: &mut P, delay: &mut D) -> Result<(), PowerError>
    where
        P: OutputPin,
        D: DelayNs,
    {
        self.state = PowerState::ResetAsserting;

        reset.set_low().map_err(|_| PowerError::ResetLine)?;
        delay.delay_ms(RESET_PHASE_MS);
        reset.set_high().map_err(|_| PowerError::ResetLine)?;
        delay.delay_ms(RESET_PHASE_MS);
        reset.set_low().map_err(|_| PowerError::ResetLine)?;
        delay.delay_ms(RESET_PHASE_MS);

        self.state = PowerState::ResetReleased;
        Ok(())
    }

    /// Drive the reset line high and hold for [`RESET_HOLD_MS`]
    ///
    /// # Errors
    ///
    /// Returns [`PowerError::ResetLine`] if the line could not be driven.
    pub fn release_reset<P, D>(&mut self, reset: &mut P, delay: &mut D) -> Result<(), PowerError>
    where
        P: OutputPin,
        D: DelayNs,
    {
        reset.set_high().map_err(|_| PowerError::ResetLine)?;
        delay.delay_ms(RESET_HOLD_MS);
        self.state = PowerState::ResetReleased;
        Ok(())
    }

    /// Drive the reset line low, holding the device in reset
    ///
    /// Best effort: a failure is logged and recorded in `report`. The
    /// sequencer returns to `Off` either way.
    pub fn assert_reset<P: OutputPin>(&mut self, reset: &mut P, report: &mut TeardownReport) {
        if reset.set_low().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to assert reset line");
            report.record(TeardownFailure::Power(PowerError::ResetLine));
        }
        self.enabled = 0;
        self.state = PowerState::Off;
    }

    /// Mark the device accessible
    pub fn finish(&mut self) {
        self.state = PowerState::Ready;
    }

    /// Put the reset line in its inactive-safe (high) level
    ///
    /// Best effort: a failure is logged and recorded in `report`.
    pub fn park_reset<P: OutputPin>(&mut self, reset: &mut P, report: &mut TeardownReport) {
        if reset.set_high().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Failed to park reset line");
            report.record(TeardownFailure::Power(PowerError::ResetLine));
        }
        if self.state != PowerState::Off {
            self.state = PowerState::ResourcesEnabled;
        }
    }

    /// Disable every resource this sequencer enabled, newest first
    ///
    /// Best effort: each failure is logged and recorded in `report`, and the
    /// remaining resources are still disabled. Does nothing when already off.
    pub fn disable_resources<S, D>(&mut self, resources: &mut [S], delay: &mut D, report: &mut TeardownReport)
    where
        S: PowerResource,
        D: DelayNs,
    {
        if self.state == PowerState::Off {
            return;
        }

        let enabled = self.enabled.min(resources.len());
        for resource in resources[..enabled].iter_mut().rev() {
            if resource.disable().is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("Failed to disable {}", resource.name());
                report.record(TeardownFailure::Power(PowerError::Disable(resource.name())));
            }
            settle(resource, delay);
        }

        self.enabled = 0;
        self.state = PowerState::Off;
    }
}

fn settle<S: PowerResource, D: DelayNs>(resource: &S, delay: &mut D) {
    let settle_us = resource.settle_us();
    if settle_us > 0 {
        delay.delay_us(settle_us);
    }
}
