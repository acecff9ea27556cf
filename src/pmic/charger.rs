//! sm5703 battery charger status
//!
//! The charger runs autonomously; the driver programs two policy bits at
//! probe and otherwise only decodes the status registers on request.

use device_driver::RegisterInterface;
use embedded_hal::digital::OutputPin;

use super::Sm5703;
use crate::Error;

/// Charger policy, from the board description
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerOptions {
    /// `siliconmitus,enable-autoset`: let the chip pick charge parameters
    pub autoset: bool,
    /// `siliconmitus,enable-autostop`: stop charging at top-off
    pub autostop: bool,
}

/// Charge parameters read back at probe (raw register codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerSettings {
    /// CHGCNTL2
    pub fast_charge_current: u8,
    /// CHGCNTL3
    pub regulation_voltage: u8,
    /// CHGCNTL4 top-off field
    pub topoff_current: u8,
    /// CHGCNTL5
    pub input_current_limiting: u8,
    /// CHGCNTL6
    pub frequency: u8,
    /// VBUSCNTL
    pub input_current_limit: u8,
}

/// Battery presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Presence {
    /// Battery detected
    Present,
    /// No battery
    Absent,
}

impl Presence {
    /// Decode the STATUS2 no-battery flag
    pub const fn from_flags(nobat: bool) -> Self {
        if nobat { Self::Absent } else { Self::Present }
    }
}

/// Charging activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChargeStatus {
    /// Current flowing into the battery
    Charging,
    /// Charge complete
    Full,
    /// Not charging
    Discharging,
}

impl ChargeStatus {
    /// Decode the STATUS3 flags; completion wins over charging
    pub const fn from_flags(done: bool, chgon: bool) -> Self {
        if done {
            Self::Full
        } else if chgon {
            Self::Charging
        } else {
            Self::Discharging
        }
    }
}

/// Input health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Health {
    /// VBUS in range
    Good,
    /// VBUS over-voltage protection tripped
    Overvoltage,
    /// Neither flag set
    Unknown,
}

impl Health {
    /// Decode the STATUS5 flags; a good input wins over over-voltage
    pub const fn from_flags(vbusok: bool, vbusovp: bool) -> Self {
        if vbusok {
            Self::Good
        } else if vbusovp {
            Self::Overvoltage
        } else {
            Self::Unknown
        }
    }
}

/// Full charger snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChargerState {
    /// Battery presence
    pub presence: Presence,
    /// Charging activity
    pub status: ChargeStatus,
    /// Input health
    pub health: Health,
    /// External supply connected
    pub online: bool,
}

/// Charger sub-driver
#[derive(Debug)]
pub struct Charger {
    options: ChargerOptions,
    settings: Option<ChargerSettings>,
}

impl Charger {
    /// Program the charger policy and log the charge parameters
    ///
    /// Reading the parameters back is informational; a failed read is logged
    /// and leaves [`settings`](Self::settings) empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the PMIC is not initialized, or the
    /// bus error if a policy bit could not be written.
    pub fn probe<I, P>(pmic: &mut Sm5703<I, P>, options: ChargerOptions) -> Result<Self, Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        let regs = pmic.registers()?;

        regs.chg_cntl_4()
            .modify(|w| w.set_autostop(options.autostop))
            .inspect_err(|_| {
                #[cfg(feature = "defmt")]
                defmt::error!("sm5703-charger: unable to set autostop register");
            })?;
        regs.cntl()
            .modify(|w| w.set_autoset(options.autoset))
            .inspect_err(|_| {
                #[cfg(feature = "defmt")]
                defmt::error!("sm5703-charger: unable to set autoset register");
            })?;

        let settings = read_settings(pmic).ok();
        match settings {
            Some(_settings) => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "sm5703-charger: fast charging current 0x{:x}, regulation voltage 0x{:x}, top-off current threshold 0x{:x}, automatic input current limiting 0x{:x}, frequency select 0x{:x}, input current limit 0x{:x}",
                    _settings.fast_charge_current,
                    _settings.regulation_voltage,
                    _settings.topoff_current,
                    _settings.input_current_limiting,
                    _settings.frequency,
                    _settings.input_current_limit
                );
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("sm5703-charger: failed to read charge parameters");
            }
        }

        Ok(Self { options, settings })
    }

    /// Policy programmed at probe
    pub const fn options(&self) -> ChargerOptions {
        self.options
    }

    /// Charge parameters read at probe
    pub const fn settings(&self) -> Option<ChargerSettings> {
        self.settings
    }

    /// Whether a battery is connected
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the PMIC is not initialized, or the
    /// bus error.
    pub fn present<I, P>(&self, pmic: &mut Sm5703<I, P>) -> Result<Presence, Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        let status2 = pmic.registers()?.status_2().read()?;
        Ok(Presence::from_flags(status2.nobat()))
    }

    /// Whether an external supply is connected
    ///
    /// # Errors
    ///
    /// Same as [`present`](Self::present).
    pub fn online<I, P>(&self, pmic: &mut Sm5703<I, P>) -> Result<bool, Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        Ok(pmic.registers()?.status_5().read()?.vbusok())
    }

    /// Charging activity
    ///
    /// # Errors
    ///
    /// Same as [`present`](Self::present).
    pub fn status<I, P>(&self, pmic: &mut Sm5703<I, P>) -> Result<ChargeStatus, Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        let status3 = pmic.registers()?.status_3().read()?;
        Ok(ChargeStatus::from_flags(status3.done(), status3.chgon()))
    }

    /// Input health
    ///
    /// # Errors
    ///
    /// Same as [`present`](Self::present).
    pub fn health<I, P>(&self, pmic: &mut Sm5703<I, P>) -> Result<Health, Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        let status5 = pmic.registers()?.status_5().read()?;
        Ok(Health::from_flags(status5.vbusok(), status5.vbusovp()))
    }

    /// Read every property at once
    ///
    /// # Errors
    ///
    /// Same as [`present`](Self::present).
    pub fn state<I, P>(&self, pmic: &mut Sm5703<I, P>) -> Result<ChargerState, Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        let regs = pmic.registers()?;
        let status2 = regs.status_2().read()?;
        let status3 = regs.status_3().read()?;
        let status5 = regs.status_5().read()?;

        Ok(ChargerState {
            presence: Presence::from_flags(status2.nobat()),
            status: ChargeStatus::from_flags(status3.done(), status3.chgon()),
            health: Health::from_flags(status5.vbusok(), status5.vbusovp()),
            online: status5.vbusok(),
        })
    }
}

fn read_settings<I, P>(pmic: &mut Sm5703<I, P>) -> Result<ChargerSettings, Error<I::Error>>
where
    I: RegisterInterface<AddressType = u8>,
    P: OutputPin,
{
    let regs = pmic.registers()?;
    Ok(ChargerSettings {
        fast_charge_current: regs.chg_cntl_2().read()?.fastchg(),
        regulation_voltage: regs.chg_cntl_3().read()?.batreg(),
        topoff_current: regs.chg_cntl_4().read()?.topoff(),
        input_current_limiting: regs.chg_cntl_5().read()?.aicl(),
        frequency: regs.chg_cntl_6().read()?.freqsel(),
        input_current_limit: regs.vbus_cntl().read()?.vbuslimit(),
    })
}
