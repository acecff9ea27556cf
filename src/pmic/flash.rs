//! sm5703 flash / torch LED
//!
//! Brightness is the movie-mode current code (10 mA per step from 10 mA).
//! Turning the LED on switches the PMIC into flash-boost mode; turning it off
//! hands the converter back to the charger.

use device_driver::RegisterInterface;
use embedded_hal::digital::OutputPin;

use super::{
    OPERATION_MODE_CHARGING_ON, OPERATION_MODE_FLASH_BOOST, OPERATION_MODE_MASK, REG_CNTL,
    REG_FLEDCNTL1, REG_FLEDCNTL2, REG_FLEDCNTL4, REG_FLEDCNTL6, REG_VBUSCNTL, Sm5703,
};
use crate::Error;
use crate::script::{self, Step};

/// Lowest flash current
pub const FLASH_CURRENT_MIN_MA: u32 = 300;
/// Flash current where the step size changes from 25 mA to 50 mA
pub const FLASH_CURRENT_BREAKPOINT_MA: u32 = 700;
/// Highest flash current
pub const FLASH_CURRENT_MAX_MA: u32 = 1500;
/// Lowest movie (torch) current
pub const MOVIE_CURRENT_MIN_MA: u32 = 10;
/// Highest movie (torch) current
pub const MOVIE_CURRENT_MAX_MA: u32 = 320;

/// FLEDCNTL1 enable field
pub const FLEDEN_MASK: u16 = 0x03;
/// FLEDCNTL1 enable: movie mode
pub const FLEDEN_MOVIE: u16 = 0x01;
/// FLEDCNTL4 movie current field
pub const IFLED_MASK: u16 = 0x1F;
/// FLEDCNTL3 flash current field
pub const IFLASH_MASK: u16 = 0x1F;
/// FLEDCNTL6 boost output 4.5 V
pub const BSTOUT_4P5: u16 = 0x05;
/// VBUSCNTL input limit used while the boost runs
pub const VBUS_LIMIT_FLASH: u16 = 0x08;

const FLEDCNTL1_DEFAULT: u16 = 0x1C;
const FLEDCNTL2_DEFAULT: u16 = 0x94;

/// Register writes run at probe
pub const CONFIGURE_SEQUENCE: [Step; 2] = [
    Step::write(REG_FLEDCNTL1, FLEDCNTL1_DEFAULT),
    Step::write(REG_FLEDCNTL2, FLEDCNTL2_DEFAULT),
];

/// Flash current code for `ma`
///
/// 25 mA steps from 300 mA up to 700 mA, then 50 mA steps (code 0x0F at
/// 700 mA) up to 1500 mA. `None` outside 300..=1500.
#[allow(clippy::cast_possible_truncation)]
pub const fn flash_current_code(ma: u32) -> Option<u8> {
    if ma < FLASH_CURRENT_MIN_MA || ma > FLASH_CURRENT_MAX_MA {
        return None;
    }
    let code = if ma < FLASH_CURRENT_BREAKPOINT_MA {
        (ma - FLASH_CURRENT_MIN_MA) / 25
    } else {
        (ma - FLASH_CURRENT_BREAKPOINT_MA) / 50 + 0x0F
    };
    Some((code & 0x1F) as u8)
}

/// Movie current code for `ma`
///
/// 10 mA steps from 10 mA. `None` outside 10..=320.
#[allow(clippy::cast_possible_truncation)]
pub const fn movie_current_code(ma: u32) -> Option<u8> {
    if ma < MOVIE_CURRENT_MIN_MA || ma > MOVIE_CURRENT_MAX_MA {
        return None;
    }
    Some((((ma - MOVIE_CURRENT_MIN_MA) / 10) & 0x1F) as u8)
}

/// Board limits for the attached LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashConfig {
    /// Maximum LED current in movie mode (`led-max-microamp`)
    pub movie_max_microamp: u32,
    /// Maximum LED current in flash mode (`flash-max-microamp`)
    pub flash_max_microamp: u32,
}

impl FlashConfig {
    /// Create a configuration from the board limits
    pub const fn new(movie_max_microamp: u32, flash_max_microamp: u32) -> Self {
        Self {
            movie_max_microamp,
            flash_max_microamp,
        }
    }
}

/// Flash LED sub-driver
#[derive(Debug)]
pub struct FlashLed {
    config: FlashConfig,
    max_brightness: u8,
    brightness: u8,
}

impl FlashLed {
    /// Validate the board limits and program the LED block defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] when a limit is outside the range the
    /// hardware can drive, [`Error::InvalidState`] if the PMIC is not
    /// initialized, or the bus error of the failing write.
    pub fn probe<I, P>(pmic: &mut Sm5703<I, P>, config: FlashConfig) -> Result<Self, Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        let Some(max_brightness) = movie_current_code(config.movie_max_microamp / 1000) else {
            #[cfg(feature = "defmt")]
            defmt::error!("sm5703-flash: led-max-microamp {} out of range", config.movie_max_microamp);
            return Err(Error::InvalidValue);
        };
        if flash_current_code(config.flash_max_microamp / 1000).is_none() {
            #[cfg(feature = "defmt")]
            defmt::error!("sm5703-flash: flash-max-microamp {} out of range", config.flash_max_microamp);
            return Err(Error::InvalidValue);
        }

        let map = &mut pmic.registers()?.interface;
        script::apply(&CONFIGURE_SEQUENCE, map).map_err(|error| {
            #[cfg(feature = "defmt")]
            defmt::error!("sm5703-flash: failed to set configuration {}", error.position + 1);
            error.into_error()
        })?;

        Ok(Self {
            config,
            max_brightness,
            brightness: 0,
        })
    }

    /// Highest accepted brightness
    pub const fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    /// Brightness last set successfully
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Board limits
    pub const fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Set the torch brightness; 0 turns the LED off
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] above [`max_brightness`](Self::max_brightness)
    /// (nothing is written), [`Error::InvalidState`] if the PMIC is not
    /// initialized, or the bus error of the first failing write.
    pub fn set_brightness<I, P>(&mut self, pmic: &mut Sm5703<I, P>, brightness: u8) -> Result<(), Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        if brightness > self.max_brightness {
            return Err(Error::InvalidValue);
        }

        let map = &mut pmic.registers()?.interface;
        let result = if brightness == 0 {
            script::apply(&off_sequence(), map)
        } else {
            script::apply(&on_sequence(brightness), map)
        };
        result.map_err(script::ScriptError::into_error)?;

        self.brightness = brightness;
        Ok(())
    }

    /// Program the flash (strobe) current
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if `ma` is outside the hardware range or
    /// above the board's flash limit, [`Error::InvalidState`] if the PMIC is
    /// not initialized, or the bus error.
    pub fn set_flash_current<I, P>(&mut self, pmic: &mut Sm5703<I, P>, ma: u32) -> Result<(), Error<I::Error>>
    where
        I: RegisterInterface<AddressType = u8>,
        P: OutputPin,
    {
        if ma.saturating_mul(1000) > self.config.flash_max_microamp {
            return Err(Error::InvalidValue);
        }
        let code = flash_current_code(ma).ok_or(Error::InvalidValue)?;

        pmic.registers()?
            .fled_cntl_3()
            .modify(|w| w.set_iflash(code))?;
        Ok(())
    }
}

fn off_sequence() -> [Step; 2] {
    [
        Step::update(REG_FLEDCNTL1, FLEDEN_MASK, 0),
        Step::update(REG_CNTL, OPERATION_MODE_MASK, OPERATION_MODE_CHARGING_ON),
    ]
}

fn on_sequence(brightness: u8) -> [Step; 5] {
    [
        Step::write(REG_VBUSCNTL, VBUS_LIMIT_FLASH),
        Step::update(REG_CNTL, OPERATION_MODE_MASK, OPERATION_MODE_FLASH_BOOST),
        Step::update(REG_FLEDCNTL6, BSTOUT_4P5, BSTOUT_4P5),
        Step::update(REG_FLEDCNTL4, IFLED_MASK, u16::from(brightness)),
        Step::update(REG_FLEDCNTL1, FLEDEN_MOVIE, FLEDEN_MOVIE),
    ]
}
