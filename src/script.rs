//! Register initialization scripts
//!
//! A script is a static, ordered list of [`Step`]s run against a
//! [`Regmap`]. Execution is strictly in order and stops at the first failure;
//! the failing step's position and address come back in a [`ScriptError`] so
//! the caller can log it and unwind power. Nothing is retried.
//!
//! Besides plain register writes a script can carry the few command shapes
//! the devices here need:
//!
//! - `PageSelect(n)` sends the ili9881c vendor page switch `0xFF 0x98 0x81 n`.
//! - `PixelFormat(f)` sends DCS `set_pixel_format` (0x3A) with one parameter.
//! - `Brightness(v)` sends DCS `set_display_brightness` (0x51), low byte first.
//! - `Update { .. }` is a masked read-modify-write through the shadow.

use device_driver::RegisterInterface;

use crate::Error;
use crate::regmap::Regmap;

/// Vendor command selecting the ili9881c register page
pub const PAGE_SELECT_COMMAND: u8 = 0xFF;

/// Fixed ili9881c page-select key that precedes the page number
pub const PAGE_SELECT_KEY: [u8; 2] = [0x98, 0x81];

/// DCS `set_pixel_format`
pub const DCS_SET_PIXEL_FORMAT: u8 = 0x3A;

/// DCS `set_display_brightness`
pub const DCS_SET_DISPLAY_BRIGHTNESS: u8 = 0x51;

/// Pixel format parameter codes accepted by `set_pixel_format`
///
/// Besides the standard DCS interface formats the ili9881c vendor table
/// reuses the command on pages 3 and 4 to program two panel-specific
/// registers; those codes are listed here too so every value a script can
/// send is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PixelFormat {
    /// Page 3 GIP timing value (0x40)
    GipTiming = 0x40,
    /// 16 bits per pixel
    Rgb565 = 0x55,
    /// 18 bits per pixel
    Rgb666 = 0x66,
    /// 24 bits per pixel
    Rgb888 = 0x77,
    /// Page 4 power control value (0xA4)
    PowerControl = 0xA4,
}

impl PixelFormat {
    /// Parameter byte sent on the wire
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// A byte that is not a known [`PixelFormat`] code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidPixelFormat(pub u8);

impl TryFrom<u8> for PixelFormat {
    type Error = InvalidPixelFormat;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x40 => Ok(Self::GipTiming),
            0x55 => Ok(Self::Rgb565),
            0x66 => Ok(Self::Rgb666),
            0x77 => Ok(Self::Rgb888),
            0xA4 => Ok(Self::PowerControl),
            code => Err(InvalidPixelFormat(code)),
        }
    }
}

/// One script entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Write `value` to `address`
    Write {
        /// Register address
        address: u8,
        /// Register value
        value: u16,
    },
    /// Replace the bits of `address` selected by `mask` with `value`
    Update {
        /// Register address
        address: u8,
        /// Bits to change
        mask: u16,
        /// New bit values
        value: u16,
    },
    /// Switch the vendor register page
    PageSelect(u8),
    /// DCS set_pixel_format
    PixelFormat(PixelFormat),
    /// DCS set_display_brightness
    Brightness(u16),
}

impl Step {
    /// Shorthand for [`Step::Write`], used to keep long tables readable
    pub const fn write(address: u8, value: u16) -> Self {
        Self::Write { address, value }
    }

    /// Shorthand for [`Step::Update`]
    pub const fn update(address: u8, mask: u16, value: u16) -> Self {
        Self::Update { address, mask, value }
    }

    /// Address or command byte this step goes to
    pub const fn address(&self) -> u8 {
        match *self {
            Self::Write { address, .. } | Self::Update { address, .. } => address,
            Self::PageSelect(_) => PAGE_SELECT_COMMAND,
            Self::PixelFormat(_) => DCS_SET_PIXEL_FORMAT,
            Self::Brightness(_) => DCS_SET_DISPLAY_BRIGHTNESS,
        }
    }
}

/// A script stopped at a failing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScriptError<E> {
    /// Zero-based index of the failing step
    pub position: usize,
    /// Address or command byte of the failing step
    pub address: u8,
    /// Underlying failure
    pub error: Error<E>,
}

impl<E> ScriptError<E> {
    /// Drop the position information
    pub fn into_error(self) -> Error<E> {
        self.error
    }
}

/// Run `steps` in order against `map`
///
/// # Errors
///
/// Returns a [`ScriptError`] for the first step that fails. Steps after it
/// are not attempted.
pub fn apply<I>(steps: &[Step], map: &mut Regmap<I>) -> Result<(), ScriptError<I::Error>>
where
    I: RegisterInterface<AddressType = u8>,
{
    for (position, step) in steps.iter().enumerate() {
        run_step(step, map).map_err(|error| {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "{}: init step {} (0x{:x}) failed",
                map.config().name(),
                position,
                step.address()
            );
            ScriptError {
                position,
                address: step.address(),
                error,
            }
        })?;
    }
    Ok(())
}

fn run_step<I>(step: &Step, map: &mut Regmap<I>) -> Result<(), Error<I::Error>>
where
    I: RegisterInterface<AddressType = u8>,
{
    match *step {
        Step::Write { address, value } => map.write(address, value),
        Step::Update { address, mask, value } => map.update_bits(address, mask, value),
        Step::PageSelect(page) => {
            let [key0, key1] = PAGE_SELECT_KEY;
            map.write_raw(PAGE_SELECT_COMMAND, &[key0, key1, page])
        }
        Step::PixelFormat(format) => map.write_raw(DCS_SET_PIXEL_FORMAT, &[format.code()]),
        Step::Brightness(level) => map.write_raw(DCS_SET_DISPLAY_BRIGHTNESS, &level.to_le_bytes()),
    }
}
