//! ili9881c 720x1280 MIPI-DSI video mode panel
//!
//! The panel needs one supply (`power`) and an active-low reset line. Bring-up
//! is split the way display pipelines drive it:
//!
//! - [`prepare`](Ili9881c::prepare): supply on, three-phase reset, vendor
//!   register table. Leaves the panel programmed but asleep.
//! - [`enable`](Ili9881c::enable): sleep-out and display-on.
//! - [`disable`](Ili9881c::disable): display-off and sleep-in.
//! - [`unprepare`](Ili9881c::unprepare): off sequence if needed, reset
//!   parked, supply off. Never fails.
//!
//! `prepare` and `unprepare` are idempotent. A failed `prepare` leaves the
//! panel unpowered and `Attached`, ready for another attempt.
//!
//! The vendor table writes paged registers, so the register map runs without
//! a cache and nothing is ever read back.
//!
//! # Example
//!
//! ```ignore
//! # use msm8916_periph::Ili9881c;
//! let mut panel = Ili9881c::new(dsi, Some(supply), Some(reset_pin))?;
//! panel.prepare(&mut delay)?;
//! panel.enable(&mut delay)?;
//! let mode = &panel.get_modes()[0];
//! assert_eq!((mode.hdisplay, mode.vdisplay), (720, 1280));
//! ```

pub mod init_sequence;

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::Error;
use crate::lifecycle::{LifecycleState, TeardownFailure, TeardownReport};
use crate::power::{PowerError, PowerResource, PowerSequencer};
use crate::regmap::{CacheType, Regmap, RegmapConfig, ValueWidth};
use crate::script::{self, PixelFormat};

pub use init_sequence::INIT_SEQUENCE;

/// DCS `enter_sleep_mode`
pub const DCS_ENTER_SLEEP_MODE: u8 = 0x10;
/// DCS `exit_sleep_mode`
pub const DCS_EXIT_SLEEP_MODE: u8 = 0x11;
/// DCS `set_display_off`
pub const DCS_SET_DISPLAY_OFF: u8 = 0x28;
/// DCS `set_display_on`
pub const DCS_SET_DISPLAY_ON: u8 = 0x29;

/// Wait after sleep-out before display-on
pub const EXIT_SLEEP_DELAY_MS: u32 = 120;
/// Wait after display-on
pub const DISPLAY_ON_DELAY_MS: u32 = 32;
/// Wait after display-off before sleep-in
pub const DISPLAY_OFF_DELAY_MS: u32 = 50;
/// Wait after sleep-in
pub const ENTER_SLEEP_DELAY_MS: u32 = 120;

/// Register map for the panel's vendor command space
///
/// 0xFF is the page-select command, sent raw by the script engine.
const PANEL_REGMAP: RegmapConfig = RegmapConfig::new("ili9881c", ValueWidth::Bits8)
    .with_max_register(0xFE)
    .with_cache_type(CacheType::None);

/// A display timing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayMode {
    /// Pixel clock in kHz
    pub clock_khz: u32,
    /// Active pixels per line
    pub hdisplay: u16,
    /// Horizontal sync start
    pub hsync_start: u16,
    /// Horizontal sync end
    pub hsync_end: u16,
    /// Total pixels per line
    pub htotal: u16,
    /// Active lines
    pub vdisplay: u16,
    /// Vertical sync start
    pub vsync_start: u16,
    /// Vertical sync end
    pub vsync_end: u16,
    /// Total lines per frame
    pub vtotal: u16,
    /// Physical width (0 when unknown)
    pub width_mm: u16,
    /// Physical height (0 when unknown)
    pub height_mm: u16,
    /// Preferred mode for this panel
    pub preferred: bool,
}

impl DisplayMode {
    /// Refresh rate in Hz, rounded to nearest
    pub const fn refresh_hz(&self) -> u32 {
        let pixels = self.htotal as u32 * self.vtotal as u32;
        if pixels == 0 {
            return 0;
        }
        (self.clock_khz * 1000 + pixels / 2) / pixels
    }
}

const HDISPLAY: u16 = 720;
const HFP: u16 = 128;
const HSYNC: u16 = 8;
const HBP: u16 = 160;
const VDISPLAY: u16 = 1280;
const VFP: u16 = 8;
const VSYNC: u16 = 8;
const VBP: u16 = 20;
const REFRESH_HZ: u32 = 60;

const HTOTAL: u16 = HDISPLAY + HFP + HSYNC + HBP;
const VTOTAL: u16 = VDISPLAY + VFP + VSYNC + VBP;

static MODES: [DisplayMode; 1] = [DisplayMode {
    clock_khz: HTOTAL as u32 * VTOTAL as u32 * REFRESH_HZ / 1000,
    hdisplay: HDISPLAY,
    hsync_start: HDISPLAY + HFP,
    hsync_end: HDISPLAY + HFP + HSYNC,
    htotal: HTOTAL,
    vdisplay: VDISPLAY,
    vsync_start: VDISPLAY + VFP,
    vsync_end: VDISPLAY + VFP + VSYNC,
    vtotal: VTOTAL,
    width_mm: 0,
    height_mm: 0,
    preferred: true,
}];

/// DSI link parameters the host must apply before attaching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct DsiConfig {
    /// Data lane count
    pub lanes: u8,
    /// Pixel stream format
    pub format: PixelFormat,
    /// Video mode (as opposed to command mode)
    pub video: bool,
    /// Burst video transfers
    pub burst: bool,
    /// Send horizontal sync end packets
    pub hse: bool,
    /// Suppress end-of-transmission packets
    pub no_eot: bool,
    /// Stop the clock lane between transfers
    pub clock_non_continuous: bool,
}

/// Link parameters for this panel
pub const DSI_CONFIG: DsiConfig = DsiConfig {
    lanes: 4,
    format: PixelFormat::Rgb888,
    video: true,
    burst: true,
    hse: true,
    no_eot: true,
    clock_non_continuous: true,
};

/// ili9881c panel driver
pub struct Ili9881c<I, S, P> {
    map: Regmap<I>,
    supply: [S; 1],
    reset: P,
    power: PowerSequencer,
    state: LifecycleState,
    report: TeardownReport,
}

impl<I, S, P> Ili9881c<I, S, P>
where
    I: RegisterInterface<AddressType = u8>,
    S: PowerResource,
    P: OutputPin,
{
    /// Attach to the DSI host and the panel's resources
    ///
    /// The reset line is driven high (panel held in reset) immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceMissing`] when the supply (`"power"`) or the
    /// reset line (`"reset"`) is absent, and [`Error::Power`] if the reset
    /// line cannot be driven.
    pub fn new(interface: I, supply: Option<S>, reset: Option<P>) -> Result<Self, Error<I::Error>> {
        let Some(supply) = supply else {
            #[cfg(feature = "defmt")]
            defmt::error!("ili9881c: failed to get power regulator");
            return Err(Error::ResourceMissing("power"));
        };
        let Some(mut reset) = reset else {
            #[cfg(feature = "defmt")]
            defmt::error!("ili9881c: failed to get reset-gpios");
            return Err(Error::ResourceMissing("reset"));
        };

        reset
            .set_high()
            .map_err(|_| Error::Power(PowerError::ResetLine))?;

        Ok(Self {
            map: Regmap::new(interface, PANEL_REGMAP),
            supply: [supply],
            reset,
            power: PowerSequencer::new(),
            state: LifecycleState::Attached,
            report: TeardownReport::new(),
        })
    }

    /// Power the panel and program its registers
    ///
    /// Does nothing if the panel is already prepared.
    ///
    /// # Errors
    ///
    /// Returns the first failure. The supply and reset line are returned to
    /// their unpowered levels before the error is reported.
    pub fn prepare<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        if matches!(self.state, LifecycleState::Prepared | LifecycleState::Active) {
            return Ok(());
        }

        if let Err(error) = self.power.enable_resources(&mut self.supply, delay) {
            #[cfg(feature = "defmt")]
            defmt::error!("ili9881c: failed to enable regulator: {}", error);
            return Err(Error::Power(error));
        }

        if let Err(error) = self.power.reset_pulse(&mut self.reset, delay) {
            self.roll_back(delay);
            return Err(Error::Power(error));
        }
        self.power.finish();

        if let Err(error) = script::apply(INIT_SEQUENCE, &mut self.map) {
            #[cfg(feature = "defmt")]
            defmt::error!("ili9881c: failed to initialize panel at step {}", error.position);
            self.roll_back(delay);
            return Err(error.into_error());
        }

        self.state = LifecycleState::Prepared;
        Ok(())
    }

    /// Wake the panel and turn the display on
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the panel is prepared, and the
    /// bus error of a failed command.
    pub fn enable<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        match self.state {
            LifecycleState::Active => return Ok(()),
            LifecycleState::Prepared => {}
            state => return Err(Error::InvalidState(state)),
        }

        self.map.write_raw(DCS_EXIT_SLEEP_MODE, &[]).inspect_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::error!("ili9881c: failed to exit sleep mode");
        })?;
        delay.delay_ms(EXIT_SLEEP_DELAY_MS);

        self.map.write_raw(DCS_SET_DISPLAY_ON, &[]).inspect_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::error!("ili9881c: failed to set display on");
        })?;
        delay.delay_ms(DISPLAY_ON_DELAY_MS);

        self.state = LifecycleState::Active;
        Ok(())
    }

    /// Turn the display off and put the panel to sleep
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the panel is not powered, and the
    /// bus error of a failed command (the panel stays `Active`).
    pub fn disable<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        match self.state {
            LifecycleState::Prepared => return Ok(()),
            LifecycleState::Active => {}
            state => return Err(Error::InvalidState(state)),
        }

        self.off(delay).map_err(|(_, error)| error)?;
        self.state = LifecycleState::Prepared;
        Ok(())
    }

    /// Power the panel down
    ///
    /// Always succeeds. Problems along the way are logged and collected in
    /// the returned report; the remaining steps still run.
    pub fn unprepare<D: DelayNs>(&mut self, delay: &mut D) -> &TeardownReport {
        self.report.clear();
        if !self.state.is_powered() {
            return &self.report;
        }

        if let Err((command, _)) = self.off(delay) {
            #[cfg(feature = "defmt")]
            defmt::error!("ili9881c: failed to un-initialize panel");
            self.report.record(TeardownFailure::Command(command));
        }

        self.power.park_reset(&mut self.reset, &mut self.report);
        self.power
            .disable_resources(&mut self.supply, delay, &mut self.report);

        self.state = LifecycleState::Unprepared;
        &self.report
    }

    /// Release the panel and hand its resources back
    ///
    /// A powered panel is unprepared first.
    pub fn detach<D: DelayNs>(mut self, delay: &mut D) -> (I, S, P) {
        self.unprepare(delay);
        self.state = LifecycleState::Detached;

        let [supply] = self.supply;
        (self.map.release(), supply, self.reset)
    }

    /// Display modes supported by the panel
    pub fn get_modes(&self) -> &'static [DisplayMode] {
        &MODES
    }

    /// Link parameters to program into the DSI host
    pub const fn dsi_config(&self) -> DsiConfig {
        DSI_CONFIG
    }

    /// Current lifecycle state
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Failures from the most recent teardown or rolled back prepare
    pub const fn last_report(&self) -> &TeardownReport {
        &self.report
    }

    /// Borrow the DSI host transport
    pub const fn interface(&self) -> &I {
        self.map.interface()
    }

    fn off<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), (&'static str, Error<I::Error>)> {
        self.map
            .write_raw(DCS_SET_DISPLAY_OFF, &[])
            .map_err(|error| ("display_off", error))?;
        delay.delay_ms(DISPLAY_OFF_DELAY_MS);

        self.map
            .write_raw(DCS_ENTER_SLEEP_MODE, &[])
            .map_err(|error| ("enter_sleep", error))?;
        delay.delay_ms(ENTER_SLEEP_DELAY_MS);

        Ok(())
    }

    fn roll_back<D: DelayNs>(&mut self, delay: &mut D) {
        self.report.clear();
        self.power.park_reset(&mut self.reset, &mut self.report);
        self.power
            .disable_resources(&mut self.supply, delay, &mut self.report);
        self.state = LifecycleState::Attached;
    }
}
