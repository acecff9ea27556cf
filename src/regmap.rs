//! Cached register access layer
//!
//! [`Regmap`] sits between a driver and its bus transport. It knows the shape
//! of the device register space (value width, byte order, highest valid
//! address) and keeps a shadow copy of every non-volatile register it has
//! seen, so reads of configuration registers are served without bus traffic
//! and read-modify-write sequences stay consistent.
//!
//! Volatile registers (data outputs, interrupt flags, status) always go to the
//! transport. Addresses above [`RegmapConfig::max_register`] are rejected
//! before the transport is touched.
//!
//! `Regmap` implements [`RegisterInterface`] itself, so typed register blocks
//! from [`crate::registers`] can be layered on top and still go through the
//! cache.
//!
//! # Example
//!
//! ```ignore
//! # use msm8916_periph::regmap::{Regmap, RegmapConfig, ValueWidth, Endian, CacheType};
//! const CONFIG: RegmapConfig = RegmapConfig::new("cm36672p", ValueWidth::Bits16)
//!     .with_endian(Endian::Little)
//!     .with_max_register(0x0D)
//!     .with_cache_type(CacheType::Flat)
//!     .with_volatile_reg(|reg| matches!(reg, 0x08 | 0x0C));
//!
//! let mut map = Regmap::new(interface, CONFIG);
//! map.write(0x03, 0x0320)?;
//! assert_eq!(map.read(0x03)?, 0x0320); // served from the shadow
//! ```

use device_driver::RegisterInterface;

use crate::Error;

/// Number of addressable registers with 8-bit addresses
const ADDRESS_SPACE: usize = 256;

/// Type of caching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CacheType {
    /// Don't cache anything; every access goes to the transport
    None,
    /// One shadow slot per address
    Flat,
}

/// Register value width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueWidth {
    /// 8-bit registers
    Bits8,
    /// 16-bit registers
    Bits16,
}

impl ValueWidth {
    /// Width in bits
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
        }
    }

    /// Width in bytes on the wire
    pub const fn bytes(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
        }
    }

    /// Largest value a register of this width can hold
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Bits8 => 0xFF,
            Self::Bits16 => 0xFFFF,
        }
    }
}

/// Byte order of multi-byte register values on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endian {
    /// Most significant byte first
    Big,
    /// Least significant byte first
    Little,
}

const fn never_volatile(_reg: u8) -> bool {
    false
}

/// Register map configuration
///
/// Built with `const` builder methods so each driver can keep its map
/// description in a `const`.
#[derive(Debug, Clone, Copy)]
pub struct RegmapConfig {
    name: &'static str,
    val_width: ValueWidth,
    endian: Endian,
    max_register: u8,
    cache_type: CacheType,
    volatile_reg: fn(u8) -> bool,
}

impl RegmapConfig {
    /// Create a new configuration
    ///
    /// Defaults: big-endian values, full 8-bit address space, no cache,
    /// no volatile registers.
    pub const fn new(name: &'static str, val_width: ValueWidth) -> Self {
        Self {
            name,
            val_width,
            endian: Endian::Big,
            max_register: u8::MAX,
            cache_type: CacheType::None,
            volatile_reg: never_volatile,
        }
    }

    /// Byte order of 16-bit values
    #[must_use]
    pub const fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Specifies the maximum valid register address
    #[must_use]
    pub const fn with_max_register(mut self, max_register: u8) -> Self {
        self.max_register = max_register;
        self
    }

    /// Type of caching being performed
    #[must_use]
    pub const fn with_cache_type(mut self, cache_type: CacheType) -> Self {
        self.cache_type = cache_type;
        self
    }

    /// Classifier for registers whose value changes without driver writes
    #[must_use]
    pub const fn with_volatile_reg(mut self, volatile_reg: fn(u8) -> bool) -> Self {
        self.volatile_reg = volatile_reg;
        self
    }

    /// Map name used in diagnostics
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Register value width
    pub const fn val_width(&self) -> ValueWidth {
        self.val_width
    }

    /// Byte order of multi-byte values
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Highest valid register address
    pub const fn max_register(&self) -> u8 {
        self.max_register
    }

    /// Caching strategy
    pub const fn cache_type(&self) -> CacheType {
        self.cache_type
    }
}

/// Cached register map over a bus transport
pub struct Regmap<I> {
    interface: I,
    config: RegmapConfig,
    cache: [Option<u16>; ADDRESS_SPACE],
}

impl<I> Regmap<I> {
    /// Create a register map with an empty shadow
    pub const fn new(interface: I, config: RegmapConfig) -> Self {
        Self {
            interface,
            config,
            cache: [None; ADDRESS_SPACE],
        }
    }

    /// Map configuration
    pub const fn config(&self) -> &RegmapConfig {
        &self.config
    }

    /// Whether `address` bypasses the shadow
    pub fn is_volatile(&self, address: u8) -> bool {
        self.config.cache_type == CacheType::None || (self.config.volatile_reg)(address)
    }

    /// Shadow value for `address`, if one is held
    ///
    /// Never touches the transport.
    pub fn cached(&self, address: u8) -> Option<u16> {
        self.cache[usize::from(address)]
    }

    /// Drop every shadow value
    ///
    /// Call when the hardware has lost its register contents (power removed,
    /// reset asserted). The next read of each register goes to the transport.
    pub fn invalidate(&mut self) {
        self.cache = [None; ADDRESS_SPACE];
    }

    /// Borrow the underlying transport
    pub const fn interface(&self) -> &I {
        &self.interface
    }

    /// Consume the map and return the transport
    pub fn release(self) -> I {
        self.interface
    }

    fn check_address<E>(&self, address: u8) -> Result<(), Error<E>> {
        if address > self.config.max_register {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{}: register 0x{:x} outside map (max 0x{:x})",
                self.config.name,
                address,
                self.config.max_register
            );
            return Err(Error::InvalidAddress(address));
        }
        Ok(())
    }

    fn encode(&self, value: u16, out: &mut [u8]) {
        match (self.config.val_width, self.config.endian) {
            (ValueWidth::Bits8, _) => out[0] = value.to_le_bytes()[0],
            (ValueWidth::Bits16, Endian::Big) => out[..2].copy_from_slice(&value.to_be_bytes()),
            (ValueWidth::Bits16, Endian::Little) => out[..2].copy_from_slice(&value.to_le_bytes()),
        }
    }

    fn decode(&self, bytes: &[u8]) -> u16 {
        match (self.config.val_width, self.config.endian) {
            (ValueWidth::Bits8, _) => u16::from(bytes[0]),
            (ValueWidth::Bits16, Endian::Big) => u16::from_be_bytes([bytes[0], bytes[1]]),
            (ValueWidth::Bits16, Endian::Little) => u16::from_le_bytes([bytes[0], bytes[1]]),
        }
    }
}

impl<I> Regmap<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Read a register
    ///
    /// Non-volatile registers with a shadow value are answered from the
    /// shadow; otherwise the transport is read and, for non-volatile
    /// registers, the shadow populated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for addresses outside the map (no bus
    /// access is made) and [`Error::Bus`] if the transport fails.
    pub fn read(&mut self, address: u8) -> Result<u16, Error<I::Error>> {
        self.check_address(address)?;

        let volatile = self.is_volatile(address);
        if !volatile {
            if let Some(value) = self.cache[usize::from(address)] {
                return Ok(value);
            }
        }

        let width = self.config.val_width;
        let mut buffer = [0u8; 2];
        self.interface
            .read_register(address, width.bits(), &mut buffer[..width.bytes()])?;
        let value = self.decode(&buffer[..width.bytes()]);

        if !volatile {
            self.cache[usize::from(address)] = Some(value);
        }
        Ok(value)
    }

    /// Write a register
    ///
    /// The shadow of a non-volatile register is updated only after the
    /// transport accepted the write.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for addresses outside the map,
    /// [`Error::InvalidValue`] if `value` does not fit the register width
    /// (neither touches the bus), and [`Error::Bus`] if the transport fails.
    pub fn write(&mut self, address: u8, value: u16) -> Result<(), Error<I::Error>> {
        self.check_address(address)?;

        let width = self.config.val_width;
        if value > width.max_value() {
            return Err(Error::InvalidValue);
        }

        let mut buffer = [0u8; 2];
        self.encode(value, &mut buffer);
        self.interface
            .write_register(address, width.bits(), &buffer[..width.bytes()])?;

        if !self.is_volatile(address) {
            self.cache[usize::from(address)] = Some(value);
        }
        Ok(())
    }

    /// Read-modify-write the bits selected by `mask`
    ///
    /// The write is skipped when the register already holds the requested
    /// bits.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read) and [`write`](Self::write).
    pub fn update_bits(&mut self, address: u8, mask: u16, value: u16) -> Result<(), Error<I::Error>> {
        let original = self.read(address)?;
        let updated = (original & !mask) | (value & mask);
        if updated != original {
            self.write(address, updated)?;
        }
        Ok(())
    }

    /// Set the bits in `bits`
    ///
    /// # Errors
    ///
    /// Same as [`update_bits`](Self::update_bits).
    pub fn set_bits(&mut self, address: u8, bits: u16) -> Result<(), Error<I::Error>> {
        self.update_bits(address, bits, bits)
    }

    /// Clear the bits in `bits`
    ///
    /// # Errors
    ///
    /// Same as [`update_bits`](Self::update_bits).
    pub fn clear_bits(&mut self, address: u8, bits: u16) -> Result<(), Error<I::Error>> {
        self.update_bits(address, bits, 0)
    }

    /// Send a command with an arbitrary payload, bypassing the map
    ///
    /// Used for vendor page-select writes and DCS commands whose command
    /// byte lies outside the register map. Nothing is cached and no address
    /// check is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bus`] if the transport fails.
    pub fn write_raw(&mut self, command: u8, payload: &[u8]) -> Result<(), Error<I::Error>> {
        let size_bits = u32::try_from(payload.len() * 8).map_err(|_| Error::InvalidValue)?;
        self.interface.write_register(command, size_bits, payload)?;
        Ok(())
    }
}

impl<I> RegisterInterface for Regmap<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    type Error = Error<I::Error>;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let width = self.config.val_width;
        if size_bits != width.bits() || read_data.len() != width.bytes() {
            return Err(Error::InvalidValue);
        }
        let value = self.read(address)?;
        self.encode(value, read_data);
        Ok(())
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let width = self.config.val_width;
        if size_bits != width.bits() || write_data.len() != width.bytes() {
            return Err(Error::InvalidValue);
        }
        let value = self.decode(write_data);
        self.write(address, value)
    }
}
