//! Register definitions
//!
//! Typed register blocks for the I2C devices in this crate. Each block is
//! meant to be driven over a [`crate::regmap::Regmap`], which supplies the
//! shadow cache and the address/volatility checks; the blocks only describe
//! field layout.
//!
//! The ili9881c panel has no block here: its vendor init table programs
//! paged registers by raw address (see [`crate::panel`]).

/// cm36672p / cm36686 proximity sensor registers
///
/// 16-bit registers, little-endian on the wire. Addresses 0x00-0x02 belong to
/// the ambient-light block, which these parts do not populate.
pub mod cm36672p {
    device_driver::create_device!(
        device_name: Cm36672pRegisters,
        dsl: {
            config {
                type RegisterAddressType = u8;
                type DefaultByteOrder = LE;
            }

            /// PS_CONF1 / PS_CONF2 - Proximity configuration (0x03)
            register PsConf1 {
                const ADDRESS = 0x03;
                const SIZE_BITS = 16;

                /// Proximity shutdown (1 = sensor off)
                ps_sd: bool = 0,
                /// Integration time
                ps_it: uint = 1..4,
                /// Interrupt persistence
                ps_pers: uint = 4..6,
                /// IR LED duty ratio
                ps_duty: uint = 6..8,
                /// Interrupt mode (0 = off, 1 = close, 2 = away, 3 = both)
                ps_int: uint = 8..10,
                reserved_15_10: uint = 10..16,
            },

            /// PS_CONF3 / PS_MS - Proximity configuration 3 (0x04)
            register PsConf3 {
                const ADDRESS = 0x04;
                const SIZE_BITS = 16;

                reserved_3_0: uint = 0..4,
                /// Smart persistence
                ps_smart_pers: bool = 4,
                reserved_15_5: uint = 5..16,
            },

            /// PS_CANC - Crosstalk cancellation level (0x05)
            register PsCanc {
                const ADDRESS = 0x05;
                const SIZE_BITS = 16;

                /// Cancellation offset subtracted from PS_DATA
                level: uint = 0..16,
            },

            /// PS_THDL - Low interrupt threshold (0x06)
            register PsThdLow {
                const ADDRESS = 0x06;
                const SIZE_BITS = 16;

                /// Away threshold
                threshold: uint = 0..16,
            },

            /// PS_THDH - High interrupt threshold (0x07)
            register PsThdHigh {
                const ADDRESS = 0x07;
                const SIZE_BITS = 16;

                /// Close threshold
                threshold: uint = 0..16,
            },

            /// PS_DATA - Proximity output (0x08)
            register PsData {
                const ADDRESS = 0x08;
                const SIZE_BITS = 16;

                /// Raw proximity count
                count: uint = 0..16,
            },

            /// INT_FLAG - Interrupt flags (0x0C), cleared by reading
            register IntFlag {
                const ADDRESS = 0x0C;
                const SIZE_BITS = 16;

                reserved_7_0: uint = 0..8,
                /// Object moved away (count fell below the low threshold)
                ps_if_away: bool = 8,
                /// Object came close (count rose above the high threshold)
                ps_if_close: bool = 9,
                reserved_15_10: uint = 10..16,
            },

            /// ID - Device identification (0x0D)
            register DevId {
                const ADDRESS = 0x0D;
                const SIZE_BITS = 16;

                /// Device ID code
                id: uint = 0..16,
            }
        }
    );
}

/// sm5703 PMIC registers (charger, flash LED and system control)
///
/// 8-bit registers. Interrupt and status registers are volatile.
pub mod sm5703 {
    device_driver::create_device!(
        device_name: Sm5703Registers,
        dsl: {
            config {
                type RegisterAddressType = u8;
                type DefaultByteOrder = BE;
            }

            /// STATUS2 - Battery status (0x0B)
            register Status2 {
                const ADDRESS = 0x0B;
                const SIZE_BITS = 8;

                reserved_3_0: uint = 0..4,
                /// No battery detected
                nobat: bool = 4,
                reserved_7_5: uint = 5..8,
            },

            /// STATUS3 - Charge status (0x0C)
            register Status3 {
                const ADDRESS = 0x0C;
                const SIZE_BITS = 8;

                /// Charging in progress
                chgon: bool = 0,
                /// Top-off reached
                topoff: bool = 1,
                reserved_2: uint = 2..3,
                /// Charge complete
                done: bool = 3,
                reserved_7_4: uint = 4..8,
            },

            /// STATUS5 - Input status (0x0E)
            register Status5 {
                const ADDRESS = 0x0E;
                const SIZE_BITS = 8;

                /// VBUS within operating range
                vbusok: bool = 0,
                /// VBUS under-voltage lockout
                vbusuvlo: bool = 1,
                /// VBUS over-voltage protection tripped
                vbusovp: bool = 2,
                reserved_7_3: uint = 3..8,
            },

            /// CNTL - System control (0x0F)
            register Cntl {
                const ADDRESS = 0x0F;
                const SIZE_BITS = 8;

                /// Operation mode
                operation_mode: uint = 0..3,
                reserved_3: uint = 3..4,
                /// Automatic charge parameter setup
                autoset: bool = 4,
                reserved_7_5: uint = 5..8,
            },

            /// VBUSCNTL - Input current limit (0x10)
            register VbusCntl {
                const ADDRESS = 0x10;
                const SIZE_BITS = 8;

                /// Input current limit code
                vbuslimit: uint = 0..7,
                reserved_7: uint = 7..8,
            },

            /// CHGCNTL2 - Fast charge current (0x12)
            register ChgCntl2 {
                const ADDRESS = 0x12;
                const SIZE_BITS = 8;

                /// Fast charge current code
                fastchg: uint = 0..8,
            },

            /// CHGCNTL3 - Regulation voltage (0x13)
            register ChgCntl3 {
                const ADDRESS = 0x13;
                const SIZE_BITS = 8;

                /// Battery regulation voltage code
                batreg: uint = 0..8,
            },

            /// CHGCNTL4 - Top-off current (0x14)
            register ChgCntl4 {
                const ADDRESS = 0x14;
                const SIZE_BITS = 8;

                /// Top-off current threshold code
                topoff: uint = 0..7,
                /// Stop charging automatically at top-off
                autostop: bool = 7,
            },

            /// CHGCNTL5 - Automatic input current limit (0x15)
            register ChgCntl5 {
                const ADDRESS = 0x15;
                const SIZE_BITS = 8;

                /// AICL threshold code
                aicl: uint = 0..8,
            },

            /// CHGCNTL6 - Switching frequency (0x16)
            register ChgCntl6 {
                const ADDRESS = 0x16;
                const SIZE_BITS = 8;

                /// Frequency select
                freqsel: uint = 0..8,
            },

            /// FLEDCNTL1 - Flash LED enable (0x17)
            register FledCntl1 {
                const ADDRESS = 0x17;
                const SIZE_BITS = 8;

                /// LED enable mode (0 = off, 1 = movie, 2 = flash, 3 = external)
                fleden: uint = 0..2,
                /// Flash timeout and control bits
                flash_ctrl: uint = 2..8,
            },

            /// FLEDCNTL2 - Flash LED control (0x18)
            register FledCntl2 {
                const ADDRESS = 0x18;
                const SIZE_BITS = 8;

                /// Timer and enable configuration
                control: uint = 0..8,
            },

            /// FLEDCNTL3 - Flash current (0x19)
            register FledCntl3 {
                const ADDRESS = 0x19;
                const SIZE_BITS = 8;

                /// Flash current code
                iflash: uint = 0..5,
                reserved_7_5: uint = 5..8,
            },

            /// FLEDCNTL4 - Movie current (0x1A)
            register FledCntl4 {
                const ADDRESS = 0x1A;
                const SIZE_BITS = 8;

                /// Movie (torch) current code
                ifled: uint = 0..5,
                reserved_7_5: uint = 5..8,
            },

            /// FLEDCNTL6 - Boost output (0x1C)
            register FledCntl6 {
                const ADDRESS = 0x1C;
                const SIZE_BITS = 8;

                /// Boost output voltage selection
                bstout: uint = 0..4,
                reserved_7_4: uint = 4..8,
            },

            /// DEVICE_ID - Vendor and revision (0x1E)
            register DeviceId {
                const ADDRESS = 0x1E;
                const SIZE_BITS = 8;

                /// Vendor ID
                vendor_id: uint = 0..4,
                /// Chip revision
                revision: uint = 4..8,
            }
        }
    );
}

/// sm5703 fuel gauge registers
///
/// 16-bit registers, little-endian, all measurement outputs (volatile).
/// Values are 8.8 fixed point unless noted.
pub mod sm5703_fg {
    device_driver::create_device!(
        device_name: Sm5703FgRegisters,
        dsl: {
            config {
                type RegisterAddressType = u8;
                type DefaultByteOrder = LE;
            }

            /// SOC - State of charge in percent (0x62)
            register Soc {
                const ADDRESS = 0x62;
                const SIZE_BITS = 16;

                /// 8.8 fixed point percent
                value: uint = 0..16,
            },

            /// OCV - Open-circuit voltage in volts (0x80)
            register Ocv {
                const ADDRESS = 0x80;
                const SIZE_BITS = 16;

                /// 8.8 fixed point volts
                value: uint = 0..16,
            },

            /// TEMPERATURE - Battery temperature in degrees Celsius (0x90)
            register Temperature {
                const ADDRESS = 0x90;
                const SIZE_BITS = 16;

                /// 8.8 fixed point degrees
                value: uint = 0..16,
            },

            /// VOLTAGE - Battery voltage in volts (0xA0)
            register Voltage {
                const ADDRESS = 0xA0;
                const SIZE_BITS = 16;

                /// 8.8 fixed point volts
                value: uint = 0..16,
            },

            /// CURRENT - Battery current in amperes (0xB0)
            register Current {
                const ADDRESS = 0xB0;
                const SIZE_BITS = 16;

                /// 3.8 fixed point amperes
                magnitude: uint = 0..11,
                reserved_14_11: uint = 11..15,
                /// Discharging when set
                sign: bool = 15,
            }
        }
    );
}
