//! ili9881c vendor initialization table
//!
//! Programs GIP timing (page 3), power control (page 4) and gamma (page 1),
//! then returns to the user command page.

use crate::script::{PixelFormat, Step};

/// Full register programming run during prepare, before sleep-out
pub static INIT_SEQUENCE: &[Step] = &[
    Step::PageSelect(3),
    Step::write(0x01, 0x00),
    Step::write(0x02, 0x00),
    Step::write(0x03, 0x53),
    Step::write(0x04, 0x13),
    Step::write(0x05, 0x13),
    Step::write(0x06, 0x06),
    Step::write(0x07, 0x00),
    Step::write(0x08, 0x04),
    Step::write(0x09, 0x00),
    Step::write(0x0a, 0x00),
    Step::write(0x0b, 0x00),
    Step::write(0x0c, 0x00),
    Step::write(0x0d, 0x00),
    Step::write(0x0e, 0x00),
    Step::write(0x0f, 0x00),
    Step::write(0x10, 0x00),
    Step::write(0x11, 0x00),
    Step::write(0x12, 0x00),
    Step::write(0x13, 0x00),
    Step::write(0x14, 0x00),
    Step::write(0x15, 0x00),
    Step::write(0x16, 0x00),
    Step::write(0x17, 0x00),
    Step::write(0x18, 0x00),
    Step::write(0x19, 0x00),
    Step::write(0x1a, 0x00),
    Step::write(0x1b, 0x00),
    Step::write(0x1c, 0x00),
    Step::write(0x1d, 0x00),
    Step::write(0x1e, 0xc0),
    Step::write(0x1f, 0x80),
    Step::write(0x20, 0x04),
    Step::write(0x21, 0x0b),
    Step::write(0x22, 0x00),
    Step::write(0x23, 0x00),
    Step::write(0x24, 0x00),
    Step::write(0x25, 0x00),
    Step::write(0x26, 0x00),
    Step::write(0x27, 0x00),
    Step::write(0x28, 0x55),
    Step::write(0x29, 0x03),
    Step::write(0x2a, 0x00),
    Step::write(0x2b, 0x00),
    Step::write(0x2c, 0x00),
    Step::write(0x2d, 0x00),
    Step::write(0x2e, 0x00),
    Step::write(0x2f, 0x00),
    Step::write(0x30, 0x00),
    Step::write(0x31, 0x00),
    Step::write(0x32, 0x00),
    Step::write(0x33, 0x00),
    Step::write(0x34, 0x04),
    Step::write(0x35, 0x05),
    Step::write(0x36, 0x05),
    Step::write(0x37, 0x00),
    Step::write(0x38, 0x3c),
    Step::write(0x39, 0x00),
    Step::PixelFormat(PixelFormat::GipTiming),
    Step::write(0x3b, 0x40),
    Step::write(0x3c, 0x00),
    Step::write(0x3d, 0x00),
    Step::write(0x3e, 0x00),
    Step::write(0x3f, 0x00),
    Step::write(0x40, 0x00),
    Step::write(0x41, 0x00),
    Step::write(0x42, 0x00),
    Step::write(0x43, 0x00),
    Step::write(0x44, 0x00),
    Step::write(0x50, 0x01),
    Step::Brightness(0x0023),
    Step::write(0x52, 0x45),
    Step::write(0x53, 0x67),
    Step::write(0x54, 0x89),
    Step::write(0x55, 0xab),
    Step::write(0x56, 0x01),
    Step::write(0x57, 0x23),
    Step::write(0x58, 0x45),
    Step::write(0x59, 0x67),
    Step::write(0x5a, 0x89),
    Step::write(0x5b, 0xab),
    Step::write(0x5c, 0xcd),
    Step::write(0x5d, 0xef),
    Step::write(0x5e, 0x01),
    Step::write(0x5f, 0x14),
    Step::write(0x60, 0x15),
    Step::write(0x61, 0x0c),
    Step::write(0x62, 0x0d),
    Step::write(0x63, 0x0e),
    Step::write(0x64, 0x0f),
    Step::write(0x65, 0x10),
    Step::write(0x66, 0x11),
    Step::write(0x67, 0x08),
    Step::write(0x68, 0x02),
    Step::write(0x69, 0x0a),
    Step::write(0x6a, 0x02),
    Step::write(0x6b, 0x02),
    Step::write(0x6c, 0x02),
    Step::write(0x6d, 0x02),
    Step::write(0x6e, 0x02),
    Step::write(0x6f, 0x02),
    Step::write(0x70, 0x02),
    Step::write(0x71, 0x02),
    Step::write(0x72, 0x06),
    Step::write(0x73, 0x02),
    Step::write(0x74, 0x02),
    Step::write(0x75, 0x14),
    Step::write(0x76, 0x15),
    Step::write(0x77, 0x11),
    Step::write(0x78, 0x10),
    Step::write(0x79, 0x0f),
    Step::write(0x7a, 0x0e),
    Step::write(0x7b, 0x0d),
    Step::write(0x7c, 0x0c),
    Step::write(0x7d, 0x06),
    Step::write(0x7e, 0x02),
    Step::write(0x7f, 0x0a),
    Step::write(0x80, 0x02),
    Step::write(0x81, 0x02),
    Step::write(0x82, 0x02),
    Step::write(0x83, 0x02),
    Step::write(0x84, 0x02),
    Step::write(0x85, 0x02),
    Step::write(0x86, 0x02),
    Step::write(0x87, 0x02),
    Step::write(0x88, 0x08),
    Step::write(0x89, 0x02),
    Step::write(0x8a, 0x02),

    Step::PageSelect(4),
    Step::write(0x6c, 0x15),
    Step::write(0x6e, 0x3b),
    Step::write(0x6f, 0x53),
    Step::PixelFormat(PixelFormat::PowerControl),
    Step::write(0x8d, 0x15),
    Step::write(0x87, 0xba),
    Step::write(0xb2, 0xd1),
    Step::write(0x26, 0x76),
    Step::write(0x88, 0x0b),

    Step::PageSelect(1),
    Step::write(0x22, 0x0a),
    Step::write(0x31, 0x00),
    Step::write(0x53, 0x88),
    Step::write(0x55, 0x83),
    Step::write(0x50, 0xa6),
    Step::Brightness(0x00a6),
    Step::write(0x60, 0x14),
    Step::write(0xa0, 0x08),
    Step::write(0xa1, 0x22),
    Step::write(0xa2, 0x30),
    Step::write(0xa3, 0x15),
    Step::write(0xa4, 0x17),
    Step::write(0xa5, 0x2b),
    Step::write(0xa6, 0x1f),
    Step::write(0xa7, 0x1f),
    Step::write(0xa8, 0x88),
    Step::write(0xa9, 0x1c),
    Step::write(0xaa, 0x28),
    Step::write(0xab, 0x6c),
    Step::write(0xac, 0x1b),
    Step::write(0xad, 0x18),
    Step::write(0xae, 0x4b),
    Step::write(0xaf, 0x20),
    Step::write(0xb0, 0x26),
    Step::write(0xb1, 0x43),
    Step::write(0xb2, 0x52),
    Step::write(0xb3, 0x2c),
    Step::write(0xc0, 0x08),
    Step::write(0xc1, 0x22),
    Step::write(0xc2, 0x30),
    Step::write(0xc3, 0x15),
    Step::write(0xc4, 0x17),
    Step::write(0xc5, 0x2b),
    Step::write(0xc6, 0x1f),
    Step::write(0xc7, 0x1f),
    Step::write(0xc8, 0x88),
    Step::write(0xc9, 0x1c),
    Step::write(0xca, 0x28),
    Step::write(0xcb, 0x6c),
    Step::write(0xcc, 0x1b),
    Step::write(0xcd, 0x18),
    Step::write(0xce, 0x4b),
    Step::write(0xcf, 0x20),
    Step::write(0xd0, 0x26),
    Step::write(0xd1, 0x43),
    Step::write(0xd2, 0x52),
    Step::write(0xd3, 0x2c),

    Step::PageSelect(0),
];
