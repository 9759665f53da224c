//! Value scaling between MIDI 1.0 and MIDI 2.0 resolutions.
//!
//! Widening follows the MIDI Association min-center-max algorithm: values at or
//! below the source center are shifted, values above it have their low bits
//! repeated into the new low bits so the maximum maps to all ones. Narrowing is
//! a plain right shift, so `narrow(widen(v)) == v` for every source value.

/// Widen `value` from `src_bits` to `dst_bits` (`src_bits < dst_bits <= 32`).
#[inline]
pub const fn scale_up(value: u32, src_bits: u32, dst_bits: u32) -> u32 {
    let scale_bits = dst_bits - src_bits;
    let mut shifted = value << scale_bits;

    let src_center = 1u32 << (src_bits - 1);
    if value <= src_center {
        return shifted;
    }

    let repeat_bits = src_bits - 1;
    let repeat_mask = (1u32 << repeat_bits) - 1;
    let mut repeat = value & repeat_mask;

    if scale_bits > repeat_bits {
        repeat <<= scale_bits - repeat_bits;
    } else {
        repeat >>= repeat_bits - scale_bits;
    }

    while repeat != 0 {
        shifted |= repeat;
        repeat >>= repeat_bits;
    }

    shifted
}

#[inline]
pub const fn scale_7_to_8(value: u8) -> u8 {
    scale_up((value & 0x7F) as u32, 7, 8) as u8
}

#[inline]
pub const fn scale_7_to_16(value: u8) -> u16 {
    scale_up((value & 0x7F) as u32, 7, 16) as u16
}

#[inline]
pub const fn scale_14_to_16(value: u16) -> u16 {
    scale_up((value & 0x3FFF) as u32, 14, 16) as u16
}

#[inline]
pub const fn scale_7_to_32(value: u8) -> u32 {
    scale_up((value & 0x7F) as u32, 7, 32)
}

#[inline]
pub const fn scale_14_to_32(value: u16) -> u32 {
    scale_up((value & 0x3FFF) as u32, 14, 32)
}

#[inline]
pub const fn scale_8_to_7(value: u8) -> u8 {
    value >> 1
}

#[inline]
pub const fn scale_16_to_7(value: u16) -> u8 {
    (value >> 9) as u8
}

#[inline]
pub const fn scale_32_to_7(value: u32) -> u8 {
    (value >> 25) as u8
}

#[inline]
pub const fn scale_16_to_14(value: u16) -> u16 {
    value >> 2
}

#[inline]
pub const fn scale_32_to_14(value: u32) -> u16 {
    (value >> 18) as u16
}
