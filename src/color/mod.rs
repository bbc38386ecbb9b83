mod values;

use smart_leds::RGB8;
pub use values::{ColorValues, white_balance};

pub type Rgb = RGB8;

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Blend between two 8-bit values
///
/// `amount_of_b` of 0 yields `a`, 255 yields `b`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn blend8(a: u8, b: u8, amount_of_b: u8) -> u8 {
    let delta = b as i16 - a as i16;

    let mut partial: u32 = (a as u32) << 16;
    partial = partial.wrapping_add(
        (delta as u32)
            .wrapping_mul(amount_of_b as u32)
            .wrapping_mul(257),
    );
    partial = partial.wrapping_add(0x8000);

    (partial >> 16) as u8
}

/// Two-point gradient between `from` and `to`
#[inline]
pub const fn gradient(from: Rgb, to: Rgb, amount: u8) -> Rgb {
    Rgb {
        r: blend8(from.r, to.r, amount),
        g: blend8(from.g, to.g, amount),
        b: blend8(from.b, to.b, amount),
    }
}

/// Clamp a value into `[0, 1]`, mapping NaN to 0
#[inline]
pub(crate) fn clamp_unit(value: f32) -> f32 {
    clamp_range(value, 0.0, 1.0)
}

/// Clamp a value into `[min, max]` without panicking on bad bounds or NaN
#[inline]
pub(crate) fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() || value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Convert a unit float to an 8-bit channel
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn unit_to_u8(value: f32) -> u8 {
    libm::roundf(clamp_unit(value) * 255.0) as u8
}

/// Convert an 8-bit channel to a unit float
#[inline]
pub(crate) fn u8_to_unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_range_handles_nan() {
        assert_eq!(clamp_range(f32::NAN, 153.0, 500.0), 153.0);
        assert_eq!(clamp_range(600.0, 153.0, 500.0), 500.0);
        assert_eq!(clamp_unit(-0.1), 0.0);
    }

    #[test]
    fn test_unit_channel_conversion() {
        assert_eq!(unit_to_u8(1.0), 255);
        assert_eq!(unit_to_u8(0.5), 128);
        assert_eq!(unit_to_u8(2.0), 255);
        assert_eq!(u8_to_unit(255), 1.0);
        assert_eq!(rgb_from_u32(0x00FF_8000), Rgb::new(255, 128, 0));
    }
}
