/// Apply gamma correction to a unit value.
///
/// Computes `value ^ (1 / gamma)`. A gamma of zero or below disables
/// correction and the value passes through unchanged.
#[inline]
pub fn gamma_correct(value: f32, gamma: f32) -> f32 {
    if value <= 0.0 {
        return 0.0;
    }
    if gamma <= 0.0 {
        return value;
    }
    libm::powf(value, 1.0 / gamma)
}

