//! Complete color/brightness state of a light

use super::{Rgb, clamp_range, clamp_unit, unit_to_u8};
use crate::capability::{ColorCapability, ColorMode};
use crate::gamma::gamma_correct;
use crate::traits::LightTraits;

/// Split a color temperature into cold and warm white fractions.
///
/// At `min_mireds` the result is fully cold, at `max_mireds` fully warm.
pub fn white_balance(mireds: f32, min_mireds: f32, max_mireds: f32) -> (f32, f32) {
    let range = max_mireds - min_mireds;
    if range <= 0.0 {
        return (1.0, 0.0);
    }
    let cold = clamp_unit((max_mireds - mireds) / range);
    (cold, 1.0 - cold)
}

#[inline]
fn lerp(start: f32, end: f32, completion: f32) -> f32 {
    start + (end - start) * completion
}

macro_rules! unit_channel {
    ($(#[$doc:meta])* $field:ident, $setter:ident) => {
        $(#[$doc])*
        pub const fn $field(&self) -> f32 {
            self.$field
        }

        /// Set the channel, clamping into `[0, 1]`
        pub fn $setter(&mut self, value: f32) {
            self.$field = clamp_unit(value);
        }
    };
}

/// Light color and brightness state.
///
/// All unit channels are kept inside `[0, 1]` by the setters. Channels not
/// covered by the current color mode keep a neutral value after
/// [`ColorValues::normalize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorValues {
    color_mode: ColorMode,
    is_on: bool,
    brightness: f32,
    color_brightness: f32,
    red: f32,
    green: f32,
    blue: f32,
    white: f32,
    color_temperature: f32,
    cold_white: f32,
    warm_white: f32,
}

impl Default for ColorValues {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Unknown,
            is_on: false,
            brightness: 1.0,
            color_brightness: 1.0,
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            white: 1.0,
            color_temperature: 0.0,
            cold_white: 1.0,
            warm_white: 1.0,
        }
    }
}

impl ColorValues {
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    pub const fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn set_state(&mut self, on: bool) {
        self.is_on = on;
    }

    /// On/off as a float, 1 when on
    pub const fn state(&self) -> f32 {
        if self.is_on { 1.0 } else { 0.0 }
    }

    unit_channel!(
        /// Master brightness
        brightness,
        set_brightness
    );
    unit_channel!(
        /// Brightness of the RGB channels relative to the master brightness
        color_brightness,
        set_color_brightness
    );
    unit_channel!(red, set_red);
    unit_channel!(green, set_green);
    unit_channel!(blue, set_blue);
    unit_channel!(white, set_white);
    unit_channel!(cold_white, set_cold_white);
    unit_channel!(warm_white, set_warm_white);

    /// Color temperature in mireds
    pub const fn color_temperature(&self) -> f32 {
        self.color_temperature
    }

    /// Set the color temperature. The range is enforced by [`ColorValues::normalize`].
    pub fn set_color_temperature(&mut self, mireds: f32) {
        self.color_temperature = if mireds.is_nan() { 0.0 } else { mireds.max(0.0) };
    }

    pub fn set_rgb(&mut self, red: f32, green: f32, blue: f32) {
        self.set_red(red);
        self.set_green(green);
        self.set_blue(blue);
    }

    /// Linear interpolation between two values.
    ///
    /// The on/off flag follows `start` until `completion` reaches 1, the
    /// color mode always follows `end`.
    pub fn lerp(start: &Self, end: &Self, completion: f32) -> Self {
        let t = clamp_unit(completion);
        Self {
            color_mode: end.color_mode,
            is_on: if t < 1.0 { start.is_on } else { end.is_on },
            brightness: lerp(start.brightness, end.brightness, t),
            color_brightness: lerp(start.color_brightness, end.color_brightness, t),
            red: lerp(start.red, end.red, t),
            green: lerp(start.green, end.green, t),
            blue: lerp(start.blue, end.blue, t),
            white: lerp(start.white, end.white, t),
            color_temperature: lerp(start.color_temperature, end.color_temperature, t),
            cold_white: lerp(start.cold_white, end.cold_white, t),
            warm_white: lerp(start.warm_white, end.warm_white, t),
        }
    }

    /// Scale RGB so the largest channel becomes 1.
    ///
    /// All-zero RGB becomes white. Does nothing outside RGB modes.
    pub fn normalize_color(&mut self) {
        if !self.color_mode.supports(ColorCapability::RGB) {
            return;
        }
        let max = self.red.max(self.green).max(self.blue);
        if max <= 0.0 {
            self.red = 1.0;
            self.green = 1.0;
            self.blue = 1.0;
            return;
        }
        self.red /= max;
        self.green /= max;
        self.blue /= max;
    }

    /// Clamp every channel and reset channels absent from the color mode.
    ///
    /// Idempotent.
    pub fn normalize(&mut self, traits: &LightTraits) {
        let caps = self.color_mode.capabilities();

        self.brightness = clamp_unit(self.brightness);
        self.color_brightness = clamp_unit(self.color_brightness);
        self.red = clamp_unit(self.red);
        self.green = clamp_unit(self.green);
        self.blue = clamp_unit(self.blue);
        self.white = clamp_unit(self.white);
        self.cold_white = clamp_unit(self.cold_white);
        self.warm_white = clamp_unit(self.warm_white);

        if !caps.contains(ColorCapability::BRIGHTNESS) {
            self.brightness = 1.0;
        }
        if !caps.contains(ColorCapability::RGB) {
            self.color_brightness = 1.0;
            self.red = 1.0;
            self.green = 1.0;
            self.blue = 1.0;
        }
        if !caps.contains(ColorCapability::WHITE) {
            self.white = 1.0;
        }
        // Cold/warm white lights still report the temperature they were split from
        if caps.contains(ColorCapability::COLOR_TEMPERATURE)
            || caps.contains(ColorCapability::COLD_WARM_WHITE)
        {
            self.color_temperature = clamp_range(
                self.color_temperature,
                traits.min_mireds(),
                traits.max_mireds(),
            );
        } else {
            self.color_temperature = traits.min_mireds();
        }
        if !caps.contains(ColorCapability::COLD_WARM_WHITE) {
            self.cold_white = 1.0;
            self.warm_white = 1.0;
        }
    }

    /// On/off output
    pub const fn as_binary(&self) -> bool {
        self.is_on
    }

    /// Single brightness output
    pub fn as_brightness(&self, gamma: f32) -> f32 {
        gamma_correct(self.state() * self.brightness, gamma)
    }

    /// RGB output, black outside RGB modes
    pub fn as_rgb(&self, gamma: f32) -> (f32, f32, f32) {
        if !self.color_mode.supports(ColorCapability::RGB) {
            return (0.0, 0.0, 0.0);
        }
        let level = self.state() * self.brightness * self.color_brightness;
        (
            gamma_correct(level * self.red, gamma),
            gamma_correct(level * self.green, gamma),
            gamma_correct(level * self.blue, gamma),
        )
    }

    /// RGB plus white output
    pub fn as_rgbw(&self, gamma: f32) -> (f32, f32, f32, f32) {
        let (red, green, blue) = self.as_rgb(gamma);
        let white = if self.color_mode.supports(ColorCapability::WHITE) {
            gamma_correct(self.state() * self.brightness * self.white, gamma)
        } else {
            0.0
        };
        (red, green, blue, white)
    }

    /// Cold and warm white output.
    ///
    /// Cold/warm modes use the explicit channels, color temperature modes
    /// split the white level by temperature.
    pub fn as_cwww(&self, traits: &LightTraits, gamma: f32) -> (f32, f32) {
        if self.color_mode.supports(ColorCapability::COLD_WARM_WHITE) {
            let level = gamma_correct(self.state() * self.brightness * self.white_level(), gamma);
            return (
                level * gamma_correct(self.cold_white, gamma),
                level * gamma_correct(self.warm_white, gamma),
            );
        }
        if self.color_mode.supports(ColorCapability::COLOR_TEMPERATURE) {
            let (cold, warm) = white_balance(
                self.color_temperature,
                traits.min_mireds(),
                traits.max_mireds(),
            );
            let level = self.state() * self.brightness * self.white_level();
            return (
                gamma_correct(level * cold, gamma),
                gamma_correct(level * warm, gamma),
            );
        }
        (0.0, 0.0)
    }

    /// RGB plus cold and warm white output
    pub fn as_rgbww(&self, traits: &LightTraits, gamma: f32) -> (f32, f32, f32, f32, f32) {
        let (red, green, blue) = self.as_rgb(gamma);
        let (cold, warm) = self.as_cwww(traits, gamma);
        (red, green, blue, cold, warm)
    }

    /// Color temperature as a fraction of the mired range plus white brightness
    pub fn as_ct(&self, traits: &LightTraits, gamma: f32) -> (f32, f32) {
        let range = traits.max_mireds() - traits.min_mireds();
        let temperature = if range > 0.0 {
            clamp_unit((self.color_temperature - traits.min_mireds()) / range)
        } else {
            0.0
        };
        let white = gamma_correct(self.state() * self.brightness * self.white_level(), gamma);
        (temperature, white)
    }

    /// RGB plus color temperature output
    pub fn as_rgbct(&self, traits: &LightTraits, gamma: f32) -> (f32, f32, f32, f32, f32) {
        let (red, green, blue) = self.as_rgb(gamma);
        let (temperature, white) = self.as_ct(traits, gamma);
        (red, green, blue, temperature, white)
    }

    /// RGB output as an 8-bit color for LED strip drivers
    pub fn as_rgb8(&self, gamma: f32) -> Rgb {
        let (red, green, blue) = self.as_rgb(gamma);
        Rgb {
            r: unit_to_u8(red),
            g: unit_to_u8(green),
            b: unit_to_u8(blue),
        }
    }

    /// White channel scale in combined RGB and white modes
    fn white_level(&self) -> f32 {
        if self.color_mode.supports(ColorCapability::RGB) {
            self.white
        } else {
            1.0
        }
    }
}
