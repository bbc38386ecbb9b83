//! Light change requests
//!
//! A [`LightCall`] collects optional attribute changes, validates them
//! against the light's traits and current state and then applies them as a
//! flash, a transition, an effect change or an instant change.

use alloc::string::String;
use core::fmt;

use embassy_time::{Duration, Instant};

use crate::capability::{ColorCapability, ColorMode};
use crate::color::{ColorValues, white_balance};
use crate::events::LightEvent;
use crate::state::LightState;
use crate::traits::LightTraits;

/// Maximum number of warnings kept per call.
pub const MAX_CALL_WARNINGS: usize = 16;

pub type CallWarnings = heapless::Vec<CallWarning, MAX_CALL_WARNINGS>;

const EFFECT_NAME_NONE: &str = "none";

const LOG_TARGET: &str = "light";

/// Attribute a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Brightness,
    ColorBrightness,
    Red,
    Green,
    Blue,
    Rgb,
    White,
    ColorTemperature,
    ColdWhite,
    WarmWhite,
    ColdWarmWhite,
    Transition,
}

impl Attribute {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::ColorBrightness => "color brightness",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Rgb => "RGB color",
            Self::White => "white value",
            Self::ColorTemperature => "color temperature",
            Self::ColdWhite => "cold white",
            Self::WarmWhite => "warm white",
            Self::ColdWarmWhite => "cold/warm white",
            Self::Transition => "transition",
        }
    }
}

/// Non-fatal problem found while validating a call.
///
/// The offending attribute is dropped or clamped and the rest of the call
/// still applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallWarning {
    /// The light cannot drive this attribute
    Unsupported(Attribute),
    /// Value was outside `[0, 1]` and has been clamped
    OutOfRange(Attribute, f32),
    /// The light does not support the requested color mode
    UnsupportedColorMode(ColorMode),
    /// Flash of zero length requested
    ZeroFlashLength,
    /// Effect index beyond the registered effects
    InvalidEffectIndex(u32),
    /// No effect registered under the requested name
    UnknownEffect,
    /// Effect and transition or flash requested together
    EffectWithTransition,
    /// Flash and transition requested together
    FlashWithTransition,
    /// Effect requested while turning the light off
    EffectWhileTurningOff,
}

impl fmt::Display for CallWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(attribute) => write!(f, "{} not supported", attribute.as_str()),
            Self::OutOfRange(attribute, value) => {
                write!(f, "{} {} out of range", attribute.as_str(), value)
            }
            Self::UnsupportedColorMode(mode) => {
                write!(f, "color mode {} not supported", mode.as_str())
            }
            Self::ZeroFlashLength => write!(f, "flash length must be greater than zero"),
            Self::InvalidEffectIndex(index) => write!(f, "invalid effect index {}", index),
            Self::UnknownEffect => write!(f, "unknown effect name"),
            Self::EffectWithTransition => {
                write!(f, "effect cannot be combined with transition or flash")
            }
            Self::FlashWithTransition => write!(f, "flash cannot be combined with transition"),
            Self::EffectWhileTurningOff => write!(f, "cannot start effect when turning off"),
        }
    }
}

/// How a call was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallAction {
    Flash,
    Transition,
    Effect,
    Instant,
}

/// Outcome of [`LightCall::perform`]
#[derive(Debug, Clone)]
pub struct CallReport {
    pub action: CallAction,
    /// Validated target values
    pub values: ColorValues,
    pub warnings: CallWarnings,
}

impl CallReport {
    pub fn has_warning(&self, warning: &CallWarning) -> bool {
        self.warnings.contains(warning)
    }
}

/// Request to change a light.
///
/// Every attribute is optional, unset attributes keep their current value.
#[derive(Debug, Clone, PartialEq)]
pub struct LightCall {
    state: Option<bool>,
    brightness: Option<f32>,
    color_brightness: Option<f32>,
    red: Option<f32>,
    green: Option<f32>,
    blue: Option<f32>,
    white: Option<f32>,
    color_temperature: Option<f32>,
    cold_white: Option<f32>,
    warm_white: Option<f32>,
    color_mode: Option<ColorMode>,
    transition_length: Option<Duration>,
    flash_length: Option<Duration>,
    effect: Option<u32>,
    effect_name: Option<String>,
    publish: bool,
    save: bool,
}

impl Default for LightCall {
    fn default() -> Self {
        Self::new()
    }
}

impl LightCall {
    /// Call that publishes and saves the result
    pub const fn new() -> Self {
        Self {
            state: None,
            brightness: None,
            color_brightness: None,
            red: None,
            green: None,
            blue: None,
            white: None,
            color_temperature: None,
            cold_white: None,
            warm_white: None,
            color_mode: None,
            transition_length: None,
            flash_length: None,
            effect: None,
            effect_name: None,
            publish: true,
            save: true,
        }
    }

    /// Call that neither publishes nor saves, used by effects
    pub const fn internal() -> Self {
        let mut call = Self::new();
        call.publish = false;
        call.save = false;
        call
    }

    /// Turn the light on
    pub fn turn_on() -> Self {
        Self::new().with_state(true)
    }

    /// Turn the light off
    pub fn turn_off() -> Self {
        Self::new().with_state(false)
    }

    /// Flip the on/off state relative to `remote`
    pub fn toggle(remote: &ColorValues) -> Self {
        Self::new().with_state(!remote.is_on())
    }

    #[must_use]
    pub fn with_state(mut self, on: bool) -> Self {
        self.state = Some(on);
        self
    }

    #[must_use]
    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    #[must_use]
    pub fn with_color_brightness(mut self, brightness: f32) -> Self {
        self.color_brightness = Some(brightness);
        self
    }

    #[must_use]
    pub fn with_red(mut self, red: f32) -> Self {
        self.red = Some(red);
        self
    }

    #[must_use]
    pub fn with_green(mut self, green: f32) -> Self {
        self.green = Some(green);
        self
    }

    #[must_use]
    pub fn with_blue(mut self, blue: f32) -> Self {
        self.blue = Some(blue);
        self
    }

    #[must_use]
    pub fn with_rgb(self, red: f32, green: f32, blue: f32) -> Self {
        self.with_red(red).with_green(green).with_blue(blue)
    }

    #[must_use]
    pub fn with_white(mut self, white: f32) -> Self {
        self.white = Some(white);
        self
    }

    /// Color temperature in mireds
    #[must_use]
    pub fn with_color_temperature(mut self, mireds: f32) -> Self {
        self.color_temperature = Some(mireds);
        self
    }

    #[must_use]
    pub fn with_cold_white(mut self, cold_white: f32) -> Self {
        self.cold_white = Some(cold_white);
        self
    }

    #[must_use]
    pub fn with_warm_white(mut self, warm_white: f32) -> Self {
        self.warm_white = Some(warm_white);
        self
    }

    #[must_use]
    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_transition_length(mut self, length: Duration) -> Self {
        self.transition_length = Some(length);
        self
    }

    #[must_use]
    pub fn with_flash_length(mut self, length: Duration) -> Self {
        self.flash_length = Some(length);
        self
    }

    /// Select an effect by index, 0 stops the active effect
    #[must_use]
    pub fn with_effect(mut self, index: u32) -> Self {
        self.effect = Some(index);
        self
    }

    /// Select an effect by name, `"none"` stops the active effect
    #[must_use]
    pub fn with_effect_name(mut self, name: &str) -> Self {
        self.effect_name = Some(String::from(name));
        self
    }

    #[must_use]
    pub fn with_publish(mut self, publish: bool) -> Self {
        self.publish = publish;
        self
    }

    #[must_use]
    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    #[must_use]
    pub fn with_brightness_if_supported(self, traits: &LightTraits, brightness: f32) -> Self {
        if traits.supports_brightness() {
            self.with_brightness(brightness)
        } else {
            self
        }
    }

    #[must_use]
    pub fn with_rgb_if_supported(
        self,
        traits: &LightTraits,
        red: f32,
        green: f32,
        blue: f32,
    ) -> Self {
        if traits.supports_rgb() {
            self.with_rgb(red, green, blue)
        } else {
            self
        }
    }

    #[must_use]
    pub fn with_color_temperature_if_supported(self, traits: &LightTraits, mireds: f32) -> Self {
        if traits.supports_color_temperature() {
            self.with_color_temperature(mireds)
        } else {
            self
        }
    }

    #[must_use]
    pub fn with_color_mode_if_supported(self, traits: &LightTraits, mode: ColorMode) -> Self {
        if traits.supports_mode(mode) {
            self.with_color_mode(mode)
        } else {
            self
        }
    }

    #[must_use]
    pub fn with_transition_length_if_supported(
        self,
        traits: &LightTraits,
        length: Duration,
    ) -> Self {
        if traits.supports_brightness() {
            self.with_transition_length(length)
        } else {
            self
        }
    }

    /// Request every attribute of `values` the light supports
    #[must_use]
    pub fn with_values(mut self, values: &ColorValues, traits: &LightTraits) -> Self {
        self.state = Some(values.is_on());
        if values.color_mode() != ColorMode::Unknown && traits.supports_mode(values.color_mode()) {
            self.color_mode = Some(values.color_mode());
        }
        if traits.supports_brightness() {
            self.brightness = Some(values.brightness());
        }
        if traits.supports_rgb() {
            self.color_brightness = Some(values.color_brightness());
            self.red = Some(values.red());
            self.green = Some(values.green());
            self.blue = Some(values.blue());
        }
        if traits.supports_white_value() {
            self.white = Some(values.white());
        }
        if traits.supports_color_temperature() {
            self.color_temperature = Some(values.color_temperature());
        }
        if traits.supports_cold_warm_white() {
            self.cold_white = Some(values.cold_white());
            self.warm_white = Some(values.warm_white());
        }
        self
    }

    pub const fn state(&self) -> Option<bool> {
        self.state
    }

    pub const fn brightness(&self) -> Option<f32> {
        self.brightness
    }

    /// Requested red, green and blue channels
    pub const fn rgb(&self) -> (Option<f32>, Option<f32>, Option<f32>) {
        (self.red, self.green, self.blue)
    }

    pub const fn white(&self) -> Option<f32> {
        self.white
    }

    pub const fn color_temperature(&self) -> Option<f32> {
        self.color_temperature
    }

    pub const fn color_mode(&self) -> Option<ColorMode> {
        self.color_mode
    }

    pub const fn transition_length(&self) -> Option<Duration> {
        self.transition_length
    }

    pub const fn flash_length(&self) -> Option<Duration> {
        self.flash_length
    }

    pub const fn effect(&self) -> Option<u32> {
        self.effect
    }

    pub const fn is_publish(&self) -> bool {
        self.publish
    }

    pub const fn is_save(&self) -> bool {
        self.save
    }

    /// Validate the call and apply it to `state`.
    pub fn perform(mut self, state: &mut LightState, now: Instant) -> CallReport {
        let mut warnings = CallWarnings::new();
        let values = self.validate(state, &mut warnings);

        let action = if let Some(length) = self.flash_length {
            state.start_flash(values, length, now);
            CallAction::Flash
        } else if let Some(length) = self.transition_length {
            if self.effect.is_some() {
                state.stop_effect();
            }
            state.start_transition(values, length, now);
            CallAction::Transition
        } else if let Some(index) = self.effect {
            state.start_effect(index);
            state.set_immediately(values, true);
            CallAction::Effect
        } else {
            state.set_immediately(values, self.publish);
            CallAction::Instant
        };

        if !matches!(action, CallAction::Transition | CallAction::Flash) {
            state.notify(LightEvent::TargetReached);
        }
        if self.publish {
            log::debug!(
                target: LOG_TARGET,
                "'{}': on={} brightness={:.3} mireds={:.1} rgb=({:.3}, {:.3}, {:.3}) white={:.3} \
                 transition={:?} flash={:?} effect={}",
                state.name(),
                values.is_on(),
                values.brightness(),
                values.color_temperature(),
                values.red(),
                values.green(),
                values.blue(),
                values.white(),
                self.transition_length.map(|l| l.as_millis()),
                self.flash_length.map(|l| l.as_millis()),
                state.effect_name(),
            );
            state.publish_state();
        }
        if self.save {
            state.save_remote_values();
        }

        CallReport {
            action,
            values,
            warnings,
        }
    }

    fn validate(&mut self, state: &LightState, warnings: &mut CallWarnings) -> ColorValues {
        let traits = *state.traits();
        let name = state.name();
        let mut warn = |warning: CallWarning| {
            log::warn!(target: LOG_TARGET, "'{}': {}", name, warning);
            let _ = warnings.push(warning);
        };

        // Drop attributes the light cannot drive
        if self.brightness.is_some() && !traits.supports_brightness() {
            warn(CallWarning::Unsupported(Attribute::Brightness));
            self.brightness = None;
        }
        if self.transition_length.is_some_and(|l| l.as_millis() != 0)
            && !traits.supports_brightness()
        {
            warn(CallWarning::Unsupported(Attribute::Transition));
            self.transition_length = None;
        }
        if self.color_brightness.is_some() && !traits.supports_rgb() {
            warn(CallWarning::Unsupported(Attribute::ColorBrightness));
            self.color_brightness = None;
        }
        if (self.red.is_some() || self.green.is_some() || self.blue.is_some())
            && !traits.supports_rgb()
        {
            warn(CallWarning::Unsupported(Attribute::Rgb));
            self.red = None;
            self.green = None;
            self.blue = None;
        }
        if self.white.is_some() && !traits.supports_white_value() {
            warn(CallWarning::Unsupported(Attribute::White));
            self.white = None;
        }
        if self.color_temperature.is_some() && !traits.supports_color_temperature() {
            warn(CallWarning::Unsupported(Attribute::ColorTemperature));
            self.color_temperature = None;
        }
        if (self.cold_white.is_some() || self.warm_white.is_some())
            && !traits.supports_cold_warm_white()
        {
            warn(CallWarning::Unsupported(Attribute::ColdWarmWhite));
            self.cold_white = None;
            self.warm_white = None;
        }
        if let Some(mode) = self.color_mode {
            if !traits.supports_mode(mode) {
                warn(CallWarning::UnsupportedColorMode(mode));
                self.color_mode = None;
            }
        }

        // Clamp unit attributes
        for (value, attribute) in [
            (&mut self.brightness, Attribute::Brightness),
            (&mut self.color_brightness, Attribute::ColorBrightness),
            (&mut self.red, Attribute::Red),
            (&mut self.green, Attribute::Green),
            (&mut self.blue, Attribute::Blue),
            (&mut self.white, Attribute::White),
            (&mut self.cold_white, Attribute::ColdWhite),
            (&mut self.warm_white, Attribute::WarmWhite),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&*v) {
                    warn(CallWarning::OutOfRange(attribute, *v));
                    *v = crate::color::clamp_unit(*v);
                }
            }
        }
        if let Some(mireds) = &mut self.color_temperature {
            if !(traits.min_mireds()..=traits.max_mireds()).contains(&*mireds) {
                warn(CallWarning::OutOfRange(Attribute::ColorTemperature, *mireds));
                *mireds = crate::color::clamp_range(
                    *mireds,
                    traits.min_mireds(),
                    traits.max_mireds(),
                );
            }
        }

        let mode = self.negotiate_color_mode(&traits, state.remote_values().color_mode());
        self.derive_cold_warm_white(mode, &traits);
        let values = self.merge(state.remote_values(), mode, &traits);

        if self.flash_length.is_some_and(|l| l.as_millis() == 0) {
            warn(CallWarning::ZeroFlashLength);
            self.flash_length = None;
        }

        if let Some(effect_name) = self.effect_name.take() {
            if effect_name.eq_ignore_ascii_case(EFFECT_NAME_NONE) {
                self.effect = Some(0);
            } else if let Some(index) = state.effect_index_by_name(&effect_name) {
                self.effect = Some(index);
            } else {
                warn(CallWarning::UnknownEffect);
            }
        }
        if self.effect == Some(state.active_effect_index()) {
            self.effect = None;
        }
        if let Some(index) = self.effect {
            if index as usize > state.effect_count() {
                warn(CallWarning::InvalidEffectIndex(index));
                self.effect = None;
            }
        }

        // Judged on the merged target. Turning off keeps its fade, the effect
        // is dealt with below
        let turning_off = !values.is_on();
        if self.effect.is_some() {
            if self.flash_length.is_some() {
                warn(CallWarning::EffectWithTransition);
                self.flash_length = None;
            }
            if self.transition_length.is_some() && !turning_off {
                warn(CallWarning::EffectWithTransition);
                self.transition_length = None;
            }
        }
        if self.flash_length.is_some() && self.transition_length.is_some() {
            warn(CallWarning::FlashWithTransition);
            self.transition_length = None;
        }

        if self.transition_length.is_none()
            && self.flash_length.is_none()
            && self.effect.is_none_or(|index| index == 0)
            && traits.supports_brightness()
        {
            self.transition_length = Some(state.default_transition_length());
        }
        if self.transition_length.is_some_and(|l| l.as_millis() == 0) {
            self.transition_length = None;
        }

        if turning_off && self.flash_length.is_none() {
            if self.effect.is_some_and(|index| index != 0) {
                warn(CallWarning::EffectWhileTurningOff);
                self.effect = None;
            }
            if self.effect.is_none() && state.active_effect_index() != 0 {
                self.effect = Some(0);
            }
        }

        if self.flash_length.is_some() {
            self.save = false;
        }

        values
    }

    /// Pick the color mode of the result.
    ///
    /// An explicit mode wins. Otherwise the current mode is kept if it covers
    /// the requested channels, else the simplest supported mode that does.
    fn negotiate_color_mode(&self, traits: &LightTraits, current: ColorMode) -> ColorMode {
        if let Some(mode) = self.color_mode {
            return mode;
        }

        let mut wanted = ColorCapability::NONE;
        if self.brightness.is_some() {
            wanted = wanted.union(ColorCapability::BRIGHTNESS);
        }
        if self.color_brightness.is_some()
            || self.red.is_some()
            || self.green.is_some()
            || self.blue.is_some()
        {
            wanted = wanted.union(ColorCapability::RGB);
        }
        if self.white.is_some() {
            wanted = wanted.union(ColorCapability::WHITE);
        }
        if self.color_temperature.is_some() {
            if traits.supports_capability(ColorCapability::COLOR_TEMPERATURE) {
                wanted = wanted.union(ColorCapability::COLOR_TEMPERATURE);
            } else {
                wanted = wanted.union(ColorCapability::COLD_WARM_WHITE);
            }
        }
        if self.cold_white.is_some() || self.warm_white.is_some() {
            wanted = wanted.union(ColorCapability::COLD_WARM_WHITE);
        }

        if traits.supports_mode(current) && current.supports(wanted) {
            return current;
        }
        traits
            .preferred_mode_for(wanted)
            .or_else(|| traits.supports_mode(current).then_some(current))
            .or_else(|| traits.first_mode())
            .unwrap_or(ColorMode::Unknown)
    }

    /// Lights with cold/warm white but no native color temperature get the
    /// temperature split into cold and warm channels
    fn derive_cold_warm_white(&mut self, mode: ColorMode, traits: &LightTraits) {
        let Some(mireds) = self.color_temperature else {
            return;
        };
        if !mode.supports(ColorCapability::COLD_WARM_WHITE)
            || mode.supports(ColorCapability::COLOR_TEMPERATURE)
            || self.cold_white.is_some()
            || self.warm_white.is_some()
        {
            return;
        }
        let (cold, warm) = white_balance(mireds, traits.min_mireds(), traits.max_mireds());
        self.cold_white = Some(cold);
        self.warm_white = Some(warm);
    }

    fn merge(&self, remote: &ColorValues, mode: ColorMode, traits: &LightTraits) -> ColorValues {
        let mut values = *remote;
        values.set_color_mode(mode);
        if let Some(on) = self.state {
            values.set_state(on);
        }
        if let Some(brightness) = self.brightness {
            values.set_brightness(brightness);
        }
        if let Some(brightness) = self.color_brightness {
            values.set_color_brightness(brightness);
        }
        if let Some(red) = self.red {
            values.set_red(red);
        }
        if let Some(green) = self.green {
            values.set_green(green);
        }
        if let Some(blue) = self.blue {
            values.set_blue(blue);
        }
        if let Some(white) = self.white {
            values.set_white(white);
        }
        if let Some(mireds) = self.color_temperature {
            values.set_color_temperature(mireds);
        }
        if let Some(cold_white) = self.cold_white {
            values.set_cold_white(cold_white);
        }
        if let Some(warm_white) = self.warm_white {
            values.set_warm_white(warm_white);
        }
        values.normalize_color();
        values.normalize(traits);
        values
    }
}
