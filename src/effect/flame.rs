//! Candle and fireplace flicker
//!
//! The flame picks a flicker level from a probability table, then toggles
//! between a bright and a dim brightness for that level a random number of
//! times before picking the next level. A candle flickers below its
//! baseline brightness, a fireplace above it.

use alloc::string::String;
use alloc::vec::Vec;

use embassy_time::Duration;
use heapless::Vec as BoundedVec;

use super::{EffectContext, LightEffect};
use crate::call::LightCall;
use crate::capability::ColorMode;
use crate::color::{Rgb, gradient, u8_to_unit};

const LOG_TARGET: &str = "flame";

/// Maximum number of flicker levels
pub const MAX_FLAME_LEVELS: usize = 8;

/// Maximum number of flicker count rules
pub const MAX_FLICKER_COUNTS: usize = 8;

const DEFAULT_LEVEL_PROBABILITIES: [f32; 3] = [0.5, 0.3, 0.08];

const DEFAULT_FLICKER_COUNTS: [FlickerCount; 5] = [
    // Fall-through entry, its probability is not used
    FlickerCount::with_probability(0.40, 2),
    FlickerCount::with_probability(0.20, 4),
    FlickerCount::with_probability(0.10, 8),
    FlickerCount::with_probability(0.05, 10),
    FlickerCount::forced_at(3, 1),
];

/// Fallback when no flicker count rule exists
const FALLBACK_FLICKER_COUNT: u32 = 4;

/// Whether the flame flickers below or above its baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlameFlavor {
    Candle,
    Fireplace,
}

/// Rule for the number of bright/dim toggles at a new flicker level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickerCount {
    pub probability: f32,
    /// Level at which this count is always used, 0 for none
    pub force_at_level: u32,
    pub count: u32,
}

impl FlickerCount {
    pub const fn with_probability(probability: f32, count: u32) -> Self {
        Self {
            probability,
            force_at_level: 0,
            count,
        }
    }

    pub const fn forced_at(level: u32, count: u32) -> Self {
        Self {
            probability: 0.0,
            force_at_level: level,
            count,
        }
    }
}

/// Flame flicker effect, see the module docs
#[derive(Debug, Clone)]
pub struct FlameEffect {
    name: String,
    flavor: FlameFlavor,
    intensity: f32,
    custom_flicker_intensity: Option<f32>,
    transition_length: Duration,
    transition_jitter: Duration,
    colors: Vec<Rgb>,
    use_exponential_gradient: bool,
    level_probabilities: BoundedVec<f32, MAX_FLAME_LEVELS>,
    flicker_counts: BoundedVec<FlickerCount, MAX_FLICKER_COUNTS>,

    number_levels: u32,
    flicker_intensity: f32,
    initial_brightness: f32,
    baseline_brightness: f32,
    min_brightness: f32,
    max_brightness: f32,
    flicker_bright_brightness: f32,
    flicker_dim_brightness: f32,
    flicker_state: u32,
    previous_flicker_state: u32,
    flickers_left: u32,
    is_in_bright_state: bool,
    is_baseline_needed: bool,
    is_custom_color_needed: bool,
    color_mode: ColorMode,
}

impl FlameEffect {
    fn new(name: &str, flavor: FlameFlavor) -> Self {
        Self {
            name: String::from(name),
            flavor,
            intensity: 0.15,
            custom_flicker_intensity: None,
            transition_length: Duration::from_millis(90),
            transition_jitter: Duration::from_millis(40),
            colors: Vec::new(),
            use_exponential_gradient: false,
            level_probabilities: BoundedVec::new(),
            flicker_counts: BoundedVec::new(),
            number_levels: 0,
            flicker_intensity: 0.0,
            initial_brightness: 1.0,
            baseline_brightness: 1.0,
            min_brightness: 0.0,
            max_brightness: 1.0,
            flicker_bright_brightness: 1.0,
            flicker_dim_brightness: 1.0,
            flicker_state: 0,
            previous_flicker_state: 0,
            flickers_left: 0,
            is_in_bright_state: false,
            is_baseline_needed: true,
            is_custom_color_needed: true,
            color_mode: ColorMode::Unknown,
        }
    }

    /// Flame flickering below the light's brightness
    pub fn candle(name: &str) -> Self {
        Self::new(name, FlameFlavor::Candle)
    }

    /// Flame flickering above a dimmed baseline
    pub fn fireplace(name: &str) -> Self {
        Self::new(name, FlameFlavor::Fireplace)
    }

    /// Overall brightness span of the flicker
    #[must_use]
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Brightness difference between the bright and dim state of a level
    #[must_use]
    pub fn with_flicker_intensity(mut self, intensity: f32) -> Self {
        self.custom_flicker_intensity = Some(intensity);
        self
    }

    /// Base step length and the random extra added to it
    #[must_use]
    pub fn with_timing(mut self, transition_length: Duration, jitter: Duration) -> Self {
        self.transition_length = transition_length;
        self.transition_jitter = jitter;
        self
    }

    /// Colors of the flame.
    ///
    /// Two colors are blended by brightness, more are used one per level.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<Rgb>) -> Self {
        self.colors = colors;
        self
    }

    #[must_use]
    pub fn with_exponential_gradient(mut self, enabled: bool) -> Self {
        self.use_exponential_gradient = enabled;
        self
    }

    /// Probability of each flicker level, lowest level first.
    ///
    /// Entries beyond [`MAX_FLAME_LEVELS`] are ignored.
    #[must_use]
    pub fn with_level_probabilities(mut self, probabilities: &[f32]) -> Self {
        self.level_probabilities = probabilities.iter().copied().take(MAX_FLAME_LEVELS).collect();
        self
    }

    #[must_use]
    pub fn with_flicker_counts(mut self, counts: &[FlickerCount]) -> Self {
        self.flicker_counts = counts.iter().copied().take(MAX_FLICKER_COUNTS).collect();
        self
    }

    pub const fn flavor(&self) -> FlameFlavor {
        self.flavor
    }

    pub const fn baseline_brightness(&self) -> f32 {
        self.baseline_brightness
    }

    pub const fn flicker_bright_brightness(&self) -> f32 {
        self.flicker_bright_brightness
    }

    pub const fn flicker_dim_brightness(&self) -> f32 {
        self.flicker_dim_brightness
    }

    pub const fn flicker_state(&self) -> u32 {
        self.flicker_state
    }

    /// Lowest and highest brightness the flame moves between
    pub const fn brightness_range(&self) -> (f32, f32) {
        (self.min_brightness, self.max_brightness)
    }

    const fn is_baseline_dim(&self) -> bool {
        matches!(self.flavor, FlameFlavor::Fireplace)
    }

    /// Set the flicker level and compute its bright and dim brightness
    #[allow(clippy::cast_precision_loss)]
    pub fn set_flicker_brightness_levels(&mut self, level: u32) {
        self.flicker_state = level;
        if level == 0 {
            self.flicker_bright_brightness = self.baseline_brightness;
            self.flicker_dim_brightness = self.baseline_brightness;
            return;
        }
        let step = level as f32 * self.intensity / self.number_levels.max(1) as f32;
        match self.flavor {
            FlameFlavor::Candle => {
                self.flicker_bright_brightness =
                    self.baseline_brightness - step * self.initial_brightness;
                self.flicker_dim_brightness = self.flicker_bright_brightness
                    - self.flicker_intensity * self.initial_brightness;
            }
            FlameFlavor::Fireplace => {
                self.flicker_dim_brightness = self.baseline_brightness * (1.0 + step);
                self.flicker_bright_brightness =
                    self.flicker_dim_brightness + self.flicker_intensity;
            }
        }
    }

    fn set_min_max_brightness(&mut self) {
        match self.flavor {
            FlameFlavor::Candle => {
                self.max_brightness = self.baseline_brightness;
                self.min_brightness =
                    self.baseline_brightness - self.intensity * self.initial_brightness;
            }
            FlameFlavor::Fireplace => {
                self.min_brightness = self.baseline_brightness;
                self.max_brightness =
                    self.min_brightness + self.intensity * self.initial_brightness;
            }
        }
        log::debug!(
            target: LOG_TARGET,
            "'{}': brightness range {:.3}..{:.3}",
            self.name,
            self.min_brightness,
            self.max_brightness
        );
    }

    fn clamp_flicker_brightness_levels(&mut self) {
        self.flicker_bright_brightness = self.flicker_bright_brightness.clamp(0.0, 1.0);
        self.flicker_dim_brightness = self.flicker_dim_brightness.clamp(0.0, 1.0);
    }

    fn pick_level(&self, ctx: &mut EffectContext<'_>) -> u32 {
        let r = ctx.rng().next_f32();
        let mut cumulative = 0.0;
        for (index, probability) in self.level_probabilities.iter().enumerate().rev() {
            cumulative += probability;
            if r <= cumulative {
                return u32::try_from(index + 1).unwrap_or(0);
            }
        }
        0
    }

    fn determine_number_flickers(&self, ctx: &mut EffectContext<'_>) -> u32 {
        let Some(fallback) = self.flicker_counts.first() else {
            return FALLBACK_FLICKER_COUNT;
        };
        if self.flicker_state > 0 {
            if let Some(forced) = self
                .flicker_counts
                .iter()
                .find(|rule| rule.force_at_level == self.flicker_state)
            {
                return forced.count;
            }
        }

        let r = ctx.rng().next_f32();
        let mut cumulative = 0.0;
        for rule in self.flicker_counts.iter().rev() {
            if rule.probability <= 0.0 {
                continue;
            }
            cumulative += rule.probability;
            if r <= cumulative {
                return rule.count;
            }
        }
        fallback.count
    }

    fn step_length(&self, ctx: &mut EffectContext<'_>) -> Duration {
        if ctx.rng().chance(0.5) {
            self.transition_length
        } else {
            self.transition_length + self.transition_jitter
        }
    }

    /// Step length for a new level, longer for bigger level jumps
    fn transition_length_for_new_state(&self, ctx: &mut EffectContext<'_>) -> Duration {
        let delta = self.flicker_state.abs_diff(self.previous_flicker_state).max(1);
        self.step_length(ctx) * delta
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn flame_color(&self, brightness: f32) -> Option<Rgb> {
        match self.colors.as_slice() {
            [] | [_] => None,
            [from, to] => {
                let span = self.max_brightness - self.min_brightness;
                let mut amount = if span <= 0.0 {
                    0.0
                } else if self.is_baseline_dim() {
                    (brightness - self.min_brightness) / span
                } else {
                    (self.max_brightness - brightness) / span
                };
                if self.use_exponential_gradient {
                    amount = libm::powf(10.0, amount) / 10.0;
                }
                let amount = (amount.clamp(0.0, 1.0) * 255.0) as u8;
                Some(gradient(*from, *to, amount))
            }
            colors => {
                let index = usize::try_from(self.flicker_state).unwrap_or(usize::MAX);
                colors.get(index).or(colors.last()).copied()
            }
        }
    }
}

impl LightEffect for FlameEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) {
        self.is_baseline_needed = true;
        self.is_custom_color_needed = true;
        self.flickers_left = 0;
        self.flicker_state = 0;
        self.previous_flicker_state = 0;

        if self.level_probabilities.is_empty() {
            self.level_probabilities = DEFAULT_LEVEL_PROBABILITIES.into_iter().collect();
        }
        if self.flicker_counts.is_empty() {
            self.flicker_counts = DEFAULT_FLICKER_COUNTS.into_iter().collect();
        }
        self.number_levels = u32::try_from(self.level_probabilities.len()).unwrap_or(1);
        #[allow(clippy::cast_precision_loss)]
        let levels = self.number_levels.max(1) as f32;
        self.flicker_intensity = self
            .custom_flicker_intensity
            .unwrap_or(self.intensity / levels / 2.0);

        let total: f32 = self.level_probabilities.iter().sum();
        if total >= 1.0 {
            log::warn!(
                target: LOG_TARGET,
                "'{}': cumulative flicker probability {:.1}% leaves no calm time",
                self.name,
                total * 100.0
            );
        }
    }

    fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        if ctx.is_transformer_active() {
            return None;
        }
        let traits = *ctx.traits();

        if let Some(&color) = self.colors.first().filter(|_| self.is_custom_color_needed) {
            self.is_custom_color_needed = false;
            self.is_baseline_needed = false;
            self.initial_brightness = 1.0;
            self.baseline_brightness = if self.is_baseline_dim() {
                1.0 - self.intensity
            } else {
                1.0
            };
            self.color_mode = ColorMode::Rgb;
            self.set_min_max_brightness();

            return Some(
                ctx.turn_on()
                    .with_color_mode_if_supported(&traits, self.color_mode)
                    .with_brightness(self.baseline_brightness)
                    .with_rgb(u8_to_unit(color.r), u8_to_unit(color.g), u8_to_unit(color.b)),
            );
        }

        if self.is_baseline_needed {
            self.is_baseline_needed = false;
            self.baseline_brightness = ctx.current_values().brightness();
            self.initial_brightness = self.baseline_brightness;
            self.color_mode = ctx.current_values().color_mode();

            // A dim baseline needs headroom for the flicker above it
            let mut call = None;
            if self.is_baseline_dim() && self.baseline_brightness >= 1.0 - self.intensity {
                self.baseline_brightness = 1.0 - self.intensity;
                call = Some(ctx.turn_on().with_brightness(self.baseline_brightness));
            }
            self.set_min_max_brightness();
            // Flickering starts on the next pass, after a possible transition
            return call;
        }

        let new_brightness;
        let transition_length;
        if self.flickers_left > 0 {
            transition_length = self.step_length(ctx);
            new_brightness = if self.is_in_bright_state {
                self.flicker_dim_brightness
            } else {
                self.flicker_bright_brightness
            };
            self.is_in_bright_state = !self.is_in_bright_state;
        } else {
            let level = self.pick_level(ctx);
            self.set_flicker_brightness_levels(level);
            self.clamp_flicker_brightness_levels();
            self.flickers_left = self.determine_number_flickers(ctx);
            transition_length = self.transition_length_for_new_state(ctx);
            self.is_in_bright_state = ctx.rng().chance(0.5);
            new_brightness = if self.is_in_bright_state {
                self.flicker_bright_brightness
            } else {
                self.flicker_dim_brightness
            };
            self.previous_flicker_state = self.flicker_state;
        }
        self.flickers_left = self.flickers_left.saturating_sub(1);

        let mut call = ctx
            .make_call()
            .with_color_mode_if_supported(&traits, self.color_mode);
        if let Some(color) = self.flame_color(new_brightness) {
            call = call.with_rgb(u8_to_unit(color.r), u8_to_unit(color.g), u8_to_unit(color.b));
        }
        Some(
            call.with_transition_length(transition_length.max(self.transition_length))
                .with_brightness(new_brightness),
        )
    }
}
