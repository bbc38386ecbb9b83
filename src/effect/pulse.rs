use alloc::string::String;

use embassy_time::{Duration, Instant};

use super::{EffectContext, LightEffect};
use crate::call::LightCall;

/// Fades brightness back and forth between two levels
#[derive(Debug, Clone)]
pub struct PulseEffect {
    name: String,
    transition_length: Duration,
    update_interval: Duration,
    min_brightness: f32,
    max_brightness: f32,
    on: bool,
    last_change: Option<Instant>,
}

impl PulseEffect {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            transition_length: Duration::from_secs(1),
            update_interval: Duration::from_secs(1),
            min_brightness: 0.0,
            max_brightness: 1.0,
            on: false,
            last_change: None,
        }
    }

    #[must_use]
    pub fn with_transition_length(mut self, length: Duration) -> Self {
        self.transition_length = length;
        self
    }

    #[must_use]
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Brightness bounds of the pulse
    #[must_use]
    pub fn with_brightness_range(mut self, min: f32, max: f32) -> Self {
        self.min_brightness = min;
        self.max_brightness = max;
        self
    }
}

impl LightEffect for PulseEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) {
        self.on = false;
        self.last_change = None;
    }

    fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        let now = ctx.now();
        if let Some(last) = self.last_change {
            if now.saturating_duration_since(last) < self.update_interval {
                return None;
            }
        }
        self.last_change = Some(now);
        self.on = !self.on;

        let brightness = if self.on {
            self.max_brightness
        } else {
            self.min_brightness
        };
        let traits = ctx.traits();
        Some(
            ctx.turn_on()
                .with_brightness_if_supported(traits, brightness)
                .with_transition_length_if_supported(traits, self.transition_length),
        )
    }
}
