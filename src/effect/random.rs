use alloc::string::String;

use embassy_time::{Duration, Instant};

use super::{EffectContext, LightEffect};
use crate::call::LightCall;
use crate::capability::ColorCapability;

/// Fades to a random color every update interval.
///
/// Lights without color channels get a random brightness instead.
#[derive(Debug, Clone)]
pub struct RandomEffect {
    name: String,
    transition_length: Duration,
    update_interval: Duration,
    last_change: Option<Instant>,
}

impl RandomEffect {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            transition_length: Duration::from_millis(7500),
            update_interval: Duration::from_secs(10),
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
}

impl LightEffect for RandomEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) {
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

        let mode = ctx.remote_values().color_mode();
        let traits = *ctx.traits();
        let mut call = ctx.turn_on();
        let mut changed = false;

        if mode.supports(ColorCapability::RGB) {
            let rng = ctx.rng();
            let (red, green, blue) = (rng.next_f32(), rng.next_f32(), rng.next_f32());
            call = call.with_rgb(red, green, blue);
            changed = true;
        }
        if mode.supports(ColorCapability::COLOR_TEMPERATURE) {
            let span = traits.max_mireds() - traits.min_mireds();
            let mireds = traits.min_mireds() + ctx.rng().next_f32() * span;
            call = call.with_color_temperature(mireds);
            changed = true;
        }
        if !changed {
            let brightness = ctx.rng().next_f32();
            call = call.with_brightness_if_supported(&traits, brightness);
        }

        Some(call.with_transition_length_if_supported(&traits, self.transition_length))
    }
}
