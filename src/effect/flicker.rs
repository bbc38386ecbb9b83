use alloc::string::String;

use embassy_time::Duration;

use super::{EffectContext, LightEffect};
use crate::call::LightCall;

/// Random small deviations around the requested values.
///
/// Each step mixes the reported values with the shown ones and adds cubic
/// noise, so the light wanders close to its target.
#[derive(Debug, Clone)]
pub struct FlickerEffect {
    name: String,
    alpha: f32,
    intensity: f32,
}

impl FlickerEffect {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            alpha: 0.95,
            intensity: 0.015,
        }
    }

    /// Weight of the shown values against the reported ones
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Amplitude of the noise
    #[must_use]
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }
}

impl LightEffect for FlickerEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        let remote = *ctx.remote_values();
        let current = *ctx.current_values();
        let traits = *ctx.traits();
        let beta = 1.0 - self.alpha;
        let alpha = self.alpha;
        let intensity = self.intensity;
        let rng = ctx.rng();
        let mut mix = |target: f32, shown: f32| {
            target * beta + shown * alpha + rng.next_cubic() * intensity
        };

        let mut out = remote;
        out.set_state(true);
        out.set_brightness(mix(remote.brightness(), current.brightness()));
        out.set_red(mix(remote.red(), current.red()));
        out.set_green(mix(remote.green(), current.green()));
        out.set_blue(mix(remote.blue(), current.blue()));
        out.set_white(mix(remote.white(), current.white()));
        out.set_cold_white(mix(remote.cold_white(), current.cold_white()));
        out.set_warm_white(mix(remote.warm_white(), current.warm_white()));

        Some(
            ctx.make_call()
                .with_values(&out, &traits)
                .with_transition_length_if_supported(&traits, Duration::from_millis(0)),
        )
    }
}
