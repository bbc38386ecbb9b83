use alloc::string::String;
use alloc::vec::Vec;

use embassy_time::{Duration, Instant};

use super::{EffectContext, LightEffect};
use crate::call::LightCall;
use crate::color::ColorValues;

const LOG_TARGET: &str = "strobe";

/// One color of a strobe sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrobeStep {
    pub color: ColorValues,
    /// How long the color is held
    pub duration: Duration,
    /// Fade into the color
    pub transition_length: Duration,
}

impl StrobeStep {
    pub const fn new(color: ColorValues, duration: Duration) -> Self {
        Self {
            color,
            duration,
            transition_length: Duration::from_millis(0),
        }
    }

    #[must_use]
    pub const fn with_transition_length(mut self, length: Duration) -> Self {
        self.transition_length = length;
        self
    }
}

/// Cycles through a list of colors
#[derive(Debug, Clone)]
pub struct StrobeEffect {
    name: String,
    steps: Vec<StrobeStep>,
    looping: bool,
    at_step: Option<usize>,
    last_switch: Instant,
    finished: bool,
}

impl StrobeEffect {
    /// Strobe alternating full brightness and off every half second
    pub fn new(name: &str) -> Self {
        let mut on = ColorValues::default();
        on.set_state(true);
        on.set_brightness(1.0);
        let off = ColorValues::default();

        let half_second = Duration::from_millis(500);
        Self::with_steps(
            name,
            alloc::vec![StrobeStep::new(on, half_second), StrobeStep::new(off, half_second)],
        )
    }

    pub fn with_steps(name: &str, steps: Vec<StrobeStep>) -> Self {
        Self {
            name: String::from(name),
            steps,
            looping: true,
            at_step: None,
            last_switch: Instant::from_millis(0),
            finished: false,
        }
    }

    /// Stop on the last step instead of starting over
    #[must_use]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Index of the step currently shown
    pub fn current_step(&self) -> Option<usize> {
        self.at_step
    }
}

impl LightEffect for StrobeEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) {
        self.at_step = None;
        self.finished = false;
    }

    fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        let now = ctx.now();
        let next = match self.at_step {
            None => 0,
            Some(at) => {
                let step = self.steps.get(at)?;
                if now.saturating_duration_since(self.last_switch) < step.duration {
                    return None;
                }
                if at + 1 < self.steps.len() {
                    at + 1
                } else if self.looping {
                    0
                } else {
                    if !self.finished {
                        self.finished = true;
                        log::debug!(target: LOG_TARGET, "'{}': sequence finished", self.name);
                    }
                    return None;
                }
            }
        };
        let step = *self.steps.get(next)?;
        self.at_step = Some(next);
        self.last_switch = now;

        let traits = *ctx.traits();
        let mut call = ctx.make_call().with_values(&step.color, &traits);
        if !step.color.is_on() {
            // Keep the light on and show black so the effect stays active
            call = call.with_brightness_if_supported(&traits, 0.0).with_state(true);
        }
        Some(call.with_transition_length_if_supported(&traits, step.transition_length))
    }
}
