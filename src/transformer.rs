//! Time-based interpolators between light states
//!
//! A transformer owns the fade from one [`ColorValues`] to another. The
//! state machine asks it for the visible values every tick and drops it
//! once finished.

use embassy_time::{Duration, Instant};

use crate::color::ColorValues;

/// Creates the transformer used for plain transitions.
///
/// Outputs may provide their own through
/// [`crate::LightOutput::create_default_transition`].
pub type TransitionFactory = fn(ColorValues, ColorValues, Instant, Duration) -> Transformer;

/// Linear fade, the factory every output gets unless it overrides it
pub fn default_transition(
    begin: ColorValues,
    end: ColorValues,
    start_time: Instant,
    length: Duration,
) -> Transformer {
    Transformer::Transition(TransitionTransformer::new(begin, end, start_time, length))
}

/// Adjust a fade pair so on/off changes fade through brightness.
///
/// Turning on starts from the target at zero brightness, turning off fades
/// the current values to zero brightness and stays on until finished.
fn fade_pair(begin: ColorValues, end: ColorValues) -> (ColorValues, ColorValues) {
    if !begin.is_on() && end.is_on() {
        let mut start = end;
        start.set_brightness(0.0);
        return (start, end);
    }
    if begin.is_on() && !end.is_on() {
        let mut target = begin;
        target.set_brightness(0.0);
        return (begin, target);
    }
    (begin, end)
}

#[allow(clippy::cast_precision_loss)]
fn progress(start_time: Instant, length: Duration, now: Instant) -> f32 {
    let length_ms = length.as_millis();
    if length_ms == 0 {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start_time).as_millis();
    (elapsed as f32 / length_ms as f32).min(1.0)
}

/// Linear transition from the current values to a target
#[derive(Debug, Clone)]
pub struct TransitionTransformer {
    start_time: Instant,
    length: Duration,
    begin: ColorValues,
    fade_from: ColorValues,
    fade_to: ColorValues,
    end: ColorValues,
}

impl TransitionTransformer {
    pub fn new(begin: ColorValues, end: ColorValues, start_time: Instant, length: Duration) -> Self {
        let (fade_from, fade_to) = fade_pair(begin, end);
        Self {
            start_time,
            length,
            begin,
            fade_from,
            fade_to,
            end,
        }
    }

    /// Completion in `[0, 1]`
    pub fn progress(&self, now: Instant) -> f32 {
        progress(self.start_time, self.length, now)
    }

    pub fn values(&self, now: Instant) -> ColorValues {
        let completion = self.progress(now);
        if completion >= 1.0 {
            return self.end;
        }
        ColorValues::lerp(&self.fade_from, &self.fade_to, completion)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Temporary switch to a flash color, restoring the previous values afterwards
#[derive(Debug, Clone)]
pub struct FlashTransformer {
    start_time: Instant,
    length: Duration,
    fade_length: Duration,
    begin: ColorValues,
    target: ColorValues,
    restore: ColorValues,
}

impl FlashTransformer {
    /// Create a flash.
    ///
    /// `fade_length` is the fade into and out of the flash color, limited to
    /// half of the flash. Zero shows the flash color for the whole length.
    pub fn new(
        begin: ColorValues,
        target: ColorValues,
        restore: ColorValues,
        start_time: Instant,
        length: Duration,
        fade_length: Duration,
    ) -> Self {
        let half = Duration::from_millis(length.as_millis() / 2);
        Self {
            start_time,
            length,
            fade_length: fade_length.min(half),
            begin,
            target,
            restore,
        }
    }

    pub fn progress(&self, now: Instant) -> f32 {
        progress(self.start_time, self.length, now)
    }

    pub fn values(&self, now: Instant) -> ColorValues {
        let elapsed = now.saturating_duration_since(self.start_time);
        if elapsed >= self.length {
            return self.restore;
        }
        if self.fade_length.as_millis() == 0 {
            return self.target;
        }
        let fade_out_at = self.length - self.fade_length;
        if elapsed < self.fade_length {
            let (from, to) = fade_pair(self.begin, self.target);
            return ColorValues::lerp(&from, &to, progress(self.start_time, self.fade_length, now));
        }
        if elapsed >= fade_out_at {
            let (from, to) = fade_pair(self.target, self.restore);
            let completion = progress(self.start_time + fade_out_at, self.fade_length, now);
            if completion >= 1.0 {
                return self.restore;
            }
            return ColorValues::lerp(&from, &to, completion);
        }
        self.target
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start_time) >= self.length
    }
}

/// Active interpolator of a light
#[derive(Debug, Clone)]
pub enum Transformer {
    Transition(TransitionTransformer),
    Flash(FlashTransformer),
}

impl Transformer {
    /// Values to show at `now`
    pub fn values(&self, now: Instant) -> ColorValues {
        match self {
            Self::Transition(transition) => transition.values(now),
            Self::Flash(flash) => flash.values(now),
        }
    }

    /// Values reported to remote observers, always the end values
    pub fn remote_values(&self) -> ColorValues {
        self.end_values()
    }

    pub fn begin_values(&self) -> ColorValues {
        match self {
            Self::Transition(transition) => transition.begin,
            Self::Flash(flash) => flash.begin,
        }
    }

    /// Values the transformer moves towards
    pub fn target_values(&self) -> ColorValues {
        match self {
            Self::Transition(transition) => transition.end,
            Self::Flash(flash) => flash.target,
        }
    }

    /// Values the light settles on once finished
    pub fn end_values(&self) -> ColorValues {
        match self {
            Self::Transition(transition) => transition.end,
            Self::Flash(flash) => flash.restore,
        }
    }

    pub fn progress(&self, now: Instant) -> f32 {
        match self {
            Self::Transition(transition) => transition.progress(now),
            Self::Flash(flash) => flash.progress(now),
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        match self {
            Self::Transition(transition) => transition.is_finished(now),
            Self::Flash(flash) => flash.is_finished(now),
        }
    }

    /// Whether the end values must be published when finished
    pub const fn publish_at_end(&self) -> bool {
        matches!(self, Self::Flash(_))
    }
}
