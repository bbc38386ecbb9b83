//! Fixed-rate driving of a light.
//!
//! Provides portable tick pacing without async/await or platform-specific timers.
//! The caller is responsible for sleeping/waiting between ticks.

use embassy_time::{Duration, Instant};

use crate::light::{Light, LightOutput};

/// Default tick rate (60 per second).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Default tick interval based on the tick rate.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000 / DEFAULT_TICK_RATE as u64);

/// Result of a tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (may be zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Calls [`Light::tick`] at a fixed rate.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = FrameScheduler::new(light);
/// scheduler.setup(Instant::now());
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     Timer::after(result.sleep_duration).await;
/// }
/// ```
pub struct FrameScheduler<O: LightOutput> {
    light: Light<O>,
    next_frame: Instant,
    frame_duration: Duration,
}

impl<O: LightOutput> FrameScheduler<O> {
    /// Uses [`DEFAULT_TICK_INTERVAL`].
    pub fn new(light: Light<O>) -> Self {
        Self::with_frame_duration(light, DEFAULT_TICK_INTERVAL)
    }

    pub fn with_frame_duration(light: Light<O>, frame_duration: Duration) -> Self {
        Self {
            light,
            next_frame: Instant::from_millis(0),
            frame_duration,
        }
    }

    /// Restore the light and start pacing from `now`
    pub fn setup(&mut self, now: Instant) {
        self.light.setup(now);
        self.next_frame = now;
    }

    /// Tick the light once and return timing information.
    ///
    /// If more than two intervals behind, the schedule restarts from `now`
    /// instead of catching up.
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        let max_drift = self.frame_duration * 2;
        if now > self.next_frame + max_drift {
            self.next_frame = now;
        }

        self.light.tick(now);

        self.next_frame += self.frame_duration;
        let sleep_duration = self
            .next_frame
            .checked_duration_since(now)
            .unwrap_or(Duration::from_millis(0));

        FrameResult {
            next_deadline: self.next_frame,
            sleep_duration,
        }
    }

    pub fn light(&self) -> &Light<O> {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut Light<O> {
        &mut self.light
    }
}
