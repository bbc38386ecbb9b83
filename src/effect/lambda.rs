use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use embassy_time::{Duration, Instant};

use super::{EffectContext, LightEffect};
use crate::call::LightCall;

/// User step function, the flag is set on the first run after a start
pub type LambdaFn = Box<dyn FnMut(&mut EffectContext<'_>, bool) -> Option<LightCall>>;

/// Runs a user function every update interval
pub struct LambdaEffect {
    name: String,
    update_interval: Duration,
    step: LambdaFn,
    initial_run: bool,
    last_run: Option<Instant>,
}

impl LambdaEffect {
    pub fn new(name: &str, update_interval: Duration, step: LambdaFn) -> Self {
        Self {
            name: String::from(name),
            update_interval,
            step,
            initial_run: true,
            last_run: None,
        }
    }
}

impl fmt::Debug for LambdaEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaEffect")
            .field("name", &self.name)
            .field("update_interval", &self.update_interval)
            .field("initial_run", &self.initial_run)
            .finish_non_exhaustive()
    }
}

impl LightEffect for LambdaEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) {
        self.initial_run = true;
        self.last_run = None;
    }

    fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        let now = ctx.now();
        if let Some(last) = self.last_run {
            if now.saturating_duration_since(last) < self.update_interval {
                return None;
            }
        }
        self.last_run = Some(now);
        let initial_run = core::mem::replace(&mut self.initial_run, false);
        (self.step)(ctx, initial_run)
    }
}
