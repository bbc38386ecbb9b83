use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use super::{EffectContext, LightEffect};
use crate::call::LightCall;

/// Externally defined action sequence driven by [`AutomationEffect`]
pub trait AutomationTrigger {
    /// Whether a previously triggered run is still in progress
    fn is_running(&self) -> bool;

    /// Start a new run
    fn trigger(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall>;

    /// Abort the current run
    fn stop(&mut self);
}

/// Re-triggers an automation whenever it is not running
pub struct AutomationEffect {
    name: String,
    trigger: Box<dyn AutomationTrigger>,
}

impl AutomationEffect {
    pub fn new(name: &str, trigger: Box<dyn AutomationTrigger>) -> Self {
        Self {
            name: String::from(name),
            trigger,
        }
    }
}

impl fmt::Debug for AutomationEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationEffect")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl LightEffect for AutomationEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn stop(&mut self) {
        self.trigger.stop();
    }

    fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        if self.trigger.is_running() {
            return None;
        }
        self.trigger.trigger(ctx)
    }
}
