//! Light bound to an output
//!
//! [`Light`] owns the [`LightState`] and the hardware output. It drains
//! queued calls, advances the state machine and writes the output whenever
//! the shown values change.

use embassy_time::Instant;

use crate::call::{CallReport, LightCall};
use crate::config::LightConfig;
use crate::events::LightIntentReceiver;
use crate::state::LightState;
use crate::traits::LightTraits;
use crate::transformer::{TransitionFactory, default_transition};

/// Hardware side of a light
///
/// Implement this trait to drive a concrete output. Read the values to show
/// through the `current_values_as_*` accessors of [`LightState`].
pub trait LightOutput {
    /// Describe what the output can do
    fn traits(&self) -> LightTraits;

    /// Transformer factory used for transitions
    fn create_default_transition(&self) -> TransitionFactory {
        default_transition
    }

    /// Hook to adjust the state before it is restored, e.g. to register effects
    fn setup_state(&mut self, _state: &mut LightState) {}

    /// Push the current values to the hardware
    fn write_state(&mut self, state: &LightState);
}

pub struct Light<O: LightOutput> {
    output: O,
    state: LightState,
    intents: Option<LightIntentReceiver>,
}

impl<O: LightOutput> Light<O> {
    pub fn new(output: O, config: &LightConfig) -> Self {
        let state = LightState::new(config, output.traits(), output.create_default_transition());
        Self::with_state(output, state)
    }

    /// Bind a prepared state, e.g. with storage and event queue attached
    pub fn with_state(output: O, state: LightState) -> Self {
        Self {
            output,
            state,
            intents: None,
        }
    }

    /// Queue of calls performed on the next tick
    #[must_use]
    pub fn with_intents(mut self, intents: LightIntentReceiver) -> Self {
        self.intents = Some(intents);
        self
    }

    /// Register effects, restore the boot state and write it out.
    pub fn setup(&mut self, now: Instant) {
        self.output.setup_state(&mut self.state);
        self.state.setup(now);
        self.tick(now);
    }

    /// Process queued calls, advance the state and write the output if needed
    pub fn tick(&mut self, now: Instant) {
        if let Some(intents) = &self.intents {
            while let Ok(call) = intents.try_receive() {
                call.perform(&mut self.state, now);
            }
        }
        if self.state.tick(now) {
            self.output.write_state(&self.state);
        }
    }

    /// Validate and apply a call right away
    pub fn perform(&mut self, call: LightCall, now: Instant) -> CallReport {
        call.perform(&mut self.state, now)
    }

    pub const fn state(&self) -> &LightState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LightState {
        &mut self.state
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }
}
