//! Light effects
//!
//! Effects run once per tick while active. They never touch the light
//! directly: [`LightEffect::apply`] returns a [`LightCall`] which the state
//! machine performs afterwards. Calls made from effects should come from
//! [`EffectContext::make_call`] so they are neither published nor saved.
//!
//! Built-in effects are stored in [`EffectSlot`]. Other effects can be
//! registered as [`EffectSlot::Custom`].

mod automation;
mod flame;
mod flicker;
mod lambda;
mod pulse;
mod random;
mod strobe;

use alloc::boxed::Box;

use embassy_time::Instant;

pub use automation::{AutomationEffect, AutomationTrigger};
pub use flame::{FlameEffect, FlameFlavor, FlickerCount, MAX_FLAME_LEVELS};
pub use flicker::FlickerEffect;
pub use lambda::{LambdaEffect, LambdaFn};
pub use pulse::PulseEffect;
pub use random::RandomEffect;
pub use strobe::{StrobeEffect, StrobeStep};

use crate::call::LightCall;
use crate::color::ColorValues;
use crate::rng::Prng;
use crate::traits::LightTraits;

/// View of the light handed to an effect while it runs
pub struct EffectContext<'a> {
    now: Instant,
    current: &'a ColorValues,
    remote: &'a ColorValues,
    traits: &'a LightTraits,
    transformer_active: bool,
    rng: &'a mut Prng,
}

impl<'a> EffectContext<'a> {
    pub fn new(
        now: Instant,
        current: &'a ColorValues,
        remote: &'a ColorValues,
        traits: &'a LightTraits,
        transformer_active: bool,
        rng: &'a mut Prng,
    ) -> Self {
        Self {
            now,
            current,
            remote,
            traits,
            transformer_active,
            rng,
        }
    }

    pub const fn now(&self) -> Instant {
        self.now
    }

    /// Values currently shown
    pub const fn current_values(&self) -> &ColorValues {
        self.current
    }

    /// Values last reported to observers
    pub const fn remote_values(&self) -> &ColorValues {
        self.remote
    }

    pub const fn traits(&self) -> &LightTraits {
        self.traits
    }

    /// Whether a transition or flash is running
    pub const fn is_transformer_active(&self) -> bool {
        self.transformer_active
    }

    pub fn rng(&mut self) -> &mut Prng {
        &mut *self.rng
    }

    /// New call that neither publishes nor saves
    pub fn make_call(&self) -> LightCall {
        LightCall::internal()
    }

    /// New internal call that turns the light on
    pub fn turn_on(&self) -> LightCall {
        LightCall::internal().with_state(true)
    }
}

/// Behavior shared by all effects
pub trait LightEffect {
    /// Name used to select the effect
    fn name(&self) -> &str;

    /// Called once when the effect is registered at setup
    fn init(&mut self, _traits: &LightTraits) {}

    /// Called when the effect becomes active
    fn start(&mut self) {}

    /// Internal start hook, calls [`LightEffect::start`] unless overridden
    fn start_internal(&mut self) {
        self.start();
    }

    /// Called when the effect stops being active
    fn stop(&mut self) {}

    /// Run one step, returning the change to perform if any
    fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall>;
}

/// Effect slot - enum containing all possible effects
pub enum EffectSlot {
    Pulse(PulseEffect),
    Random(RandomEffect),
    Flame(FlameEffect),
    Strobe(StrobeEffect),
    Flicker(FlickerEffect),
    Lambda(LambdaEffect),
    Automation(AutomationEffect),
    /// Effect provided by the firmware
    Custom(Box<dyn LightEffect>),
}

impl EffectSlot {
    fn effect(&self) -> &dyn LightEffect {
        match self {
            Self::Pulse(effect) => effect,
            Self::Random(effect) => effect,
            Self::Flame(effect) => effect,
            Self::Strobe(effect) => effect,
            Self::Flicker(effect) => effect,
            Self::Lambda(effect) => effect,
            Self::Automation(effect) => effect,
            Self::Custom(effect) => effect.as_ref(),
        }
    }

    fn effect_mut(&mut self) -> &mut dyn LightEffect {
        match self {
            Self::Pulse(effect) => effect,
            Self::Random(effect) => effect,
            Self::Flame(effect) => effect,
            Self::Strobe(effect) => effect,
            Self::Flicker(effect) => effect,
            Self::Lambda(effect) => effect,
            Self::Automation(effect) => effect,
            Self::Custom(effect) => effect.as_mut(),
        }
    }

    pub fn name(&self) -> &str {
        self.effect().name()
    }

    pub fn init(&mut self, traits: &LightTraits) {
        self.effect_mut().init(traits);
    }

    pub fn start_internal(&mut self) {
        self.effect_mut().start_internal();
    }

    pub fn stop(&mut self) {
        self.effect_mut().stop();
    }

    pub fn apply(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        self.effect_mut().apply(ctx)
    }
}

macro_rules! impl_slot_from {
    ($($variant:ident($effect:ty)),* $(,)?) => {
        $(
            impl From<$effect> for EffectSlot {
                fn from(effect: $effect) -> Self {
                    Self::$variant(effect)
                }
            }
        )*
    };
}

impl_slot_from!(
    Pulse(PulseEffect),
    Random(RandomEffect),
    Flame(FlameEffect),
    Strobe(StrobeEffect),
    Flicker(FlickerEffect),
    Lambda(LambdaEffect),
    Automation(AutomationEffect),
    Custom(Box<dyn LightEffect>),
);
