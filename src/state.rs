//! Light state machine
//!
//! Holds the current and remote values, the active transformer and the
//! registered effects. [`LightState::tick`] advances everything once per
//! loop iteration and reports whether the output needs a new write.

use alloc::boxed::Box;
use alloc::vec::Vec;

use embassy_time::{Duration, Instant};

use crate::call::{CallReport, LightCall};
use crate::color::{ColorValues, Rgb};
use crate::config::{LightConfig, RestoreMode};
use crate::effect::{EffectContext, EffectSlot};
use crate::events::{LightEvent, LightEventSender};
use crate::persistence::{PreferenceStore, RestoreRecord, StorageError, preference_key};
use crate::rng::Prng;
use crate::traits::LightTraits;
use crate::transformer::{FlashTransformer, Transformer, TransitionFactory};

const LOG_TARGET: &str = "light";

pub struct LightState {
    name: &'static str,
    traits: LightTraits,
    current_values: ColorValues,
    remote_values: ColorValues,
    transformer: Option<Transformer>,
    transition_factory: TransitionFactory,
    effects: Vec<EffectSlot>,
    active_effect_index: u32,
    default_transition_length: Duration,
    flash_transition_length: Duration,
    gamma_correct: f32,
    restore_mode: RestoreMode,
    store: Option<Box<dyn PreferenceStore>>,
    events: Option<LightEventSender>,
    rng: Prng,
    next_write: bool,
}

impl LightState {
    pub fn new(
        config: &LightConfig,
        traits: LightTraits,
        transition_factory: TransitionFactory,
    ) -> Self {
        Self {
            name: config.name,
            traits,
            current_values: ColorValues::default(),
            remote_values: ColorValues::default(),
            transformer: None,
            transition_factory,
            effects: Vec::new(),
            active_effect_index: 0,
            default_transition_length: config.default_transition_length,
            flash_transition_length: config.flash_transition_length,
            gamma_correct: config.gamma_correct,
            restore_mode: config.restore_mode,
            store: None,
            events: None,
            rng: Prng::new(config.seed),
            next_write: true,
        }
    }

    /// Storage for restoring values across restarts
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Queue receiving [`LightEvent`]s
    #[must_use]
    pub fn with_events(mut self, events: LightEventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Register an effect. Effects are numbered from 1 in registration order.
    pub fn add_effect(&mut self, effect: impl Into<EffectSlot>) -> u32 {
        self.effects.push(effect.into());
        u32::try_from(self.effects.len()).unwrap_or(u32::MAX)
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn traits(&self) -> &LightTraits {
        &self.traits
    }

    /// Values shown right now
    pub const fn current_values(&self) -> &ColorValues {
        &self.current_values
    }

    /// Values reported to observers, the target of any running transition
    pub const fn remote_values(&self) -> &ColorValues {
        &self.remote_values
    }

    pub const fn gamma_correct(&self) -> f32 {
        self.gamma_correct
    }

    pub const fn default_transition_length(&self) -> Duration {
        self.default_transition_length
    }

    pub const fn flash_transition_length(&self) -> Duration {
        self.flash_transition_length
    }

    pub const fn restore_mode(&self) -> RestoreMode {
        self.restore_mode
    }

    pub fn transformer(&self) -> Option<&Transformer> {
        self.transformer.as_ref()
    }

    pub const fn is_transformer_active(&self) -> bool {
        self.transformer.is_some()
    }

    /// Active effect, 0 when none
    pub const fn active_effect_index(&self) -> u32 {
        self.active_effect_index
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    pub fn effects(&self) -> &[EffectSlot] {
        &self.effects
    }

    /// Name of the active effect, `"None"` when none
    pub fn effect_name(&self) -> &str {
        self.active_effect().map_or("None", EffectSlot::name)
    }

    /// Index of the effect with the given name, case-insensitive
    pub fn effect_index_by_name(&self, name: &str) -> Option<u32> {
        self.effects
            .iter()
            .position(|effect| effect.name().eq_ignore_ascii_case(name))
            .and_then(|position| u32::try_from(position + 1).ok())
    }

    pub fn active_effect(&self) -> Option<&EffectSlot> {
        let index = usize::try_from(self.active_effect_index).ok()?;
        self.effects.get(index.checked_sub(1)?)
    }

    /// New call that publishes and saves
    pub fn make_call(&self) -> LightCall {
        LightCall::new()
    }

    /// Validate and apply a call
    pub fn perform(&mut self, call: LightCall, now: Instant) -> CallReport {
        call.perform(self, now)
    }

    pub fn current_values_as_binary(&self) -> bool {
        self.current_values.as_binary()
    }

    pub fn current_values_as_brightness(&self) -> f32 {
        self.current_values.as_brightness(self.gamma_correct)
    }

    pub fn current_values_as_rgb(&self) -> (f32, f32, f32) {
        self.current_values.as_rgb(self.gamma_correct)
    }

    pub fn current_values_as_rgbw(&self) -> (f32, f32, f32, f32) {
        self.current_values.as_rgbw(self.gamma_correct)
    }

    pub fn current_values_as_rgbww(&self) -> (f32, f32, f32, f32, f32) {
        self.current_values.as_rgbww(&self.traits, self.gamma_correct)
    }

    pub fn current_values_as_rgbct(&self) -> (f32, f32, f32, f32, f32) {
        self.current_values.as_rgbct(&self.traits, self.gamma_correct)
    }

    pub fn current_values_as_cwww(&self) -> (f32, f32) {
        self.current_values.as_cwww(&self.traits, self.gamma_correct)
    }

    pub fn current_values_as_ct(&self) -> (f32, f32) {
        self.current_values.as_ct(&self.traits, self.gamma_correct)
    }

    pub fn current_values_as_rgb8(&self) -> Rgb {
        self.current_values.as_rgb8(self.gamma_correct)
    }

    /// Initialize effects and restore the boot state.
    pub(crate) fn setup(&mut self, now: Instant) {
        for effect in &mut self.effects {
            effect.init(&self.traits);
        }

        let min_mireds = self.traits.min_mireds();
        if min_mireds > 0.0 {
            self.remote_values.set_color_temperature(min_mireds);
            self.current_values.set_color_temperature(min_mireds);
        }

        let record = self.boot_record();
        let mut call = LightCall::new().with_values(&record.to_values(), &self.traits);
        if record.state && record.effect != 0 {
            call = call.with_effect(record.effect);
        } else {
            call = call.with_transition_length(Duration::from_millis(0));
        }
        log::info!(
            target: LOG_TARGET,
            "'{}': restoring on={} effect={}",
            self.name,
            record.state,
            record.effect
        );
        call.perform(self, now);
    }

    fn boot_record(&mut self) -> RestoreRecord {
        let mode = self.restore_mode;
        if !mode.uses_saved_values() {
            return RestoreRecord::with_state(mode.default_state());
        }
        match self.load_record() {
            Ok(mut record) => {
                if mode.is_inverted() {
                    record.state = !record.state;
                }
                record
            }
            Err(err) => {
                if err != StorageError::NotFound {
                    log::warn!(
                        target: LOG_TARGET,
                        "'{}': cannot restore saved values: {}",
                        self.name,
                        err
                    );
                }
                RestoreRecord::with_state(mode.default_state())
            }
        }
    }

    fn load_record(&mut self) -> Result<RestoreRecord, StorageError> {
        let key = preference_key(self.name);
        let store = self.store.as_deref_mut().ok_or(StorageError::NotFound)?;
        RestoreRecord::load(store, key)
    }

    /// Advance effects and transformers.
    ///
    /// Returns `true` when the output must be written.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        if let Some(call) = self.apply_active_effect(now) {
            call.perform(self, now);
        }

        if let Some(transformer) = &self.transformer {
            if transformer.is_finished(now) {
                let end = transformer.end_values();
                let publish = transformer.publish_at_end();
                self.current_values = end;
                self.remote_values = end;
                self.transformer = None;
                if publish {
                    self.publish_state();
                }
                self.notify(LightEvent::TargetReached);
            } else {
                self.current_values = transformer.values(now);
                self.remote_values = transformer.remote_values();
            }
            self.next_write = true;
        }

        core::mem::take(&mut self.next_write)
    }

    fn apply_active_effect(&mut self, now: Instant) -> Option<LightCall> {
        let index = usize::try_from(self.active_effect_index).ok()?.checked_sub(1)?;
        let effect = self.effects.get_mut(index)?;
        let mut ctx = EffectContext::new(
            now,
            &self.current_values,
            &self.remote_values,
            &self.traits,
            self.transformer.is_some(),
            &mut self.rng,
        );
        effect.apply(&mut ctx)
    }

    pub(crate) fn start_transition(&mut self, target: ColorValues, length: Duration, now: Instant) {
        let transformer = (self.transition_factory)(self.current_values, target, now, length);
        self.remote_values = transformer.remote_values();
        self.transformer = Some(transformer);
        self.next_write = true;
    }

    pub(crate) fn start_flash(&mut self, target: ColorValues, length: Duration, now: Instant) {
        let restore = self
            .transformer
            .as_ref()
            .map_or(self.remote_values, Transformer::end_values);
        let flash = FlashTransformer::new(
            self.current_values,
            target,
            restore,
            now,
            length,
            self.flash_transition_length,
        );
        let transformer = Transformer::Flash(flash);
        self.remote_values = transformer.remote_values();
        self.transformer = Some(transformer);
        self.next_write = true;
    }

    /// Activate the effect with the given index, 0 only stops the active one
    pub(crate) fn start_effect(&mut self, index: u32) {
        self.stop_effect();
        if index == 0 {
            return;
        }
        let Some(position) = usize::try_from(index).ok().and_then(|i| i.checked_sub(1)) else {
            return;
        };
        if let Some(effect) = self.effects.get_mut(position) {
            log::debug!(target: LOG_TARGET, "'{}': starting effect '{}'", self.name, effect.name());
            self.active_effect_index = index;
            effect.start_internal();
        }
    }

    pub(crate) fn stop_effect(&mut self) {
        let Some(position) = usize::try_from(self.active_effect_index)
            .ok()
            .and_then(|i| i.checked_sub(1))
        else {
            return;
        };
        if let Some(effect) = self.effects.get_mut(position) {
            log::debug!(target: LOG_TARGET, "'{}': stopping effect '{}'", self.name, effect.name());
            effect.stop();
        }
        self.active_effect_index = 0;
    }

    /// Drop any transformer and show `target` right away
    pub(crate) fn set_immediately(&mut self, target: ColorValues, set_remote: bool) {
        self.transformer = None;
        self.current_values = target;
        if set_remote {
            self.remote_values = target;
        }
        self.next_write = true;
    }

    pub(crate) fn publish_state(&self) {
        self.notify(LightEvent::StateChanged(self.remote_values));
    }

    pub(crate) fn notify(&self, event: LightEvent) {
        if let Some(events) = &self.events {
            if events.try_send(event).is_err() {
                log::debug!(
                    target: LOG_TARGET,
                    "'{}': event queue full, dropping {:?}",
                    self.name,
                    event
                );
            }
        }
    }

    pub(crate) fn save_remote_values(&mut self) {
        let record = RestoreRecord::from_values(&self.remote_values, self.active_effect_index);
        let key = preference_key(self.name);
        if let Some(store) = self.store.as_deref_mut() {
            if let Err(err) = record.save(store, key) {
                log::warn!(target: LOG_TARGET, "'{}': cannot save values: {}", self.name, err);
            }
        }
    }
}
