#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use embassy_time::Instant;
use lumen_core::effect::{EffectContext, LightEffect};
use lumen_core::transformer::default_transition;
use lumen_core::{
    ColorMode, ColorValues, LightCall, LightConfig, LightOutput, LightState, LightTraits,
    PreferenceStore, StorageError,
};

pub fn at(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

pub fn rgb_traits() -> LightTraits {
    LightTraits::new().with_mode(ColorMode::Rgb)
}

pub fn rgbct_traits() -> LightTraits {
    LightTraits::new()
        .with_modes(&[ColorMode::Rgb, ColorMode::ColorTemperature])
        .with_mireds(153.0, 500.0)
}

pub fn state_with(config: &LightConfig, traits: LightTraits) -> LightState {
    LightState::new(config, traits, default_transition)
}

pub fn rgb_state() -> LightState {
    state_with(&LightConfig::new("test"), rgb_traits())
}

/// Values that are on at the given brightness
pub fn on_values(mode: ColorMode, brightness: f32) -> ColorValues {
    let mut values = ColorValues::default();
    values.set_color_mode(mode);
    values.set_state(true);
    values.set_brightness(brightness);
    values
}

/// Switch the light on instantly
pub fn turn_on_now(state: &mut LightState, brightness: f32) {
    let call = LightCall::new()
        .with_state(true)
        .with_brightness(brightness)
        .with_transition_length(embassy_time::Duration::from_millis(0));
    state.perform(call, at(0));
}

/// Output recording every write
pub struct TestOutput {
    pub traits: LightTraits,
    pub writes: Rc<Cell<usize>>,
    pub last: Rc<RefCell<Option<ColorValues>>>,
}

impl TestOutput {
    pub fn new(traits: LightTraits) -> Self {
        Self {
            traits,
            writes: Rc::new(Cell::new(0)),
            last: Rc::new(RefCell::new(None)),
        }
    }
}

impl LightOutput for TestOutput {
    fn traits(&self) -> LightTraits {
        self.traits
    }

    fn write_state(&mut self, state: &LightState) {
        self.writes.set(self.writes.get() + 1);
        *self.last.borrow_mut() = Some(*state.current_values());
    }
}

/// In-memory preference storage shared between lights
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub data: Rc<RefCell<HashMap<u32, Vec<u8>>>>,
}

impl PreferenceStore for MemoryStore {
    fn load(&mut self, key: u32, buffer: &mut [u8]) -> Result<(), StorageError> {
        let data = self.data.borrow();
        let bytes = data.get(&key).ok_or(StorageError::NotFound)?;
        if bytes.len() != buffer.len() {
            return Err(StorageError::InvalidData);
        }
        buffer.copy_from_slice(bytes);
        Ok(())
    }

    fn save(&mut self, key: u32, data: &[u8]) -> Result<(), StorageError> {
        self.data.borrow_mut().insert(key, data.to_vec());
        Ok(())
    }
}

/// Effect counting its lifecycle calls
pub struct CountingEffect {
    pub name: &'static str,
    pub starts: Rc<Cell<u32>>,
    pub stops: Rc<Cell<u32>>,
    pub applies: Rc<Cell<u32>>,
}

impl CountingEffect {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            starts: Rc::new(Cell::new(0)),
            stops: Rc::new(Cell::new(0)),
            applies: Rc::new(Cell::new(0)),
        }
    }
}

impl LightEffect for CountingEffect {
    fn name(&self) -> &str {
        self.name
    }

    fn start(&mut self) {
        self.starts.set(self.starts.get() + 1);
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
    }

    fn apply(&mut self, _ctx: &mut EffectContext<'_>) -> Option<LightCall> {
        self.applies.set(self.applies.get() + 1);
        None
    }
}

/// Counters of a registered counting effect
pub struct EffectCounters {
    pub starts: Rc<Cell<u32>>,
    pub stops: Rc<Cell<u32>>,
    pub applies: Rc<Cell<u32>>,
}

/// Register a counting effect and return its counters
pub fn add_counting_effect(state: &mut LightState, name: &'static str) -> EffectCounters {
    let effect = CountingEffect::new(name);
    let handle = EffectCounters {
        starts: effect.starts.clone(),
        stops: effect.stops.clone(),
        applies: effect.applies.clone(),
    };
    let boxed: Box<dyn LightEffect> = Box::new(effect);
    state.add_effect(boxed);
    handle
}
