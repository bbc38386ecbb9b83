#![no_std]

extern crate alloc;

pub mod call;
pub mod capability;
pub mod color;
pub mod config;
pub mod effect;
pub mod events;
pub mod frame_scheduler;
pub mod gamma;
pub mod light;
pub mod persistence;
pub mod rng;
pub mod state;
pub mod traits;
pub mod transformer;

pub use call::{Attribute, CallAction, CallReport, CallWarning, LightCall};
pub use capability::{ColorCapability, ColorMode};
pub use color::{ColorValues, Rgb};
pub use config::{LightConfig, RestoreMode};
pub use effect::{EffectContext, EffectSlot, LightEffect};
pub use events::{
    LightEvent, LightEventChannel, LightEventReceiver, LightEventSender, LightIntentChannel,
    LightIntentReceiver, LightIntentSender,
};
pub use frame_scheduler::FrameScheduler;
pub use light::{Light, LightOutput};
pub use persistence::{PreferenceStore, RestoreRecord, StorageError};
pub use state::LightState;
pub use traits::LightTraits;
pub use transformer::{Transformer, TransitionFactory};

pub use embassy_time::{Duration, Instant};

/// Install the `log` backend printing over the ESP serial console
#[cfg(feature = "esp32-log")]
pub fn init_logger(level: log::LevelFilter) {
    esp_println::logger::init_logger(level);
}
