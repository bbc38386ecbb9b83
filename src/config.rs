//! Static light configuration

use embassy_time::Duration;

/// Default length of transitions when a call asks for none.
pub const DEFAULT_TRANSITION_LENGTH: Duration = Duration::from_secs(1);

/// Default seed of the effect random generator.
pub const DEFAULT_SEED: u64 = 0x5EED_11C7_0000_0001;

/// Policy applied at boot to decide the initial on/off state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreMode {
    /// Restore saved values, off if nothing saved
    #[default]
    RestoreDefaultOff,
    /// Restore saved values, on if nothing saved
    RestoreDefaultOn,
    /// Restore saved values with the on/off state flipped, off if nothing saved
    RestoreInvertedDefaultOff,
    /// Restore saved values with the on/off state flipped, on if nothing saved
    RestoreInvertedDefaultOn,
    /// Ignore saved values, always start off
    AlwaysOff,
    /// Ignore saved values, always start on
    AlwaysOn,
}

impl RestoreMode {
    /// Whether saved values are loaded at all
    pub const fn uses_saved_values(self) -> bool {
        !matches!(self, Self::AlwaysOff | Self::AlwaysOn)
    }

    /// On/off state when nothing is saved
    pub const fn default_state(self) -> bool {
        matches!(
            self,
            Self::RestoreDefaultOn | Self::RestoreInvertedDefaultOn | Self::AlwaysOn
        )
    }

    /// Whether the saved on/off state is flipped
    pub const fn is_inverted(self) -> bool {
        matches!(
            self,
            Self::RestoreInvertedDefaultOff | Self::RestoreInvertedDefaultOn
        )
    }
}

/// Configuration of a single light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    /// Light name, also the key of the saved values
    pub name: &'static str,
    /// Transition used when a call does not request one
    pub default_transition_length: Duration,
    /// Fade into and out of flashes, zero to switch instantly
    pub flash_transition_length: Duration,
    /// Gamma applied on output, zero or below to disable
    pub gamma_correct: f32,
    pub restore_mode: RestoreMode,
    /// Seed of the random generator used by effects
    pub seed: u64,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self::new("light")
    }
}

impl LightConfig {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default_transition_length: DEFAULT_TRANSITION_LENGTH,
            flash_transition_length: Duration::from_millis(0),
            gamma_correct: 0.0,
            restore_mode: RestoreMode::RestoreDefaultOff,
            seed: DEFAULT_SEED,
        }
    }

    #[must_use]
    pub const fn with_default_transition_length(mut self, length: Duration) -> Self {
        self.default_transition_length = length;
        self
    }

    #[must_use]
    pub const fn with_flash_transition_length(mut self, length: Duration) -> Self {
        self.flash_transition_length = length;
        self
    }

    #[must_use]
    pub const fn with_gamma_correct(mut self, gamma: f32) -> Self {
        self.gamma_correct = gamma;
        self
    }

    #[must_use]
    pub const fn with_restore_mode(mut self, mode: RestoreMode) -> Self {
        self.restore_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
