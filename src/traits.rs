//! Per-light capability descriptor

use crate::capability::{ColorCapability, ColorMode};

/// Set of supported color modes, one bit per entry of [`ColorMode::ALL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorModeSet(u16);

impl ColorModeSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn with(self, mode: ColorMode) -> Self {
        match mode.index() {
            Some(index) => Self(self.0 | (1 << index)),
            None => self,
        }
    }

    pub fn contains(self, mode: ColorMode) -> bool {
        mode.index().is_some_and(|index| self.0 & (1 << index) != 0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the modes in ascending order of richness
    pub fn iter(self) -> impl Iterator<Item = ColorMode> {
        ColorMode::ALL.into_iter().filter(move |mode| self.contains(*mode))
    }
}

/// Describes what a light output can do.
///
/// Created once from the output at setup and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightTraits {
    supported_modes: ColorModeSet,
    min_mireds: f32,
    max_mireds: f32,
}

impl LightTraits {
    pub const fn new() -> Self {
        Self {
            supported_modes: ColorModeSet::empty(),
            min_mireds: 0.0,
            max_mireds: 0.0,
        }
    }

    /// Add a supported color mode
    #[must_use]
    pub fn with_mode(mut self, mode: ColorMode) -> Self {
        self.supported_modes = self.supported_modes.with(mode);
        self
    }

    /// Add several supported color modes
    #[must_use]
    pub fn with_modes(self, modes: &[ColorMode]) -> Self {
        modes.iter().fold(self, |traits, mode| traits.with_mode(*mode))
    }

    /// Set the color temperature range in mireds
    #[must_use]
    pub const fn with_mireds(mut self, min_mireds: f32, max_mireds: f32) -> Self {
        self.min_mireds = min_mireds;
        self.max_mireds = max_mireds;
        self
    }

    pub const fn supported_modes(&self) -> ColorModeSet {
        self.supported_modes
    }

    pub fn supports_mode(&self, mode: ColorMode) -> bool {
        self.supported_modes.contains(mode)
    }

    /// Check whether any supported mode drives the given channel(s)
    pub fn supports_capability(&self, capability: ColorCapability) -> bool {
        self.supported_modes.iter().any(|mode| mode.supports(capability))
    }

    pub fn supports_brightness(&self) -> bool {
        self.supports_capability(ColorCapability::BRIGHTNESS)
    }

    pub fn supports_rgb(&self) -> bool {
        self.supports_capability(ColorCapability::RGB)
    }

    pub fn supports_white_value(&self) -> bool {
        self.supports_capability(ColorCapability::WHITE)
    }

    /// Color temperature can be set either natively or through cold/warm white
    pub fn supports_color_temperature(&self) -> bool {
        self.supports_capability(ColorCapability::COLOR_TEMPERATURE)
            || self.supports_capability(ColorCapability::COLD_WARM_WHITE)
    }

    pub fn supports_cold_warm_white(&self) -> bool {
        self.supports_capability(ColorCapability::COLD_WARM_WHITE)
    }

    pub const fn min_mireds(&self) -> f32 {
        self.min_mireds
    }

    pub const fn max_mireds(&self) -> f32 {
        self.max_mireds
    }

    /// Simplest supported mode that drives every requested channel
    pub fn preferred_mode_for(&self, capabilities: ColorCapability) -> Option<ColorMode> {
        self.supported_modes
            .iter()
            .find(|mode| mode.supports(capabilities))
    }

    /// Simplest supported mode
    pub fn first_mode(&self) -> Option<ColorMode> {
        self.supported_modes.iter().next()
    }
}
