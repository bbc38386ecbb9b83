//! Color capabilities and the color modes built from them
//!
//! A capability is one independently addressable output quantity. A color
//! mode is a combination of capabilities a light can drive at the same time.

/// Set of output channels, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorCapability(u8);

impl ColorCapability {
    /// No channels at all
    pub const NONE: Self = Self(0);
    /// Light can be switched on and off
    pub const ON_OFF: Self = Self(1 << 0);
    /// Master brightness can be dimmed
    pub const BRIGHTNESS: Self = Self(1 << 1);
    /// Separate white channel
    pub const WHITE: Self = Self(1 << 2);
    /// White channel with adjustable color temperature
    pub const COLOR_TEMPERATURE: Self = Self(1 << 3);
    /// Separate cold and warm white channels
    pub const COLD_WARM_WHITE: Self = Self(1 << 4);
    /// Red, green and blue channels
    pub const RGB: Self = Self(1 << 5);

    /// Raw bitmask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Combine two capability sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether every channel of `other` is present in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether no channel is present
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

const MODE_NAME_UNKNOWN: &str = "unknown";
const MODE_NAME_ON_OFF: &str = "onoff";
const MODE_NAME_BRIGHTNESS: &str = "brightness";
const MODE_NAME_WHITE: &str = "white";
const MODE_NAME_COLOR_TEMPERATURE: &str = "color_temp";
const MODE_NAME_COLD_WARM_WHITE: &str = "cwww";
const MODE_NAME_RGB: &str = "rgb";
const MODE_NAME_RGB_WHITE: &str = "rgbw";
const MODE_NAME_RGB_COLOR_TEMPERATURE: &str = "rgbct";
const MODE_NAME_RGB_COLD_WARM_WHITE: &str = "rgbww";

/// Valid channel combinations.
///
/// The discriminant of every mode is the bitmask of its capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ColorMode {
    /// No mode negotiated yet
    #[default]
    Unknown = 0,
    OnOff = 0b00_0001,
    Brightness = 0b00_0011,
    White = 0b00_0111,
    ColorTemperature = 0b00_1011,
    ColdWarmWhite = 0b01_0011,
    Rgb = 0b10_0011,
    RgbWhite = 0b10_0111,
    RgbColorTemperature = 0b10_1111,
    RgbColdWarmWhite = 0b11_0111,
}

impl ColorMode {
    /// Every negotiable mode, from the simplest to the richest
    pub const ALL: [ColorMode; 9] = [
        Self::OnOff,
        Self::Brightness,
        Self::White,
        Self::ColorTemperature,
        Self::ColdWarmWhite,
        Self::Rgb,
        Self::RgbWhite,
        Self::RgbColorTemperature,
        Self::RgbColdWarmWhite,
    ];

    pub const fn capabilities(self) -> ColorCapability {
        ColorCapability(self as u8)
    }

    /// Check whether this mode drives the given channel(s)
    pub const fn supports(self, capability: ColorCapability) -> bool {
        self.capabilities().contains(capability)
    }

    pub fn from_raw(value: u8) -> Option<Self> {
        if value == Self::Unknown as u8 {
            return Some(Self::Unknown);
        }
        Self::ALL.into_iter().find(|mode| *mode as u8 == value)
    }

    /// Position of the mode in [`ColorMode::ALL`]
    pub(crate) fn index(self) -> Option<usize> {
        Self::ALL.iter().position(|mode| *mode == self)
    }

    /// Name used by the wire adapters
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => MODE_NAME_UNKNOWN,
            Self::OnOff => MODE_NAME_ON_OFF,
            Self::Brightness => MODE_NAME_BRIGHTNESS,
            Self::White => MODE_NAME_WHITE,
            Self::ColorTemperature => MODE_NAME_COLOR_TEMPERATURE,
            Self::ColdWarmWhite => MODE_NAME_COLD_WARM_WHITE,
            Self::Rgb => MODE_NAME_RGB,
            Self::RgbWhite => MODE_NAME_RGB_WHITE,
            Self::RgbColorTemperature => MODE_NAME_RGB_COLOR_TEMPERATURE,
            Self::RgbColdWarmWhite => MODE_NAME_RGB_COLD_WARM_WHITE,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            MODE_NAME_ON_OFF => Some(Self::OnOff),
            MODE_NAME_BRIGHTNESS => Some(Self::Brightness),
            MODE_NAME_WHITE => Some(Self::White),
            MODE_NAME_COLOR_TEMPERATURE => Some(Self::ColorTemperature),
            MODE_NAME_COLD_WARM_WHITE => Some(Self::ColdWarmWhite),
            MODE_NAME_RGB => Some(Self::Rgb),
            MODE_NAME_RGB_WHITE => Some(Self::RgbWhite),
            MODE_NAME_RGB_COLOR_TEMPERATURE => Some(Self::RgbColorTemperature),
            MODE_NAME_RGB_COLD_WARM_WHITE => Some(Self::RgbColdWarmWhite),
            _ => None,
        }
    }
}
