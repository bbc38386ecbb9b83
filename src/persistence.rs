//! Saved light values restored at boot
//!
//! Values are stored as a fixed-size, versioned little record under a key
//! derived from the light name. Storage itself is provided by the platform
//! through [`PreferenceStore`].

use bytemuck::{Pod, Zeroable};

use crate::capability::ColorMode;
use crate::color::ColorValues;

/// Version of the record layout. Records with another version are ignored.
pub const RESTORE_RECORD_VERSION: u8 = 1;

/// Size of an encoded record in bytes
pub const RESTORE_RECORD_SIZE: usize = core::mem::size_of::<RawRestoreRecord>();

const FNV1_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV1_PRIME: u32 = 16_777_619;

/// FNV-1 hash of a string, used as the storage key of a light
pub fn fnv1_hash(value: &str) -> u32 {
    value.bytes().fold(FNV1_OFFSET_BASIS, |hash, byte| {
        hash.wrapping_mul(FNV1_PRIME) ^ u32::from(byte)
    })
}

/// Storage key of the light with the given name
pub fn preference_key(name: &str) -> u32 {
    fnv1_hash(name)
}

/// Errors that can occur while loading or saving records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Nothing saved under the key
    NotFound,
    /// Underlying storage failed
    Driver,
    /// Saved bytes could not be decoded
    InvalidData,
    /// Saved record has another layout version
    SchemaMismatch,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "no saved record"),
            Self::Driver => write!(f, "storage driver error"),
            Self::InvalidData => write!(f, "invalid saved record"),
            Self::SchemaMismatch => write!(f, "saved record version mismatch"),
        }
    }
}

/// Keyed byte storage.
pub trait PreferenceStore {
    /// Fill `buffer` with the bytes saved under `key`
    fn load(&mut self, key: u32, buffer: &mut [u8]) -> Result<(), StorageError>;

    /// Save `data` under `key`
    fn save(&mut self, key: u32, data: &[u8]) -> Result<(), StorageError>;
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct RawRestoreRecord {
    version: u8,
    state: u8,
    color_mode: u8,
    reserved: u8,
    brightness: f32,
    color_brightness: f32,
    red: f32,
    green: f32,
    blue: f32,
    white: f32,
    color_temperature: f32,
    cold_white: f32,
    warm_white: f32,
    effect: u32,
}

/// Light values as saved across restarts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoreRecord {
    pub state: bool,
    pub color_mode: ColorMode,
    pub brightness: f32,
    pub color_brightness: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub white: f32,
    pub color_temperature: f32,
    pub cold_white: f32,
    pub warm_white: f32,
    /// Active effect, 0 for none
    pub effect: u32,
}

impl Default for RestoreRecord {
    fn default() -> Self {
        Self {
            state: false,
            color_mode: ColorMode::Unknown,
            brightness: 1.0,
            color_brightness: 1.0,
            red: 1.0,
            green: 1.0,
            blue: 1.0,
            white: 1.0,
            color_temperature: 1.0,
            cold_white: 1.0,
            warm_white: 1.0,
            effect: 0,
        }
    }
}

impl RestoreRecord {
    /// Default record with the given on/off state
    pub fn with_state(state: bool) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn from_values(values: &ColorValues, effect: u32) -> Self {
        Self {
            state: values.is_on(),
            color_mode: values.color_mode(),
            brightness: values.brightness(),
            color_brightness: values.color_brightness(),
            red: values.red(),
            green: values.green(),
            blue: values.blue(),
            white: values.white(),
            color_temperature: values.color_temperature(),
            cold_white: values.cold_white(),
            warm_white: values.warm_white(),
            effect,
        }
    }

    pub fn to_values(&self) -> ColorValues {
        let mut values = ColorValues::default();
        values.set_state(self.state);
        values.set_color_mode(self.color_mode);
        values.set_brightness(self.brightness);
        values.set_color_brightness(self.color_brightness);
        values.set_rgb(self.red, self.green, self.blue);
        values.set_white(self.white);
        values.set_color_temperature(self.color_temperature);
        values.set_cold_white(self.cold_white);
        values.set_warm_white(self.warm_white);
        values
    }

    pub fn encode(&self) -> [u8; RESTORE_RECORD_SIZE] {
        let raw = RawRestoreRecord {
            version: RESTORE_RECORD_VERSION,
            state: u8::from(self.state),
            color_mode: self.color_mode as u8,
            reserved: 0,
            brightness: self.brightness,
            color_brightness: self.color_brightness,
            red: self.red,
            green: self.green,
            blue: self.blue,
            white: self.white,
            color_temperature: self.color_temperature,
            cold_white: self.cold_white,
            warm_white: self.warm_white,
            effect: self.effect,
        };
        let mut bytes = [0u8; RESTORE_RECORD_SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(&raw));
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let raw: RawRestoreRecord =
            bytemuck::try_pod_read_unaligned(bytes).map_err(|_| StorageError::InvalidData)?;
        if raw.version != RESTORE_RECORD_VERSION {
            return Err(StorageError::SchemaMismatch);
        }
        let color_mode = ColorMode::from_raw(raw.color_mode).ok_or(StorageError::InvalidData)?;
        Ok(Self {
            state: raw.state != 0,
            color_mode,
            brightness: raw.brightness,
            color_brightness: raw.color_brightness,
            red: raw.red,
            green: raw.green,
            blue: raw.blue,
            white: raw.white,
            color_temperature: raw.color_temperature,
            cold_white: raw.cold_white,
            warm_white: raw.warm_white,
            effect: raw.effect,
        })
    }

    /// Load the record saved under `key`
    pub fn load(store: &mut dyn PreferenceStore, key: u32) -> Result<Self, StorageError> {
        let mut bytes = [0u8; RESTORE_RECORD_SIZE];
        store.load(key, &mut bytes)?;
        Self::decode(&bytes)
    }

    /// Save the record under `key`
    pub fn save(&self, store: &mut dyn PreferenceStore, key: u32) -> Result<(), StorageError> {
        store.save(key, &self.encode())
    }
}
