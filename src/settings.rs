//! Player preferences
//!
//! Audio levels and on-screen joystick behaviour. Kept apart from [`crate::Tuning`]
//! since none of it changes how the simulation plays out.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Joystick size presets, picked from the viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JoystickSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl JoystickSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoystickSize::Small => "Small",
            JoystickSize::Medium => "Medium",
            JoystickSize::Large => "Large",
        }
    }

    /// Preset for a viewport width in CSS pixels
    pub fn for_viewport(width: f64) -> Self {
        if width > 1024.0 {
            JoystickSize::Small
        } else if width > 768.0 {
            JoystickSize::Large
        } else {
            JoystickSize::Medium
        }
    }

    /// Outer diameter in CSS pixels
    pub fn diameter_px(&self) -> u32 {
        match self {
            JoystickSize::Small => 150,
            JoystickSize::Medium => 300,
            JoystickSize::Large => 420,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// One-shot cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Engine loop volume (0.0 - 1.0)
    pub engine_volume: f32,
    pub muted: bool,

    // === Joystick ===
    pub show_joystick: bool,
    /// Drag distance (px) before a direction registers
    pub joystick_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            engine_volume: 0.7,
            muted: false,

            show_joystick: true,
            joystick_threshold: 40.0,
        }
    }
}

impl Settings {
    /// LocalStorage key holding the player's settings JSON
    pub const STORAGE_KEY: &'static str = "fuel-rush-settings";

    /// Settings from a stored JSON blob. Missing or invalid blobs give defaults.
    pub fn from_stored(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded stored settings");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|storage| storage.get_item(Self::STORAGE_KEY).ok().flatten());
        Self::from_stored(stored.as_deref())
    }

    /// Parse settings JSON (missing fields fall back to defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        for (field, volume) in [
            ("master_volume", settings.master_volume),
            ("sfx_volume", settings.sfx_volume),
            ("engine_volume", settings.engine_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::OutOfRange {
                    field,
                    reason: format!("{volume} not within [0, 1]"),
                });
            }
        }
        if !(settings.joystick_threshold >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "joystick_threshold",
                reason: format!("{} must be >= 0", settings.joystick_threshold),
            });
        }
        Ok(settings)
    }

    /// Effective volume for one-shot cues (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective volume for the engine loop (respects mute)
    pub fn effective_engine_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.engine_volume
        }
    }
}
