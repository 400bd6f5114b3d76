//! Player preferences
//!
//! Carried on the session and echoed in every snapshot. Storage lives with
//! the caller; this module only converts to and from JSON.

use serde::{Deserialize, Serialize};

/// How the player steers the paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InputScheme {
    #[default]
    Pointer,
    Keyboard,
    Gamepad,
    Touch,
}

impl InputScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputScheme::Pointer => "Pointer",
            InputScheme::Keyboard => "Keyboard",
            InputScheme::Gamepad => "Gamepad",
            InputScheme::Touch => "Touch",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pointer" | "mouse" => Some(InputScheme::Pointer),
            "keyboard" | "keys" => Some(InputScheme::Keyboard),
            "gamepad" | "controller" => Some(InputScheme::Gamepad),
            "touch" => Some(InputScheme::Touch),
            _ => None,
        }
    }

    /// Label of the launch control shown in HUD prompts
    pub fn launch_hint(&self) -> &'static str {
        match self {
            InputScheme::Pointer => "Click",
            InputScheme::Keyboard => "Space",
            InputScheme::Gamepad => "A",
            InputScheme::Touch => "Tap",
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Paddle control scheme
    pub input_scheme: InputScheme,
    /// Reduced motion (calmer audio scene swings)
    pub reduced_motion: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            input_scheme: InputScheme::Pointer,
            reduced_motion: false,
        }
    }
}

impl Preferences {
    /// Clamp volumes into range; non-finite volumes fall back to defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.master_volume = clamp_volume(self.master_volume, defaults.master_volume);
        self.sfx_volume = clamp_volume(self.sfx_volume, defaults.sfx_volume);
        self.music_volume = clamp_volume(self.music_volume, defaults.music_volume);
        self
    }

    /// Effective music volume after the master fader
    pub fn effective_music_volume(&self) -> f32 {
        self.master_volume * self.music_volume
    }

    /// Effective SFX volume after the master fader
    pub fn effective_sfx_volume(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    /// Parse preferences; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Parse preferences, falling back to defaults on malformed input
    pub fn load_or_default(json: Option<&str>) -> Self {
        if let Some(json) = json {
            match Self::from_json(json) {
                Ok(prefs) => {
                    log::info!("Loaded preferences ({})", prefs.input_scheme.as_str());
                    return prefs;
                }
                Err(e) => log::warn!("Ignoring malformed preferences: {}", e),
            }
        }

        log::info!("Using default preferences");
        Self::default()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn clamp_volume(vol: f32, fallback: f32) -> f32 {
    if vol.is_finite() {
        vol.clamp(0.0, 1.0)
    } else {
        fallback
    }
}
