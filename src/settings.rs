//! Player preferences
//!
//! Stored by the host separately from match state; the core only reads the
//! AI difficulty and the aim-assist toggle.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Computer opponent strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Aim error as a fraction of the aim distance, applied as ±half
    pub fn aim_error(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium => 0.1,
            Difficulty::Hard => 0.0,
        }
    }

    /// Seconds the AI "thinks" before shooting: (min, spread)
    pub fn think_time(&self) -> (f64, f64) {
        match self {
            Difficulty::Easy => (2.0, 1.0),
            Difficulty::Medium => (1.5, 0.5),
            Difficulty::Hard => (0.8, 0.7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    /// Board theme name, resolved by the renderer
    pub theme: String,
    /// Show the predicted striker path while aiming
    pub aim_assist: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            master_volume: 0.8,
            sfx_volume: 1.0,
            theme: "Classic Teak".to_string(),
            aim_assist: true,
        }
    }
}

impl Settings {
    /// Parse stored settings; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        log::info!("Loaded settings (difficulty {})", settings.difficulty.as_str());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Effective sound effect gain
    pub fn sfx_gain(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }
}
