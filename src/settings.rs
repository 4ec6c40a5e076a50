//! Player preferences
//!
//! Persisted separately from the player profile in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform;

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Ja,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Ja,
            Language::Ja => Language::En,
        }
    }

    /// HUD label for the current streak
    pub fn streak_label(&self) -> &'static str {
        match self {
            Language::En => "Streak",
            Language::Ja => "連勝",
        }
    }

    /// HUD label for the personal best
    pub fn best_label(&self) -> &'static str {
        match self {
            Language::En => "Best",
            Language::Ja => "最高記録",
        }
    }

    pub fn leaderboard_title(&self) -> &'static str {
        match self {
            Language::En => "Leaderboard",
            Language::Ja => "リーダーボード",
        }
    }

    /// Shown in place of an empty leaderboard
    pub fn no_records(&self) -> &'static str {
        match self {
            Language::En => "No records yet",
            Language::Ja => "まだ記録がありません",
        }
    }

    /// Prompt shown while no target is set
    pub fn target_label(&self, target: Option<crate::sim::CoinSide>) -> String {
        use crate::sim::CoinSide;
        match (self, target) {
            (Language::En, None) => "Tap or flick the coin".to_string(),
            (Language::Ja, None) => "コインをタップかフリック".to_string(),
            (Language::En, Some(side)) => format!("Target: {}", side.as_str().to_uppercase()),
            (Language::Ja, Some(CoinSide::Heads)) => "ターゲット: 表".to_string(),
            (Language::Ja, Some(CoinSide::Tails)) => "ターゲット: 裏".to_string(),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub language: Language,
    /// Reduced motion (no milestone slow motion)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.5,
            language: Language::Ja,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "coin_toss_settings";

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Parse stored settings, falling back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                let volume = settings.master_volume;
                settings.set_master_volume(volume);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (defaults when absent or native)
    pub fn load() -> Self {
        match platform::storage_get(Self::STORAGE_KEY) {
            Some(json) => {
                log::info!("Loaded settings from LocalStorage");
                Self::from_json(&json)
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            platform::storage_set(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }
}
