//! Game settings
//!
//! Raw, serializable configuration. Nothing here is validated; the simulation
//! only ever sees the checked form produced by `Rules::new`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigResult;
use crate::sim::difficulty::{ARCADE_TIERS, DifficultyCaps, DifficultyTier};
use crate::sim::vocabulary::{KanaSet, ScriptMode, VocabularyEntry};

/// Bundled rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Flat one-second spawn cadence, ten escapes allowed
    Classic,
    /// Score-driven difficulty ramp, three escapes allowed
    #[default]
    Arcade,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "Classic",
            Preset::Arcade => "Arcade",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Preset::Classic),
            "arcade" => Some(Preset::Arcade),
            _ => None,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Difficulty ===
    /// Ramp, ascending by score threshold; the first tier must start at 0
    pub tiers: Vec<DifficultyTier>,
    /// Ceilings applied on top of the selected tier
    pub caps: DifficultyCaps,
    /// Relative per-kana speed jitter (0.2 = ±20%)
    pub speed_variance: f32,

    // === Scoring ===
    pub score_per_kill: u32,
    /// Escapes that end the run
    pub max_escapes: u32,

    // === Vocabulary ===
    pub kana_sets: Vec<KanaSet>,
    pub script: ScriptMode,
    /// Custom readings appended after the kana sets
    pub extra_entries: Vec<VocabularyEntry>,
    /// Chance to flip hiragana/katakana after each kill
    pub mode_switch_chance: f32,

    // === Input ===
    /// Characters accepted into the typing buffer
    pub alphabet: String,

    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Horizontal inset for spawn positions
    pub spawn_margin: f32,
    /// Vertical spawn position (negative = above the top edge)
    pub spawn_y: f32,
    /// How far below the bottom edge a kana counts as escaped
    pub miss_margin: f32,

    // === Presentation ===
    /// How long a destroyed kana lingers for its hit effect
    pub hit_effect_secs: f32,
    /// Escaped glyphs kept for the game-over screen
    pub missed_history: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tiers: ARCADE_TIERS.to_vec(),
            caps: DifficultyCaps::default(),
            speed_variance: 0.2,

            score_per_kill: SCORE_PER_KILL,
            max_escapes: 3,

            kana_sets: vec![KanaSet::Basic],
            script: ScriptMode::Both,
            extra_entries: Vec::new(),
            mode_switch_chance: 0.2,

            alphabet: DEFAULT_ALPHABET.to_string(),

            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            spawn_margin: SPAWN_MARGIN,
            spawn_y: SPAWN_Y,
            miss_margin: MISS_MARGIN,

            hit_effect_secs: 0.25,
            missed_history: 10,
        }
    }
}

impl Settings {
    /// Settings for a bundled rule set
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Arcade => Self::default(),
            Preset::Classic => Self {
                // One tier at 105 px/s ± 43% covers the old 1-2.5 px/frame range
                tiers: vec![DifficultyTier::new(0, 64, 105.0, 1.0)],
                caps: DifficultyCaps {
                    max_concurrent: 64,
                    speed: 150.0,
                },
                speed_variance: 0.43,
                max_escapes: 10,
                hit_effect_secs: 0.0,
                ..Self::default()
            },
        }
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load_from<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or broken
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.as_ref().display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("CLASSIC"), Some(Preset::Classic));
        assert_eq!(Preset::from_str("arcade"), Some(Preset::Arcade));
        assert_eq!(Preset::from_str("hard"), None);
        assert_eq!(Preset::Classic.as_str(), "Classic");
    }

    #[test]
    fn test_classic_preset() {
        let s = Settings::from_preset(Preset::Classic);
        assert_eq!(s.max_escapes, 10);
        assert_eq!(s.tiers.len(), 1);
        assert_eq!(s.tiers[0].spawn_interval, 1.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{ "max_escapes": 5, "script": "Hiragana" }"#).unwrap();
        assert_eq!(s.max_escapes, 5);
        assert_eq!(s.script, ScriptMode::Hiragana);
        assert_eq!(s.tiers, ARCADE_TIERS.to_vec());
        assert_eq!(s.alphabet, DEFAULT_ALPHABET);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            kana_sets: vec![KanaSet::Basic, KanaSet::Youon],
            extra_entries: vec![VocabularyEntry::new("neko", &["ねこ", "ネコ"])],
            ..Settings::from_preset(Preset::Classic)
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let s = Settings::load_or_default(dir.path().join("absent.json"));
        assert_eq!(s, Settings::default());
    }
}
