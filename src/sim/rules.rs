//! Validated rule set
//!
//! `Rules` is the immutable, checked form of `Settings` shared by a session.

use crate::error::{ConfigError, ConfigResult};
use crate::settings::Settings;

use super::difficulty::DifficultyController;
use super::input::Alphabet;
use super::vocabulary::Vocabulary;

#[derive(Debug, Clone)]
pub struct Rules {
    pub difficulty: DifficultyController,
    pub vocabulary: Vocabulary,
    pub alphabet: Alphabet,
    pub score_per_kill: u32,
    pub max_escapes: u32,
    pub speed_variance: f32,
    pub mode_switch_chance: f32,
    pub arena_width: f32,
    pub arena_height: f32,
    pub spawn_margin: f32,
    pub spawn_y: f32,
    pub miss_margin: f32,
    pub hit_effect_secs: f32,
    pub missed_history: usize,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Rules {
    pub fn new(settings: &Settings) -> ConfigResult<Self> {
        let difficulty = DifficultyController::new(settings.tiers.clone(), settings.caps)?;
        let alphabet = Alphabet::new(&settings.alphabet)?;
        let vocabulary = Vocabulary::from_sets(&settings.kana_sets, settings.script, &settings.extra_entries)?;

        // Every reading must be typeable, otherwise its kana can never be destroyed
        for entry in vocabulary.entries() {
            if let Some(ch) = entry.romaji.chars().find(|c| !alphabet.contains(*c)) {
                return Err(ConfigError::RomajiOutsideAlphabet {
                    romaji: entry.romaji.clone(),
                    ch,
                });
            }
        }

        if settings.max_escapes == 0 {
            return Err(invalid("max_escapes", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&settings.mode_switch_chance) {
            return Err(invalid(
                "mode_switch_chance",
                format!("must be within [0, 1], got {}", settings.mode_switch_chance),
            ));
        }
        if !(0.0..1.0).contains(&settings.speed_variance) {
            return Err(invalid(
                "speed_variance",
                format!("must be within [0, 1), got {}", settings.speed_variance),
            ));
        }
        let finite_positive = |v: f32| v.is_finite() && v > 0.0;
        let finite_non_negative = |v: f32| v.is_finite() && v >= 0.0;
        if !(finite_positive(settings.arena_width) && finite_positive(settings.arena_height)) {
            return Err(invalid("arena", "width and height must be finite and positive"));
        }
        if !(finite_non_negative(settings.spawn_margin) && settings.spawn_margin * 2.0 < settings.arena_width) {
            return Err(invalid("spawn_margin", "must leave room to spawn inside the arena"));
        }
        if !finite_non_negative(settings.miss_margin) {
            return Err(invalid(
                "miss_margin",
                format!("must be finite and not negative, got {}", settings.miss_margin),
            ));
        }
        let miss_line = settings.arena_height + settings.miss_margin;
        if !(settings.spawn_y.is_finite() && settings.spawn_y < miss_line) {
            return Err(invalid(
                "spawn_y",
                format!("must be finite and above the miss line {miss_line}, got {}", settings.spawn_y),
            ));
        }
        if !finite_non_negative(settings.hit_effect_secs) {
            return Err(invalid("hit_effect_secs", "must be finite and not negative"));
        }

        Ok(Self {
            difficulty,
            vocabulary,
            alphabet,
            score_per_kill: settings.score_per_kill,
            max_escapes: settings.max_escapes,
            speed_variance: settings.speed_variance,
            mode_switch_chance: settings.mode_switch_chance,
            arena_width: settings.arena_width,
            arena_height: settings.arena_height,
            spawn_margin: settings.spawn_margin,
            spawn_y: settings.spawn_y,
            miss_margin: settings.miss_margin,
            hit_effect_secs: settings.hit_effect_secs,
            missed_history: settings.missed_history,
        })
    }

    /// Y coordinate past which a falling kana has escaped
    pub fn miss_line(&self) -> f32 {
        self.arena_height + self.miss_margin
    }
}
