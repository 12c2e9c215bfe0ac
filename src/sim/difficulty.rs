//! Difficulty ramp and spawn policy
//!
//! A tier table maps cumulative score to spawn cadence, fall speed and the
//! number of kana allowed on screen at once. Lookups are pure; the spawn timer
//! itself belongs to the session.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// One step of the difficulty ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    /// Minimum score for this tier to apply
    pub score_threshold: u32,
    /// Maximum unresolved kana on screen
    pub max_concurrent: u32,
    /// Fall speed (pixels/s)
    pub speed: f32,
    /// Seconds between spawns
    pub spawn_interval: f32,
}

impl DifficultyTier {
    pub const fn new(score_threshold: u32, max_concurrent: u32, speed: f32, spawn_interval: f32) -> Self {
        Self {
            score_threshold,
            max_concurrent,
            speed,
            spawn_interval,
        }
    }
}

/// Reference ramp: thresholds 0, 300, 700, 1200, 1800
pub const ARCADE_TIERS: [DifficultyTier; 5] = [
    DifficultyTier::new(0, 3, 70.0, 1.4),
    DifficultyTier::new(300, 4, 90.0, 1.2),
    DifficultyTier::new(700, 5, 110.0, 1.0),
    DifficultyTier::new(1200, 6, 130.0, 0.85),
    DifficultyTier::new(1800, 8, 160.0, 0.7),
];

/// Global ceilings applied after tier selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyCaps {
    pub max_concurrent: u32,
    pub speed: f32,
}

impl Default for DifficultyCaps {
    fn default() -> Self {
        Self {
            max_concurrent: 7,
            speed: 150.0,
        }
    }
}

/// Validated tier table plus caps
#[derive(Debug, Clone)]
pub struct DifficultyController {
    tiers: Vec<DifficultyTier>,
    caps: DifficultyCaps,
}

impl DifficultyController {
    /// Build a controller, rejecting tables that would make selection ambiguous
    pub fn new(tiers: Vec<DifficultyTier>, caps: DifficultyCaps) -> ConfigResult<Self> {
        let first = tiers.first().ok_or(ConfigError::EmptyTierTable)?;
        if first.score_threshold != 0 {
            return Err(ConfigError::FirstThreshold(first.score_threshold));
        }

        for pair in tiers.windows(2) {
            if pair[1].score_threshold <= pair[0].score_threshold {
                return Err(ConfigError::UnsortedTiers {
                    prev: pair[0].score_threshold,
                    next: pair[1].score_threshold,
                });
            }
        }

        for tier in &tiers {
            let reason = if tier.max_concurrent == 0 {
                Some("max_concurrent must be at least 1")
            } else if !(tier.speed > 0.0 && tier.speed.is_finite()) {
                Some("speed must be positive")
            } else if !(tier.spawn_interval > 0.0 && tier.spawn_interval.is_finite()) {
                Some("spawn_interval must be positive")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidTier {
                    threshold: tier.score_threshold,
                    reason,
                });
            }
        }

        if caps.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                field: "caps.max_concurrent",
                reason: "must be at least 1".into(),
            });
        }
        if !(caps.speed > 0.0 && caps.speed.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "caps.speed",
                reason: format!("must be positive, got {}", caps.speed),
            });
        }

        Ok(Self { tiers, caps })
    }

    pub fn tiers(&self) -> &[DifficultyTier] {
        &self.tiers
    }

    pub fn caps(&self) -> DifficultyCaps {
        self.caps
    }

    /// Index of the tier that applies at `score`
    pub fn tier_index(&self, score: u32) -> usize {
        // Thresholds are strictly ascending and the first is 0, so the
        // partition point is always >= 1.
        self.tiers
            .partition_point(|t| t.score_threshold <= score)
            .saturating_sub(1)
    }

    /// Tier for `score`, clamped to the global caps
    pub fn current_tier(&self, score: u32) -> DifficultyTier {
        let tier = self.tiers[self.tier_index(score)];
        DifficultyTier {
            max_concurrent: tier.max_concurrent.min(self.caps.max_concurrent),
            speed: tier.speed.min(self.caps.speed),
            ..tier
        }
    }

    /// Whether a new kana may spawn this tick
    pub fn should_spawn(&self, timer: f32, score: u32, live_unresolved: usize) -> bool {
        let tier = self.current_tier(score);
        timer >= tier.spawn_interval && live_unresolved < tier.max_concurrent as usize
    }
}
