//! Session state and core simulation types
//!
//! Everything a single run owns lives in `GameState`: counters, the typing
//! buffer, falling kana and the spawn timer. Rules are shared and immutable.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::input::InputBuffer;
use super::random::RandomSource;
use super::rules::Rules;
use super::vocabulary::Script;
use crate::highscores::HighScores;

pub type EntityId = u32;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing falls
    Menu,
    /// Active gameplay
    Playing,
    /// Escape limit reached
    GameOver,
}

/// A falling kana
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingEntity {
    pub id: EntityId,
    pub romaji: String,
    pub glyph: String,
    pub pos: Vec2,
    /// Fall speed (pixels/s), fixed at spawn
    pub speed: f32,
    /// Destroyed by the player, waiting for its hit effect to finish
    pub resolved: bool,
    /// Seconds of hit effect left once resolved
    #[serde(default)]
    pub hit_timer: f32,
}

impl FallingEntity {
    pub fn new(id: EntityId, romaji: &str, glyph: &str, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            romaji: romaji.to_string(),
            glyph: glyph.to_string(),
            pos,
            speed,
            resolved: false,
            hit_timer: 0.0,
        }
    }

    /// Mark as destroyed; it stays visible for `effect_secs`
    pub fn resolve(&mut self, effect_secs: f32) {
        self.resolved = true;
        self.hit_timer = effect_secs;
    }

    /// Effect progress, 0 when just hit and 1 when finished
    pub fn hit_progress(&self, effect_secs: f32) -> f32 {
        if !self.resolved || effect_secs <= 0.0 {
            return 0.0;
        }
        (1.0 - self.hit_timer / effect_secs).clamp(0.0, 1.0)
    }
}

/// Something the host may want to react to (sound, flash, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Spawned { id: EntityId },
    Destroyed { id: EntityId, romaji: String },
    Escaped { id: EntityId, glyph: String },
    /// Buffer dropped because it could not become any reading
    DeadEnd { typed: String },
    TierChanged { tier: usize },
    ScriptChanged { script: Script },
    GameOver { score: u32, rank: Option<usize> },
    ReturnedToMenu,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState<R: RandomSource = Pcg32> {
    pub rules: Arc<Rules>,
    pub rng: R,
    pub phase: GamePhase,
    pub score: u32,
    pub escapes: u32,
    pub buffer: InputBuffer,
    /// Falling kana, in spawn order (ids ascending)
    pub entities: Vec<FallingEntity>,
    /// Seconds accumulated toward the next spawn
    pub spawn_timer: f32,
    /// Script new kana are drawn in
    pub script: Script,
    /// Most recent escaped glyphs, oldest first
    pub missed: VecDeque<String>,
    /// Tier index at the last tick (for change events)
    pub tier_index: usize,
    /// Seconds spent in `Playing` this run
    pub elapsed: f32,
    /// Kana destroyed this run
    pub kills: u32,
    /// Leaderboard for this process; survives restarts
    pub high_scores: HighScores,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
    /// Autopilot keystroke cadence
    pub autopilot_timer: f32,
    next_id: EntityId,
}

impl GameState<Pcg32> {
    /// Create a session on the title screen with a seeded RNG
    pub fn new(rules: Arc<Rules>, seed: u64) -> Self {
        Self::with_rng(rules, Pcg32::seed_from_u64(seed))
    }
}

impl<R: RandomSource> GameState<R> {
    pub fn with_rng(rules: Arc<Rules>, rng: R) -> Self {
        Self {
            rules,
            rng,
            phase: GamePhase::Menu,
            score: 0,
            escapes: 0,
            buffer: InputBuffer::default(),
            entities: Vec::new(),
            spawn_timer: 0.0,
            script: Script::Hiragana,
            missed: VecDeque::new(),
            tier_index: 0,
            elapsed: 0.0,
            kills: 0,
            high_scores: HighScores::new(),
            events: Vec::new(),
            autopilot_timer: 0.0,
            next_id: 1,
        }
    }

    /// Reset per-run state and enter `Playing`
    pub fn start_run(&mut self) {
        self.score = 0;
        self.escapes = 0;
        self.kills = 0;
        self.elapsed = 0.0;
        self.buffer.clear();
        self.entities.clear();
        self.missed.clear();
        self.spawn_timer = 0.0;
        self.autopilot_timer = 0.0;
        self.tier_index = 0;
        self.script = if self.rng.chance(0.5) {
            Script::Hiragana
        } else {
            Script::Katakana
        };
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Started);
        log::info!("Run started ({})", self.script.as_str());
    }

    /// Drop the run and go back to the title screen
    pub fn return_to_menu(&mut self) {
        self.buffer.clear();
        self.entities.clear();
        self.spawn_timer = 0.0;
        self.phase = GamePhase::Menu;
        self.events.push(GameEvent::ReturnedToMenu);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Kana still on screen and not yet destroyed
    pub fn live(&self) -> impl Iterator<Item = &FallingEntity> {
        self.entities.iter().filter(|e| !e.resolved)
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn entity(&self, id: EntityId) -> Option<&FallingEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Hand accumulated events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remember an escaped glyph, keeping only the newest few
    pub(super) fn record_miss(&mut self, glyph: String) {
        self.missed.push_back(glyph);
        while self.missed.len() > self.rules.missed_history {
            self.missed.pop_front();
        }
    }
}
