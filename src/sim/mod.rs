//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only advances through `tick`
//! - Randomness only through `RandomSource`
//! - Stable iteration order (spawn order, ids ascending)
//! - No rendering or platform dependencies

pub mod difficulty;
pub mod input;
pub mod random;
pub mod rules;
pub mod state;
pub mod tick;
pub mod vocabulary;

pub use difficulty::{ARCADE_TIERS, DifficultyCaps, DifficultyController, DifficultyTier};
pub use input::{Alphabet, InputBuffer, Key, Verdict, resolve};
pub use random::{RandomSource, SequenceRandom};
pub use rules::Rules;
pub use state::{EntityId, FallingEntity, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, autopilot_key, handle_key, spawn_entity, tick};
pub use vocabulary::{KanaSet, Script, ScriptMode, Vocabulary, VocabularyEntry};
