//! Kana Blaster - falling-kana typing game core
//!
//! Core modules:
//! - `sim`: Simulation (difficulty ramp, input matching, session state)
//! - `settings`: Serializable game configuration
//! - `highscores`: In-memory leaderboard
//! - `error`: Configuration errors

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, ConfigResult};
pub use highscores::HighScores;
pub use settings::{Preset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 720.0;
    pub const ARENA_HEIGHT: f32 = 900.0;
    /// Kana spawn between x = margin and x = width - margin
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// Kana spawn just above the visible area
    pub const SPAWN_Y: f32 = -50.0;
    /// Kana escape once fully below the bottom edge
    pub const MISS_MARGIN: f32 = 50.0;

    pub const SCORE_PER_KILL: u32 = 10;
    pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

    /// Seconds between autopilot keystrokes
    pub const AUTOPILOT_KEY_INTERVAL: f32 = 0.12;
}
