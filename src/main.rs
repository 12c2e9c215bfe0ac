//! Kana Blaster entry point
//!
//! Native build runs a headless autopilot session. A browser host drives the
//! same `sim` API once per animation frame and once per keydown.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use kana_blaster::consts::*;
use kana_blaster::sim::{GameEvent, GamePhase, GameState, Rules, TickInput, tick};
use kana_blaster::{ConfigResult, Preset, Settings};

/// headless kana blaster session driven by the autopilot
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// run seed
    #[clap(short, long, default_value_t = 1)]
    seed: u64,

    /// bundled rules: classic or arcade
    #[clap(short, long, default_value = "arcade")]
    preset: String,

    /// JSON settings file (overrides --preset)
    #[clap(long)]
    settings: Option<PathBuf>,

    /// stop after this many simulated seconds
    #[clap(long, default_value_t = 120.0)]
    secs: f32,

    /// number of runs (restarts after each game over)
    #[clap(short, long, default_value_t = 1)]
    runs: u32,

    /// print the resolved settings as JSON and exit
    #[clap(long)]
    dump_settings: bool,
}

/// Game instance holding all state
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(rules: Arc<Rules>, seed: u64) -> Self {
        Self {
            state: GameState::new(rules, seed),
            accumulator: 0.0,
            input: TickInput {
                idle_mode: true,
                ..Default::default()
            },
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.keys.clear();
            self.input.start = false;
            self.input.restart = false;
            self.input.quit = false;
        }

        for event in self.state.drain_events() {
            match event {
                GameEvent::TierChanged { tier } => log::info!("Tier {}", tier),
                GameEvent::ScriptChanged { script } => log::info!("Script: {}", script.as_str()),
                GameEvent::Escaped { glyph, .. } => log::info!("Missed {}", glyph),
                _ => {}
            }
        }
    }
}

fn load_settings(cli: &Cli) -> ConfigResult<Settings> {
    if let Some(path) = &cli.settings {
        return Settings::load_from(path);
    }
    let preset = Preset::from_str(&cli.preset).unwrap_or_else(|| {
        log::warn!("Unknown preset '{}', using Arcade", cli.preset);
        Preset::Arcade
    });
    Ok(Settings::from_preset(preset))
}

fn main() -> ConfigResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = load_settings(&cli)?;
    if cli.dump_settings {
        println!("{}", settings.to_json()?);
        return Ok(());
    }

    let rules = match Rules::new(&settings) {
        Ok(rules) => Arc::new(rules),
        Err(e) => {
            log::warn!("Rejected settings: {}", e);
            return Err(e);
        }
    };
    log::info!(
        "Kana Blaster (native) starting: seed {}, {} kana, {} tiers",
        cli.seed,
        rules.vocabulary.len(),
        rules.difficulty.tiers().len()
    );

    let mut game = Game::new(rules, cli.seed);
    game.input.start = true;

    for run in 1..=cli.runs {
        if run > 1 {
            game.input.restart = true;
        }
        let mut sim_time = 0.0;
        while sim_time < cli.secs {
            game.update(SIM_DT);
            sim_time += SIM_DT;
            if game.state.phase == GamePhase::GameOver {
                break;
            }
        }

        let state = &game.state;
        println!(
            "run {}: score {} | kills {} | escapes {}/{} | tier {} | {:.1}s",
            run,
            state.score,
            state.kills,
            state.escapes,
            state.rules.max_escapes,
            state.tier_index,
            state.elapsed
        );
        if !state.missed.is_empty() {
            let missed: Vec<&str> = state.missed.iter().map(String::as_str).collect();
            println!("  missed: {}", missed.join(", "));
        }

        // Runs still going at the time limit are not ranked
        if state.phase == GamePhase::Playing {
            game.input.quit = true;
            game.update(SIM_DT);
            game.input.start = true;
        }
    }

    let board = &game.state.high_scores;
    if !board.is_empty() {
        println!("high scores:");
        for (i, entry) in board.entries.iter().enumerate() {
            println!(
                "  {:>2}. {:>6}  ({} kills, tier {}, {:.1}s)",
                i + 1,
                entry.score,
                entry.kills,
                entry.tier,
                entry.duration_secs
            );
        }
    }

    Ok(())
}
