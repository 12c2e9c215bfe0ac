//! Fixed timestep simulation tick
//!
//! `tick` advances falling kana, spawns new ones and counts escapes.
//! `handle_key` applies one keystroke. Both are no-ops outside `Playing`,
//! apart from the lifecycle commands carried by `TickInput`.

use std::sync::Arc;

use glam::Vec2;

use super::input::{BufferEdit, Key, Verdict, most_urgent, resolve};
use super::random::RandomSource;
use super::rules::Rules;
use super::state::{EntityId, FallingEntity, GameEvent, GamePhase, GameState};
use super::vocabulary::Script;
use crate::consts::AUTOPILOT_KEY_INTERVAL;
use crate::highscores::HighScoreEntry;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keystrokes since the last tick, in order
    pub keys: Vec<Key>,
    /// Leave the menu
    pub start: bool,
    /// Play again from the game-over screen
    pub restart: bool,
    /// Back to the menu
    pub quit: bool,
    /// Idle/demo mode - autopilot types for the player
    pub idle_mode: bool,
}

/// Advance the session by `dt` seconds
pub fn tick<R: RandomSource>(state: &mut GameState<R>, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Menu => {
            if !input.start {
                return;
            }
            state.start_run();
        }
        GamePhase::GameOver => {
            if input.restart {
                state.start_run();
            } else {
                if input.quit {
                    state.return_to_menu();
                }
                return;
            }
        }
        GamePhase::Playing => {
            if input.quit {
                state.return_to_menu();
                return;
            }
        }
    }

    for key in &input.keys {
        handle_key(state, *key);
    }

    let dt = dt.max(0.0);

    if input.idle_mode {
        state.autopilot_timer += dt;
        if state.autopilot_timer >= AUTOPILOT_KEY_INTERVAL {
            state.autopilot_timer = 0.0;
            if let Some(key) = autopilot_key(state) {
                handle_key(state, key);
            }
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    state.elapsed += dt;
    let rules = Arc::clone(&state.rules);

    // Move kana and run down hit effects
    for entity in &mut state.entities {
        if entity.resolved {
            entity.hit_timer -= dt;
        } else {
            entity.pos.y += entity.speed * dt;
        }
    }
    state.entities.retain(|e| !(e.resolved && e.hit_timer <= 0.0));

    // Spawn
    state.spawn_timer += dt;
    if rules
        .difficulty
        .should_spawn(state.spawn_timer, state.score, state.live_count())
    {
        let id = state.next_entity_id();
        let entity = spawn_entity(&rules, &mut state.rng, state.script, state.score, id);
        log::debug!("Spawned {} ({}) at x={:.0}", entity.glyph, entity.romaji, entity.pos.x);
        state.entities.push(entity);
        state.events.push(GameEvent::Spawned { id });
        state.spawn_timer = 0.0;
    }

    // Escapes
    let miss_line = rules.miss_line();
    let (escaped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.entities)
        .into_iter()
        .partition(|e| !e.resolved && e.pos.y > miss_line);
    state.entities = kept;

    for entity in escaped {
        state.escapes += 1;
        log::debug!("Escaped {} ({}/{})", entity.glyph, state.escapes, rules.max_escapes);
        state.events.push(GameEvent::Escaped {
            id: entity.id,
            glyph: entity.glyph.clone(),
        });
        state.record_miss(entity.glyph);
    }

    if state.escapes >= rules.max_escapes {
        finish_run(state);
    }
}

/// Apply one keystroke; None when the session is not accepting input
pub fn handle_key<R: RandomSource>(state: &mut GameState<R>, key: Key) -> Option<Verdict> {
    if state.phase != GamePhase::Playing {
        return None;
    }

    let edit = state.buffer.apply(key, &state.rules.alphabet);
    if edit != Some(BufferEdit::Appended) {
        // Ignored keys, backspace and clear never dead-end
        return Some(Verdict::Pending);
    }

    let verdict = resolve(state.buffer.as_str(), &state.entities, &state.rules.vocabulary);
    match verdict {
        Verdict::Matched(id) => {
            state.buffer.clear();
            destroy(state, id);
        }
        Verdict::DeadEnd => {
            let typed = state.buffer.as_str().to_string();
            log::debug!("Dead end on '{}'", typed);
            state.buffer.clear();
            state.events.push(GameEvent::DeadEnd { typed });
        }
        Verdict::Pending => {}
    }
    Some(verdict)
}

/// Create a kana for the current tier
pub fn spawn_entity(
    rules: &Rules,
    rng: &mut impl RandomSource,
    script: Script,
    score: u32,
    id: EntityId,
) -> FallingEntity {
    let entries = rules.vocabulary.entries();
    let entry = &entries[rng.index(entries.len())];

    let span = rules.arena_width - 2.0 * rules.spawn_margin;
    let x = rules.spawn_margin + rng.unit() * span;

    let tier = rules.difficulty.current_tier(score);
    let jitter = 1.0 + rules.speed_variance * (2.0 * rng.unit() - 1.0);
    let speed = (tier.speed * jitter).min(rules.difficulty.caps().speed);

    FallingEntity::new(id, &entry.romaji, entry.glyph(script), Vec2::new(x, rules.spawn_y), speed)
}

/// Next key the autopilot would press
pub fn autopilot_key<R: RandomSource>(state: &GameState<R>) -> Option<Key> {
    let typed = state.buffer.as_str();
    let target = most_urgent(state.live().filter(|e| e.romaji.starts_with(typed)));

    match target {
        Some(entity) => entity.romaji[typed.len()..].chars().next().map(Key::Char),
        None if !typed.is_empty() => Some(Key::Clear),
        None => None,
    }
}

fn destroy<R: RandomSource>(state: &mut GameState<R>, id: EntityId) {
    let effect_secs = state.rules.hit_effect_secs;
    let Some(entity) = state.entities.iter_mut().find(|e| e.id == id) else {
        return;
    };
    entity.resolve(effect_secs);
    let romaji = entity.romaji.clone();

    state.score = state.score.saturating_add(state.rules.score_per_kill);
    state.kills += 1;
    log::debug!("Destroyed {} (score {})", romaji, state.score);
    state.events.push(GameEvent::Destroyed { id, romaji });

    let switch_chance = state.rules.mode_switch_chance;
    if switch_chance > 0.0 && state.rng.chance(switch_chance) {
        state.script = state.script.toggled();
        state.events.push(GameEvent::ScriptChanged { script: state.script });
    }

    let tier = state.rules.difficulty.tier_index(state.score);
    if tier != state.tier_index {
        state.tier_index = tier;
        log::info!("Difficulty tier {} at score {}", tier, state.score);
        state.events.push(GameEvent::TierChanged { tier });
    }
}

fn finish_run<R: RandomSource>(state: &mut GameState<R>) {
    state.phase = GamePhase::GameOver;
    state.buffer.clear();

    let rank = state.high_scores.add_score(HighScoreEntry {
        score: state.score,
        kills: state.kills,
        tier: state.tier_index,
        duration_secs: state.elapsed,
    });
    log::info!(
        "Game over: score {} after {:.1}s, rank {:?}",
        state.score,
        state.elapsed,
        rank
    );
    state.events.push(GameEvent::GameOver {
        score: state.score,
        rank,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::{Preset, Settings};
    use crate::sim::random::SequenceRandom;

    fn rules_with(f: impl FnOnce(&mut Settings)) -> Arc<Rules> {
        let mut settings = Settings::default();
        f(&mut settings);
        Arc::new(Rules::new(&settings).unwrap())
    }

    /// Session in `Playing` where every random draw is 0 (kana "a", hiragana)
    fn playing(rules: Arc<Rules>) -> GameState<SequenceRandom> {
        let mut state = GameState::with_rng(rules, SequenceRandom::new([0.0]));
        tick(&mut state, &TickInput { start: true, ..Default::default() }, 0.0);
        assert_eq!(state.phase, GamePhase::Playing);
        state
    }

    fn push_entity<R: RandomSource>(state: &mut GameState<R>, romaji: &str, y: f32) -> EntityId {
        let id = state.next_entity_id();
        state
            .entities
            .push(FallingEntity::new(id, romaji, "・", Vec2::new(100.0, y), 60.0));
        id
    }

    fn keys(text: &str) -> TickInput {
        TickInput {
            keys: text.chars().map(Key::Char).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_menu_is_inert() {
        let mut state = GameState::new(rules_with(|_| {}), 1);
        for _ in 0..600 {
            tick(&mut state, &keys("a"), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.entities.is_empty());
        assert!(state.buffer.is_empty());
        assert_eq!(handle_key(&mut state, Key::Char('a')), None);
    }

    #[test]
    fn test_first_spawn_uses_first_tier() {
        let mut state = playing(rules_with(|_| {}));

        tick(&mut state, &TickInput::default(), 1.0);
        assert!(state.entities.is_empty());

        tick(&mut state, &TickInput::default(), 0.5);
        assert_eq!(state.entities.len(), 1);
        let e = &state.entities[0];
        assert_eq!(e.romaji, "a");
        assert_eq!(e.glyph, "あ");
        assert_eq!(e.pos, Vec2::new(40.0, -50.0));
        // 70 px/s with the full -20% jitter
        assert!((e.speed - 56.0).abs() < 1e-4);
        assert_eq!(state.spawn_timer, 0.0);
    }

    #[test]
    fn test_kill_frees_capacity() {
        let rules = rules_with(|s| s.mode_switch_chance = 0.0);
        let mut state = playing(rules.clone());
        let interval = rules.difficulty.current_tier(0).spawn_interval;

        for _ in 0..3 {
            tick(&mut state, &TickInput::default(), interval);
        }
        assert_eq!(state.live_count(), 3);

        // At capacity: the timer keeps running but nothing spawns
        tick(&mut state, &TickInput::default(), interval);
        assert_eq!(state.live_count(), 3);
        assert!(state.spawn_timer >= interval);

        let lowest = state.entities[0].id;
        assert_eq!(handle_key(&mut state, Key::Char('a')), Some(Verdict::Matched(lowest)));
        assert_eq!(state.score, rules.score_per_kill);
        assert_eq!(state.live_count(), 2);
        assert!(state.buffer.is_empty());
        assert!(state.entity(lowest).is_some_and(|e| e.resolved));

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.live_count(), 3);
    }

    #[test]
    fn test_multi_key_match_and_dead_end() {
        let mut state = playing(rules_with(|s| s.mode_switch_chance = 0.0));
        let near = push_entity(&mut state, "ka", 300.0);
        let far = push_entity(&mut state, "ka", 100.0);

        assert_eq!(handle_key(&mut state, Key::Char('k')), Some(Verdict::Pending));
        assert_eq!(state.buffer.as_str(), "k");
        assert_eq!(handle_key(&mut state, Key::Char('A')), Some(Verdict::Matched(near)));
        assert!(state.entity(far).is_some_and(|e| !e.resolved));

        assert_eq!(handle_key(&mut state, Key::Char('k')), Some(Verdict::Pending));
        assert_eq!(handle_key(&mut state, Key::Char('x')), Some(Verdict::DeadEnd));
        assert!(state.buffer.is_empty());
        assert!(state.drain_events().contains(&GameEvent::DeadEnd { typed: "kx".into() }));
    }

    #[test]
    fn test_backspace_and_ignored_keys_are_pending() {
        let mut state = playing(rules_with(|_| {}));
        assert_eq!(handle_key(&mut state, Key::Backspace), Some(Verdict::Pending));
        assert_eq!(handle_key(&mut state, Key::Char('7')), Some(Verdict::Pending));
        assert!(state.buffer.is_empty());

        handle_key(&mut state, Key::Char('s'));
        handle_key(&mut state, Key::Char('h'));
        assert_eq!(handle_key(&mut state, Key::Backspace), Some(Verdict::Pending));
        assert_eq!(state.buffer.as_str(), "s");
        assert_eq!(handle_key(&mut state, Key::Clear), Some(Verdict::Pending));
        assert!(state.buffer.is_empty());

        // Deleting the last character empties the buffer without a dead end
        handle_key(&mut state, Key::Char('k'));
        assert_eq!(handle_key(&mut state, Key::Backspace), Some(Verdict::Pending));
        assert!(state.buffer.is_empty());
        assert!(!state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::DeadEnd { .. })));
    }

    #[test]
    fn test_hit_effect_lingers_then_clears() {
        let mut state = playing(rules_with(|s| {
            s.hit_effect_secs = 0.25;
            s.mode_switch_chance = 0.0;
        }));
        let id = push_entity(&mut state, "a", 400.0);
        handle_key(&mut state, Key::Char('a'));

        tick(&mut state, &TickInput::default(), 0.1);
        let e = state.entity(id).unwrap();
        assert_eq!(e.pos.y, 400.0);
        assert!(e.hit_progress(0.25) > 0.0);

        tick(&mut state, &TickInput::default(), 0.2);
        assert!(state.entity(id).is_none());
    }

    #[test]
    fn test_escapes_end_the_run() {
        let rules = rules_with(|s| s.mode_switch_chance = 0.0);
        let mut state = playing(rules.clone());
        let line = rules.miss_line();

        push_entity(&mut state, "a", 200.0);
        handle_key(&mut state, Key::Char('a'));

        for _ in 0..3 {
            push_entity(&mut state, "ka", line - 1.0);
        }
        // A destroyed kana past the line is not an escape
        let hit = push_entity(&mut state, "ki", line + 10.0);
        state.entities.last_mut().unwrap().resolve(1.0);

        tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(state.escapes, 3);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.missed.len(), 3);
        assert!(state.entity(hit).is_some());

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GameOver {
            score: 10,
            rank: Some(1)
        }));
        assert_eq!(state.high_scores.top_score(), Some(10));

        // Input is inert until restart
        assert_eq!(handle_key(&mut state, Key::Char('a')), None);
        tick(&mut state, &TickInput::default(), 10.0);
        assert_eq!(state.escapes, 3);
    }

    #[test]
    fn test_restart_and_quit() {
        let mut state = playing(rules_with(|s| s.max_escapes = 1));
        push_entity(&mut state, "a", 2000.0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.is_game_over());

        tick(&mut state, &TickInput { restart: true, ..Default::default() }, 0.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.escapes, 0);
        assert_eq!(state.score, 0);
        assert!(state.entities.is_empty());
        assert!(state.missed.is_empty());

        push_entity(&mut state, "a", 2000.0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        tick(&mut state, &TickInput { quit: true, ..Default::default() }, 0.0);
        assert_eq!(state.phase, GamePhase::Menu);
    }

    #[test]
    fn test_missed_history_is_bounded() {
        let mut state = playing(rules_with(|s| {
            s.max_escapes = 50;
            s.missed_history = 2;
        }));
        for glyph in ["あ", "い", "う"] {
            let id = state.next_entity_id();
            state
                .entities
                .push(FallingEntity::new(id, "a", glyph, Vec2::new(0.0, 5000.0), 1.0));
        }
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.escapes, 3);
        assert_eq!(state.missed, ["い", "う"]);
    }

    #[test]
    fn test_script_switch_after_kill() {
        let rules = rules_with(|s| s.mode_switch_chance = 0.2);
        // start_run: 0.0 -> hiragana; kill: 0.1 < 0.2 -> switch
        let mut state = GameState::with_rng(rules, SequenceRandom::new([0.0, 0.1, 0.9]));
        state.start_run();
        assert_eq!(state.script, Script::Hiragana);

        push_entity(&mut state, "a", 10.0);
        handle_key(&mut state, Key::Char('a'));
        assert_eq!(state.script, Script::Katakana);

        push_entity(&mut state, "a", 10.0);
        handle_key(&mut state, Key::Char('a'));
        assert_eq!(state.script, Script::Katakana);
    }

    #[test]
    fn test_tier_change_event() {
        let mut state = playing(rules_with(|s| {
            s.score_per_kill = 300;
            s.mode_switch_chance = 0.0;
        }));
        push_entity(&mut state, "a", 10.0);
        handle_key(&mut state, Key::Char('a'));
        assert_eq!(state.tier_index, 1);
        assert!(state.drain_events().contains(&GameEvent::TierChanged { tier: 1 }));
    }

    #[test]
    fn test_classic_spawns_every_second() {
        let rules = Arc::new(Rules::new(&Settings::from_preset(Preset::Classic)).unwrap());
        let mut state = GameState::new(rules, 5);
        tick(&mut state, &TickInput { start: true, ..Default::default() }, 0.0);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), 1.0);
        }
        assert_eq!(state.entities.len(), 5);
        for e in &state.entities {
            assert!((40.0..=680.0).contains(&e.pos.x));
            assert!((59.0..=150.0).contains(&e.speed));
        }
    }

    #[test]
    fn test_autopilot_clears_kana() {
        let mut state = playing(rules_with(|s| s.mode_switch_chance = 0.0));
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..(20.0 / SIM_DT) as usize {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.kills > 0);
        assert_eq!(state.escapes, 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_autopilot_key_choice() {
        let mut state = playing(rules_with(|_| {}));
        push_entity(&mut state, "shi", 300.0);
        push_entity(&mut state, "ka", 100.0);
        assert_eq!(autopilot_key(&state), Some(Key::Char('s')));

        handle_key(&mut state, Key::Char('k'));
        assert_eq!(autopilot_key(&state), Some(Key::Char('a')));

        state.entities.clear();
        assert_eq!(autopilot_key(&state), Some(Key::Clear));
        state.buffer.clear();
        assert_eq!(autopilot_key(&state), None);
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed produce identical runs
        let rules = rules_with(|_| {});
        let mut state1 = GameState::new(rules.clone(), 99999);
        let mut state2 = GameState::new(rules, 99999);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        tick(&mut state1, &start, SIM_DT);
        tick(&mut state2, &start, SIM_DT);
        for _ in 0..(30.0 / SIM_DT) as usize {
            tick(&mut state1, &idle, SIM_DT);
            tick(&mut state2, &idle, SIM_DT);
        }

        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.script, state2.script);
        assert_eq!(state1.entities.len(), state2.entities.len());
        for (a, b) in state1.entities.iter().zip(&state2.entities) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.romaji, b.romaji);
            assert!((a.pos - b.pos).length() < 0.0001);
        }
    }
}
