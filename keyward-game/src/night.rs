//! Night resolution: waves, the fixed combat step and the dawn transition.
use crate::affixes::{castle_damage, tick_affix};
use crate::boss::{tick_boss_abilities, update_boss_phase};
use crate::buffs::{EFFECT_AP_BONUS, effect_total};
use crate::combat::tick_towers;
use crate::constants::{NIGHT_STEP_MS, VICTORY_DAY};
use crate::content::Content;
use crate::economy::day_tick;
use crate::enemies::sweep_defeated;
use crate::intent::IntentError;
use crate::map::GridPos;
use crate::numbers::floor_f64_to_i32;
use crate::progression::roll_daily_challenge;
use crate::spells::tick_spell_cooldowns;
use crate::state::{Enemy, GameState, NightState, Phase};
use crate::status::{speed_multiplier, tick_statuses};
use crate::summons::tick_summons;
use crate::typing::{resolve_typed_word, tick_encounter};
use crate::waves::{compose_wave, spawn_pending, total_waves};

/// End the day and start the first wave.
///
/// # Errors
///
/// Fails outside the day or while an encounter is running.
pub fn begin_night(state: &mut GameState, content: &Content) -> Result<Vec<String>, IntentError> {
    if state.phase != Phase::Day {
        return Err(IntentError::WrongPhase {
            action: "end the day",
            phase: state.phase,
        });
    }
    if state.encounter.is_some() {
        return Err(IntentError::InEncounter("end the day"));
    }
    state.phase = Phase::Night;
    state.ap = 0;
    state.night = NightState {
        total_waves: total_waves(state.day),
        ..NightState::default()
    };
    state.counters.damage_taken_tonight = 0;
    let mut events = vec![format!("Night {} falls", state.day)];
    events.push(compose_wave(state, content));
    events.extend(spawn_pending(state, content));
    Ok(events)
}

fn tick_enemy_effects(state: &mut GameState, dt_ms: u32) -> Vec<String> {
    let mut events = Vec::new();
    for enemy in &mut state.enemies {
        let dot = tick_statuses(&mut enemy.status, dt_ms);
        if dot > 0 {
            enemy.hp -= dot;
        }
        events.extend(tick_affix(enemy, dt_ms));
    }
    events
}

fn update_boss_phases(state: &mut GameState, content: &Content) -> Vec<String> {
    state
        .enemies
        .iter_mut()
        .filter_map(|enemy| update_boss_phase(enemy, content))
        .collect()
}

fn advance_one(enemy: &mut Enemy, base: GridPos, dt_ms: u32) -> bool {
    enemy.move_progress +=
        enemy.speed * speed_multiplier(&enemy.status) * f64::from(dt_ms) / 1_000.0;
    while enemy.move_progress >= 1.0 && enemy.pos != base {
        enemy.pos = enemy.pos.step_toward(base);
        enemy.move_progress -= 1.0;
    }
    enemy.pos == base
}

/// Move enemies toward the base; arrivals strike the castle and leave the field.
pub fn advance_enemies(state: &mut GameState, dt_ms: u32) -> Vec<String> {
    let base = state.map.base;
    let mut events = Vec::new();
    let mut damage = 0;
    state.enemies.retain_mut(|enemy| {
        if !advance_one(enemy, base, dt_ms) {
            return true;
        }
        let hit = castle_damage(enemy);
        damage += hit;
        events.push(format!(
            "{} #{} hits the castle for {hit}",
            enemy.kind, enemy.id
        ));
        false
    });
    state.hp -= damage;
    state.counters.damage_taken_tonight += damage;
    events
}

/// One fixed-order combat step of `dt_ms` milliseconds.
pub fn combat_step(state: &mut GameState, content: &Content, dt_ms: u32) -> Vec<String> {
    let mut events = Vec::new();
    tick_spell_cooldowns(state, u64::from(dt_ms));
    events.extend(tick_enemy_effects(state, dt_ms));
    events.extend(tick_boss_abilities(state, content, dt_ms));
    events.extend(
        tick_towers(state, content, dt_ms)
            .iter()
            .map(ToString::to_string),
    );
    events.extend(update_boss_phases(state, content));
    events.extend(tick_summons(state, content, dt_ms));
    events.extend(sweep_defeated(state, content));
    events.extend(advance_enemies(state, dt_ms));
    events.extend(spawn_pending(state, content));
    state.night.step += 1;

    if state.hp <= 0 {
        state.hp = 0;
        state.phase = Phase::GameOver;
        events.push("The castle has fallen. Game over.".to_string());
        return events;
    }
    if state.enemies.is_empty() && state.night.pending_spawns.is_empty() {
        if state.night.wave_index + 1 < state.night.total_waves {
            state.night.wave_index += 1;
            events.push(compose_wave(state, content));
            events.extend(spawn_pending(state, content));
        } else {
            events.extend(dawn(state, content));
        }
    }
    events
}

/// Close the night: victory on the final day, otherwise the next morning.
pub fn dawn(state: &mut GameState, content: &Content) -> Vec<String> {
    state.summons.clear();
    state.tower_summons.clear();
    if state.day >= VICTORY_DAY {
        state.phase = Phase::Victory;
        return vec![format!(
            "Victory! The keep has held for {} nights.",
            state.day
        )];
    }
    let mut events = vec![format!("Dawn breaks after night {}", state.day)];
    events.extend(day_tick(state, content));
    state.day += 1;
    state.phase = Phase::Day;
    state.night = NightState::default();
    state.ap = state.ap_max + floor_f64_to_i32(effect_total(state, content, EFFECT_AP_BONUS));
    events.extend(roll_daily_challenge(state, content));
    log::debug!("day {} begins with {} ap", state.day, state.ap);
    events.push(format!("Day {} begins", state.day));
    events
}

/// Type a word: strike at night or in an encounter, then let time pass.
///
/// # Errors
///
/// Fails when there is nothing to type at or the input is blank.
pub fn defend(
    state: &mut GameState,
    content: &Content,
    text: &str,
    elapsed_ms: Option<u64>,
) -> Result<Vec<String>, IntentError> {
    let elapsed = elapsed_ms.unwrap_or(0);
    if state.encounter.is_some() {
        let mut events = resolve_typed_word(state, content, text, elapsed)?;
        tick_spell_cooldowns(state, elapsed);
        events.extend(tick_encounter(state, elapsed));
        return Ok(events);
    }
    if !state.is_night() {
        return Err(IntentError::WrongPhase {
            action: "type at enemies",
            phase: state.phase,
        });
    }
    let mut events = resolve_typed_word(state, content, text, elapsed)?;
    events.extend(combat_step(state, content, NIGHT_STEP_MS));
    Ok(events)
}

/// Let one step pass without typing.
///
/// # Errors
///
/// Fails during the day outside an encounter.
pub fn wait(state: &mut GameState, content: &Content) -> Result<Vec<String>, IntentError> {
    advance_time(state, content, NIGHT_STEP_MS, "wait")
}

/// Advance by an arbitrary elapsed time (real-time frontends).
///
/// # Errors
///
/// Fails during the day outside an encounter.
pub fn tick(
    state: &mut GameState,
    content: &Content,
    delta_ms: u32,
) -> Result<Vec<String>, IntentError> {
    advance_time(state, content, delta_ms, "advance time")
}

fn advance_time(
    state: &mut GameState,
    content: &Content,
    dt_ms: u32,
    action: &'static str,
) -> Result<Vec<String>, IntentError> {
    if state.encounter.is_some() {
        tick_spell_cooldowns(state, u64::from(dt_ms));
        let mut events = tick_encounter(state, u64::from(dt_ms));
        if events.is_empty() {
            events.push("You hold your ground.".to_string());
        }
        return Ok(events);
    }
    if !state.is_night() {
        return Err(IntentError::WrongPhase {
            action,
            phase: state.phase,
        });
    }
    let mut events = combat_step(state, content, dt_ms);
    if events.is_empty() {
        events.push("Time passes.".to_string());
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::new_game;

    fn night(seed: &str) -> GameState {
        let content = Content::builtin();
        let mut state = new_game(seed, content);
        begin_night(&mut state, content).unwrap();
        state
    }

    #[test]
    fn ending_the_day_starts_wave_one() {
        let state = night("dusk");
        assert_eq!(state.phase, Phase::Night);
        assert_eq!(state.ap, 0);
        assert_eq!(state.night.total_waves, 1);
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn enemies_walk_longer_axis_first() {
        let mut state = GameState::default();
        state.map.base = GridPos::new(5, 5);
        state.enemies.push(Enemy {
            id: 1,
            pos: GridPos::new(0, 4),
            speed: 2.0,
            hp: 5,
            ..Enemy::default()
        });
        advance_enemies(&mut state, 1_000);
        assert_eq!(state.enemies[0].pos, GridPos::new(2, 4));
        advance_enemies(&mut state, 500);
        assert_eq!(state.enemies[0].pos, GridPos::new(3, 4));
        assert!((state.enemies[0].move_progress).abs() < 1e-9);
    }

    #[test]
    fn arrivals_hit_the_castle() {
        let mut state = GameState {
            hp: 10,
            ..GameState::default()
        };
        state.map.base = GridPos::new(5, 5);
        state.enemies.push(Enemy {
            id: 1,
            kind: "raider".into(),
            pos: GridPos::new(5, 4),
            speed: 1.0,
            hp: 5,
            damage: 3,
            affix: Some("explosive".into()),
            ..Enemy::default()
        });
        let events = advance_enemies(&mut state, 1_000);
        assert_eq!(events.len(), 1);
        assert_eq!(state.hp, 4);
        assert_eq!(state.counters.damage_taken_tonight, 6);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn waiting_through_the_night_reaches_dawn() {
        let content = Content::builtin();
        let mut state = night("patience");
        state.hp = 10_000;
        state.hp_max = 10_000;
        let mut steps = 0;
        while state.is_night() && steps < 500 {
            wait(&mut state, content).unwrap();
            steps += 1;
        }
        assert_eq!(state.phase, Phase::Day);
        assert_eq!(state.day, 2);
        assert_eq!(state.ap, state.ap_max);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn castle_can_fall() {
        let content = Content::builtin();
        let mut state = night("doom");
        state.hp = 1;
        let mut steps = 0;
        while state.is_night() && steps < 500 {
            wait(&mut state, content).unwrap();
            steps += 1;
        }
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.hp, 0);
    }

    #[test]
    fn final_night_is_victory() {
        let content = Content::builtin();
        let mut state = new_game("glory", content);
        state.day = VICTORY_DAY;
        state.phase = Phase::Night;
        let events = dawn(&mut state, content);
        assert_eq!(state.phase, Phase::Victory);
        assert!(events[0].starts_with("Victory"));
    }

    #[test]
    fn waiting_by_day_is_rejected() {
        let content = Content::builtin();
        let mut state = new_game("noon", content);
        assert!(matches!(
            wait(&mut state, content),
            Err(IntentError::WrongPhase { .. })
        ));
        assert!(begin_night(&mut state, content).is_ok());
        assert!(begin_night(&mut state, content).is_err());
    }
}
