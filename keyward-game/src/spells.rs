//! Player spells with per-spell cooldowns in seconds.
use crate::content::{Content, SpellEffect};
use crate::damage::{absorb_with_shield, calculate_damage};
use crate::enemies::{reward_kill, sweep_defeated};
use crate::intent::IntentError;
use crate::numbers::u64_to_f64;
use crate::state::{Enemy, GameState, ResourceKind};
use crate::status::{StatusKind, apply_status};
use crate::typing::end_encounter;

/// Remaining cooldown for a spell, zero when ready or never cast.
#[must_use]
pub fn cooldown_remaining(state: &GameState, spell: &str) -> f64 {
    state
        .spells
        .get(spell)
        .map_or(0.0, |entry| entry.cooldown_secs.max(0.0))
}

/// Count every spell cooldown down by `elapsed_ms`, floored at zero.
pub fn tick_spell_cooldowns(state: &mut GameState, elapsed_ms: u64) {
    let secs = u64_to_f64(elapsed_ms) / 1_000.0;
    for entry in state.spells.values_mut() {
        entry.cooldown_secs = (entry.cooldown_secs - secs).max(0.0);
    }
}

fn targets_mut(state: &mut GameState) -> &mut Vec<Enemy> {
    match state.encounter.as_mut() {
        Some(encounter) => &mut encounter.enemies,
        None => &mut state.enemies,
    }
}

fn collect_encounter_kills(state: &mut GameState, content: &Content) -> Vec<String> {
    let Some(encounter) = state.encounter.as_mut() else {
        return sweep_defeated(state, content);
    };
    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut encounter.enemies)
        .into_iter()
        .partition(|enemy| !enemy.is_alive());
    encounter.enemies = alive;
    let cleared = encounter.enemies.is_empty();
    let mut events: Vec<String> = dead
        .iter()
        .map(|enemy| reward_kill(state, content, enemy))
        .collect();
    if cleared {
        events.extend(end_encounter(state));
    }
    events
}

/// Cast a spell at night or during an encounter.
///
/// # Errors
///
/// Fails for unknown spells, in the wrong phase, or while cooling down.
pub fn cast_spell(
    state: &mut GameState,
    content: &Content,
    spell: &str,
) -> Result<Vec<String>, IntentError> {
    let def = content
        .spell(spell)
        .ok_or_else(|| IntentError::unknown("spell", spell))?;
    if !state.is_night() && state.encounter.is_none() {
        return Err(IntentError::WrongPhase {
            action: "cast spells",
            phase: state.phase,
        });
    }
    let remaining = cooldown_remaining(state, &def.id);
    if remaining > 0.0 {
        return Err(IntentError::OnCooldown {
            what: def.name.clone(),
            remaining,
        });
    }

    let mut events = Vec::new();
    match &def.effect {
        SpellEffect::DamageAll {
            amount,
            damage_type,
        } => {
            let mut hits = 0;
            for enemy in targets_mut(state).iter_mut().filter(|e| e.is_alive()) {
                let dealt = calculate_damage(*amount, *damage_type, enemy);
                enemy.hp -= absorb_with_shield(&mut enemy.shield, dealt);
                hits += 1;
            }
            events.push(format!("{} scorches {hits} foe(s)", def.name));
            events.extend(collect_encounter_kills(state, content));
        }
        SpellEffect::FreezeAll { duration_ms } => {
            let targets = targets_mut(state);
            for enemy in targets.iter_mut() {
                apply_status(&mut enemy.status, StatusKind::Frozen, *duration_ms, 0);
            }
            events.push(format!(
                "{} freezes {} foe(s) for {}s",
                def.name,
                targets.len(),
                duration_ms / 1_000
            ));
        }
        SpellEffect::Heal { amount } => {
            let before = state.hp;
            state.hp = (state.hp + amount).min(state.hp_max);
            events.push(format!("{} restores {} hp", def.name, state.hp - before));
        }
        SpellEffect::GoldRush { amount } => {
            state.add_resource(ResourceKind::Gold, *amount);
            events.push(format!("{} yields {amount} gold", def.name));
        }
    }
    state.spells.entry(def.id.clone()).or_default().cooldown_secs = def.cooldown_secs;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridPos;
    use crate::state::{Encounter, Phase};
    use crate::status::has_status;
    use crate::world::new_game;

    fn night_with(enemies: Vec<Enemy>) -> GameState {
        let mut state = new_game("spells", Content::builtin());
        state.phase = Phase::Night;
        state.enemies = enemies;
        state
    }

    fn enemy(id: u32, hp: i32) -> Enemy {
        Enemy {
            id,
            kind: "raider".into(),
            pos: GridPos::new(0, 0),
            hp,
            max_hp: hp,
            gold: 2,
            ..Enemy::default()
        }
    }

    #[test]
    fn day_casting_is_rejected() {
        let content = Content::builtin();
        let mut state = new_game("spells", content);
        assert!(matches!(
            cast_spell(&mut state, content, "mend"),
            Err(IntentError::WrongPhase { .. })
        ));
    }

    #[test]
    fn cooldown_blocks_then_recovers() {
        let content = Content::builtin();
        let mut state = night_with(Vec::new());
        cast_spell(&mut state, content, "windfall").unwrap();
        let err = cast_spell(&mut state, content, "windfall").unwrap_err();
        assert!(matches!(err, IntentError::OnCooldown { .. }));
        let secs = content.spell("windfall").unwrap().cooldown_secs;
        tick_spell_cooldowns(&mut state, 1_000_000);
        assert!(cooldown_remaining(&state, "windfall").abs() < f64::EPSILON);
        assert!(secs > 0.0);
        cast_spell(&mut state, content, "windfall").unwrap();
    }

    #[test]
    fn fireball_kills_weak_enemies() {
        let content = Content::builtin();
        let mut state = night_with(vec![enemy(1, 1), enemy(2, 500)]);
        let events = cast_spell(&mut state, content, "fireball").unwrap();
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, 2);
        assert!(events.iter().any(|e| e.contains("Defeated raider #1")));
    }

    #[test]
    fn blizzard_freezes_encounter() {
        let content = Content::builtin();
        let mut state = new_game("spells", content);
        state.encounter = Some(Encounter {
            source_id: 9,
            enemies: vec![enemy(3, 10)],
        });
        cast_spell(&mut state, content, "blizzard").unwrap();
        let foe = &state.encounter.as_ref().unwrap().enemies[0];
        assert!(has_status(&foe.status, StatusKind::Frozen));
    }

    #[test]
    fn mend_does_not_overheal() {
        let content = Content::builtin();
        let mut state = night_with(Vec::new());
        state.hp = state.hp_max - 1;
        cast_spell(&mut state, content, "mend").unwrap();
        assert_eq!(state.hp, state.hp_max);
    }
}
