//! Typing proficiency and the word-to-damage bridge.
use serde::{Deserialize, Serialize};

use crate::buffs::{EFFECT_DAMAGE_MULTIPLIER, EFFECT_TYPING_DAMAGE, effect_total};
use crate::constants::{
    COMBO_BONUS_CAP, COMBO_BONUS_PER_WORD, ENCOUNTER_APPROACH_PER_SEC, ENCOUNTER_DAMAGE_PER_TIER,
    ENCOUNTER_GOLD_BONUS, TYPING_BASE_DAMAGE,
};
use crate::content::Content;
use crate::damage::{DamageType, absorb_with_shield, calculate_damage};
use crate::enemies::{pick_word, reward_kill};
use crate::intent::IntentError;
use crate::numbers::{floor_f64_to_i32, u64_to_f64};
use crate::state::{Enemy, GameState, Phase, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TypingMetrics {
    pub words_typed: u32,
    pub chars_typed: u32,
    pub errors: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub input_ms: u64,
}

impl TypingMetrics {
    /// Words per minute, counting five characters as a word.
    #[must_use]
    pub fn wpm(&self) -> f64 {
        if self.input_ms == 0 {
            return 0.0;
        }
        let minutes = u64_to_f64(self.input_ms) / 60_000.0;
        (f64::from(self.chars_typed) / 5.0) / minutes
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let attempts = self.words_typed + self.errors;
        if attempts == 0 {
            return 1.0;
        }
        f64::from(self.words_typed) / f64::from(attempts)
    }

    fn record_hit(&mut self, word: &str) {
        self.words_typed += 1;
        self.chars_typed += u32::try_from(word.chars().count()).unwrap_or(u32::MAX);
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
    }

    fn record_miss(&mut self) {
        self.errors += 1;
        self.combo = 0;
    }
}

/// Multiplier from speed band, accuracy and combo streak.
#[must_use]
pub fn proficiency_multiplier(metrics: &TypingMetrics) -> f64 {
    let wpm = metrics.wpm();
    let speed = if wpm >= 60.0 {
        1.5
    } else if wpm >= 40.0 {
        1.25
    } else if wpm >= 20.0 || wpm <= 0.0 {
        1.0
    } else {
        0.8
    };
    let accuracy = metrics.accuracy();
    let precision = if accuracy >= 0.95 {
        0.2
    } else if accuracy < 0.8 {
        -0.2
    } else {
        0.0
    };
    let combo = (COMBO_BONUS_PER_WORD * f64::from(metrics.combo)).min(COMBO_BONUS_CAP);
    speed + precision + combo
}

/// Damage one correctly typed word deals right now.
#[must_use]
pub fn typing_damage(state: &GameState, content: &Content) -> i32 {
    let base = TYPING_BASE_DAMAGE + effect_total(state, content, EFFECT_TYPING_DAMAGE);
    let buff = 1.0 + effect_total(state, content, EFFECT_DAMAGE_MULTIPLIER);
    floor_f64_to_i32(base * proficiency_multiplier(&state.typing) * buff).max(1)
}

fn targets_mut(state: &mut GameState) -> &mut Vec<Enemy> {
    match state.encounter.as_mut() {
        Some(encounter) => &mut encounter.enemies,
        None => &mut state.enemies,
    }
}

/// Match typed text against live enemies and strike the first match.
///
/// # Errors
///
/// Returns [`IntentError::InvalidPayload`] for blank input.
pub fn resolve_typed_word(
    state: &mut GameState,
    content: &Content,
    text: &str,
    elapsed_ms: u64,
) -> Result<Vec<String>, IntentError> {
    let typed = text.trim();
    if typed.is_empty() {
        return Err(IntentError::InvalidPayload("type a word to attack".into()));
    }
    state.typing.input_ms += elapsed_ms;
    let in_encounter = state.encounter.is_some();
    let Some(target) = state
        .typing_targets()
        .iter()
        .position(|enemy| enemy.is_alive() && enemy.word.eq_ignore_ascii_case(typed))
    else {
        state.typing.record_miss();
        return Ok(vec![format!("Miss! '{typed}' matches no enemy")]);
    };

    let damage = typing_damage(state, content);
    state.typing.record_hit(typed);
    state.counters.words_typed += 1;
    state.counters.max_combo = state
        .counters
        .max_combo
        .max(i32::try_from(state.typing.combo).unwrap_or(i32::MAX));

    let enemy = &mut targets_mut(state)[target];
    let dealt = calculate_damage(damage, DamageType::Pure, enemy);
    let through = absorb_with_shield(&mut enemy.shield, dealt);
    enemy.hp -= through;
    let mut events = vec![format!(
        "'{typed}' strikes {} #{} for {through}",
        enemy.kind, enemy.id
    )];

    if enemy.is_alive() {
        let (is_boss, hp, max_hp) = (enemy.is_boss, enemy.hp, enemy.max_hp);
        let word = pick_word(state, content, is_boss);
        let enemy = &mut targets_mut(state)[target];
        enemy.word.clone_from(&word);
        events.push(format!(
            "{} #{} holds on ({hp}/{max_hp}), next word '{word}'",
            enemy.kind, enemy.id
        ));
        if let Some(event) = crate::boss::update_boss_phase(enemy, content) {
            events.push(event);
        }
        return Ok(events);
    }

    let defeated = targets_mut(state).remove(target);
    events.push(reward_kill(state, content, &defeated));
    if in_encounter {
        state.add_resource(ResourceKind::Gold, ENCOUNTER_GOLD_BONUS * defeated.tier);
        if state
            .encounter
            .as_ref()
            .is_some_and(|encounter| encounter.enemies.is_empty())
        {
            events.extend(end_encounter(state));
        }
    }
    Ok(events)
}

/// Close the encounter and return to exploration.
pub fn end_encounter(state: &mut GameState) -> Vec<String> {
    state.encounter = None;
    state.typing.combo = 0;
    vec!["Encounter cleared. You return to exploring.".to_string()]
}

/// Move encounter enemies closer; those that arrive strike the player.
pub fn tick_encounter(state: &mut GameState, elapsed_ms: u64) -> Vec<String> {
    let Some(encounter) = state.encounter.as_mut() else {
        return Vec::new();
    };
    let secs = u64_to_f64(elapsed_ms) / 1_000.0;
    let mut events = Vec::new();
    let mut damage_taken = 0;
    encounter.enemies.retain_mut(|enemy| {
        enemy.approach += ENCOUNTER_APPROACH_PER_SEC * secs;
        if enemy.approach >= 1.0 {
            let hit = ENCOUNTER_DAMAGE_PER_TIER * enemy.tier.max(1);
            damage_taken += hit;
            events.push(format!("{} #{} reaches you for {hit} damage", enemy.kind, enemy.id));
            false
        } else {
            true
        }
    });
    let cleared = encounter.enemies.is_empty();
    state.hp -= damage_taken;
    if state.hp <= 0 {
        state.hp = 0;
        state.phase = Phase::GameOver;
        state.encounter = None;
        events.push("You have fallen. Game over.".to_string());
        return events;
    }
    if cleared && damage_taken > 0 {
        events.extend(end_encounter(state));
    }
    events
}
