//! Intent application: one intent in, a new state and its events out.
use serde_json::Value;

use crate::content::Content;
use crate::diplomacy::apply_diplomacy;
use crate::economy::{build, craft, demolish, equip, gather, trade, upgrade};
use crate::expeditions::start_expedition;
use crate::intent::{INTENT_KINDS, Intent, IntentError};
use crate::night::{begin_night, defend, tick, wait};
use crate::progression::{claim_quest, unlock_skill};
use crate::spells::cast_spell;
use crate::state::GameState;
use crate::synergy::active_synergies;
use crate::world::{explore, move_player, set_lesson, talk};

const NOTHING_HAPPENS: &str = "Nothing happens.";

/// Outcome of applying one intent.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentResult {
    pub state: GameState,
    /// Never empty.
    pub events: Vec<String>,
    pub ok: bool,
    pub error: Option<String>,
}

impl IntentResult {
    fn rejected(state: GameState, error: &IntentError) -> Self {
        let message = error.to_string();
        Self {
            state,
            events: vec![format!("Error: {message}")],
            ok: false,
            error: Some(message),
        }
    }
}

/// Apply an intent. The input state is returned unchanged when the intent fails.
#[must_use]
pub fn apply(state: GameState, intent: &Intent, content: &Content) -> IntentResult {
    if state.is_over() && !intent.is_informational() {
        return IntentResult::rejected(state, &IntentError::GameOver);
    }
    let mut working = state.clone();
    match dispatch(&mut working, intent, content) {
        Ok(mut events) => {
            if events.is_empty() {
                events.push(NOTHING_HAPPENS.to_string());
            }
            IntentResult {
                state: working,
                events,
                ok: true,
                error: None,
            }
        }
        Err(err) => {
            log::debug!("intent {intent} rejected: {err}");
            IntentResult::rejected(state, &err)
        }
    }
}

/// Apply a raw wire record; unknown kinds and bad payloads become an error event.
#[must_use]
pub fn apply_value(state: GameState, value: &Value, content: &Content) -> IntentResult {
    match Intent::from_value(value) {
        Ok(intent) => apply(state, &intent, content),
        Err(err) => IntentResult::rejected(state, &err),
    }
}

fn dispatch(
    state: &mut GameState,
    intent: &Intent,
    content: &Content,
) -> Result<Vec<String>, IntentError> {
    match intent {
        Intent::MovePlayer { dx, dy } => move_player(state, content, *dx, *dy),
        Intent::Explore => explore(state, content),
        Intent::Gather { resource } => gather(state, content, *resource),
        Intent::Build { structure, x, y } => build(state, content, structure, *x, *y),
        Intent::Upgrade { x, y, to } => upgrade(state, content, *x, *y, to.as_deref()),
        Intent::Demolish { x, y } => demolish(state, content, *x, *y),
        Intent::End => begin_night(state, content),
        Intent::Wait => wait(state, content),
        Intent::Tick { delta_ms } => tick(state, content, *delta_ms),
        Intent::DefendInput { text, elapsed_ms } => defend(state, content, text, *elapsed_ms),
        Intent::CastSpell { spell } => cast_spell(state, content, spell),
        Intent::Trade {
            give,
            receive,
            amount,
        } => trade(state, *give, *receive, *amount),
        Intent::Craft { item } => craft(state, content, item),
        Intent::Equip { item } => equip(state, content, item),
        Intent::Diplomacy { faction, action } => apply_diplomacy(state, content, faction, *action),
        Intent::StartExpedition { id } => start_expedition(state, content, id),
        Intent::UnlockSkill { id } => unlock_skill(state, content, id),
        Intent::ClaimQuest { id } => claim_quest(state, content, id),
        Intent::Talk => talk(state, content),
        Intent::SetLesson { lesson } => set_lesson(state, content, lesson),
        Intent::Help => Ok(help_lines(state)),
        Intent::Status => Ok(status_lines(state, content)),
    }
}

/// Commands available in the current phase.
#[must_use]
pub fn help_lines(state: &GameState) -> Vec<String> {
    if state.is_night() || state.encounter.is_some() {
        return vec![
            "Type an enemy's word to strike it.".to_string(),
            "wait | tick <ms> | cast <spell> | status | help".to_string(),
        ];
    }
    vec![
        "move <dx> <dy> | n | s | e | w | explore | gather <resource>".to_string(),
        "build <type> <x> <y> | upgrade <x> <y> [to] | demolish <x> <y>".to_string(),
        "trade <give> <receive> <amount> | craft <item> | equip <item>".to_string(),
        "diplomacy <faction> gift|agreement|break | expedition <id>".to_string(),
        "unlock <skill> | claim <quest> | talk | lesson <id> | end | status".to_string(),
        format!("Wire intents: {}", INTENT_KINDS.join(", ")),
    ]
}

/// One-screen summary of the current state.
#[must_use]
pub fn status_lines(state: &GameState, content: &Content) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Day {} ({}) | HP {}/{} | AP {}/{} | Threat {}",
            state.day, state.phase, state.hp, state.hp_max, state.ap, state.ap_max, state.threat
        ),
        format!(
            "Gold {} | Wood {} | Stone {} | Food {} | Citizens {}",
            state.gold,
            state.resources.wood,
            state.resources.stone,
            state.resources.food,
            state.citizens
        ),
    ];
    if state.is_night() {
        lines.push(format!(
            "Wave {}/{} ({}) | {} enemies, {} incoming",
            state.night.wave_index + 1,
            state.night.total_waves,
            state.night.theme,
            state.enemies.len(),
            state.night.pending_spawns.len()
        ));
    }
    for enemy in state.typing_targets() {
        lines.push(format!(
            "  {} #{} [{}] {}/{} hp at {}",
            enemy.kind, enemy.id, enemy.word, enemy.hp, enemy.max_hp, enemy.pos
        ));
    }
    let synergies = active_synergies(state, content);
    if !synergies.is_empty() {
        lines.push(format!("Synergies: {}", synergies.join(", ")));
    }
    if let Some(challenge) = &state.daily_challenge
        && let Some(def) = content.challenge(&challenge.id)
    {
        lines.push(format!("Daily challenge: {}", def.name));
    }
    lines.push(format!(
        "Typing: {:.0} wpm, {:.0}% accuracy, combo {}",
        state.typing.wpm(),
        state.typing.accuracy() * 100.0,
        state.typing.combo
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;
    use crate::world::new_game;
    use serde_json::json;

    #[test]
    fn failures_leave_state_untouched() {
        let content = Content::builtin();
        let state = new_game("pipeline", content);
        let result = apply(
            state.clone(),
            &Intent::Build {
                structure: "sentry".into(),
                x: -1,
                y: 0,
            },
            content,
        );
        assert!(!result.ok);
        assert_eq!(result.events.len(), 1);
        assert!(result.events[0].starts_with("Error"));
        assert_eq!(result.state, state);
    }

    #[test]
    fn informational_intents_change_nothing() {
        let content = Content::builtin();
        let state = new_game("pipeline", content);
        for intent in [Intent::Help, Intent::Status] {
            let result = apply(state.clone(), &intent, content);
            assert!(result.ok);
            assert!(!result.events.is_empty());
            assert_eq!(result.state, state);
        }
    }

    #[test]
    fn finished_games_reject_actions() {
        let content = Content::builtin();
        let mut state = new_game("pipeline", content);
        state.phase = Phase::GameOver;
        let result = apply(state.clone(), &Intent::Explore, content);
        assert_eq!(result.error.as_deref(), Some("the game is over"));
        assert!(apply(state, &Intent::Status, content).ok);
    }

    #[test]
    fn unknown_wire_kinds_become_events() {
        let content = Content::builtin();
        let state = new_game("pipeline", content);
        let result = apply_value(state.clone(), &json!({"kind": "teleport"}), content);
        assert!(!result.ok);
        assert!(result.events[0].contains("teleport"));
        let result = apply_value(state, &json!({"kind": "build", "x": 1}), content);
        assert!(result.events[0].contains("invalid payload"));
    }

    #[test]
    fn end_starts_the_night() {
        let content = Content::builtin();
        let state = new_game("pipeline", content);
        let result = apply(state, &Intent::End, content);
        assert!(result.ok);
        assert_eq!(result.state.phase, Phase::Night);
        assert!(result.events.iter().any(|e| e.starts_with("Wave 1/1")));
    }
}
